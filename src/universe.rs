//! Company name to exchange ticker table

use crate::types::Ticker;
use serde::{Deserialize, Serialize};

/// A listed company shown on the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    pub ticker: Ticker,
}

impl Company {
    pub fn new(name: impl Into<String>, ticker: impl Into<Ticker>) -> Self {
        Self {
            name: name.into(),
            ticker: ticker.into(),
        }
    }
}

/// Base company plus its comparison peers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    pub base: Company,
    #[serde(default)]
    pub competitors: Vec<Company>,
}

impl Universe {
    pub fn new(base: Company, competitors: Vec<Company>) -> Self {
        Self { base, competitors }
    }

    /// Bursa Malaysia property developers compared against LBS Bina
    pub fn bursa_property() -> Self {
        let competitors = [
            ("S P Setia", "8664.KL"),
            ("Sime Darby Property", "5288.KL"),
            ("Eco World", "8206.KL"),
            ("UEM Sunrise", "5148.KL"),
            ("IOI Properties", "5249.KL"),
            ("Mah Sing", "8583.KL"),
            ("IJM Corporation", "3336.KL"),
            ("Sunway", "5211.KL"),
            ("Gamuda", "5398.KL"),
            ("OSK Holdings", "5053.KL"),
            ("UOA Development", "5200.KL"),
        ]
        .into_iter()
        .map(|(name, ticker)| Company::new(name, ticker))
        .collect();

        Self::new(Company::new("LBS Bina", "5789.KL"), competitors)
    }

    /// All companies, base first
    pub fn companies(&self) -> impl Iterator<Item = &Company> {
        std::iter::once(&self.base).chain(self.competitors.iter())
    }

    /// Display names, base first
    pub fn names(&self) -> Vec<&str> {
        self.companies().map(|c| c.name.as_str()).collect()
    }

    pub fn find(&self, name: &str) -> Option<&Company> {
        self.companies().find(|c| c.name == name)
    }

    pub fn ticker_for(&self, name: &str) -> Option<&str> {
        self.find(name).map(|c| c.ticker.as_str())
    }

    pub fn name_for(&self, ticker: &str) -> Option<&str> {
        self.companies()
            .find(|c| c.ticker == ticker)
            .map(|c| c.name.as_str())
    }

    /// Resolve display names, splitting them into known companies and unknown names
    pub fn resolve<'a, S: AsRef<str>>(&'a self, names: &'a [S]) -> (Vec<Company>, Vec<&'a str>) {
        let mut known = Vec::new();
        let mut unknown = Vec::new();
        for name in names {
            match self.find(name.as_ref()) {
                Some(company) if !known.contains(company) => known.push(company.clone()),
                Some(_) => {}
                None => unknown.push(name.as_ref()),
            }
        }
        (known, unknown)
    }
}

impl Default for Universe {
    fn default() -> Self {
        Self::bursa_property()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_ticker() {
        let universe = Universe::default();
        assert_eq!(universe.ticker_for("LBS Bina"), Some("5789.KL"));
        assert_eq!(universe.ticker_for("Gamuda"), Some("5398.KL"));
        assert_eq!(universe.ticker_for("Nonexistent Bhd"), None);
    }

    #[test]
    fn test_names_start_with_base() {
        let universe = Universe::default();
        let names = universe.names();
        assert_eq!(names.len(), 12);
        assert_eq!(names[0], "LBS Bina");
    }

    #[test]
    fn test_name_for_ticker() {
        let universe = Universe::default();
        assert_eq!(universe.name_for("8583.KL"), Some("Mah Sing"));
    }

    #[test]
    fn test_resolve_splits_unknown_and_dedups() {
        let universe = Universe::default();
        let (known, unknown) = universe.resolve(&["Sunway", "Foo", "Sunway"]);
        assert_eq!(known.len(), 1);
        assert_eq!(known[0].ticker, "5211.KL");
        assert_eq!(unknown, vec!["Foo"]);
    }
}
