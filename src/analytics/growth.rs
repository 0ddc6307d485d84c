//! Compound annual growth of the dividend

use super::aggregate::AnnualDividend;

/// CAGR between the earliest and latest years with a strictly positive total.
///
/// `None` with fewer than two such years or a zero year span.
pub fn cagr(annual: &[AnnualDividend]) -> Option<f64> {
    let mut positive = annual.iter().filter(|a| a.amount > 0.0);
    let first = positive.next()?;
    let last = positive.last()?;

    let elapsed = last.year - first.year;
    if elapsed <= 0 {
        return None;
    }

    let rate = (last.amount / first.amount).powf(1.0 / elapsed as f64) - 1.0;
    rate.is_finite().then_some(rate)
}
