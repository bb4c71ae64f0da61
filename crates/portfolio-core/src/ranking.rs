use crate::models::ValuatedHolding;

pub const TOP_PERFORMERS_COUNT: usize = 5;

/// Best performers by percentage gain, descending. Holdings without a
/// computable gain are excluded outright; ties keep input order (the
/// sort is stable).
pub fn top_performers(holdings: &[ValuatedHolding], count: usize) -> Vec<ValuatedHolding> {
    let mut ranked: Vec<ValuatedHolding> = holdings
        .iter()
        .filter(|h| h.gain_pct.is_some())
        .cloned()
        .collect();
    ranked.sort_by(|a, b| {
        b.gain_pct
            .partial_cmp(&a.gain_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(count);
    ranked
}
