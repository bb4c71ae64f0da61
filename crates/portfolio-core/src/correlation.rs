use crate::models::{CorrelationMatrix, GrowthSeries};

/// Pearson correlation over the months where both series have a value.
/// Months missing from either side are excluded pairwise; pairs with
/// fewer than two common months, or with zero variance, have no defined
/// correlation.
fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y.iter())
        .filter_map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) => Some((*a, *b)),
            _ => None,
        })
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let sum_x: f64 = pairs.iter().map(|(a, _)| a).sum();
    let sum_y: f64 = pairs.iter().map(|(_, b)| b).sum();
    let sum_xy: f64 = pairs.iter().map(|(a, b)| a * b).sum();
    let sum_x2: f64 = pairs.iter().map(|(a, _)| a * a).sum();
    let sum_y2: f64 = pairs.iter().map(|(_, b)| b * b).sum();

    let denom = ((n * sum_x2 - sum_x * sum_x) * (n * sum_y2 - sum_y * sum_y)).sqrt();
    if denom < 1e-12 {
        return None;
    }
    Some((n * sum_xy - sum_x * sum_y) / denom)
}

/// Full symmetric correlation matrix across the growth series, in input
/// order. The diagonal is 1 by construction.
pub fn correlation_matrix(series: &[GrowthSeries]) -> CorrelationMatrix {
    let assets: Vec<String> = series.iter().map(|s| s.name.clone()).collect();
    let columns: Vec<Vec<Option<f64>>> = series
        .iter()
        .map(|s| s.series.iter().map(|p| p.growth_pct).collect())
        .collect();

    let values = (0..columns.len())
        .map(|i| {
            (0..columns.len())
                .map(|j| {
                    if i == j {
                        Some(1.0)
                    } else {
                        pearson(&columns[i], &columns[j])
                    }
                })
                .collect()
        })
        .collect();

    CorrelationMatrix { assets, values }
}
