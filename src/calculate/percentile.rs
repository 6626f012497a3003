//! Mid-rank percentiles.

/// Percentile returned for degenerate populations.
pub const NEUTRAL_PERCENTILE: f64 = 50.0;

/// Percentile (0-100) of `value` within `population`.
///
/// Ties share the midpoint of their group:
/// `(count(x < value) + 0.5 * count(x == value)) / n * 100`.
/// Populations of one or zero give 50.
pub fn percentile(value: f64, population: &[f64]) -> f64 {
    if population.len() <= 1 {
        return NEUTRAL_PERCENTILE;
    }

    let (below, equal) = population.iter().fold((0usize, 0usize), |(below, equal), &x| {
        if x < value {
            (below + 1, equal)
        } else if x == value {
            (below, equal + 1)
        } else {
            (below, equal)
        }
    });

    (below as f64 + equal as f64 * 0.5) / population.len() as f64 * 100.0
}

/// Mean of several percentiles.
pub fn mean_percentile(percentiles: &[f64]) -> f64 {
    if percentiles.is_empty() {
        NEUTRAL_PERCENTILE
    } else {
        percentiles.iter().sum::<f64>() / percentiles.len() as f64
    }
}
