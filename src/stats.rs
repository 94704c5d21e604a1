// Weighted statistics helpers shared across the pipeline stages

/// Sum of value × weight over all observations.
pub fn weighted_sum<I>(pairs: I) -> f64
where
    I: IntoIterator<Item = (f64, f64)>,
{
    pairs.into_iter().map(|(value, weight)| value * weight).sum()
}

/// Weight-proportional mean. NaN on an empty or zero-weight input.
pub fn weighted_mean<I>(pairs: I) -> f64
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut numerator = 0.0;
    let mut total_weight = 0.0;
    for (value, weight) in pairs {
        numerator += value * weight;
        total_weight += weight;
    }
    numerator / total_weight
}
