/// Centered sliding-window mean without padding.
///
/// Each output is the mean of `values[i - left ..= i + right]` where
/// `left = window / 2` and `right = window - 1 - left`, with the window
/// clipped at both ends of the series.
pub(crate) fn centered_mean(values: &[f64], window: usize) -> Vec<f64> {
    if window <= 1 || values.len() <= 1 {
        return values.to_vec();
    }
    let left = window / 2;
    let right = window - 1 - left;

    let mut prefix = Vec::with_capacity(values.len() + 1);
    prefix.push(0.0);
    for v in values {
        let last = prefix[prefix.len() - 1];
        prefix.push(last + v);
    }

    (0..values.len())
        .map(|i| {
            let lo = i.saturating_sub(left);
            let hi = (i + right).min(values.len() - 1);
            (prefix[hi + 1] - prefix[lo]) / (hi + 1 - lo) as f64
        })
        .collect()
}
