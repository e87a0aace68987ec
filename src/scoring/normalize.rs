use super::schema::MetricDescriptor;

/// Value returned for a descriptor whose range is empty (`min >= max`).
///
/// Schema validation rejects such descriptors up front; this only keeps
/// `normalize` total when it is called on an unvalidated descriptor.
pub const DEGENERATE_NORMALIZED: f64 = 0.5;

/// Map a raw metric value into `0.0..=1.0`.
///
/// The value is clamped into `[min, max]` first, so out-of-range raw values
/// score like the nearest bound. With `invert_scale` the result is flipped so
/// smaller raw values score higher.
pub fn normalize(raw: f64, metric: &MetricDescriptor) -> f64 {
    let (min, max) = (metric.min, metric.max);
    // Also false for NaN bounds, which would make `clamp` panic.
    if !(max > min) {
        return DEGENERATE_NORMALIZED;
    }

    let clamped = raw.clamp(min, max);
    let value = (clamped - min) / (max - min);

    if metric.invert_scale {
        1.0 - value
    } else {
        value
    }
}
