//! Intensity math shared by the Normalizer and its benchmark.

/// Maximum value of an 8-bit sample.
pub const MAX_SAMPLE: f32 = 255.0;

/// Min-max stretch a slice in place so its values span `[0, 1]`.
///
/// A constant slice has no range to stretch; it becomes all zeros.
pub fn min_max_normalize_in_place(v: &mut [f32]) {
    let (min, max) = v
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x), hi.max(x))
        });
    let range = max - min;
    if range > f32::EPSILON {
        for x in v.iter_mut() {
            *x = (*x - min) / range;
        }
    } else {
        v.fill(0.0);
    }
}

/// Min-max stretch 8-bit samples to the full `[0, 255]` range.
///
/// Samples go through `[0, 1]` floats, are stretched, then mapped back with
/// `round(v * 255)` clamped to the sample range.
pub fn stretch_samples(samples: &[u8]) -> Vec<u8> {
    let mut unit: Vec<f32> = samples.iter().map(|&s| s as f32 / MAX_SAMPLE).collect();
    min_max_normalize_in_place(&mut unit);
    unit.iter()
        .map(|&x| (x * MAX_SAMPLE).round().clamp(0.0, MAX_SAMPLE) as u8)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_max_normalize() {
        let mut v = vec![0.2, 0.4, 0.6];
        min_max_normalize_in_place(&mut v);
        assert!((v[0] - 0.0).abs() < 1e-6);
        assert!((v[1] - 0.5).abs() < 1e-6);
        assert!((v[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_min_max_normalize_constant_is_zero() {
        let mut v = vec![0.7, 0.7, 0.7];
        min_max_normalize_in_place(&mut v);
        assert_eq!(v, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_min_max_normalize_empty() {
        let mut v: Vec<f32> = vec![];
        min_max_normalize_in_place(&mut v);
        assert!(v.is_empty());
    }

    #[test]
    fn test_stretch_samples_fills_range() {
        let out = stretch_samples(&[50, 75, 150]);
        assert_eq!(out, vec![0, 64, 255]);
    }

    #[test]
    fn test_stretch_samples_uniform() {
        assert_eq!(stretch_samples(&[0; 16]), vec![0; 16]);
        assert_eq!(stretch_samples(&[200; 16]), vec![0; 16]);
    }

    #[test]
    fn test_stretch_samples_idempotent_on_full_range() {
        let once = stretch_samples(&[10, 40, 90, 200, 240]);
        let twice = stretch_samples(&once);
        assert_eq!(once, twice);
    }
}
