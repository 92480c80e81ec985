//! Per-chunk signal processing: gain stage and RMS level

/// Fixed amplification applied to every captured sample
pub const DEFAULT_GAIN: f32 = 10.0;

/// Amplify a single sample and clip it to the signed 16-bit range.
///
/// The multiplication happens in `f32`, so inputs that would overflow
/// `i16` saturate at the rails instead of wrapping around.
pub fn amplify_sample(sample: i16, gain: f32) -> i16 {
    let scaled = sample as f32 * gain;
    scaled.clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Apply the gain stage to a whole chunk in place
pub fn amplify(samples: &mut [i16], gain: f32) {
    for sample in samples.iter_mut() {
        *sample = amplify_sample(*sample, gain);
    }
}

/// Root-mean-square amplitude on the raw 16-bit scale (0..=32768).
/// An empty chunk has RMS 0.
pub fn rms(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_sq: f64 = samples
        .iter()
        .map(|&s| {
            let s = s as f64;
            s * s
        })
        .sum();

    (sum_sq / samples.len() as f64).sqrt() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gain_multiplies_small_samples() {
        assert_eq!(amplify_sample(100, DEFAULT_GAIN), 1000);
        assert_eq!(amplify_sample(-250, DEFAULT_GAIN), -2500);
        assert_eq!(amplify_sample(0, DEFAULT_GAIN), 0);
    }

    #[test]
    fn gain_saturates_instead_of_wrapping() {
        assert_eq!(amplify_sample(4000, DEFAULT_GAIN), 32767);
        assert_eq!(amplify_sample(-4000, DEFAULT_GAIN), -32768);
        assert_eq!(amplify_sample(i16::MAX, DEFAULT_GAIN), i16::MAX);
        assert_eq!(amplify_sample(i16::MIN, DEFAULT_GAIN), i16::MIN);
    }

    #[test]
    fn gain_boundary_values() {
        // 3276 * 10 fits, 3277 * 10 does not
        assert_eq!(amplify_sample(3276, DEFAULT_GAIN), 32760);
        assert_eq!(amplify_sample(3277, DEFAULT_GAIN), 32767);
        assert_eq!(amplify_sample(-3277, DEFAULT_GAIN), -32768);
    }

    #[test]
    fn amplify_chunk_in_place() {
        let mut chunk = vec![1, -1, 5000, -5000];
        amplify(&mut chunk, DEFAULT_GAIN);
        assert_eq!(chunk, vec![10, -10, 32767, -32768]);
    }

    #[test]
    fn rms_of_constant_signal() {
        assert_eq!(rms(&[500; 64]), 500.0);
        assert_eq!(rms(&[-500; 64]), 500.0);
    }

    #[test]
    fn rms_of_mixed_signal() {
        // sqrt((3^2 + 4^2) / 2) = sqrt(12.5)
        let value = rms(&[3, -4]);
        assert!((value - 12.5f32.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn rms_of_empty_chunk_is_zero() {
        assert_eq!(rms(&[]), 0.0);
    }
}
