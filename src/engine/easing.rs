// Animation timing helpers.

use std::time::Duration;

/// Symmetric cubic ease: accelerates through the first half, decelerates through the second.
/// Input is clamped to [0, 1]; `ease_in_out_cubic(0) == 0`, `ease_in_out_cubic(1) == 1`.
pub fn ease_in_out_cubic(p: f32) -> f32 {
    let p = p.clamp(0.0, 1.0);
    if p < 0.5 {
        4.0 * p * p * p
    } else {
        1.0 - (-2.0 * p + 2.0).powi(3) / 2.0
    }
}

/// Fraction of `duration` covered by `elapsed`, clamped to [0, 1].
/// A zero duration is already complete.
pub fn progress(elapsed: Duration, duration: Duration) -> f32 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_fixed() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_eq!(ease_in_out_cubic(1.0), 1.0);
        assert_eq!(ease_in_out_cubic(0.5), 0.5);
    }

    #[test]
    fn monotonic_over_unit_interval() {
        let mut prev = ease_in_out_cubic(0.0);
        for i in 1..=1000 {
            let next = ease_in_out_cubic(i as f32 / 1000.0);
            assert!(next >= prev, "ease dropped at step {i}: {prev} -> {next}");
            prev = next;
        }
    }

    #[test]
    fn slow_start_and_finish() {
        assert!(ease_in_out_cubic(0.25) < 0.25);
        assert!(ease_in_out_cubic(0.75) > 0.75);
        assert!((ease_in_out_cubic(0.25) - 0.0625).abs() < 1e-6);
    }

    #[test]
    fn out_of_range_input_is_clamped() {
        assert_eq!(ease_in_out_cubic(-3.0), 0.0);
        assert_eq!(ease_in_out_cubic(7.0), 1.0);
    }

    #[test]
    fn progress_clamps_and_handles_zero_duration() {
        let second = Duration::from_millis(1000);
        assert_eq!(progress(Duration::from_millis(250), second), 0.25);
        assert_eq!(progress(Duration::from_millis(5000), second), 1.0);
        assert_eq!(progress(Duration::ZERO, Duration::ZERO), 1.0);
    }
}
