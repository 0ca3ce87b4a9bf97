// Throttle slider -> global speed multiplier

/// Map the slider (-1 = full speed, +1 = minimum) to a scale in `[floor, 1]`
///
/// No ceiling is applied, so an out-of-range slider below -1 scales above 1.
pub fn throttle_scale(slider: f64, floor: f64) -> f64 {
    let scale = (-slider + 1.0) / 2.0;
    if scale < floor { floor } else { scale }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLOOR: f64 = 0.15;

    #[test]
    fn test_extremes() {
        assert_eq!(throttle_scale(-1.0, FLOOR), 1.0);
        assert_eq!(throttle_scale(1.0, FLOOR), FLOOR);
        assert_eq!(throttle_scale(0.0, FLOOR), 0.5);
    }

    #[test]
    fn test_floor_region() {
        for s in [0.71, 0.8, 0.9, 1.0] {
            assert_eq!(throttle_scale(s, FLOOR), FLOOR, "slider {s}");
        }
        // Breakpoint at (-s + 1) / 2 = 0.15
        assert!((throttle_scale(0.7, FLOOR) - FLOOR).abs() < 1e-12);
    }

    #[test]
    fn test_monotonic_and_bounded() {
        let mut prev = f64::MAX;
        for i in -100..=100 {
            let s = i as f64 / 100.0;
            let scale = throttle_scale(s, FLOOR);
            assert!(scale <= prev, "scale rose at slider {s}");
            assert!((FLOOR..=1.0).contains(&scale), "scale {scale} out of range");
            prev = scale;
        }
    }
}
