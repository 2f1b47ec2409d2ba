//! Completion percentage derivation.

/// Derive the completion percentage from hours played against the estimate.
///
/// A non-positive estimate yields `0` so the derivation is total. Otherwise
/// the ratio is scaled to a percentage, rounded half away from zero
/// ([`f64::round`] semantics), and clamped to `[0, 100]`.
pub fn completion_percent(hours_played: f64, estimated_hours: f64) -> u8 {
    if estimated_hours <= 0.0 {
        return 0;
    }

    let percent = (hours_played / estimated_hours * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_game_is_zero_percent() {
        assert_eq!(completion_percent(0.0, 40.0), 0);
    }

    #[test]
    fn halfway_through_the_estimate() {
        assert_eq!(completion_percent(20.0, 40.0), 50);
    }

    #[test]
    fn overshooting_the_estimate_clamps_to_one_hundred() {
        assert_eq!(completion_percent(80.0, 40.0), 100);
        assert_eq!(completion_percent(1000.0, 1.0), 100);
    }

    #[test]
    fn non_positive_estimate_yields_zero() {
        assert_eq!(completion_percent(10.0, 0.0), 0);
        assert_eq!(completion_percent(10.0, -3.0), 0);
    }

    #[test]
    fn rounds_half_away_from_zero() {
        // 19.8 / 40 = 49.5% exactly.
        assert_eq!(completion_percent(19.8, 40.0), 50);
        assert_eq!(completion_percent(19.75, 40.0), 49);
    }

    #[test]
    fn stays_within_bounds_across_a_sweep() {
        for tenths in 0..=800 {
            let hours = f64::from(tenths) / 10.0;
            let percent = completion_percent(hours, 40.0);
            assert!(percent <= 100, "hours {hours} produced {percent}");
        }
    }
}
