//! Closed-form scoring formulas.
//!
//! These generate the synthetic regression targets during training and
//! double as the fallback predictor when no trained artifacts exist, so
//! the two paths agree by construction.

use crate::features::FeatureVector;

/// Assists count for slightly less than goals in the combined
/// contribution score.
pub const ASSIST_WEIGHT: f64 = 0.8;

/// Age curve for expected performance: peak between 23 and 28, growth
/// before, gradual decline after.
pub fn age_multiplier(age: f64) -> f64 {
    if (23.0..=28.0).contains(&age) {
        1.1
    } else if age < 23.0 {
        0.95 + (age - 18.0) * 0.03
    } else {
        1.0 - (age - 28.0) * 0.02
    }
}

/// Playing-time factor: regular starters keep their output, fringe
/// players are discounted.
pub fn time_factor(minutes_played: f64) -> f64 {
    if minutes_played > 2000.0 {
        1.0
    } else if minutes_played > 1000.0 {
        0.9
    } else {
        0.7
    }
}

/// Per-match performance estimate (expected goals + assists contribution).
pub fn performance_target(features: &FeatureVector) -> f64 {
    let base = features.goals + features.assists * ASSIST_WEIGHT;
    let estimate = base * age_multiplier(features.age) * time_factor(features.minutes_played) * 0.15;
    estimate.max(0.0)
}

/// Age curve for market value: youth carries a premium, value declines
/// past the peak years.
pub fn value_age_factor(age: f64) -> f64 {
    if age < 23.0 {
        1.3
    } else if age <= 28.0 {
        1.0
    } else {
        0.6 - (age - 28.0) * 0.05
    }
}

/// How much of a full season the player actually featured in.
/// A full season is roughly 2500 minutes.
pub fn consistency(minutes_played: f64) -> f64 {
    (minutes_played / 2500.0).min(1.0)
}

/// Market value estimate in millions. Never below 0.1.
pub fn value_target(features: &FeatureVector) -> f64 {
    let base = features.goals * 2.5 + features.assists * 1.8;
    let estimate =
        base * value_age_factor(features.age) * consistency(features.minutes_played) / 10.0;
    estimate.max(0.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn features(goals: f64, assists: f64, minutes: f64, age: f64) -> FeatureVector {
        FeatureVector {
            goals,
            assists,
            minutes_played: minutes,
            age,
        }
    }

    #[test_case(25.0, 1.1; "peak years")]
    #[test_case(20.0, 0.95 + 2.0 * 0.03; "growing")]
    #[test_case(33.0, 1.0 - 5.0 * 0.02; "declining")]
    fn age_multiplier_curve(age: f64, expected: f64) {
        assert!((age_multiplier(age) - expected).abs() < 1e-12);
    }

    #[test_case(2500.0, 1.0; "regular starter")]
    #[test_case(1500.0, 0.9; "rotation")]
    #[test_case(500.0, 0.7; "fringe")]
    fn time_factor_tiers(minutes: f64, expected: f64) {
        assert!((time_factor(minutes) - expected).abs() < 1e-12);
    }

    #[test]
    fn performance_target_matches_formula() {
        let f = features(20.0, 10.0, 2700.0, 25.0);
        let expected = (20.0 + 10.0 * 0.8) * 1.1 * 1.0 * 0.15;
        assert!((performance_target(&f) - expected).abs() < 1e-12);
    }

    #[test]
    fn performance_target_never_negative() {
        let f = features(0.0, 0.0, 0.0, 45.0);
        assert!(performance_target(&f) >= 0.0);
    }

    #[test]
    fn value_target_has_floor() {
        let f = features(0.0, 0.0, 0.0, 40.0);
        assert!((value_target(&f) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn value_target_matches_formula() {
        let f = features(20.0, 10.0, 2500.0, 22.0);
        let expected = (20.0 * 2.5 + 10.0 * 1.8) * 1.3 * 1.0 / 10.0;
        assert!((value_target(&f) - expected).abs() < 1e-12);
    }
}
