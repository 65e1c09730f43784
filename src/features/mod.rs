use serde::{Deserialize, Serialize};

use crate::core::error::{ScoutError, ScoutResult};
use crate::data::Record;

/// Default age assumed when a record carries none.
pub const DEFAULT_AGE: f64 = 25.0;
/// Valid age range; values outside are clamped or rejected depending on
/// the derivation path.
pub const AGE_MIN: f64 = 16.0;
pub const AGE_MAX: f64 = 50.0;

/// The fixed numeric input to both regressors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub goals: f64,
    pub assists: f64,
    pub minutes_played: f64,
    pub age: f64,
}

impl FeatureVector {
    pub const SIZE: usize = 4;

    pub fn as_array(&self) -> [f64; Self::SIZE] {
        [self.goals, self.assists, self.minutes_played, self.age]
    }

    /// Clamp into the valid domain: non-negative counts, age in range.
    pub fn clamped(self) -> Self {
        Self {
            goals: self.goals.max(0.0),
            assists: self.assists.max(0.0),
            minutes_played: self.minutes_played.max(0.0),
            age: self.age.clamp(AGE_MIN, AGE_MAX),
        }
    }
}

/// Raw per-record extraction with defaults but without clamping.
///
/// `MP` counts matches played; real minutes come from a `Min` column when
/// present and are estimated as `MP * 90` otherwise. The training
/// pipeline uses this unclamped form for its validity filter.
pub fn raw_from_record(record: &Record) -> FeatureVector {
    let goals = record.numeric_or("Gls", 0.0);
    let assists = record.numeric_or("Ast", 0.0);
    let matches_played = record.numeric_or("MP", 0.0);
    let minutes_played = record.numeric_or("Min", matches_played * 90.0);
    let age = record.numeric_or("Age", DEFAULT_AGE);

    FeatureVector {
        goals,
        assists,
        minutes_played,
        age,
    }
}

/// Derive a validated feature vector from a record. Malformed or missing
/// cells degrade to defaults and out-of-range values are clamped; this
/// path never fails.
pub fn from_record(record: &Record) -> FeatureVector {
    raw_from_record(record).clamped()
}

/// Derive a feature vector from values a human typed in directly.
///
/// Unlike the record path this reports out-of-range values as
/// `InvalidInput` instead of silently clamping them.
pub fn from_direct_input(
    goals: f64,
    assists: f64,
    minutes_played: f64,
    age: f64,
) -> ScoutResult<FeatureVector> {
    if goals < 0.0 {
        return Err(ScoutError::InvalidInput(format!(
            "goals must be non-negative, got {goals}"
        )));
    }
    if assists < 0.0 {
        return Err(ScoutError::InvalidInput(format!(
            "assists must be non-negative, got {assists}"
        )));
    }
    if minutes_played < 0.0 {
        return Err(ScoutError::InvalidInput(format!(
            "minutes played must be non-negative, got {minutes_played}"
        )));
    }
    if !(AGE_MIN..=AGE_MAX).contains(&age) {
        return Err(ScoutError::InvalidInput(format!(
            "age must be between {AGE_MIN} and {AGE_MAX}, got {age}"
        )));
    }

    Ok(FeatureVector {
        goals,
        assists,
        minutes_played,
        age,
    }
    .clamped())
}

/// A record counts as active when its matches-played field coerces to an
/// integer greater than zero. Missing and non-numeric values read as
/// inactive.
pub fn is_active(record: &Record) -> bool {
    record
        .get("MP")
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .map_or(false, |mp| mp > 0)
}
