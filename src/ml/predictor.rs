use std::path::Path;

use serde::Serialize;
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::core::error::{ScoutError, ScoutResult};
use crate::features::FeatureVector;

use super::heuristics::{self, ASSIST_WEIGHT};
use super::trainer::{self, Artifacts};

/// Matches in a reference season, used to normalise the model's combined
/// score to a per-match estimate.
const SEASON_MATCHES: f64 = 35.0;
/// Assists are reported slightly more generously than goals.
const ASSIST_SCALE: f64 = 1.25;

#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    pub predicted_goals: f64,
    pub predicted_assists: f64,
    pub performance_score: f64,
    pub market_value: f64,
}

/// Prediction front-end holding the optional trained artifacts.
///
/// Constructed once and shared by reference; predictions only read the
/// loaded state. Missing artifacts are not an error: the service
/// degrades to the closed-form heuristics instead.
pub struct PredictionService {
    artifacts: Option<Artifacts>,
}

impl PredictionService {
    /// Load artifacts from `models_dir`, degrading to the heuristic path
    /// when the set is incomplete.
    pub fn new(models_dir: &Path) -> Self {
        match trainer::load(models_dir) {
            Ok(artifacts) => {
                log::info!("Loaded trained models from {}", models_dir.display());
                Self {
                    artifacts: Some(artifacts),
                }
            }
            Err(e) => {
                log::warn!("{e}; using heuristic fallback predictions");
                Self { artifacts: None }
            }
        }
    }

    pub fn from_artifacts(artifacts: Artifacts) -> Self {
        Self {
            artifacts: Some(artifacts),
        }
    }

    /// A service with no artifacts that always takes the fallback path.
    pub fn heuristic_only() -> Self {
        Self { artifacts: None }
    }

    pub fn is_trained(&self) -> bool {
        self.artifacts.is_some()
    }

    /// Predict next-season output and market value for a feature vector.
    ///
    /// Out-of-range inputs are clamped here; validation feedback belongs
    /// to the direct-entry boundary, not this service.
    pub fn predict(&self, features: &FeatureVector) -> ScoutResult<PredictionResult> {
        let f = features.clamped();

        match &self.artifacts {
            Some(artifacts) => Self::predict_with_models(artifacts, &f),
            None => Ok(Self::predict_heuristic(&f)),
        }
    }

    fn predict_with_models(
        artifacts: &Artifacts,
        f: &FeatureVector,
    ) -> ScoutResult<PredictionResult> {
        let scaled = artifacts.scaler.transform(&f.as_array());
        let x = DenseMatrix::from_2d_vec(&vec![scaled]);

        let perf_score = artifacts
            .perf_model
            .predict(&x)
            .map_err(|e| ScoutError::ModelError(e.to_string()))?[0];
        let market_value = artifacts
            .value_model
            .predict(&x)
            .map_err(|e| ScoutError::ModelError(e.to_string()))?[0];

        // The model scores a whole season of involvement; bring it back
        // to a per-match figure before splitting into goals and assists.
        let matches_estimate = (f.minutes_played / 90.0).max(1.0);
        let per_match = perf_score / (matches_estimate / SEASON_MATCHES).max(1.0);
        let (goals_ratio, assists_ratio) = contribution_split(f);

        Ok(PredictionResult {
            predicted_goals: round1(per_match * goals_ratio).max(0.0),
            predicted_assists: round1(per_match * assists_ratio * ASSIST_SCALE).max(0.0),
            performance_score: round2(perf_score),
            market_value: market_value.max(0.1),
        })
    }

    fn predict_heuristic(f: &FeatureVector) -> PredictionResult {
        let per_match = heuristics::performance_target(f);
        let (goals_ratio, assists_ratio) = contribution_split(f);

        PredictionResult {
            predicted_goals: round1(per_match * goals_ratio).max(0.0),
            predicted_assists: round1(per_match * assists_ratio * ASSIST_SCALE).max(0.0),
            performance_score: round2(per_match),
            market_value: heuristics::value_target(f),
        }
    }
}

/// Split a combined contribution score proportionally to the input's
/// goals and weighted assists; 50/50 when both are zero.
fn contribution_split(f: &FeatureVector) -> (f64, f64) {
    let total = f.goals + f.assists * ASSIST_WEIGHT;
    if total > 0.0 {
        (f.goals / total, f.assists * ASSIST_WEIGHT / total)
    } else {
        (0.5, 0.5)
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn features(goals: f64, assists: f64, minutes: f64, age: f64) -> FeatureVector {
        FeatureVector {
            goals,
            assists,
            minutes_played: minutes,
            age,
        }
    }

    #[test]
    fn fallback_matches_closed_form() {
        let service = PredictionService::heuristic_only();
        let f = features(20.0, 10.0, 2700.0, 25.0);

        let result = service.predict(&f).unwrap();
        let per_match = heuristics::performance_target(&f);
        assert_eq!(result.performance_score, round2(per_match));
        assert!((result.market_value - heuristics::value_target(&f)).abs() < 1e-12);
    }

    #[test]
    fn fallback_splits_fifty_fifty_when_no_contribution() {
        let service = PredictionService::heuristic_only();
        let result = service.predict(&features(0.0, 0.0, 900.0, 25.0)).unwrap();
        assert_eq!(result.predicted_goals, result.predicted_assists);
    }

    #[test]
    fn market_value_floor_holds_in_fallback() {
        let service = PredictionService::heuristic_only();
        let result = service.predict(&features(0.0, 0.0, 0.0, 40.0)).unwrap();
        assert!(result.market_value >= 0.1);
    }

    #[test]
    fn out_of_range_inputs_are_clamped_not_rejected() {
        let service = PredictionService::heuristic_only();
        let result = service.predict(&features(-5.0, 2.0, -100.0, 99.0)).unwrap();
        assert!(result.predicted_goals >= 0.0);
        assert!(result.predicted_assists >= 0.0);
        assert!(result.market_value >= 0.1);
    }

    #[test]
    fn goals_dominate_split_for_pure_scorers() {
        let service = PredictionService::heuristic_only();
        let scorer = service.predict(&features(20.0, 0.0, 2700.0, 25.0)).unwrap();
        assert_eq!(scorer.predicted_assists, 0.0);
        assert!(scorer.predicted_goals > 0.0);
    }

    #[test]
    fn trained_service_honours_output_invariants() {
        let table = crate::ml::trainer::tests::synthetic_table(40);
        let (artifacts, _) = trainer::train(&table).unwrap();
        let service = PredictionService::from_artifacts(artifacts);
        assert!(service.is_trained());

        for f in [
            features(0.0, 0.0, 0.0, 25.0),
            features(10.0, 5.0, 1800.0, 22.0),
            features(25.0, 12.0, 3000.0, 35.0),
        ] {
            let result = service.predict(&f).unwrap();
            assert!(result.predicted_goals >= 0.0);
            assert!(result.predicted_assists >= 0.0);
            assert!(result.market_value >= 0.1);
        }
    }

    #[test]
    fn trained_predictions_track_the_heuristic_targets() {
        let table = crate::ml::trainer::tests::synthetic_table(60);
        let (artifacts, _) = trainer::train(&table).unwrap();
        let service = PredictionService::from_artifacts(artifacts);
        let fallback = PredictionService::heuristic_only();

        // A mid-range point drawn from the training distribution: the
        // forest was fitted on targets generated by the same formulas,
        // so both paths should land in the same neighbourhood.
        let f = features(10.0, 6.0, 1530.0, 27.0);
        let trained = service.predict(&f).unwrap();
        let heuristic = fallback.predict(&f).unwrap();

        assert!((trained.market_value - heuristic.market_value).abs() < 2.0);
        assert!((trained.performance_score - heuristic.performance_score).abs() < 1.5);
    }
}
