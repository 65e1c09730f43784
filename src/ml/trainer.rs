use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::core::error::{ScoutError, ScoutResult};
use crate::data::Table;
use crate::features::{self, FeatureVector, AGE_MAX, AGE_MIN};

use super::heuristics;

pub type ForestModel = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

pub const PERF_MODEL_FILE: &str = "perf_model.json";
pub const VALUE_MODEL_FILE: &str = "value_model.json";
pub const SCALER_FILE: &str = "scaler.json";

const N_TREES: usize = 100;
const MAX_DEPTH: u16 = 10;
const SEED: u64 = 42;

/// Per-feature standardization (zero mean, unit variance) fitted on the
/// training split. Persisted alongside the two regressors; its
/// dimensionality must match `FeatureVector::SIZE`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(samples: &[Vec<f64>]) -> ScoutResult<Self> {
        if samples.is_empty() {
            return Err(ScoutError::InsufficientData(
                "cannot fit scaler on empty data".to_string(),
            ));
        }
        let dims = samples[0].len();
        let n = samples.len() as f64;

        let mut means = vec![0.0; dims];
        for sample in samples {
            for (mean, value) in means.iter_mut().zip(sample) {
                *mean += value / n;
            }
        }

        let mut stds = vec![0.0; dims];
        for sample in samples {
            for ((std, value), mean) in stds.iter_mut().zip(sample).zip(&means) {
                *std += (value - mean).powi(2) / n;
            }
        }
        for std in &mut stds {
            *std = std.sqrt();
            // A constant feature scales by 1 instead of dividing by zero.
            if *std == 0.0 {
                *std = 1.0;
            }
        }

        Ok(Self { means, stds })
    }

    pub fn dims(&self) -> usize {
        self.means.len()
    }

    pub fn transform(&self, sample: &[f64]) -> Vec<f64> {
        sample
            .iter()
            .zip(&self.means)
            .zip(&self.stds)
            .map(|((value, mean), std)| (value - mean) / std)
            .collect()
    }

    pub fn transform_all(&self, samples: &[Vec<f64>]) -> Vec<Vec<f64>> {
        samples.iter().map(|s| self.transform(s)).collect()
    }
}

/// The three trained artifacts, loaded and persisted as a unit.
#[derive(Debug)]
pub struct Artifacts {
    pub perf_model: ForestModel,
    pub value_model: ForestModel,
    pub scaler: StandardScaler,
}

/// Diagnostic holdout metrics. Not contractual; `None` when the table is
/// too small to carve out a holdout split.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub samples: usize,
    pub holdout: usize,
    pub perf_mae: Option<f64>,
    pub perf_r2: Option<f64>,
    pub value_mae: Option<f64>,
    pub value_r2: Option<f64>,
}

/// Feature matrix with the two synthetic target columns.
pub struct TrainingSet {
    pub features: Vec<Vec<f64>>,
    pub perf_targets: Vec<f64>,
    pub value_targets: Vec<f64>,
}

/// Build synthetic regression targets for every row passing basic
/// validity (non-negative counts, age in range). The targets come from
/// the closed-form heuristics, so the models learn to reproduce them.
pub fn build_synthetic_targets(table: &Table) -> TrainingSet {
    let mut set = TrainingSet {
        features: Vec::new(),
        perf_targets: Vec::new(),
        value_targets: Vec::new(),
    };

    for record in table.rows() {
        let raw = features::raw_from_record(record);
        if raw.goals < 0.0
            || raw.assists < 0.0
            || raw.minutes_played < 0.0
            || raw.age < AGE_MIN
            || raw.age > AGE_MAX
        {
            continue;
        }

        set.features.push(raw.as_array().to_vec());
        set.perf_targets.push(heuristics::performance_target(&raw));
        set.value_targets.push(heuristics::value_target(&raw));
    }

    set
}

fn matrix(rows: Vec<Vec<f64>>) -> DenseMatrix<f64> {
    DenseMatrix::from_2d_vec(&rows)
}

fn forest_params() -> RandomForestRegressorParameters {
    RandomForestRegressorParameters::default()
        .with_n_trees(N_TREES)
        .with_max_depth(MAX_DEPTH)
        .with_seed(SEED)
}

fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> f64 {
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / actual.len() as f64
}

fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return 0.0;
    }
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    1.0 - ss_res / ss_tot
}

/// Fit the scaler and both regressors on an 80% split, evaluating on the
/// held-out 20%. Fails with `InsufficientData` when no row passes
/// validity.
pub fn train(table: &Table) -> ScoutResult<(Artifacts, TrainingReport)> {
    let set = build_synthetic_targets(table);
    if set.features.is_empty() {
        return Err(ScoutError::InsufficientData(
            "no valid rows found in data sources".to_string(),
        ));
    }

    log::info!("Training on {} samples", set.features.len());

    // Deterministic 80/20 split: every fifth valid row is held out.
    let mut train_x = Vec::new();
    let mut train_perf = Vec::new();
    let mut train_value = Vec::new();
    let mut test_x = Vec::new();
    let mut test_perf = Vec::new();
    let mut test_value = Vec::new();
    for i in 0..set.features.len() {
        if i % 5 == 4 {
            test_x.push(set.features[i].clone());
            test_perf.push(set.perf_targets[i]);
            test_value.push(set.value_targets[i]);
        } else {
            train_x.push(set.features[i].clone());
            train_perf.push(set.perf_targets[i]);
            train_value.push(set.value_targets[i]);
        }
    }

    let scaler = StandardScaler::fit(&train_x)?;
    let x = matrix(scaler.transform_all(&train_x));

    let perf_model = ForestModel::fit(&x, &train_perf, forest_params())
        .map_err(|e| ScoutError::ModelError(e.to_string()))?;
    let value_model = ForestModel::fit(&x, &train_value, forest_params())
        .map_err(|e| ScoutError::ModelError(e.to_string()))?;

    let mut report = TrainingReport {
        samples: set.features.len(),
        holdout: test_x.len(),
        perf_mae: None,
        perf_r2: None,
        value_mae: None,
        value_r2: None,
    };

    if !test_x.is_empty() {
        let tx = matrix(scaler.transform_all(&test_x));
        let perf_pred = perf_model
            .predict(&tx)
            .map_err(|e| ScoutError::ModelError(e.to_string()))?;
        let value_pred = value_model
            .predict(&tx)
            .map_err(|e| ScoutError::ModelError(e.to_string()))?;

        report.perf_mae = Some(mean_absolute_error(&test_perf, &perf_pred));
        report.perf_r2 = Some(r2_score(&test_perf, &perf_pred));
        report.value_mae = Some(mean_absolute_error(&test_value, &value_pred));
        report.value_r2 = Some(r2_score(&test_value, &value_pred));

        log::info!(
            "Performance model - MAE: {:.3}, R2: {:.3}",
            report.perf_mae.unwrap_or_default(),
            report.perf_r2.unwrap_or_default()
        );
        log::info!(
            "Value model - MAE: ${:.2}M, R2: {:.3}",
            report.value_mae.unwrap_or_default(),
            report.value_r2.unwrap_or_default()
        );
    } else {
        log::warn!("Too few samples for a holdout split, skipping metrics");
    }

    Ok((
        Artifacts {
            perf_model,
            value_model,
            scaler,
        },
        report,
    ))
}

/// Write the three artifacts to `dir` as a set.
pub fn persist(artifacts: &Artifacts, dir: &Path) -> ScoutResult<()> {
    std::fs::create_dir_all(dir)?;

    write_json(&dir.join(PERF_MODEL_FILE), &artifacts.perf_model)?;
    write_json(&dir.join(VALUE_MODEL_FILE), &artifacts.value_model)?;
    write_json(&dir.join(SCALER_FILE), &artifacts.scaler)?;

    log::info!("Models saved to {}", dir.display());
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> ScoutResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer(file, value).map_err(|e| ScoutError::ModelError(e.to_string()))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> ScoutResult<T> {
    if !path.exists() {
        return Err(ScoutError::ArtifactsMissing(format!(
            "{} not found",
            path.display()
        )));
    }
    let file = File::open(path)?;
    serde_json::from_reader(file).map_err(|e| {
        ScoutError::ArtifactsMissing(format!("{} unreadable: {}", path.display(), e))
    })
}

/// Load the artifact set from `dir`. The set is all-or-nothing: a
/// missing or unreadable file fails the whole load with
/// `ArtifactsMissing`.
pub fn load(dir: &Path) -> ScoutResult<Artifacts> {
    let perf_model = read_json(&dir.join(PERF_MODEL_FILE))?;
    let value_model = read_json(&dir.join(VALUE_MODEL_FILE))?;
    let scaler: StandardScaler = read_json(&dir.join(SCALER_FILE))?;

    if scaler.dims() != FeatureVector::SIZE {
        return Err(ScoutError::ArtifactsMissing(format!(
            "scaler expects {} features, this build uses {}",
            scaler.dims(),
            FeatureVector::SIZE
        )));
    }

    Ok(Artifacts {
        perf_model,
        value_model,
        scaler,
    })
}
