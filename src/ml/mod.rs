// Machine learning module

pub mod heuristics;
pub mod predictor;
pub mod trainer;

// Expose key types and functions
pub use predictor::{PredictionResult, PredictionService};
pub use trainer::{Artifacts, StandardScaler, TrainingReport};
