//! Player Scout: natural-language search over a player statistics table
//! plus market value and next-season performance prediction.
//!
//! The pipeline is `data` (CSV record store) -> `search` (query
//! classification and matching) -> `features` (validated feature
//! vectors) -> `ml` (training pipeline and prediction service). The
//! `cli` module is the presentation shell around it.

pub mod cli;
pub mod core;
pub mod data;
pub mod features;
pub mod ml;
pub mod search;

pub use crate::core::error::{ScoutError, ScoutResult};
