pub mod interactive;

use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use console::style;
use indicatif::ProgressBar;

use crate::core::Settings;
use crate::data::{self, Record, Table};
use crate::features::{self, FeatureVector};
use crate::ml::{trainer, PredictionResult, PredictionService};
use crate::search;

/// Messages shown while the prediction runs on a worker thread,
/// mirroring the staged pipeline the desktop shell animated.
const PIPELINE_STEPS: &[&str] = &[
    "Loading player data...",
    "Selecting important features...",
    "Cleaning and normalizing data...",
    "Model processing / prediction...",
];

fn load_table(settings: &Settings) -> Result<Table> {
    data::load(&settings.data.sources, &settings.data.key_column)
        .context("failed to load player data")
}

/// Train both models and persist the artifact set.
pub fn run_train(settings: &Settings) -> Result<()> {
    let table = load_table(settings)?;
    println!("Training on {} players...", table.len());

    let (artifacts, report) = trainer::train(&table)?;
    trainer::persist(&artifacts, &settings.models.dir)?;

    if let (Some(mae), Some(r2)) = (report.perf_mae, report.perf_r2) {
        println!("Performance model - MAE: {mae:.3}, R2: {r2:.3}");
    }
    if let (Some(mae), Some(r2)) = (report.value_mae, report.value_r2) {
        println!("Value model - MAE: ${mae:.2}M, R2: {r2:.3}");
    }
    println!(
        "{} Models saved to {}",
        style("Done.").green().bold(),
        settings.models.dir.display()
    );
    Ok(())
}

/// Search the table with a free-text query and predict for the match.
pub fn run_search(settings: &Settings, query: &str, animate: bool) -> Result<()> {
    let table = load_table(settings)?;

    let Some(record) = search::classify_and_match(&table, query) else {
        println!("{}", style("Player not found.").yellow());
        return Ok(());
    };

    let features = features::from_record(record);
    let service = PredictionService::new(&settings.models.dir);
    let trained = service.is_trained();
    let prediction = predict_staged(service, features, animate)?;

    render_player(record);
    render_prediction(&prediction, trained);
    Ok(())
}

/// Predict from directly entered stats. Out-of-range values are a user
/// error here, not something to clamp silently.
pub fn run_predict(
    settings: &Settings,
    goals: f64,
    assists: f64,
    minutes: f64,
    age: f64,
) -> Result<()> {
    let features = features::from_direct_input(goals, assists, minutes, age)?;
    let service = PredictionService::new(&settings.models.dir);
    let trained = service.is_trained();
    let prediction = service.predict(&features)?;
    render_prediction(&prediction, trained);
    Ok(())
}

/// Run the prediction on a worker thread while the progress spinner
/// steps through the pipeline messages.
fn predict_staged(
    service: PredictionService,
    features: FeatureVector,
    animate: bool,
) -> Result<PredictionResult> {
    if !animate {
        return Ok(service.predict(&features)?);
    }

    let worker = thread::spawn(move || service.predict(&features));

    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(80));
    for step in PIPELINE_STEPS {
        spinner.set_message(*step);
        thread::sleep(Duration::from_millis(400));
    }
    let result = worker
        .join()
        .map_err(|_| anyhow!("prediction worker panicked"))?;
    spinner.finish_and_clear();

    Ok(result?)
}

fn render_player(record: &Record) {
    let status = if features::is_active(record) {
        style("ACTIVE").green().bold()
    } else {
        style("RETIRED / INACTIVE").red().bold()
    };

    println!();
    println!("{}", style("Prediction Complete!").green().bold());
    println!("Name:           {}", record.get_or_unknown("Player"));
    println!("Club:           {}", record.get_or_unknown("Squad"));
    println!("Nation:         {}", record.get_or_unknown("Nation"));
    println!("Position:       {}", record.get_or_unknown("Pos"));
    println!("Age:            {}", record.get_or_unknown("Age"));
    println!("Goals:          {}", record.get_or_unknown("Gls"));
    println!("Assists:        {}", record.get_or_unknown("Ast"));
    println!("Matches Played: {}", record.get_or_unknown("MP"));
    println!("Status:         {status}");
}

fn render_prediction(prediction: &PredictionResult, trained: bool) {
    println!();
    println!(
        "Predicted Market Value: {}",
        style(format!("${:.2}M", prediction.market_value)).cyan().bold()
    );
    println!(
        "Predicted Next Season:  {:.1} goals, {:.1} assists per match",
        prediction.predicted_goals, prediction.predicted_assists
    );
    println!("Performance Score:      {:.2}", prediction.performance_score);
    if !trained {
        println!(
            "{}",
            style("(no trained models found, using heuristic estimates)").dim()
        );
    }
}
