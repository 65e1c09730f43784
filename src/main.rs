use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use player_scout::cli;
use player_scout::core::Settings;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML settings file
    #[arg(long, env = "SCOUT_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the CSV data sources, overriding the settings
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory holding the trained model artifacts, overriding the settings
    #[arg(long)]
    models_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the prediction models from the configured data sources
    Train,
    /// Search for a player in plain English and predict for the match
    Search {
        /// Free-text query, e.g. a player name or "top scorer"
        #[arg(required = true)]
        query: Vec<String>,
        /// Skip the staged progress animation
        #[arg(long)]
        no_animation: bool,
    },
    /// Predict from directly entered stats
    Predict {
        #[arg(long)]
        goals: f64,
        #[arg(long)]
        assists: f64,
        #[arg(long)]
        minutes: f64,
        #[arg(long)]
        age: f64,
    },
    /// Menu-driven interactive session
    Interactive,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => Settings::load(&path.to_string_lossy())?,
        None => Settings::load_or_default(),
    };
    if let Some(dir) = &args.data_dir {
        let remapped = settings
            .data
            .sources
            .iter()
            .map(|source| match source.file_name() {
                Some(name) => dir.join(name),
                None => source.clone(),
            })
            .collect();
        settings.data.sources = remapped;
    }
    if let Some(dir) = args.models_dir {
        settings.models.dir = dir;
    }

    match args.command {
        Commands::Train => cli::run_train(&settings),
        Commands::Search {
            query,
            no_animation,
        } => cli::run_search(&settings, &query.join(" "), !no_animation),
        Commands::Predict {
            goals,
            assists,
            minutes,
            age,
        } => cli::run_predict(&settings, goals, assists, minutes, age),
        Commands::Interactive => cli::interactive::InteractiveSession::run(&settings),
    }
}
