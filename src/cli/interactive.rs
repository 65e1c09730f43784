use anyhow::Result;
use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Select};

use crate::core::error::ScoutError;
use crate::core::Settings;

use super::{run_predict, run_search, run_train};

/// Menu-driven session covering the same actions as the subcommands.
pub struct InteractiveSession;

impl InteractiveSession {
    pub fn run(settings: &Settings) -> Result<()> {
        println!(
            "{}",
            style("Player Scout - search and predict").cyan().bold()
        );

        loop {
            let choice = Select::with_theme(&ColorfulTheme::default())
                .with_prompt("What would you like to do?")
                .items(&[
                    "Search for a player",
                    "Predict from entered stats",
                    "Train models",
                    "Quit",
                ])
                .default(0)
                .interact()?;

            let outcome = match choice {
                0 => Self::search(settings),
                1 => Self::direct_predict(settings),
                2 => run_train(settings),
                _ => break,
            };

            // A failed action ends neither the loop nor the process.
            if let Err(e) = outcome {
                eprintln!("{} {e:#}", style("Error:").red().bold());
            }
        }

        Ok(())
    }

    fn search(settings: &Settings) -> Result<()> {
        let query: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Player name or query (e.g. \"top scorer\")")
            .interact_text()?;
        run_search(settings, &query, true)
    }

    fn direct_predict(settings: &Settings) -> Result<()> {
        let goals: f64 = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Goals")
            .interact_text()?;
        let assists: f64 = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Assists")
            .interact_text()?;
        let minutes: f64 = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Minutes played")
            .interact_text()?;
        let age: f64 = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Age (16-50)")
            .interact_text()?;

        match run_predict(settings, goals, assists, minutes, age) {
            Err(e) if e.downcast_ref::<ScoutError>().is_some_and(|s| {
                matches!(s, ScoutError::InvalidInput(_))
            }) =>
            {
                println!("{}", style(format!("{e:#}")).yellow());
                Ok(())
            }
            other => other,
        }
    }
}
