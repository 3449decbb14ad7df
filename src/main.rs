mod cli;
mod ollama_client;
mod usda_client;

use std::io;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use eyre::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use crate::cli::app::{Action, AppContext, Mode};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the nutrition of a single food item and exit
    Analyze {
        /// Food item or recipe to look up
        #[arg(short, long)]
        food: String,

        /// Serving multiplier applied to every nutrient value
        #[arg(short, long, default_value_t = 1.0)]
        quantity: f64,
    },

    /// Ask the nutrition assistant a question
    Chat {
        /// Question to send; omit to start the interactive loop in chat mode
        #[arg(short, long)]
        input: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    info!("Starting FoodGO CLI");

    match cli.command {
        Some(Commands::Analyze { food, quantity }) => {
            let mut app = AppContext::new(Box::new(io::stdout()), Mode::NutritionAnalysis);
            app.run(Some(Action::Analyze { food, quantity })).await
        }
        Some(Commands::Chat { input: Some(input) }) => {
            let mut app = AppContext::new(Box::new(io::stdout()), Mode::Conversational);
            app.run(Some(Action::Chat { input })).await
        }
        Some(Commands::Chat { input: None }) => {
            let mut app = AppContext::new(Box::new(io::stdout()), Mode::Conversational);
            app.run(None).await
        }
        None => {
            let mut app = AppContext::new(Box::new(io::stdout()), Mode::NutritionAnalysis);
            app.run(None).await
        }
    }
}
