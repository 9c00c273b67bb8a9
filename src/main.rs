use std::error::Error;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{error, info};

use maint_scraper_lib::{exporter, logger, sources, validator, Aggregator, Settings};
use maint_scraper_lib::error::ValidateError;

#[derive(Parser)]
#[command(name = "maint-scraper", about = "Egypt Maintenance Technicians Harvester", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all enabled sources and export a deduplicated CSV.
    Scrape {
        /// Output CSV path (defaults to <OUTPUT_DIR>/technicians.csv).
        #[arg(short, long)]
        output: Option<String>,

        /// Verbose logs.
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate CSV columns and show a quick summary.
    Validate {
        #[arg(default_value = "data/technicians.csv")]
        csv_path: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scrape { output, verbose } => {
            logger::init(verbose);
            scrape(output).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Validate { csv_path } => {
            logger::init(false);
            Ok(validate(&csv_path)?)
        }
    }
}

async fn scrape(output: Option<String>) -> Result<(), Box<dyn Error>> {
    let settings = Settings::from_env()?;
    let output = output.unwrap_or_else(|| settings.default_output_path());
    info!("Starting harvest with concurrency {} and {:?} delay", settings.concurrency, settings.delay());

    let aggregator = Aggregator::from_settings(&settings)?;
    let results = aggregator.run(sources::builtin()).await;
    println!("Collected {} unique records", results.len());

    let count = exporter::write_csv(&results, &output)?;
    println!("Exported {} rows to {}", count, output);
    Ok(())
}

fn validate(csv_path: &str) -> Result<ExitCode, Box<dyn Error>> {
    match validator::validate_csv(csv_path) {
        Ok(summary) => {
            println!("{}", summary.headers.join(","));
            for row in &summary.head {
                println!("{}", row.join(","));
            }
            println!("Rows: {} | Unique phones: {}", summary.rows, summary.unique_phones);
            Ok(ExitCode::SUCCESS)
        }
        Err(ValidateError::MissingColumns(missing)) => {
            error!("CSV {} is missing columns", csv_path);
            println!("ERROR: Missing columns: {:?}", missing);
            Ok(ExitCode::from(1))
        }
        Err(e) => Err(e.into()),
    }
}
