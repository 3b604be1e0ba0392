use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vacmap::{batch, config, data};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one coverage map image per indicator column
    Generate {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
    /// List the indicator columns discovered in the dataset
    Inspect {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Generate { config } => {
            let app_config = config::AppConfig::load_from_file(config)?;
            let report = batch::run(&app_config)?;
            if !report.failures.is_empty() {
                println!(
                    "{} indicator(s) failed to export; see errors above",
                    report.failures.len()
                );
            }
        }
        Commands::Inspect { config } => {
            let app_config = config::AppConfig::load_from_file(config)?;
            let layer = data::load_dataset(&app_config)?;
            println!("Indicator columns:");
            for indicator in layer.indicators() {
                println!("  {}", indicator);
            }
        }
    }

    Ok(())
}
