mod extract;

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "gmaps-cli")]
#[command(about = "Extract business records from recorded Google Maps place pages")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the place pipeline over snapshot files and print one JSON record per line
    Extract {
        /// Snapshot files: JSON objects with `url`, `status`, `html` and `state`
        #[arg(required = true)]
        snapshots: Vec<PathBuf>,

        /// Run the email follow-up job even when `GMAPS_EXTRACT_EMAIL` is off
        #[arg(long)]
        extract_email: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let mut config = gmaps_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Extract {
            snapshots,
            extract_email,
        }) => {
            config.extract_email |= extract_email;
            let records = extract::run_extract(&config, &snapshots).await?;
            for record in &records {
                println!("{}", serde_json::to_string(record)?);
            }
        }
        None => Cli::command().print_help()?,
    }

    Ok(())
}
