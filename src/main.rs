//! vgsales - Main Entry Point
//!
//! Serves the prediction form by default; `fetch` and `predict` work offline
//! from the same artifacts.

use clap::Parser;
use vgsales::cli::{cmd_fetch, cmd_predict, cmd_serve, Cli, Commands, PredictArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vgsales=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { port, host, artifacts_dir }) => {
            cmd_serve(host, port, artifacts_dir).await?;
        }
        Some(Commands::Fetch { artifacts_dir }) => {
            cmd_fetch(artifacts_dir).await?;
        }
        Some(Commands::Predict {
            platform,
            genre,
            publisher,
            year,
            na_sales,
            eu_sales,
            jp_sales,
            other_sales,
            artifacts_dir,
        }) => {
            let args = PredictArgs {
                platform,
                genre,
                publisher,
                year,
                na_sales,
                eu_sales,
                jp_sales,
                other_sales,
            };
            cmd_predict(args, artifacts_dir).await?;
        }
        None => {
            cmd_serve(None, None, None).await?;
        }
    }

    Ok(())
}
