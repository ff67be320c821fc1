mod error;
mod forum;
mod mission;
mod parser;
mod pipeline;
mod roster;
mod settings;

use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use forum::ForumClient;
use pipeline::Pipeline;
use settings::Settings;

#[derive(Parser)]
#[command(name = "alpha_missions", about = "Squad Alpha mission board extractor")]
struct Cli {
    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Missions from forum pages 1..=N
    Missions {
        /// Number of listing pages to read
        #[arg(short = 'n', long, default_value = "1")]
        pages: u32,
    },
    /// Missions from a single forum page
    Page {
        /// 1-based page number
        page: u32,
    },
    /// Roster name → date lookup
    Roster,
    /// Print service status
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load()?;
    tracing::debug!(?settings, "Loaded settings");

    let client = ForumClient::new(&settings)?;
    let pipeline = Pipeline::new(client, settings.concurrency);

    match cli.command {
        Commands::Missions { pages } => {
            let pb = spinner(format!("Reading {} forum pages...", pages));
            let records = pipeline.missions(pages).await;
            pb.finish_and_clear();
            print_json(&records?, cli.pretty)?;
        }
        Commands::Page { page } => {
            let pb = spinner(format!("Reading forum page {}...", page));
            let records = pipeline.missions_page(page).await;
            pb.finish_and_clear();
            print_json(&records?, cli.pretty)?;
        }
        Commands::Roster => {
            let roster = pipeline.roster().await?;
            print_json(&roster, cli.pretty)?;
        }
        Commands::Status => {
            print_json(
                &serde_json::json!({
                    "status": "OK",
                    "forum": settings.base_url,
                    "forumId": settings.forum_id,
                    "roster": settings.roster_url.is_some(),
                }),
                cli.pretty,
            )?;
        }
    }

    tracing::info!("Done in {:.1}s", t0.elapsed().as_secs_f64());
    Ok(())
}

fn spinner(msg: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}
