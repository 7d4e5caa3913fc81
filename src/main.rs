mod aggregate;
mod config;
mod error;
mod models;
mod parser;
mod pipeline;
mod portal;
mod queue;
mod search;
mod worker;

use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};

use crate::config::{PortalSettings, Settings};
use crate::models::{Job, JobId, DEFAULT_STATE};
use crate::pipeline::Pipeline;
use crate::portal::DjePortal;
use crate::queue::WebhookQueue;
use crate::worker::Worker;

#[derive(Parser)]
#[command(name = "dje_scraper", about = "DJe TJSP publication scraper worker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the job queue forever (one cycle now, then every interval)
    Run {
        /// Seconds between cycles (default: POLL_INTERVAL_SECS or 300)
        #[arg(short, long)]
        interval: Option<u64>,
    },
    /// Run a single polling cycle and exit
    Once,
    /// Search one attorney without the queue and print the result payload
    Search {
        /// OAB registration number
        #[arg(long)]
        oab: String,
        /// OAB registration state
        #[arg(long, default_value = DEFAULT_STATE)]
        state: String,
        /// Publication date (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,
        /// Attorney full name
        #[arg(long)]
        name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { interval } => {
            let mut settings = Settings::load()?;
            if let Some(secs) = interval {
                settings.poll_interval = Duration::from_secs(secs.max(1));
            }
            build_worker(settings)?.run().await;
        }
        Commands::Once => {
            let stats = build_worker(Settings::load()?)?.run_cycle().await;
            println!(
                "Fetched {} job(s): {} completed, {} failed, {} undelivered",
                stats.fetched, stats.completed, stats.failed, stats.report_errors
            );
        }
        Commands::Search {
            oab,
            state,
            date,
            name,
        } => {
            let portal = PortalSettings::load()?;
            let window = portal.date_window_days;
            let pipeline = Pipeline::new(Box::new(DjePortal::new(portal)), window);
            let job = Job {
                id: JobId::Text("cli".into()),
                registration_number: oab,
                registration_state: state,
                attorney_name: name,
                target_date: date,
            };
            let payload = pipeline.process_job(&job).await;
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("Done in {}", format_duration(elapsed));
    }

    Ok(())
}

fn build_worker(settings: Settings) -> anyhow::Result<Worker> {
    let Settings {
        webhook_url,
        webhook_secret,
        poll_interval,
        job_pause,
        http_timeout,
        portal,
    } = settings;

    tracing::info!("Webhook URL: {}", webhook_url);
    let queue = WebhookQueue::new(webhook_url, webhook_secret, http_timeout)?;
    let window = portal.date_window_days;
    let pipeline = Pipeline::new(Box::new(DjePortal::new(portal)), window);
    Ok(Worker::new(Box::new(queue), pipeline, poll_interval, job_pause))
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
