use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use futures::stream::{self, StreamExt};
use tracing::info;

use palisade::config::{ModerationConfig, SeverityMode};
use palisade::engine::ModerationEngine;
use palisade::models::SubmissionContext;
use palisade::output::{terminal, truncate_chars};
use palisade::scorer::remote::RemoteScorer;
use palisade::sink::memory::MemoryReviewQueue;

/// Palisade: content moderation decision engine.
///
/// Runs submitted text through independent analyzers (profanity,
/// toxicity, spam, PII, phishing, custom rules) and renders one policy
/// decision: allow, warn, review, or block.
#[derive(Parser)]
#[command(name = "palisade", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Moderate a single piece of text
    Check {
        /// The text to moderate
        text: String,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Use strict severity mode regardless of PALISADE_SEVERITY
        #[arg(long)]
        strict: bool,

        /// Mark the submission as rapid (feeds the spam analyzer)
        #[arg(long)]
        rapid: bool,
    },

    /// Moderate a file of submissions, one per line
    Batch {
        /// Path to the input file
        file: String,

        /// Number of lines to moderate in parallel (default: 8)
        #[arg(long, default_value = "8")]
        concurrency: usize,
    },

    /// List the active custom rule set
    Rules,

    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("palisade=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            text,
            json,
            strict,
            rapid,
        } => {
            let mut config = ModerationConfig::from_env()?;
            if strict {
                config.severity_mode = SeverityMode::Strict;
            }
            let (engine, _review) = build_engine(config);

            let context = SubmissionContext {
                rapid_submission: rapid,
                ..Default::default()
            };
            let result = engine.moderate_content(&text, Some(context)).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                terminal::display_result(&result);
            }
        }

        Commands::Batch { file, concurrency } => {
            let config = ModerationConfig::from_env()?;
            let (engine, review) = build_engine(config);

            let raw = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {file}"))?;
            let lines: Vec<&str> = raw.lines().filter(|l| !l.trim().is_empty()).collect();
            info!(count = lines.len(), "Moderating batch");

            let results: Vec<_> = stream::iter(lines)
                .map(|line| {
                    let engine = engine.clone();
                    async move {
                        let result = engine.moderate_content(line, None).await;
                        (line.to_string(), result)
                    }
                })
                .buffer_unordered(concurrency)
                .collect()
                .await;

            for (line, result) in &results {
                let marker = match result.recommended_action {
                    palisade::models::Action::Allow => "ok".green(),
                    palisade::models::Action::Warn => "warn".yellow(),
                    palisade::models::Action::Review => "review".bright_yellow(),
                    palisade::models::Action::Block => "block".red(),
                };
                println!("  [{marker:<6}] {}", truncate_chars(line, 60));
            }

            terminal::display_stats(&engine.stats().snapshot());
            let queued = review.len().await;
            if queued > 0 {
                println!("  {} items queued for human review", queued);
            }
        }

        Commands::Rules => {
            let config = ModerationConfig::from_env()?;
            terminal::display_rules(&config.custom_rules);
        }

        Commands::Config => {
            let config = ModerationConfig::from_env()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

/// Build the engine from env-derived config, wiring in the remote
/// scorer when one is configured and keeping a handle to the in-memory
/// review queue for reporting.
fn build_engine(config: ModerationConfig) -> (Arc<ModerationEngine>, Arc<MemoryReviewQueue>) {
    let review = Arc::new(MemoryReviewQueue::new());
    let mut engine = ModerationEngine::new(config).with_review_queue(review.clone());

    if let Ok(url) = env::var("PALISADE_SCORER_URL") {
        if !url.is_empty() {
            let api_key = env::var("PALISADE_SCORER_API_KEY").ok();
            engine = engine.with_scorer(Arc::new(RemoteScorer::new(url, api_key)));
        }
    }

    (Arc::new(engine), review)
}
