mod catalog;
mod config;
mod errors;
mod llm_client;
mod scoring;
mod store;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::catalog::PromptCatalog;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::scoring::{RunOptions, ScoringEngine};

#[derive(Parser)]
#[command(name = "scorer")]
#[command(version, about = "Annotate text reports with a single validated word per prompt")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score reports with a prompt, saving after every report
    Score {
        /// JSON array of report objects, each with an `id`
        input: PathBuf,

        /// Prompt key from the catalog
        prompt: String,

        /// Output file (JSON object keyed by report id)
        #[arg(long)]
        output: PathBuf,

        /// Max reports newly processed in this run
        #[arg(long, default_value_t = 50)]
        limit: usize,

        /// Skip reports already present in the output file
        #[arg(long)]
        resume: bool,

        /// With --resume, score again reports recorded as unresolved
        #[arg(long, requires = "resume")]
        retry_unresolved: bool,

        /// Model name (overrides SCORER_MODEL)
        #[arg(long)]
        model: Option<String>,

        /// Extra prompt catalog file (overrides SCORER_PROMPTS)
        #[arg(long)]
        prompts: Option<PathBuf>,
    },

    /// Convert a scored output file into a JSON array with explicit ids
    Flatten { input: PathBuf, output: PathBuf },

    /// List available prompt keys
    Prompts {
        /// Extra prompt catalog file (overrides SCORER_PROMPTS)
        #[arg(long)]
        prompts: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Command::Score {
            input,
            prompt,
            output,
            limit,
            resume,
            retry_unresolved,
            model,
            prompts,
        } => {
            let catalog = build_catalog(prompts.as_deref().or(config.prompts_file.as_deref()))?;
            // Unknown keys fail here, before the input or output is touched.
            let spec = catalog.lookup(&prompt)?;

            let reports = store::load_reports(&input)?;

            let model = model.unwrap_or_else(|| config.model.clone());
            let llm = LlmClient::new(
                &config.ollama_url,
                &model,
                Duration::from_secs(config.llm_timeout_secs),
            )?;
            info!(
                "Scoring {} reports with prompt '{}' (model: {})",
                reports.len(),
                prompt,
                llm.model()
            );

            let options = RunOptions {
                output,
                limit,
                resume,
                retry_unresolved,
            };
            let summary = ScoringEngine::new(&llm, &prompt, spec)
                .run(&reports, &options)
                .await?;

            info!(
                "Processing complete: {} scored, {} unresolved, {} empty, {} already done",
                summary.scored, summary.unresolved, summary.skipped_empty, summary.skipped_resume
            );
            if summary.stopped_at_limit {
                info!("Limit of {} reached; rerun with --resume to continue", limit);
            }
            info!(
                "Results saved to '{}' with {} total entries",
                options.output.display(),
                summary.total_entries
            );
        }
        Command::Flatten { input, output } => {
            store::reshape::flatten_file(&input, &output)?;
        }
        Command::Prompts { prompts } => {
            let catalog = build_catalog(prompts.as_deref().or(config.prompts_file.as_deref()))?;
            for (key, spec) in catalog.iter() {
                println!("{key}: {}", spec.valid_response);
            }
        }
    }

    Ok(())
}

fn build_catalog(extra: Option<&Path>) -> Result<PromptCatalog> {
    let mut catalog = PromptCatalog::builtin();
    if let Some(path) = extra {
        let count = catalog.extend_from_file(path)?;
        info!("Loaded {} prompts from '{}'", count, path.display());
    }
    Ok(catalog)
}
