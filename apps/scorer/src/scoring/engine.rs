//! Scoring Engine: resumable, bounded batch annotation.
//!
//! Per report, in input order:
//! 1. resumed and already in the output → skipped, limit untouched
//! 2. limit reached → the run stops; the rest is left for a later resume
//! 3. blank text → skipped, nothing written, limit untouched
//! 4. otherwise up to `MAX_ATTEMPTS` model calls until the validator accepts;
//!    the result (or `null` when unresolved) is inserted and the whole
//!    mapping saved before moving on.
//!
//! Transport errors are not retried here and abort the run. Everything saved
//! before the failure stays on disk.

use std::path::PathBuf;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::catalog::validator::validate;
use crate::catalog::PromptSpec;
use crate::errors::ScorerError;
use crate::llm_client::prompts::{build_report_prompt, SINGLE_WORD_SYSTEM};
use crate::llm_client::{LlmError, ModelClient, SamplingConfig};
use crate::scoring::outcome::{Annotation, ReportOutcome, RunSummary};
use crate::store::{self, OutputMapping, Report};

/// Model calls per report before it is recorded as unresolved.
pub const MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub output: PathBuf,
    /// Max reports newly attempted this run.
    pub limit: usize,
    pub resume: bool,
    /// On resume, score again entries whose annotation is `null`.
    pub retry_unresolved: bool,
}

pub struct ScoringEngine<'a> {
    client: &'a dyn ModelClient,
    prompt_key: &'a str,
    prompt: &'a PromptSpec,
    sampling: SamplingConfig,
}

impl<'a> ScoringEngine<'a> {
    pub fn new(client: &'a dyn ModelClient, prompt_key: &'a str, prompt: &'a PromptSpec) -> Self {
        Self {
            client,
            prompt_key,
            prompt,
            sampling: SamplingConfig::default(),
        }
    }

    pub async fn run(
        &self,
        reports: &[Report],
        options: &RunOptions,
    ) -> Result<RunSummary, ScorerError> {
        let mut mapping = if options.resume {
            let existing = store::load_existing_output(&options.output);
            if existing.is_empty() {
                info!("No prior progress in '{}'", options.output.display());
            } else {
                info!(
                    "Loaded {} existing entries from '{}'",
                    existing.len(),
                    options.output.display()
                );
            }
            existing
        } else {
            OutputMapping::default()
        };

        let total = reports.len();
        let mut summary = RunSummary::default();

        for (index, report) in reports.iter().enumerate() {
            if options.resume && self.is_finished(&mapping, report, options, &mut summary) {
                summary.record(&ReportOutcome::SkippedResume);
                continue;
            }

            if summary.processed >= options.limit {
                summary.stopped_at_limit = true;
                break;
            }

            info!(
                "Processing {} ({} of {}, {} new)",
                report.id,
                index + 1,
                total,
                summary.processed + 1
            );

            if report.text.trim().is_empty() {
                info!("Skipping {}: empty text", report.id);
                summary.record(&ReportOutcome::SkippedEmpty);
                continue;
            }

            let annotation = self.annotate(&report.text).await?;
            if annotation == Annotation::Unresolved {
                warn!(
                    "No valid response for {} after {} attempts; recording as unresolved",
                    report.id, MAX_ATTEMPTS
                );
            }

            let mut record = report.clone();
            record.set_field(self.prompt_key, annotation.clone().into_value());
            mapping.insert(record)?;
            store::save(&mapping, &options.output)?;

            summary.record(&annotation.into());
        }

        if summary.skipped_other_prompt > 0 {
            warn!(
                "{} resumed entries have no '{}' annotation; resume is keyed by report id only, \
                 so use a separate output file per prompt",
                summary.skipped_other_prompt, self.prompt_key
            );
        }

        summary.total_entries = mapping.len();
        Ok(summary)
    }

    /// Asks the model up to `MAX_ATTEMPTS` times for an answer the validator accepts.
    pub async fn annotate(&self, text: &str) -> Result<Annotation, LlmError> {
        let prompt = build_report_prompt(text, &self.prompt.instruction);

        for attempt in 1..=MAX_ATTEMPTS {
            let raw = self
                .client
                .infer(&prompt, SINGLE_WORD_SYSTEM, &self.sampling)
                .await?;
            if let Some(word) = validate(&raw, &self.prompt.valid_response) {
                return Ok(Annotation::Scored(word));
            }
            warn!(
                "Invalid response '{}' (attempt {} of {})",
                raw.trim(),
                attempt,
                MAX_ATTEMPTS
            );
        }

        Ok(Annotation::Unresolved)
    }

    fn is_finished(
        &self,
        mapping: &OutputMapping,
        report: &Report,
        options: &RunOptions,
        summary: &mut RunSummary,
    ) -> bool {
        let Some(record) = mapping.get(&report.id) else {
            return false;
        };
        match record.get(self.prompt_key) {
            Some(Value::Null) if options.retry_unresolved => {
                debug!("Retrying unresolved {}", report.id);
                false
            }
            Some(_) => true,
            None => {
                debug!("{} already present without '{}'", report.id, self.prompt_key);
                summary.skipped_other_prompt += 1;
                true
            }
        }
    }
}
