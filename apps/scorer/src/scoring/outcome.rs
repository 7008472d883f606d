use serde_json::Value;

/// Result of scoring one report's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// Normalized response accepted by the validator.
    Scored(String),
    /// Every attempt was rejected. Persisted as `null`.
    Unresolved,
}

impl Annotation {
    pub fn into_value(self) -> Value {
        match self {
            Annotation::Scored(word) => Value::String(word),
            Annotation::Unresolved => Value::Null,
        }
    }
}

/// Terminal state of a report within one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    SkippedResume,
    SkippedEmpty,
    Scored(String),
    Unresolved,
}

impl From<Annotation> for ReportOutcome {
    fn from(annotation: Annotation) -> Self {
        match annotation {
            Annotation::Scored(word) => ReportOutcome::Scored(word),
            Annotation::Unresolved => ReportOutcome::Unresolved,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub scored: usize,
    pub unresolved: usize,
    pub skipped_empty: usize,
    pub skipped_resume: usize,
    /// Resumed entries that carry no annotation for the current prompt key.
    pub skipped_other_prompt: usize,
    /// Reports newly attempted this run (scored + unresolved).
    pub processed: usize,
    pub stopped_at_limit: bool,
    /// Entries in the output mapping once the run ends.
    pub total_entries: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &ReportOutcome) {
        match outcome {
            ReportOutcome::SkippedResume => self.skipped_resume += 1,
            ReportOutcome::SkippedEmpty => self.skipped_empty += 1,
            ReportOutcome::Scored(_) => {
                self.scored += 1;
                self.processed += 1;
            }
            ReportOutcome::Unresolved => {
                self.unresolved += 1;
                self.processed += 1;
            }
        }
    }
}
