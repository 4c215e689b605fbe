use crate::channel::StageKind;
use serde::Serialize;
use std::fmt;

/// Terminal state of one order within one stage pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    /// Action applied successfully
    Processed,
    /// Remote status outside the stage's allow-list; not yet ready
    Skipped,
    /// No matching remote record; expected, non-fatal
    NotFound,
    /// Action attempted and failed; needs operator attention
    Failed,
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultKind::Processed => f.write_str("processed"),
            ResultKind::Skipped => f.write_str("skipped"),
            ResultKind::NotFound => f.write_str("not found"),
            ResultKind::Failed => f.write_str("failed"),
        }
    }
}

/// One recorded outcome; never mutated after creation
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeRecord {
    pub order_id: String,
    pub stage: StageKind,
    pub kind: ResultKind,
    /// Remote status seen, or an error summary
    pub detail: String,
}

/// Aggregate of per-order outcomes for one run
///
/// Built incrementally while the run progresses and read-only once it ends.
/// Orders an aborted run never reached are absent, not marked failed.
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    outcomes: Vec<OutcomeRecord>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: OutcomeRecord) {
        tracing::debug!(
            "Outcome for {} [{}]: {} ({})",
            outcome.order_id,
            outcome.stage,
            outcome.kind,
            outcome.detail
        );
        self.outcomes.push(outcome);
    }

    pub fn outcomes(&self) -> &[OutcomeRecord] {
        &self.outcomes
    }

    pub fn outcome_for(&self, order_id: &str, stage: StageKind) -> Option<&OutcomeRecord> {
        self.outcomes
            .iter()
            .find(|o| o.order_id == order_id && o.stage == stage)
    }

    pub fn count(&self, kind: ResultKind) -> usize {
        self.outcomes.iter().filter(|o| o.kind == kind).count()
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            total: self.outcomes.len(),
            processed: self.count(ResultKind::Processed),
            skipped: self.count(ResultKind::Skipped),
            not_found: self.count(ResultKind::NotFound),
            failed: self.count(ResultKind::Failed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub processed: usize,
    pub skipped: usize,
    pub not_found: usize,
    pub failed: usize,
}
