use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::value_objects::clone_strategy::CloneStrategy;

/// Outcome of one provider/organization target in a bulk run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetResult {
    /// Provider name as configured
    pub provider: String,
    /// Organization, group or user name
    pub name: String,
    /// Local directory the target clones into
    pub clone_dir: String,
    /// Strategy used for existing working copies
    pub strategy: CloneStrategy,
    /// Whether the operation completed
    pub success: bool,
    /// Error message, verbatim from the failing operation
    pub error: Option<String>,
    /// Wall-clock duration in milliseconds
    pub duration_ms: i64,
}

/// Aggregated outcome of a bulk clone or refresh run.
///
/// `successful_targets + failed_targets + skipped_targets == total_targets`
/// holds after every `record_*` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkOperationResult {
    /// Targets attempted so far
    pub total_targets: usize,
    /// Targets that completed
    pub successful_targets: usize,
    /// Targets that failed
    pub failed_targets: usize,
    /// Targets that were not attempted
    pub skipped_targets: usize,
    /// One entry per recorded live target, in execution order
    pub results: Vec<TargetResult>,
    /// Failure count per error kind
    pub error_summary: BTreeMap<String, usize>,
    /// Whether the run only checked providers without cloning
    pub dry_run: bool,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished, once it has
    pub finished_at: Option<DateTime<Utc>>,
}

/// Result of a bulk clone run
pub type BulkCloneResult = BulkOperationResult;
/// Result of a bulk refresh run
pub type BulkRefreshResult = BulkOperationResult;

impl BulkOperationResult {
    /// Start an empty result
    pub fn new(dry_run: bool) -> Self {
        Self {
            total_targets: 0,
            successful_targets: 0,
            failed_targets: 0,
            skipped_targets: 0,
            results: Vec::new(),
            error_summary: BTreeMap::new(),
            dry_run,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Count a success, recording `result` when present
    pub fn record_success(&mut self, result: Option<TargetResult>) {
        self.total_targets += 1;
        self.successful_targets += 1;
        self.results.extend(result);
    }

    /// Count a failure of the given kind, recording `result` when present
    pub fn record_failure(&mut self, kind: &str, result: Option<TargetResult>) {
        self.total_targets += 1;
        self.failed_targets += 1;
        *self.error_summary.entry(kind.to_string()).or_insert(0) += 1;
        self.results.extend(result);
    }

    /// Count a target that was not attempted
    pub fn record_skipped(&mut self, result: Option<TargetResult>) {
        self.total_targets += 1;
        self.skipped_targets += 1;
        self.results.extend(result);
    }

    /// Stamp the finish time
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// True when nothing failed
    pub fn is_success(&self) -> bool {
        self.failed_targets == 0
    }

    /// Results of failed targets
    pub fn failures(&self) -> impl Iterator<Item = &TargetResult> {
        self.results
            .iter()
            .filter(|r| !r.success && r.error.is_some())
    }

    /// Total elapsed milliseconds, when finished
    pub fn elapsed_ms(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_milliseconds())
    }

    pub fn summary(&self) -> String {
        let mut summary = format!(
            "{}{} targets: {} succeeded, {} failed, {} skipped",
            if self.dry_run { "[dry-run] " } else { "" },
            self.total_targets,
            self.successful_targets,
            self.failed_targets,
            self.skipped_targets
        );

        if !self.error_summary.is_empty() {
            let kinds: Vec<String> = self
                .error_summary
                .iter()
                .map(|(kind, count)| format!("{}={}", kind, count))
                .collect();
            summary.push_str(&format!(" (errors: {})", kinds.join(", ")));
        }

        summary
    }
}

impl fmt::Display for BulkOperationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
