//! Structured reporting for the hybrid write sequence.
//!
//! Every mutating workflow performs one primary write against the
//! authoritative store, then a fixed, ordered series of best-effort secondary
//! writes (audit artifact, domain event, queue publish). A secondary failure
//! must never roll back or mask the committed primary write, so each step is
//! recorded here and the aggregated report is returned with the response
//! instead of being swallowed into logs.

use std::fmt::Display;

use serde::Serialize;
use tracing::warn;

/// Terminal state of a single secondary write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EffectStatus {
    Succeeded,
    Failed { reason: String },
}

/// One labelled secondary step and how it ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectOutcome {
    pub effect: &'static str,
    #[serde(flatten)]
    pub status: EffectStatus,
}

impl EffectOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self.status, EffectStatus::Succeeded)
    }
}

/// Ordered aggregation of secondary-write outcomes for one request.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct EffectReport {
    outcomes: Vec<EffectOutcome>,
}

impl EffectReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one secondary write. Failures are logged and
    /// retained; they are never re-raised to the caller.
    pub fn record<T, E: Display>(&mut self, effect: &'static str, result: Result<T, E>) {
        let status = match result {
            Ok(_) => EffectStatus::Succeeded,
            Err(error) => {
                let reason = error.to_string();
                warn!(effect, %reason, "secondary effect failed after primary write committed");
                EffectStatus::Failed { reason }
            }
        };
        self.outcomes.push(EffectOutcome { effect, status });
    }

    pub fn outcomes(&self) -> &[EffectOutcome] {
        &self.outcomes
    }

    /// True when every secondary write landed.
    pub fn is_clean(&self) -> bool {
        self.outcomes.iter().all(EffectOutcome::succeeded)
    }

    pub fn failures(&self) -> impl Iterator<Item = &EffectOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.succeeded())
    }
}
