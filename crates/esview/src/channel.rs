//! One evaluation round trip against the page
//!
//! [`EvaluationChannel`] is the single suspension point of a view: it hands
//! source to the engine, waits for the completion, and normalizes the result
//! into an [`EvaluationOutcome`]. Typed entry points layer void checking and
//! decoding on top.

use crate::engine::ScriptEngine;
use esview_core::{
    EsError, EsResult, EvaluationOutcome, JsDecode, RawValue, ScriptSource, decode,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

/// Statistics about channel operation
///
/// All counters are atomic and can be read at any time without locking.
#[derive(Debug, Default)]
pub struct EvaluationStats {
    /// Total number of evaluations handed to the engine
    pub evaluations_submitted: AtomicU64,
    /// Total number of evaluations that came back (successfully or not)
    pub evaluations_completed: AtomicU64,
    /// Number of evaluations that came back with an exception or host error
    pub evaluations_failed: AtomicU64,
}

impl EvaluationStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get snapshot of current stats
    pub fn snapshot(&self) -> EvaluationStatsSnapshot {
        EvaluationStatsSnapshot {
            evaluations_submitted: self.evaluations_submitted.load(Ordering::Relaxed),
            evaluations_completed: self.evaluations_completed.load(Ordering::Relaxed),
            evaluations_failed: self.evaluations_failed.load(Ordering::Relaxed),
        }
    }

    /// Get the number of evaluations currently in flight
    pub fn in_flight(&self) -> u64 {
        let submitted = self.evaluations_submitted.load(Ordering::Relaxed);
        let completed = self.evaluations_completed.load(Ordering::Relaxed);
        submitted.saturating_sub(completed)
    }
}

/// A point-in-time snapshot of channel statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationStatsSnapshot {
    pub evaluations_submitted: u64,
    pub evaluations_completed: u64,
    pub evaluations_failed: u64,
}

impl EvaluationStatsSnapshot {
    /// Get the success rate as a percentage (0.0 - 100.0)
    pub fn success_rate(&self) -> f64 {
        if self.evaluations_completed == 0 {
            100.0
        } else {
            let succeeded = self
                .evaluations_completed
                .saturating_sub(self.evaluations_failed);
            (succeeded as f64 / self.evaluations_completed as f64) * 100.0
        }
    }
}

/// Evaluates source against one engine
///
/// Cheap to clone; clones share the engine and the statistics. Evaluations
/// are independent: concurrent calls are neither batched nor ordered.
#[derive(Clone)]
pub struct EvaluationChannel {
    engine: Arc<dyn ScriptEngine>,
    stats: Arc<EvaluationStats>,
    log_sources: bool,
}

impl EvaluationChannel {
    pub fn new(engine: Arc<dyn ScriptEngine>) -> Self {
        Self {
            engine,
            stats: Arc::new(EvaluationStats::new()),
            log_sources: false,
        }
    }

    /// Include the full source text in trace logs
    pub fn log_sources(mut self, enabled: bool) -> Self {
        self.log_sources = enabled;
        self
    }

    /// Evaluate source and classify the result
    pub async fn evaluate(&self, source: impl Into<ScriptSource>) -> EvaluationOutcome {
        let source = source.into();
        self.stats
            .evaluations_submitted
            .fetch_add(1, Ordering::Relaxed);

        if self.log_sources {
            trace!(target: "esview", source = %source, "evaluating");
        } else {
            trace!(target: "esview", bytes = source.as_str().len(), "evaluating");
        }

        let result = self.engine.evaluate(source.into_string()).await;
        let outcome = EvaluationOutcome::from_native(result);

        self.stats
            .evaluations_completed
            .fetch_add(1, Ordering::Relaxed);
        if !outcome.is_success() {
            self.stats.evaluations_failed.fetch_add(1, Ordering::Relaxed);
            debug!(target: "esview", ?outcome, "evaluation failed");
        }

        outcome
    }

    /// Evaluate source and return the raw value
    pub async fn evaluate_raw(&self, source: impl Into<ScriptSource>) -> EsResult<RawValue> {
        self.evaluate(source).await.into_result()
    }

    /// Evaluate source that must not produce a value
    pub async fn evaluate_void(&self, source: impl Into<ScriptSource>) -> EsResult<()> {
        let value = self.evaluate_raw(source).await?;
        if value.is_undefined() {
            Ok(())
        } else {
            Err(EsError::calling_convention(format!(
                "expected no result, received {}",
                value.kind()
            )))
        }
    }

    /// Evaluate source and decode the result into `T`
    pub async fn evaluate_as<T: JsDecode>(&self, source: impl Into<ScriptSource>) -> EsResult<T> {
        let value = self.evaluate_raw(source).await?;
        decode(value)
    }

    /// Get access to the channel statistics
    pub fn stats(&self) -> &EvaluationStats {
        &self.stats
    }
}

impl std::fmt::Debug for EvaluationChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationChannel")
            .field("stats", &self.stats.snapshot())
            .field("log_sources", &self.log_sources)
            .finish()
    }
}
