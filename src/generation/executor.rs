//! Batch executor: runs a plan's batches against a [`Generator`] under a concurrency cap.
//!
//! Every batch is one future in a `FuturesUnordered` polled on the caller's task. A
//! semaphore with `max_concurrency` permits gates admission; a permit is held until the
//! batch reaches a terminal state, retries included. Outcomes are stored by batch
//! sequence, so completion order never leaks into the result.

use crate::error::ApiError;
use crate::generation::batch::{
    partition_batches, Batch, BatchOutcome, BatchState, GeneratedText,
};
use crate::generation::generator::{GenerationRequest, Generator};
use crate::planning::Plan;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

pub const DEFAULT_SENTINEL: &str = "[GENERATION FAILED - re-run needed]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorSettings {
    pub max_batch_size: usize,
    pub max_concurrency: usize,
    /// Extra attempts after the first; a batch gets `1 + max_retries` calls at most
    pub max_retries: usize,
    pub retry_delay: Duration,
    pub sentinel: String,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            max_batch_size: 15,
            max_concurrency: 10,
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
            sentinel: DEFAULT_SENTINEL.to_string(),
        }
    }
}

impl ExecutorSettings {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.max_batch_size == 0 {
            return Err(ApiError::ConfigError(
                "max_batch_size must be at least 1".to_string(),
            ));
        }
        if self.max_concurrency == 0 {
            return Err(ApiError::ConfigError(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    pub batches: usize,
    pub accepted: usize,
    pub padded: usize,
    /// Calls beyond the first, across all batches
    pub retries: usize,
    pub padded_items: usize,
    pub peak_in_flight: usize,
}

#[derive(Debug, Clone)]
pub struct ExecutionReport {
    pub batches: Vec<Batch>,
    /// Indexed by batch sequence
    pub outcomes: Vec<BatchOutcome>,
    pub summary: ExecutionSummary,
}

/// Current and peak number of batches holding a permit
#[derive(Default)]
struct InFlight {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlight {
    fn enter(&self) -> InFlightGuard<'_> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        InFlightGuard { gauge: self }
    }
}

struct InFlightGuard<'a> {
    gauge: &'a InFlight,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.gauge.current.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct BatchExecutor {
    settings: ExecutorSettings,
}

impl BatchExecutor {
    pub fn new(settings: ExecutorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ExecutorSettings {
        &self.settings
    }

    /// Run every batch of `plan`. `instructions[k]` is sent for category `k`.
    ///
    /// The first generator error aborts the run; batches still pending are dropped.
    pub async fn execute<G: Generator + ?Sized>(
        &self,
        plan: &Plan,
        instructions: &[String],
        generator: &G,
    ) -> Result<ExecutionReport, ApiError> {
        self.settings.validate()?;
        let batches = partition_batches(plan, self.settings.max_batch_size);
        let semaphore = Semaphore::new(self.settings.max_concurrency);
        let gauge = InFlight::default();

        info!(
            batches = batches.len(),
            items = plan.len(),
            max_batch_size = self.settings.max_batch_size,
            max_concurrency = self.settings.max_concurrency,
            "Execution started"
        );

        let mut futures = FuturesUnordered::new();
        for batch in &batches {
            let instruction = instructions.get(batch.category).ok_or_else(|| {
                ApiError::ConfigError(format!(
                    "No instruction variant for category {} ({} configured)",
                    batch.category,
                    instructions.len()
                ))
            })?;
            futures.push(self.run_batch(plan, batch, instruction, generator, &semaphore, &gauge));
        }

        let mut slots: Vec<Option<BatchOutcome>> = vec![None; batches.len()];
        while let Some(result) = futures.next().await {
            let outcome = result?;
            let sequence = outcome.id.sequence;
            slots[sequence] = Some(outcome);
        }
        drop(futures);

        let outcomes: Vec<BatchOutcome> = slots
            .into_iter()
            .enumerate()
            .map(|(sequence, slot)| {
                slot.ok_or_else(|| {
                    ApiError::AssemblyError(format!("Batch #{} produced no outcome", sequence))
                })
            })
            .collect::<Result<_, _>>()?;

        let summary = ExecutionSummary {
            batches: outcomes.len(),
            accepted: outcomes
                .iter()
                .filter(|o| o.state == BatchState::Accepted)
                .count(),
            padded: outcomes
                .iter()
                .filter(|o| o.state == BatchState::Padded)
                .count(),
            retries: outcomes.iter().map(|o| o.attempts.saturating_sub(1)).sum(),
            padded_items: outcomes.iter().map(BatchOutcome::padded_count).sum(),
            peak_in_flight: gauge.peak.load(Ordering::SeqCst),
        };

        info!(
            batches = summary.batches,
            accepted = summary.accepted,
            padded = summary.padded,
            retries = summary.retries,
            peak_in_flight = summary.peak_in_flight,
            "Execution completed"
        );

        Ok(ExecutionReport {
            batches,
            outcomes,
            summary,
        })
    }

    async fn run_batch<G: Generator + ?Sized>(
        &self,
        plan: &Plan,
        batch: &Batch,
        instruction: &str,
        generator: &G,
        semaphore: &Semaphore,
        gauge: &InFlight,
    ) -> Result<BatchOutcome, ApiError> {
        let _permit = semaphore
            .acquire()
            .await
            .map_err(|e| ApiError::ProviderError(format!("Concurrency gate closed: {}", e)))?;
        let _slot = gauge.enter();

        let expected = batch.len();
        let max_attempts = 1 + self.settings.max_retries;
        let mut longest: Vec<String> = Vec::new();

        for attempt in 1..=max_attempts {
            debug!(batch = %batch.id, attempt, expected, state = ?BatchState::Requesting);
            let request = GenerationRequest::for_batch(plan, batch, instruction, attempt);
            let mut texts =
                generator
                    .generate(&request)
                    .await
                    .map_err(|e| ApiError::BatchFailed {
                        batch: batch.id.to_string(),
                        attempt,
                        message: e.to_string(),
                    })?;

            if texts.len() >= expected {
                texts.truncate(expected);
                debug!(batch = %batch.id, attempt, state = ?BatchState::Accepted);
                return Ok(BatchOutcome {
                    id: batch.id,
                    texts: texts
                        .into_iter()
                        .map(|text| GeneratedText {
                            text,
                            authentic: true,
                        })
                        .collect(),
                    state: BatchState::Accepted,
                    attempts: attempt,
                });
            }

            let received = texts.len();
            if received > longest.len() {
                longest = texts;
            }
            if attempt < max_attempts {
                warn!(
                    batch = %batch.id,
                    attempt,
                    expected,
                    received,
                    state = ?BatchState::Retrying,
                    "Short generation response, retrying"
                );
                if !self.settings.retry_delay.is_zero() {
                    tokio::time::sleep(self.settings.retry_delay).await;
                }
            }
        }

        let received = longest.len();
        warn!(
            batch = %batch.id,
            attempts = max_attempts,
            expected,
            received,
            state = ?BatchState::Exhausted,
            "Retries exhausted, padding batch"
        );
        let mut texts: Vec<GeneratedText> = longest
            .into_iter()
            .map(|text| GeneratedText {
                text,
                authentic: true,
            })
            .collect();
        texts.resize(
            expected,
            GeneratedText {
                text: self.settings.sentinel.clone(),
                authentic: false,
            },
        );
        Ok(BatchOutcome {
            id: batch.id,
            texts,
            state: BatchState::Padded,
            attempts: max_attempts,
        })
    }
}
