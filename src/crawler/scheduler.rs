//! Scheduler for running one crawl phase
//!
//! This module handles:
//! - Launching one task per target in a fixed order
//! - Spacing launches by a fixed interval (the request rate limit)
//! - Bounding the number of in-flight requests with a semaphore
//! - Joining every launched task before the phase returns (full barrier)
//! - Collecting per-task outcomes into a [`PhaseReport`]
//!
//! A failed task never cancels its siblings. Panics inside a task are
//! caught at the task boundary and reported like any other failure.

use crate::config::CrawlerConfig;
use crate::state::TaskState;
use crate::HarvestError;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{interval, Interval, MissedTickBehavior};

/// The two crawl phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Fetch listing pages and collect detail references
    Listing,
    /// Fetch detail pages and extract company records
    Detail,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Listing => f.write_str("listing"),
            Self::Detail => f.write_str("detail"),
        }
    }
}

/// Final state of one task
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    /// URL or reference the task worked on
    pub target: String,

    /// Terminal state of the task
    pub state: TaskState,

    /// Items the task produced (references found or records written)
    pub items: usize,

    /// Failure description when `state` is `Failed`
    pub error: Option<String>,
}

/// Result of one phase after its barrier released
#[derive(Debug, Clone)]
pub struct PhaseReport {
    pub phase: Phase,

    /// Outcomes in launch order
    pub outcomes: Vec<TaskOutcome>,
}

impl PhaseReport {
    /// Number of tasks launched
    pub fn launched(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.state != TaskState::Pending)
            .count()
    }

    /// Number of tasks that finished successfully
    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.state == TaskState::Done)
            .count()
    }

    /// Total items produced by successful tasks
    pub fn items(&self) -> usize {
        self.outcomes.iter().map(|o| o.items).sum()
    }

    /// Outcomes of failed tasks
    pub fn failures(&self) -> impl Iterator<Item = &TaskOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.state == TaskState::Failed)
    }

    /// Number of failed tasks
    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// Returns true if every launched task has reported completion
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(|o| o.state.is_terminal())
    }
}

/// Runs crawl phases under a rate limit and a concurrency bound
///
/// Launches are spaced by `request_delay`; at most `max_in_flight` tasks
/// run at once. When every slot is taken the launch loop waits, so a slow
/// server slows the crawl down instead of piling up requests.
#[derive(Debug, Clone)]
pub struct Scheduler {
    semaphore: Arc<Semaphore>,
    request_delay: Duration,
}

impl Scheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `request_delay` - Fixed delay between two launches (zero disables spacing)
    /// * `max_in_flight` - Maximum number of concurrently running tasks
    pub fn new(request_delay: Duration, max_in_flight: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_in_flight.max(1))),
            request_delay,
        }
    }

    /// Creates a scheduler from the crawler configuration
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(
            Duration::from_millis(config.request_delay_ms),
            config.max_concurrent_requests as usize,
        )
    }

    /// Runs one task per target and waits for all of them
    ///
    /// Targets are launched in the order given. The returned report holds
    /// one outcome per target, also in that order, and only comes back once
    /// every launched task has finished.
    pub async fn run_phase<F, Fut>(&self, phase: Phase, targets: Vec<String>, job: F) -> PhaseReport
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<usize, HarvestError>> + Send + 'static,
    {
        tracing::info!("Starting {} phase with {} tasks", phase, targets.len());

        let mut outcomes: Vec<TaskOutcome> = targets
            .iter()
            .map(|target| TaskOutcome {
                target: target.clone(),
                state: TaskState::Pending,
                items: 0,
                error: None,
            })
            .collect();

        let mut ticker = self.launch_ticker();
        let mut tasks = JoinSet::new();

        for (index, target) in targets.into_iter().enumerate() {
            if let Some(ticker) = ticker.as_mut() {
                ticker.tick().await;
            }

            let permit = match self.semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    tracing::error!("Worker pool closed, {} tasks not launched", phase);
                    break;
                }
            };

            transition(&mut outcomes[index], TaskState::InFlight);
            tracing::debug!("[{}] launching task {}: {}", phase, index, target);

            let work = job(target);
            tasks.spawn(async move {
                // Run the work in its own task so a panic surfaces as a
                // JoinError for this target only
                let result = match tokio::spawn(work).await {
                    Ok(result) => result,
                    Err(e) => Err(HarvestError::Join(e)),
                };
                drop(permit);
                (index, result)
            });
        }

        // Full barrier: every launched task reports, success or failure
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(items))) => {
                    let outcome = &mut outcomes[index];
                    transition(outcome, TaskState::Done);
                    outcome.items = items;
                    tracing::debug!("[{}] {} done ({} items)", phase, outcome.target, items);
                }
                Ok((index, Err(error))) => {
                    let outcome = &mut outcomes[index];
                    transition(outcome, TaskState::Failed);
                    tracing::warn!("[{}] {} failed: {}", phase, outcome.target, error);
                    outcome.error = Some(error.to_string());
                }
                Err(e) => {
                    tracing::error!("[{}] task wrapper failed: {}", phase, e);
                }
            }
        }

        let report = PhaseReport { phase, outcomes };
        tracing::info!(
            "Finished {} phase: {} launched, {} succeeded, {} failed",
            phase,
            report.launched(),
            report.succeeded(),
            report.failure_count()
        );
        report
    }

    fn launch_ticker(&self) -> Option<Interval> {
        if self.request_delay.is_zero() {
            return None;
        }
        let mut ticker = interval(self.request_delay);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Some(ticker)
    }
}

fn transition(outcome: &mut TaskOutcome, next: TaskState) {
    if !outcome.state.can_transition_to(next) {
        tracing::warn!(
            "Unexpected task transition for {}: {} -> {}",
            outcome.target,
            outcome.state,
            next
        );
    }
    outcome.state = next;
}
