//! Interval scheduler
//!
//! ```text
//!  Idle ──run()──▶ Running ──stop signal──▶ Stopped
//! ```
//!
//! The first cycle runs as soon as [`Scheduler::run`] is called, then one cycle
//! per interval tick. The stop signal is only observed between cycles, so an
//! in-flight cycle always runs to completion and no cycle starts after stop.

use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::UpdateCycle;
use crate::error::{Error, Result};

/// Lifecycle of a [`Scheduler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Created, not started
    Idle,
    /// Running cycles or waiting for the next tick
    Running,
    /// Stop signal observed; no further cycles
    Stopped,
}

/// Runs an [`UpdateCycle`] immediately and then on a fixed interval
pub struct Scheduler {
    cycle: UpdateCycle,
    interval: Duration,
    state_tx: watch::Sender<SchedulerState>,
}

impl Scheduler {
    /// Create a scheduler
    ///
    /// Fails if `interval` is zero.
    pub fn new(cycle: UpdateCycle, interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(Error::config("update interval must be greater than zero"));
        }

        let (state_tx, _) = watch::channel(SchedulerState::Idle);
        Ok(Self {
            cycle,
            interval,
            state_tx,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Current state
    pub fn state(&self) -> SchedulerState {
        *self.state_tx.borrow()
    }

    /// Watch state transitions
    pub fn subscribe(&self) -> watch::Receiver<SchedulerState> {
        self.state_tx.subscribe()
    }

    /// Run until `shutdown_rx` fires (or its sender is dropped)
    ///
    /// Returns the number of cycles that ran. Only an `Idle` scheduler starts;
    /// calling `run` again (while running or after stop) returns 0 at once.
    pub async fn run(&self, mut shutdown_rx: oneshot::Receiver<()>) -> usize {
        let started = self.state_tx.send_if_modified(|state| {
            if *state != SchedulerState::Idle {
                return false;
            }
            *state = SchedulerState::Running;
            true
        });
        if !started {
            warn!("scheduler already {:?}, not starting again", self.state());
            return 0;
        }
        info!("scheduler started, updating every {:?}", self.interval);

        self.cycle.run_cycle().await;
        let mut cycles = 1;

        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown_rx => {
                    info!("Shutdown signal received");
                    break;
                }

                _ = ticker.tick() => {
                    debug!("interval elapsed, starting cycle {}", cycles + 1);
                    self.cycle.run_cycle().await;
                    cycles += 1;
                }
            }
        }

        self.state_tx.send_replace(SchedulerState::Stopped);
        info!("scheduler stopped after {} cycle(s)", cycles);
        cycles
    }
}
