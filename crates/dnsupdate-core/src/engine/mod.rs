//! Update cycle
//!
//! One cycle walks every configured host once:
//!
//! ```text
//!  ┌───────────┐   for each host    ┌────────────┐  address  ┌───────────────┐
//!  │ Scheduler │ ─────────────────▶ │ IpResolver │ ────────▶ │ RecordUpdater │
//!  └───────────┘                    └────────────┘           └───────────────┘
//! ```
//!
//! A failure for one host is logged and the cycle moves on to the next one;
//! [`UpdateCycle::run_cycle`] itself never fails.

pub mod scheduler;

pub use scheduler::{Scheduler, SchedulerState};

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::config::{Config, HostEntry};
use crate::resolver::IpResolver;
use crate::updater::{RecordUpdater, UpdateOutcome};

/// What happened to one host during a cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostStatus {
    /// Address resolved and the record is in sync
    Synced {
        address: String,
        outcome: UpdateOutcome,
    },
    /// Address could not be resolved; the record was not touched
    ResolveFailed { error: String },
    /// Address resolved but the provider call failed
    UpdateFailed { address: String, error: String },
}

/// Per-host result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostReport {
    pub host: String,
    pub status: HostStatus,
}

/// Summary of one cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub hosts: Vec<HostReport>,
}

impl CycleReport {
    /// Number of hosts whose record is in sync after the cycle
    pub fn synced(&self) -> usize {
        self.hosts
            .iter()
            .filter(|h| matches!(h.status, HostStatus::Synced { .. }))
            .count()
    }

    /// Number of hosts that failed at either step
    pub fn failed(&self) -> usize {
        self.hosts.len() - self.synced()
    }
}

/// Runs the resolve → update pipeline for every configured host
#[derive(Clone)]
pub struct UpdateCycle {
    config: Arc<Config>,
    resolver: IpResolver,
    updater: RecordUpdater,
}

impl UpdateCycle {
    pub fn new(config: Arc<Config>, resolver: IpResolver, updater: RecordUpdater) -> Self {
        Self {
            config,
            resolver,
            updater,
        }
    }

    /// Configuration snapshot this cycle runs against
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Update every host once
    pub async fn run_cycle(&self) -> CycleReport {
        info!("running update");
        let mut report = CycleReport::default();

        for (name, host) in &self.config.hosts {
            info!("updating address for {}", name);
            let status = self.run_host(name, host).await;
            report.hosts.push(HostReport {
                host: name.clone(),
                status,
            });
        }

        info!(
            "finished all updates ({} synced, {} failed)",
            report.synced(),
            report.failed()
        );
        report
    }

    async fn run_host(&self, name: &str, host: &HostEntry) -> HostStatus {
        let address = match self.resolver.resolve(host).await {
            Ok(address) => address,
            Err(e) => {
                error!("error resolving ip address for {}: {}", name, e);
                return HostStatus::ResolveFailed {
                    error: e.to_string(),
                };
            }
        };
        info!("resolved ip address {} for {}", address, name);

        match self.updater.update_record(&host.domain, name, &address).await {
            Ok(outcome) => {
                debug!("host {} synced: {:?}", name, outcome);
                HostStatus::Synced { address, outcome }
            }
            Err(e) => {
                error!("{}", e);
                HostStatus::UpdateFailed {
                    address,
                    error: e.to_string(),
                }
            }
        }
    }
}
