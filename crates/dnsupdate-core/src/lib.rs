// # dnsupdate-core
//
// Core library for the dnsupdate interval updater.
//
// ## Architecture Overview
//
// - **IpResolver**: current address of a host, from a local interface or from
//   public echo services with fallback
// - **RecordUpdater**: create-or-edit of the provider's A record
// - **UpdateCycle**: resolve → update for every configured host, isolating
//   failures per host
// - **Scheduler**: one cycle at startup, then one per interval until stopped
//
// ## Design Principles
//
// 1. **No hidden I/O**: network and OS access go through the traits in
//    [`traits`], so every component is testable with fakes
// 2. **Explicit configuration**: the validated [`Config`] is passed as an
//    `Arc`, never held in a global
// 3. **Failure isolation**: one broken host never stops the others
// 4. **Idempotency**: an unchanged address issues no provider write

pub mod config;
pub mod engine;
pub mod error;
pub mod resolver;
pub mod traits;
pub mod updater;

// Re-export core types for convenience
pub use config::{Config, HostEntry};
pub use engine::{CycleReport, HostReport, HostStatus, Scheduler, SchedulerState, UpdateCycle};
pub use error::{Error, Result};
pub use resolver::{EchoService, IpResolver, default_echo_services};
pub use traits::{DomainRecordClient, HttpFetcher, InterfaceAddresses};
pub use updater::{RecordUpdater, UpdateOutcome};
