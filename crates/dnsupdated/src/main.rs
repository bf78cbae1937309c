// # dnsupdated - DNS Update Daemon
//
// Thin integration layer: all update logic lives in dnsupdate-core.
//
// The daemon is responsible for:
// 1. Parsing flags and loading the TOML configuration
// 2. Initializing logging and the runtime
// 3. Wiring the interface source, echo fetcher and DigitalOcean client
// 4. Running the scheduler until SIGTERM/SIGINT
//
// ## Configuration
//
// ```toml
// AuthToken = "dop_v1_..."
//
// [Hosts.web]
// Domain = "example.com"
//
// [Hosts.nas]
// Interface = "eth0"
// Domain = "example.com"
// ```
//
// ### Environment
// - `DNSUPDATE_AUTH_TOKEN`: overrides `AuthToken` from the file
// - `DNSUPDATE_LOG_LEVEL`: log level (same as `--log-level`)
// - `DNSUPDATE_DRY_RUN`: look records up but never write them
//
// ## Example
//
// ```bash
// dnsupdated --config /etc/dnsupdate.toml --interval 15m
// ```

use anyhow::{Context, Result};
use clap::Parser;
use dnsupdate_core::{Config, IpResolver, RecordUpdater, Scheduler, UpdateCycle};
use dnsupdate_ip_http::ReqwestFetcher;
use dnsupdate_ip_interface::SystemInterfaces;
use dnsupdate_provider_digitalocean::DigitalOceanClient;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commit the binary was built from, when the build sets `DNSUPDATE_GIT_HASH`
const GIT_HASH: Option<&str> = option_env!("DNSUPDATE_GIT_HASH");

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DaemonExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DaemonExitCode> for ExitCode {
    fn from(code: DaemonExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Keep DigitalOcean A records pointed at this host's addresses
#[derive(Debug, Parser)]
#[command(name = "dnsupdated", version)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "/dnsupdate.toml")]
    config: PathBuf,

    /// Time between update cycles (e.g. 90s, 5m, 1h 30m)
    #[arg(long, default_value = "30m", value_parser = humantime::parse_duration)]
    interval: Duration,

    /// Timeout for every outbound HTTP request
    #[arg(long, default_value = "30s", value_parser = humantime::parse_duration)]
    http_timeout: Duration,

    /// Log level
    #[arg(
        long,
        env = "DNSUPDATE_LOG_LEVEL",
        default_value = "info",
        value_parser = ["trace", "debug", "info", "warn", "error"],
        ignore_case = true
    )]
    log_level: String,

    /// Look records up but only log the writes that would be made
    #[arg(
        long,
        env = "DNSUPDATE_DRY_RUN",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    dry_run: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DaemonExitCode::ConfigError.into();
    }

    info!(
        "dnsupdate version {} (commit {})",
        VERSION,
        GIT_HASH.unwrap_or("unknown")
    );

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            return DaemonExitCode::ConfigError.into();
        }
    };
    debug!("config: {:?}", config);

    let scheduler = match build_scheduler(&cli, config) {
        Ok(scheduler) => scheduler,
        Err(e) => {
            error!("Startup error: {:#}", e);
            return startup_exit_code(&e).into();
        }
    };

    info!(
        "updating every {}{}",
        humantime::format_duration(scheduler.interval()),
        if cli.dry_run { " (dry-run)" } else { "" }
    );

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DaemonExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(scheduler).await {
            error!("Daemon error: {:#}", e);
            DaemonExitCode::RuntimeError
        } else {
            DaemonExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Load, override and validate the configuration file
fn load_config(cli: &Cli) -> Result<Config> {
    let config = Config::load(&cli.config)
        .with_context(|| format!("error loading config {}", cli.config.display()))?
        .with_auth_token_override(std::env::var("DNSUPDATE_AUTH_TOKEN").ok());

    config.validate()?;
    Ok(config)
}

/// Wire the system capabilities into a scheduler
fn build_scheduler(cli: &Cli, config: Config) -> Result<Scheduler> {
    let fetcher = ReqwestFetcher::with_timeout(cli.http_timeout)?;
    let client = DigitalOceanClient::new(config.auth_token.clone(), cli.http_timeout)?
        .with_dry_run(cli.dry_run);

    let resolver = IpResolver::new(Arc::new(fetcher), Arc::new(SystemInterfaces::new()));
    let updater = RecordUpdater::new(Arc::new(client));
    let cycle = UpdateCycle::new(Arc::new(config), resolver, updater);

    Ok(Scheduler::new(cycle, cli.interval)?)
}

/// Configuration errors exit with 1, anything else failing at startup with 2
fn startup_exit_code(err: &anyhow::Error) -> DaemonExitCode {
    match err.downcast_ref::<dnsupdate_core::Error>() {
        Some(dnsupdate_core::Error::Config(_)) => DaemonExitCode::ConfigError,
        _ => DaemonExitCode::RuntimeError,
    }
}

/// Run the scheduler until a shutdown signal arrives
async fn run_daemon(scheduler: Scheduler) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = tokio::spawn(async move { scheduler.run(shutdown_rx).await });

    let signal = wait_for_shutdown().await;
    match &signal {
        Ok(name) => info!("Received {}, shutting down", name),
        Err(e) => error!("Signal handling failed, shutting down: {:#}", e),
    }

    // A cycle in flight finishes before the scheduler returns
    let _ = shutdown_tx.send(());
    let cycles = handle.await.context("scheduler task failed")?;
    info!("exiting after {} update cycle(s)", cycles);

    signal.map(|_| ())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .context("Failed to wait for CTRL-C")?;
    Ok("SIGINT")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["dnsupdated"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("/dnsupdate.toml"));
        assert_eq!(cli.interval, Duration::from_secs(30 * 60));
        assert_eq!(cli.http_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_humantime_interval() {
        let cli = Cli::try_parse_from(["dnsupdated", "--interval", "1h 30m", "--dry-run"]).unwrap();
        assert_eq!(cli.interval, Duration::from_secs(90 * 60));
        assert!(cli.dry_run);
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        assert!(Cli::try_parse_from(["dnsupdated", "--log-level", "loud"]).is_err());
    }

    #[test]
    fn test_zero_interval_fails_startup() {
        let cli = Cli::try_parse_from(["dnsupdated", "--interval", "0s"]).unwrap();
        let config =
            Config::new("token").with_host("web", dnsupdate_core::HostEntry::public("example.com"));
        let err = build_scheduler(&cli, config).err().expect("zero interval must fail startup");
        assert_eq!(startup_exit_code(&err), DaemonExitCode::ConfigError);
    }

    #[test]
    fn test_setup_failure_is_runtime_error() {
        let err = anyhow::Error::from(dnsupdate_core::Error::http("Failed to build HTTP client"));
        assert_eq!(startup_exit_code(&err), DaemonExitCode::RuntimeError);
    }

    #[test]
    fn test_dry_run_env_values() {
        // Only this test touches DNSUPDATE_DRY_RUN
        unsafe { std::env::set_var("DNSUPDATE_DRY_RUN", "1") };
        let on = Cli::try_parse_from(["dnsupdated"]).map(|cli| cli.dry_run);

        unsafe { std::env::set_var("DNSUPDATE_DRY_RUN", "no") };
        let off = Cli::try_parse_from(["dnsupdated"]).map(|cli| cli.dry_run);

        unsafe { std::env::remove_var("DNSUPDATE_DRY_RUN") };
        assert!(on.unwrap());
        assert!(!off.unwrap());
    }
}
