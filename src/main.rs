//! service-probe: connectivity smoke tests for backing services.
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI args / suite file
//!          │
//!          ▼
//!   ┌──────────────┐    ┌───────────────┐    ┌──────────────────────┐
//!   │   checks     │───▶│  RetryRunner  │───▶│ Probe::attempt()     │──▶ target
//!   │ (entry pts)  │    │ fixed delay,  │    │ TcpConnectProbe      │
//!   └──────────────┘    │ cancellable   │    │ HttpReadinessProbe   │
//!          ▲            └───────┬───────┘    └──────────────────────┘
//!          │                    │
//!   Ctrl-C → Cancel             ▼
//!                          ProbeResult ──▶ report on stdout ──▶ exit code
//! ```
//!
//! Exit codes: 0 when every check succeeded, 1 when any check failed,
//! 2 on invalid arguments or configuration.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use service_probe::checks::{run_configured_check, run_http_check, run_tcp_check_with_write_timeout};
use service_probe::config::{self, schema::stock_suite, CheckKind};
use service_probe::lifecycle::{signals, Cancel};
use service_probe::observability::logging;
use service_probe::probe::http::{DEFAULT_META_PATH, DEFAULT_READY_PATH};
use service_probe::probe::ProbeResult;
use service_probe::resilience::{PolicyError, RetryPolicy};

const EXIT_FAILED: u8 = 1;
const EXIT_USAGE: u8 = 2;

#[derive(Parser)]
#[command(name = "service-probe", version)]
#[command(about = "Check that backing services are reachable and ready", long_about = None)]
struct Cli {
    /// Debug-level logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a TCP connection and write one sentinel byte
    Tcp {
        #[arg(default_value = "localhost:27017")]
        address: String,

        /// Deadline for the sentinel write
        #[arg(long, default_value_t = 1000)]
        write_timeout_ms: u64,

        #[command(flatten)]
        policy: PolicyArgs,
    },
    /// GET a readiness endpoint and optionally fetch service metadata
    Http {
        #[arg(default_value = "http://localhost:8080")]
        base_url: String,

        #[arg(long, default_value = DEFAULT_READY_PATH)]
        ready_path: String,

        #[arg(long, default_value_t = 200)]
        expected_status: u16,

        #[arg(long, default_value = DEFAULT_META_PATH)]
        meta_path: String,

        /// Skip the metadata request
        #[arg(long)]
        no_meta: bool,

        #[command(flatten)]
        policy: PolicyArgs,
    },
    /// Run every check of a suite file (the stock suite if none is given)
    Run {
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Only run the named checks
        #[arg(long)]
        only: Vec<String>,
    },
}

#[derive(Args)]
struct PolicyArgs {
    /// Maximum attempts
    #[arg(long)]
    attempts: Option<u32>,

    /// Delay between failed attempts
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Per-attempt timeout
    #[arg(long)]
    timeout_ms: Option<u64>,
}

impl PolicyArgs {
    fn resolve(&self, defaults: RetryPolicy) -> Result<RetryPolicy, PolicyError> {
        RetryPolicy::new(
            self.attempts.unwrap_or(defaults.max_attempts()),
            self.delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.delay()),
            self.timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.attempt_timeout()),
        )
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let cancel = Cancel::new();
    let _signal_task = signals::cancel_on_ctrl_c(cancel.clone());

    match cli.command {
        Commands::Tcp {
            address,
            write_timeout_ms,
            policy,
        } => {
            let policy = match policy.resolve(RetryPolicy::tcp_default()) {
                Ok(policy) => policy,
                Err(e) => return usage_error(&e),
            };
            println!("Testing {address} connectivity...");
            let result = run_tcp_check_with_write_timeout(
                &address,
                Duration::from_millis(write_timeout_ms),
                policy,
                cancel,
            )
            .await;
            exit_code(report(&address, &result, true))
        }
        Commands::Http {
            base_url,
            ready_path,
            expected_status,
            meta_path,
            no_meta,
            policy,
        } => {
            let policy = match policy.resolve(RetryPolicy::http_default()) {
                Ok(policy) => policy,
                Err(e) => return usage_error(&e),
            };
            let meta_path = (!no_meta).then_some(meta_path.as_str());
            println!("Testing {base_url} readiness...");
            let result = run_http_check(
                &base_url,
                &ready_path,
                expected_status,
                meta_path,
                policy,
                cancel,
            )
            .await;
            exit_code(report(&base_url, &result, false))
        }
        Commands::Run { config, only } => run_suite(config, only, cancel).await,
    }
}

async fn run_suite(path: Option<PathBuf>, only: Vec<String>, cancel: Cancel) -> ExitCode {
    let suite = match path {
        Some(path) => match config::load_config(&path) {
            Ok(suite) => suite,
            Err(e) => return usage_error(&e),
        },
        None => stock_suite(),
    };

    if let Some(unknown) = only
        .iter()
        .find(|name| !suite.checks.iter().any(|c| &c.name == *name))
    {
        return usage_error(&format!("no check named `{unknown}`"));
    }

    let mut all_passed = true;
    for check in suite
        .checks
        .iter()
        .filter(|c| only.is_empty() || only.contains(&c.name))
    {
        println!("Testing {} connectivity...", check.name);
        let result = match run_configured_check(check, suite.policy, cancel.clone()).await {
            Ok(result) => result,
            Err(e) => return usage_error(&e),
        };
        let is_tcp = matches!(check.kind, CheckKind::Tcp { .. });
        all_passed &= report(&check.name, &result, is_tcp);
    }

    exit_code(all_passed)
}

/// Print the outcome of one check. Returns whether it passed.
fn report(name: &str, result: &ProbeResult, tcp_only: bool) -> bool {
    match result {
        ProbeResult::Success {
            metadata,
            warning,
            attempts,
        } => {
            println!("✓ {name} is reachable (attempts: {attempts})");
            if let Some(version) = metadata.get("version") {
                println!("✓ {name} version: {version}");
            }
            if let Some(warning) = warning {
                println!("! {name}: {warning}");
            }
            if tcp_only {
                println!("Note: a TCP connect does not prove the service protocol is healthy");
            }
            true
        }
        ProbeResult::Failure { cause, attempts } => {
            println!("✗ {name} failed after {attempts} attempt(s): {cause}");
            false
        }
    }
}

fn exit_code(passed: bool) -> ExitCode {
    if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_FAILED)
    }
}

fn usage_error(error: &dyn std::fmt::Display) -> ExitCode {
    eprintln!("Error: {error}");
    ExitCode::from(EXIT_USAGE)
}
