// SPDX-FileCopyrightText: 2026 stalehist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! stalehist - warns owners of stale Galaxy histories and marks them deleted.
//!
//! This is the binary entry point. Run it weekly from a scheduler; only one
//! instance may run at a time.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod cleanup;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing::{error, warn};

use stalehist_config::{ConfigError, StalehistConfig};
use stalehist_core::StalehistError;
use stalehist_notify::{Notifier, NotifySettings, SmtpTransport};

use crate::cleanup::{Cleanup, RunMode};
use crate::report::Output;

/// Looks for old histories, warns users of their upcoming deletion and marks
/// previously warned histories as deleted.
#[derive(Parser, Debug)]
#[command(name = "stalehist", version, about, long_about = None)]
struct Cli {
    /// TOML config file to use. Without it the XDG hierarchy is searched.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Display the config used and exit. Do not run any queries.
    #[arg(short, long)]
    show_config: bool,

    /// Run the queries and report statistics without mailing users or
    /// altering the database.
    #[arg(short, long)]
    info_only: bool,

    /// DANGER: mark histories deleted and mail the owners of histories
    /// about to be.
    #[arg(long)]
    actually_delete_things: bool,

    /// Print reports as JSON.
    #[arg(long)]
    json: bool,

    /// List every user and history, and log at debug level.
    #[arg(long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(errors) => {
            init_tracing("warn");
            stalehist_config::render_errors(&errors);
            if errors
                .iter()
                .any(|e| matches!(e, ConfigError::Unreadable { .. }))
            {
                print_usage();
            }
            return ExitCode::from(1);
        }
    };

    let log_level = if cli.verbose { "debug" } else { config.log_level.as_str() };
    init_tracing(log_level);

    let mode = RunMode::from_flags(cli.show_config, cli.info_only, cli.actually_delete_things);
    let output = Output {
        verbose: cli.verbose,
        json: cli.json,
    };

    match run(&config, mode, output).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!(error = %e, "cleanup run failed");
            eprintln!("stalehist: {e}");
            ExitCode::from(1)
        }
    }
}

/// Usage goes to stdout; a failed write is only logged.
fn print_usage() {
    if let Err(e) = Cli::command().print_help() {
        warn!(error = %e, "printing usage failed");
    }
}

fn load_config(cli: &Cli) -> Result<StalehistConfig, Vec<ConfigError>> {
    match &cli.config {
        Some(path) => stalehist_config::load_and_validate_path(path),
        None => stalehist_config::load_and_validate(),
    }
}

async fn run(config: &StalehistConfig, mode: RunMode, output: Output) -> Result<u8, StalehistError> {
    let window = config.retention.window()?;
    let connector = stalehist_storage::connector_from_config(&config.store)?;
    let transport = SmtpTransport::from_config(&config.mail)?;
    let notifier = Notifier::new(Box::new(transport), NotifySettings::from_config(config));

    let cleanup = Cleanup {
        config,
        window,
        connector: connector.as_ref(),
        notifier: &notifier,
        output,
    };
    let summary = cleanup.run(mode, &mut std::io::stdout()).await?;
    Ok(summary.exit_code())
}

/// Initialize the tracing subscriber. `RUST_LOG` wins over the config.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("stalehist={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
