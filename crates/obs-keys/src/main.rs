//! obs-keys binary entrypoint.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind as ClapErrorKind;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use obs_keys::cli::Cli;
use obs_keys::client::WsConnector;
use obs_keys::config;
use obs_keys::dispatch::{Dispatcher, usage_failure};
use obs_keys::error::UsageError;
use obs_keys::output::OutputFormat;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            // clap renders "error: <reason>" followed by its own usage block.
            let rendered = e.to_string();
            let reason = rendered
                .lines()
                .next()
                .and_then(|l| l.strip_prefix("error: "))
                .or_else(|| e.kind().as_str())
                .unwrap_or("invalid arguments");
            let usage = UsageError::InvalidOption(reason.to_string());
            return ExitCode::from(usage_failure(&usage, &mut io::stdout(), &mut io::stderr()));
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create async runtime: {e}");
            return ExitCode::from(obs_keys::ErrorKind::Transport.exit_code());
        }
    };

    ExitCode::from(runtime.block_on(run(cli)))
}

async fn run(cli: Cli) -> u8 {
    let output = OutputFormat::new(cli.format).quiet(cli.quiet);
    let overrides = cli.overrides();
    let config_path = cli.config.clone();

    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            debug!(error = %e, "Cannot listen for interrupts");
            std::future::pending::<()>().await;
        }
    };

    Dispatcher::new(WsConnector, output)
        .run(
            cli.command.as_slice(),
            || config::load(overrides, config_path.as_deref()),
            interrupt,
            &mut io::stdout(),
            &mut io::stderr(),
        )
        .await
}
