use clap::Parser;
use colored::*;
use std::io::IsTerminal;
use std::process;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

mod cli;

use crate::cli::{output, Cli};
use pcpe_core::PcpeError;
use pcpe_utils::{create_hidden_progress_bar, create_progress_bar, Dispatcher};

fn main() {
    let cli = Cli::parse();

    let directives = log_directives(std::env::var("PCPE_LOG").ok().as_deref(), cli.verbose);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directives)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(0) => {}
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);

            let exit_code = e
                .downcast_ref::<PcpeError>()
                .map(PcpeError::exit_code)
                .unwrap_or(1);
            process::exit(exit_code);
        }
    }
}

/// Filter directives from `PCPE_LOG` and the `-v` count.
///
/// Without `-v` the variable is used as given. A plain level in `PCPE_LOG` is raised to the verbosity level when `-v` asks
/// for more. Per-target directives are kept, with the verbosity level appended
/// as the global default when `-v` is given. `RUST_LOG` overrides both.
fn log_directives(pcpe_log: Option<&str>, verbose: u8) -> String {
    let requested = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let directives = match pcpe_log.map(str::trim) {
        Some(env) if !env.is_empty() => env,
        _ => return requested.to_string().to_lowercase(),
    };
    if verbose == 0 {
        return directives.to_string();
    }
    match directives.parse::<LevelFilter>() {
        Ok(level) => level.max(requested).to_string().to_lowercase(),
        Err(_) => format!("{},{}", directives, requested.to_string().to_lowercase()),
    }
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = cli.resolve_config()?;
    let archives = cli.archives();
    tracing::debug!(
        "Dispatching {} archive(s), threads={}",
        archives.len(),
        config.performance.threads
    );

    let progress = if archives.len() > 1 && cli.verbose == 0 && std::io::stderr().is_terminal() {
        create_progress_bar(archives.len() as u64, "Deduplicating")
    } else {
        create_hidden_progress_bar()
    };

    let pb = progress.clone();
    let dispatcher = Dispatcher::new(config).with_notifier(move |outcome| {
        if outcome.is_success() {
            pb.suspend(|| println!("{}", output::completion_notice(&outcome.path)));
        }
        pb.inc(1);
    });

    let report = dispatcher.dispatch(archives.as_slice())?;
    progress.finish_and_clear();

    output::print_summary(&report, cli.verbose);
    Ok(report.exit_code())
}
