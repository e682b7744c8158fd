// Copyright (c) 2025-2026 the repopack contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Context, Result};
use repopack::utils::error::{PackError, format_error};
use repopack::{cli, run};

#[tokio::main]
async fn main() {
    // Config is not parsed yet when early errors surface
    let verbose = std::env::args().any(|arg| arg == "-v" || arg == "--verbose");

    if let Err(e) = run_main().await {
        display_error(&e, verbose);
        std::process::exit(1);
    }
}

/// Display an error with contextual formatting.
///
/// Uses the rich [`PackError`] formatting when the root cause is one, and
/// anyhow's error chain otherwise.
fn display_error(error: &anyhow::Error, verbose: bool) {
    if let Some(pack_error) = error.downcast_ref::<PackError>() {
        eprintln!("{}", format_error(pack_error, verbose));
    } else {
        eprintln!("\n\u{26a0} Error: {error}");

        let causes: Vec<_> = error.chain().skip(1).collect();
        if !causes.is_empty() {
            eprintln!("\nCaused by:");
            for (i, cause) in causes.iter().enumerate() {
                let prefix = if i == causes.len() - 1 {
                    "\u{2514}\u{2500}"
                } else {
                    "\u{251c}\u{2500}"
                };
                eprintln!("{prefix} {cause}");
            }
        }

        if verbose {
            let backtrace = error.backtrace();
            if backtrace.status() == std::backtrace::BacktraceStatus::Captured {
                eprintln!("\nBacktrace:\n{backtrace}");
            }
        }
    }
    eprintln!();
}

async fn run_main() -> Result<()> {
    let args = cli::args::parse();
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;

    if args.init {
        repopack::init_logging(args.verbose, args.quiet);
        let path = cwd.join(cli::config::CONFIG_FILE_NAME);
        cli::config::write_default_config(&path)?;
        if !args.quiet {
            eprintln!("Created {}", path.display());
        }
        return Ok(());
    }

    // Load config from files + env vars, then let explicit CLI flags win
    let file_config = cli::config::load_from(&args, &cwd)?;
    let merged_config = cli::config::merge_config(&args, file_config, cwd)?;

    repopack::init_logging(merged_config.verbose, merged_config.quiet);

    run(merged_config).await?;
    Ok(())
}
