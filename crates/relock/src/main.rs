//! relock CLI
//!
//! Reads the supported interpreter versions from a project's tox envlist,
//! provisions one disposable virtualenv per version, and regenerates the
//! pinned `<env>-requirements.txt` manifest for each of them concurrently.

// The CLI binary renders the summary and fatal errors to stdout/stderr by
// design.
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;
mod logging;

use relock_engine::{RelockConfig, RunSummary};
use std::time::Duration;

/// All dispatched units completed successfully (or nothing was dispatched).
const EXIT_OK: i32 = 0;
/// At least one per-version unit failed.
const EXIT_FAILED: i32 = 1;
/// Fatal configuration error before any unit was dispatched.
const EXIT_CONFIG: i32 = 2;

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = cli::parse();

    if let Err(report) = logging::init(cli.level, cli.json) {
        eprintln!("{report:?}");
        std::process::exit(EXIT_CONFIG);
    }

    let config = RelockConfig {
        matrix_path: cli.matrix,
        inputs: cli.inputs,
        output_dir: cli.output_dir,
        timeout: cli.timeout_secs.map(Duration::from_secs),
    };

    match relock_engine::run(&config).await {
        Ok(summary) => {
            render_summary(&summary, cli.json);
            let code = if summary.success() { EXIT_OK } else { EXIT_FAILED };
            std::process::exit(code);
        }
        Err(error) => {
            let code = if error.is_fatal() { EXIT_CONFIG } else { EXIT_FAILED };
            eprintln!("{:?}", miette::Report::new(error));
            std::process::exit(code);
        }
    }
}

fn render_summary(summary: &RunSummary, json: bool) {
    if json {
        match serde_json::to_string_pretty(summary) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => eprintln!("Failed to serialize run summary: {e}"),
        }
        return;
    }

    if summary.outcomes.is_empty() {
        println!("No interpreter versions declared in the test matrix; nothing to do.");
        return;
    }

    for outcome in &summary.outcomes {
        if outcome.success {
            println!(
                "  ok      {:8} {} ({} ms)",
                outcome.env_name,
                outcome.manifest.display(),
                outcome.duration_ms
            );
        } else {
            println!(
                "  failed  {:8} {}",
                outcome.env_name,
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    let failed = summary.failures().len();
    if failed == 0 {
        println!("Regenerated {} locked manifest(s).", summary.outcomes.len());
    } else {
        println!("{failed} of {} version(s) failed.", summary.outcomes.len());
    }
}

// Fatal-vs-aggregate exit mapping lives on the error type itself; keep the
// binary's view of it pinned down here.
#[cfg(test)]
mod tests {
    use super::*;
    use relock_core::{Error, PyVersion};

    #[test]
    fn test_fatal_errors_map_to_config_exit() {
        assert!(Error::matrix_not_found("tox.ini").is_fatal());
        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(Error::io(denied, None, "create output directory").is_fatal());
        assert!(!Error::interpreter_not_found(PyVersion::new(3, 10)).is_fatal());
        assert_ne!(EXIT_CONFIG, EXIT_FAILED);
    }
}
