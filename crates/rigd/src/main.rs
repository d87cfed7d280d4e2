//! rigd binary entry point.

use std::process::ExitCode;
use std::sync::Arc;
use std::thread;

use tracing::info;

fn main() -> ExitCode {
    let reporter = Arc::new(rigd::StructuredHealthReporter::new());
    match rigd::bootstrap_with(&rigd::SystemConfigLoader, reporter) {
        Ok(daemon) => run(&daemon),
        // The health reporter has already recorded the failure.
        Err(_) => ExitCode::FAILURE,
    }
}

/// Parks the main thread while the controller threads serve requests.
fn run(daemon: &rigd::Daemon) -> ExitCode {
    info!(
        target: "rigd",
        devices = daemon.registry().len(),
        "daemon running"
    );
    loop {
        thread::park();
    }
}
