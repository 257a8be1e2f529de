//! Manifest compilation
//!
//! Runs pip-compile from a provisioned environment against the abstract
//! requirement inputs. The tool is an opaque black box here: relock passes
//! paths in order and trusts the exit code.

use crate::provision::ProvisionedEnv;
use relock_core::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Compile a fully pinned manifest for the environment's version.
///
/// Invokes `pip-compile --upgrade` with `inputs` in their configured order,
/// writing the aggregated result to `output_path` (overwritten if present).
/// `deadline`, when set, bounds the invocation; there is no deadline by
/// default and a hung tool hangs its unit.
pub async fn compile(
    env: &ProvisionedEnv,
    inputs: &[PathBuf],
    output_path: &Path,
    deadline: Option<Duration>,
) -> Result<()> {
    let version = env.version();

    let mut cmd = Command::new(env.pip_compile());
    cmd.arg("--upgrade")
        .arg("--output-file")
        .arg(output_path)
        .args(inputs)
        .stdin(Stdio::null());

    debug!(
        %version,
        output = %output_path.display(),
        inputs = inputs.len(),
        "Running pip-compile"
    );

    let invocation = match deadline {
        Some(limit) => timeout(limit, cmd.output())
            .await
            .map_err(|_| Error::timeout(version, "pip-compile", limit.as_secs()))?,
        None => cmd.output().await,
    };

    let output = invocation
        .map_err(|e| Error::compilation(version, None, format!("failed to run pip-compile: {e}")))?;

    if !output.status.success() {
        return Err(Error::compilation(
            version,
            output.status.code(),
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    debug!(%version, output = %output_path.display(), "Locked manifest written");
    Ok(())
}
