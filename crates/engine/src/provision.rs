//! Per-version environment provisioning
//!
//! For each matched interpreter version a disposable virtualenv is created
//! inside the run's scratch workspace and pip-tools is installed into it.
//! All three steps (interpreter lookup, venv creation, tool install) fail
//! per-version: a missing python3.8 never stops the python3.10 unit.

use relock_core::{Error, PyVersion, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// An isolated virtualenv for one interpreter version, with pip-tools
/// installed. One-to-one with its version; owned by the unit that created it.
#[derive(Debug, Clone)]
pub struct ProvisionedEnv {
    version: PyVersion,
    root: PathBuf,
}

impl ProvisionedEnv {
    /// The interpreter version this environment was provisioned for.
    #[must_use]
    pub fn version(&self) -> PyVersion {
        self.version
    }

    /// The environment's root directory inside the workspace.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bin_dir(&self) -> PathBuf {
        if cfg!(windows) {
            self.root.join("Scripts")
        } else {
            self.root.join("bin")
        }
    }

    /// Path to the environment's pip executable.
    #[must_use]
    pub fn pip(&self) -> PathBuf {
        self.bin_dir().join(executable_name("pip"))
    }

    /// Path to the environment's pip-compile executable.
    #[must_use]
    pub fn pip_compile(&self) -> PathBuf {
        self.bin_dir().join(executable_name("pip-compile"))
    }
}

fn executable_name(name: &str) -> String {
    if cfg!(windows) {
        format!("{name}.exe")
    } else {
        name.to_string()
    }
}

/// Locate the `python<major>.<minor>` binary on the execution search path.
pub fn find_interpreter(version: PyVersion) -> Result<PathBuf> {
    let file_name = executable_name(&version.interpreter());
    let search_path = std::env::var_os("PATH").unwrap_or_default();
    for dir in std::env::split_paths(&search_path) {
        let candidate = dir.join(&file_name);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    Err(Error::interpreter_not_found(version))
}

/// Create a virtualenv for `version` under `workspace_root` and install
/// pip-tools into it.
pub async fn provision(version: PyVersion, workspace_root: &Path) -> Result<ProvisionedEnv> {
    let interpreter = find_interpreter(version)?;
    let env_root = workspace_root.join(format!("{}-env", version.env_name()));

    debug!(
        %version,
        interpreter = %interpreter.display(),
        env = %env_root.display(),
        "Creating virtualenv"
    );
    let output = Command::new(&interpreter)
        .arg("-m")
        .arg("venv")
        .arg(&env_root)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| {
            Error::env_creation(version, format!("failed to run {}: {e}", interpreter.display()))
        })?;
    if !output.status.success() {
        return Err(Error::env_creation(
            version,
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    let env = ProvisionedEnv {
        version,
        root: env_root,
    };

    debug!(%version, "Installing pip-tools");
    let output = Command::new(env.pip())
        .args(["install", "--quiet", "pip-tools"])
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| Error::tool_install(version, format!("failed to run pip: {e}")))?;
    if !output.status.success() {
        return Err(Error::tool_install(
            version,
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    Ok(env)
}
