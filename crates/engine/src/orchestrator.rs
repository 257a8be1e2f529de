//! Run orchestration
//!
//! Drives a regeneration run: read the declared environments, match them
//! against the version grammar, acquire the scratch workspace, launch one
//! concurrent provision-then-compile unit per version, join them all, and
//! release the workspace. Unit failures are folded into per-version outcomes
//! and never cancel sibling units.

use crate::compile;
use crate::provision;
use crate::workspace::Workspace;
use relock_core::{PyVersion, Result, matrix};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Inputs for one regeneration run.
#[derive(Debug, Clone)]
pub struct RelockConfig {
    /// Test-matrix file declaring the supported interpreter versions
    pub matrix_path: PathBuf,
    /// Abstract requirement inputs, passed to pip-compile in this order
    pub inputs: Vec<PathBuf>,
    /// Directory receiving the `<env>-requirements.txt` manifests
    pub output_dir: PathBuf,
    /// Optional per-unit deadline for the pip-compile invocation
    pub timeout: Option<Duration>,
}

impl Default for RelockConfig {
    fn default() -> Self {
        Self {
            matrix_path: PathBuf::from("tox.ini"),
            inputs: vec![
                PathBuf::from("requirements.in"),
                PathBuf::from("dev-requirements.in"),
            ],
            output_dir: PathBuf::from("."),
            timeout: None,
        }
    }
}

/// Terminal state of one provision-then-compile unit.
#[derive(Debug, Clone, Serialize)]
pub struct VersionOutcome {
    /// The interpreter version this unit ran for
    pub version: PyVersion,
    /// Canonical environment name, e.g. `py310`
    pub env_name: String,
    /// Path of the locked manifest this unit targeted
    pub manifest: PathBuf,
    /// Whether the manifest was written successfully
    pub success: bool,
    /// Failure description when `success` is false
    pub error: Option<String>,
    /// Wall-clock duration of the unit in milliseconds
    pub duration_ms: u64,
}

/// Aggregate result of a run. Outcomes are sorted by version for stable
/// reporting; completion order across units is unspecified.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// One outcome per dispatched version
    pub outcomes: Vec<VersionOutcome>,
}

impl RunSummary {
    /// True iff every dispatched unit succeeded (vacuously true for a no-op
    /// run with zero matched versions).
    #[must_use]
    pub fn success(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.success)
    }

    /// The outcomes of failed units.
    #[must_use]
    pub fn failures(&self) -> Vec<&VersionOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| !outcome.success)
            .collect()
    }
}

/// Regenerate the locked manifests for every declared, matchable version.
///
/// Fatal only when the test matrix cannot be read; every per-version failure
/// is captured in the returned [`RunSummary`]. The scratch workspace is
/// removed before this function returns, in both the all-succeeded and
/// some-failed cases.
pub async fn run(config: &RelockConfig) -> Result<RunSummary> {
    // Discovery failures abort before any scratch state exists.
    let declared = matrix::declared_environments(&config.matrix_path)?;
    let versions = matched_versions(&declared);

    // A run with no matched versions must not touch the output directory.
    if !versions.is_empty() {
        std::fs::create_dir_all(&config.output_dir).map_err(|e| {
            relock_core::Error::io(e, Some(config.output_dir.clone()), "create output directory")
        })?;
    }

    let workspace = Workspace::acquire()?;

    let mut join_set = JoinSet::new();
    let mut unit_versions: HashMap<tokio::task::Id, PyVersion> = HashMap::new();
    for version in versions {
        let workspace_root = workspace.path().to_path_buf();
        let inputs = config.inputs.clone();
        let manifest = config.output_dir.join(version.manifest_name());
        let deadline = config.timeout;
        let handle = join_set.spawn(async move {
            run_unit(version, &workspace_root, &inputs, &manifest, deadline).await
        });
        unit_versions.insert(handle.id(), version);
    }

    if !join_set.is_empty() {
        info!(
            count = join_set.len(),
            "Compiling locked requirements for {} interpreter version(s)",
            join_set.len()
        );
    }

    // Join-all barrier: every unit terminates before the workspace goes away.
    let mut outcomes = Vec::new();
    while let Some(joined) = join_set.join_next_with_id().await {
        match joined {
            Ok((_, outcome)) => outcomes.push(outcome),
            Err(join_error) => {
                // A panicked unit is a failed unit, not a failed run.
                if let Some(version) = unit_versions.get(&join_error.id()) {
                    warn!(%version, "Compilation unit panicked: {join_error}");
                    outcomes.push(VersionOutcome {
                        version: *version,
                        env_name: version.env_name(),
                        manifest: config.output_dir.join(version.manifest_name()),
                        success: false,
                        error: Some(format!("unit panicked: {join_error}")),
                        duration_ms: 0,
                    });
                } else {
                    warn!("Compilation unit panicked: {join_error}");
                }
            }
        }
    }

    if let Err(e) = workspace.release() {
        warn!(error = %e, "Failed to remove scratch workspace");
    }

    outcomes.sort_by_key(|outcome| outcome.version);
    Ok(RunSummary { outcomes })
}

/// Match declared environment names against the version grammar, preserving
/// source order. When two identifiers canonicalize to the same version the
/// later one supersedes the earlier, with a warning naming the collision;
/// only one unit is ever dispatched per canonical version.
fn matched_versions(declared: &[String]) -> Vec<PyVersion> {
    let mut versions: Vec<PyVersion> = Vec::new();
    for name in declared {
        let Some(version) = PyVersion::from_env_name(name) else {
            debug!(env = %name, "Skipping non-version environment");
            continue;
        };
        if let Some(index) = versions.iter().position(|known| *known == version) {
            warn!(
                env = %name,
                %version,
                "Duplicate interpreter version in envlist; the later entry supersedes the earlier one"
            );
            versions.remove(index);
        }
        versions.push(version);
    }
    versions
}

/// One concurrent unit: provision the environment, then compile the manifest.
/// Errors are captured here, at the unit boundary.
async fn run_unit(
    version: PyVersion,
    workspace_root: &Path,
    inputs: &[PathBuf],
    manifest: &Path,
    deadline: Option<Duration>,
) -> VersionOutcome {
    let started = Instant::now();
    info!(%version, manifest = %manifest.display(), "Compiling locked requirements");

    let result = async {
        let env = provision::provision(version, workspace_root).await?;
        compile::compile(&env, inputs, manifest, deadline).await
    }
    .await;

    let duration_ms = started.elapsed().as_millis() as u64;
    match result {
        Ok(()) => {
            info!(%version, duration_ms, "Locked requirements regenerated");
            VersionOutcome {
                version,
                env_name: version.env_name(),
                manifest: manifest.to_path_buf(),
                success: true,
                error: None,
                duration_ms,
            }
        }
        Err(error) => {
            warn!(%version, %error, "Failed to regenerate locked requirements");
            VersionOutcome {
                version,
                env_name: version.env_name(),
                manifest: manifest.to_path_buf(),
                success: false,
                error: Some(error.to_string()),
                duration_ms,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relock_core::Error;
    use std::io::Write;
    use tempfile::TempDir;

    fn config_for(dir: &TempDir, matrix_contents: &str) -> RelockConfig {
        let matrix_path = dir.path().join("tox.ini");
        let mut file = std::fs::File::create(&matrix_path).unwrap();
        file.write_all(matrix_contents.as_bytes()).unwrap();
        RelockConfig {
            matrix_path,
            inputs: vec![dir.path().join("requirements.in")],
            output_dir: dir.path().join("out"),
            timeout: None,
        }
    }

    #[test]
    fn test_matched_versions_skips_non_versions() {
        let declared = vec!["py38".to_string(), "py310".to_string(), "lint".to_string()];
        assert_eq!(
            matched_versions(&declared),
            vec![PyVersion::new(3, 8), PyVersion::new(3, 10)]
        );
    }

    #[test]
    fn test_matched_versions_preserves_source_order() {
        let declared = vec!["py310".to_string(), "py38".to_string()];
        assert_eq!(
            matched_versions(&declared),
            vec![PyVersion::new(3, 10), PyVersion::new(3, 8)]
        );
    }

    #[test]
    fn test_duplicate_version_dispatched_once() {
        let declared = vec!["py38".to_string(), "py39".to_string(), "py38".to_string()];
        assert_eq!(
            matched_versions(&declared),
            vec![PyVersion::new(3, 9), PyVersion::new(3, 8)]
        );
    }

    #[test]
    fn test_all_unmatched_yields_empty_work_list() {
        let declared = vec!["lint".to_string(), "docs".to_string()];
        assert!(matched_versions(&declared).is_empty());
    }

    #[tokio::test]
    async fn test_missing_matrix_is_fatal_before_dispatch() {
        let dir = TempDir::new().unwrap();
        let config = RelockConfig {
            matrix_path: dir.path().join("tox.ini"),
            inputs: vec![],
            output_dir: dir.path().join("out"),
            timeout: None,
        };
        let err = run(&config).await.unwrap_err();
        assert!(matches!(err, Error::MatrixNotFound { .. }));
        // Aborted before the output directory was touched.
        assert!(!config.output_dir.exists());
    }

    #[tokio::test]
    async fn test_empty_envlist_is_a_successful_noop() {
        let dir = TempDir::new().unwrap();
        let config = config_for(&dir, "[tox]\nenvlist =\n");
        let summary = run(&config).await.unwrap();
        assert!(summary.outcomes.is_empty());
        assert!(summary.success());
    }

    #[tokio::test]
    async fn test_unmatched_environments_produce_no_units() {
        let dir = TempDir::new().unwrap();
        let config = config_for(&dir, "[tox]\nenvlist = lint, docs\n");
        let summary = run(&config).await.unwrap();
        assert!(summary.outcomes.is_empty());
        assert!(summary.success());
    }

    #[tokio::test]
    async fn test_noop_run_leaves_output_dir_untouched() {
        let dir = TempDir::new().unwrap();
        let config = config_for(&dir, "[tox]\nenvlist = lint\n");
        let summary = run(&config).await.unwrap();
        assert!(summary.success());
        assert!(!config.output_dir.exists());
    }

    #[test]
    fn test_summary_success_and_failures() {
        let ok = VersionOutcome {
            version: PyVersion::new(3, 8),
            env_name: "py38".to_string(),
            manifest: PathBuf::from("py38-requirements.txt"),
            success: true,
            error: None,
            duration_ms: 10,
        };
        let failed = VersionOutcome {
            version: PyVersion::new(3, 10),
            env_name: "py310".to_string(),
            manifest: PathBuf::from("py310-requirements.txt"),
            success: false,
            error: Some("pip-compile failed".to_string()),
            duration_ms: 20,
        };

        let all_ok = RunSummary {
            outcomes: vec![ok.clone()],
        };
        assert!(all_ok.success());
        assert!(all_ok.failures().is_empty());

        let mixed = RunSummary {
            outcomes: vec![ok, failed],
        };
        assert!(!mixed.success());
        assert_eq!(mixed.failures().len(), 1);
        assert_eq!(mixed.failures()[0].env_name, "py310");
    }

    #[test]
    fn test_summary_serializes_to_json() {
        let summary = RunSummary {
            outcomes: vec![VersionOutcome {
                version: PyVersion::new(3, 10),
                env_name: "py310".to_string(),
                manifest: PathBuf::from("py310-requirements.txt"),
                success: true,
                error: None,
                duration_ms: 1234,
            }],
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["outcomes"][0]["env_name"], "py310");
        assert_eq!(json["outcomes"][0]["success"], true);
        assert_eq!(json["outcomes"][0]["version"]["minor"], 10);
    }

    #[test]
    fn test_default_config() {
        let config = RelockConfig::default();
        assert_eq!(config.matrix_path, PathBuf::from("tox.ini"));
        assert_eq!(
            config.inputs,
            vec![
                PathBuf::from("requirements.in"),
                PathBuf::from("dev-requirements.in")
            ]
        );
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert!(config.timeout.is_none());
    }
}
