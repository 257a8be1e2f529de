//! Lock-manifest regeneration engine for relock
//!
//! This crate drives one regeneration run end to end:
//! - `workspace` owns the shared scratch directory for the run
//! - `provision` creates one disposable virtualenv per interpreter version
//!   and installs pip-tools into it
//! - `compile` invokes pip-compile inside a provisioned environment
//! - `orchestrator` fans the per-version units out concurrently, waits for
//!   all of them, and folds the results into a [`RunSummary`]
//!
//! Per-version failures never cancel sibling units; the scratch workspace is
//! removed whether or not any unit failed.

pub mod compile;
pub mod orchestrator;
pub mod provision;
pub mod workspace;

pub use orchestrator::{RelockConfig, RunSummary, VersionOutcome, run};
pub use provision::ProvisionedEnv;
pub use workspace::Workspace;
