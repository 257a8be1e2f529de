//! Core types for relock
//!
//! This crate provides the pieces shared by the engine and the CLI:
//! - The error taxonomy for a regeneration run
//! - The `py<major><minor>` environment-name grammar
//! - Test-matrix (tox.ini) discovery of declared interpreter versions

pub mod error;
pub mod matrix;
pub mod version;

pub use error::{Error, Result};
pub use version::PyVersion;
