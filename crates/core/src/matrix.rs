//! Test-matrix discovery
//!
//! The set of supported interpreter versions is declared in the project's
//! tox.ini under the `[tox]` section's `envlist` key. Only that key is read
//! here; the rest of the file is tox's business. Entries are separated by
//! commas and/or whitespace and may continue over indented lines, the usual
//! ini conventions.

use crate::error::{Error, Result};
use std::path::Path;
use tracing::debug;

/// Read the declared environment names from a test-matrix file.
///
/// A missing file is fatal for the whole run. A present file with no
/// `envlist` (or an empty one) yields an empty list, which callers treat as
/// a no-op run.
pub fn declared_environments(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(Error::matrix_not_found(path));
    }
    let raw = std::fs::read_to_string(path)
        .map_err(|e| Error::io(e, Some(path.to_path_buf()), "read test matrix"))?;
    let environments = parse_envlist(&raw);
    debug!(
        path = %path.display(),
        count = environments.len(),
        "Read declared environments from test matrix"
    );
    Ok(environments)
}

/// Extract and split the `[tox] envlist` value from raw ini text.
fn parse_envlist(raw: &str) -> Vec<String> {
    let mut in_tox_section = false;
    let mut collecting = false;
    let mut value = String::new();

    for line in raw.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            in_tox_section = trimmed == "[tox]";
            collecting = false;
            continue;
        }
        if trimmed.starts_with(';') || trimmed.starts_with('#') {
            continue;
        }
        if !in_tox_section {
            continue;
        }

        if collecting {
            // Indented continuation lines extend the value
            if !trimmed.is_empty() && line.starts_with([' ', '\t']) {
                value.push(' ');
                value.push_str(trimmed);
                continue;
            }
            collecting = false;
        }

        if let Some((key, rest)) = trimmed.split_once('=')
            && key.trim() == "envlist"
        {
            value = rest.trim().to_string();
            collecting = true;
        }
    }

    value
        .split([',', ' ', '\t'])
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}
