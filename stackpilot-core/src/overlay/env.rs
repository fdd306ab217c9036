//! Environment file parsing.
//!
//! Format: one `NAME=VALUE` per line. Blank lines and lines starting with `#`
//! are ignored. `NAME` is `[A-Za-z0-9_]+`; `VALUE` is the rest of the line and
//! may be empty or contain `=`.

use crate::error::{Result, StackError};
use crate::types::EnvEntry;
use once_cell::sync::Lazy;
use regex::Regex;

/// One `NAME=VALUE` definition.
static ENV_LINE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z0-9_]+)=(.*)$").expect("Invalid env line regex"));

/// Parse environment file content into ordered entries.
///
/// Duplicate names are kept; the sequence is injected as-is.
///
/// # Errors
///
/// Returns `MalformedEnvLine` (with a 1-based line number) for the first line
/// that is neither blank, a comment, nor a `NAME=VALUE` definition.
pub fn parse_env_file(content: &str) -> Result<Vec<EnvEntry>> {
    let mut entries = Vec::new();

    for (idx, raw) in content.split('\n').enumerate() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let captures = ENV_LINE_REGEX.captures(line).ok_or_else(|| {
            StackError::MalformedEnvLine { line: idx + 1, content: line.to_string() }
        })?;

        entries.push(EnvEntry::new(captures[1].trim(), captures[2].trim()));
    }

    Ok(entries)
}
