//! ARN construction and parsing helpers.
//!
//! Pipe ARNs are always derived, never stored (data model invariant 5):
//! `arn:aws:pipes:<region>:<account>:pipe/<name>`.

use crate::errors::PipesError;
use regex::Regex;
use std::sync::OnceLock;

/// Name constraints from the data model: 1-64 chars, `[.\-_A-Za-z0-9]+`.
pub const PIPE_NAME_MAX_LENGTH: usize = 64;

fn pipe_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[.\-_A-Za-z0-9]+$").expect("static pattern is valid"))
}

fn pipe_arn_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^arn:aws:pipes:[^:]+:[^:]+:pipe/(.+)$").expect("static pattern is valid")
    })
}

/// Validates a pipe name against the data model's naming constraint.
pub fn validate_pipe_name(name: &str) -> Result<(), PipesError> {
    if name.is_empty()
        || name.len() > PIPE_NAME_MAX_LENGTH
        || !pipe_name_pattern().is_match(name)
    {
        return Err(PipesError::validation(format!(
            "1 validation error detected: Value '{name}' at 'name' failed to satisfy constraint: \
             Member must satisfy regular expression pattern: [\\-_A-Za-z0-9]+ and have length \
             between 1 and {PIPE_NAME_MAX_LENGTH}"
        )));
    }
    Ok(())
}

/// Builds a pipe ARN from its constituent parts.
#[must_use]
pub fn pipe_arn(name: &str, account_id: &str, region: &str) -> String {
    format!("arn:aws:pipes:{region}:{account_id}:pipe/{name}")
}

/// Extracts the pipe name from a pipe ARN, falling back to the whole input
/// if it does not match the expected shape (mirrors the original's
/// `_pipe_name_from_arn`, which returns the ARN unchanged rather than
/// raising when it can't parse it).
#[must_use]
pub fn pipe_name_from_arn(arn: &str) -> String {
    pipe_arn_pattern()
        .captures(arn)
        .and_then(|caps| caps.get(1))
        .map_or_else(|| arn.to_string(), |m| m.as_str().to_string())
}

/// Extracts the service segment (3rd colon-separated field) from any ARN.
/// Returns an empty string if the ARN is too short to have one.
#[must_use]
pub fn service_from_arn(arn: &str) -> &str {
    arn.splitn(6, ':').nth(2).unwrap_or("")
}

/// Extracts the region segment (4th colon-separated field) from any ARN.
#[must_use]
pub fn region_from_arn(arn: &str) -> &str {
    arn.splitn(6, ':').nth(3).unwrap_or("")
}

/// Extracts the account-id segment (5th colon-separated field) from any ARN.
#[must_use]
pub fn account_from_arn(arn: &str) -> &str {
    arn.splitn(6, ':').nth(4).unwrap_or("")
}

/// Extracts the resource-name segment (last ARN path component), used for
/// stream names (`arn:...:stream/name`) and similar resource ARNs.
#[must_use]
pub fn resource_name_from_arn(arn: &str) -> &str {
    arn.rsplit('/').next().unwrap_or(arn)
}
