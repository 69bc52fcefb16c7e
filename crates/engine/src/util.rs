//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so every store decodes records the same way.

use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidData(format!("invalid {label} id")))
}

pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Store versions are `u64` in the engine and `i64` in SQLite.
pub(crate) fn version_from_db(value: i64) -> ResultEngine<u64> {
    u64::try_from(value).map_err(|_| EngineError::InvalidData("negative wallet version".to_string()))
}

pub(crate) fn version_to_db(value: u64) -> ResultEngine<i64> {
    i64::try_from(value).map_err(|_| EngineError::InvalidData("wallet version overflow".to_string()))
}
