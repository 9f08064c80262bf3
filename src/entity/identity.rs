//! Entity identity: stable ids and slug derivation.
//!
//! Sub-agents, graphs and projects carry caller-assigned ids that are never
//! derived. Tools and components may omit their id; it is then derived from the
//! name, and the derivation is pure so that repeated construction yields the
//! same id.

use crate::error::ApiError;
use crate::types::EntityId;

/// Lowercase `name`, collapse every run of non-alphanumeric characters into a
/// single hyphen, and trim hyphens at both ends.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Validate a caller-supplied stable id.
pub fn require_stable_id(kind: &str, id: Option<&str>) -> Result<EntityId, ApiError> {
    match id.map(str::trim) {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(ApiError::ConfigError(format!(
            "{} requires an explicit id; ids for this entity type are never derived",
            kind
        ))),
    }
}

/// Use the explicit id when given, otherwise derive one from the name.
pub fn derive_id(kind: &str, id: Option<&str>, name: &str) -> Result<EntityId, ApiError> {
    if let Some(id) = id.map(str::trim).filter(|id| !id.is_empty()) {
        return Ok(id.to_string());
    }
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(ApiError::ConfigError(format!(
            "Cannot derive an id for {} from name {:?}",
            kind, name
        )));
    }
    Ok(slug)
}
