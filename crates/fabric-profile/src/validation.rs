//! Identifier validation

use fabric_errors::ProfileError;

use crate::ProfileResult;

/// Validate a profile id.
///
/// Profile ids end up in the whitespace separated `parents` attribute and in
/// directory names, so they are restricted to ASCII letters, digits, `-`,
/// `_` and `.`, and may not start with a dot.
pub fn validate_profile_id(id: &str) -> ProfileResult<()> {
    validate_id("profile", id)
}

/// Validate a version id. Same character rules as profile ids.
pub fn validate_version_id(id: &str) -> ProfileResult<()> {
    validate_id("version", id)
}

fn validate_id(kind: &str, id: &str) -> ProfileResult<()> {
    if id.is_empty() {
        return Err(ProfileError::invalid_id(id, format!("{kind} id cannot be empty")));
    }

    if id.starts_with('.') {
        return Err(ProfileError::invalid_id(
            id,
            format!("{kind} id cannot start with '.'"),
        ));
    }

    if let Some(bad) = id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(ProfileError::invalid_id(
            id,
            format!("{kind} id contains invalid character {bad:?}"),
        ));
    }

    Ok(())
}
