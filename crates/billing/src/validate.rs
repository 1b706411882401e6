//! Field validators for write operations.
//!
//! Validation is an explicit layer: entity constructors call these before any
//! value reaches a store, so rejected writes never touch persistence.

use ledgerly_core::{DomainError, DomainResult};

const NAME_MIN: usize = 3;
const NAME_MAX: usize = 255;

/// Person name: non-blank, between 3 and 255 characters.
pub fn name(field: &str, value: &str) -> DomainResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} is mandatory")));
    }
    let len = trimmed.chars().count();
    if !(NAME_MIN..=NAME_MAX).contains(&len) {
        return Err(DomainError::validation(format!(
            "{field} must be between {NAME_MIN} and {NAME_MAX} characters"
        )));
    }
    Ok(())
}

/// Well-formed email: one `@`, non-empty local part, dotted domain.
pub fn email(value: &str) -> DomainResult<()> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::validation("email is mandatory"));
    }

    let Some((local, domain)) = value.split_once('@') else {
        return Err(DomainError::validation("email format must be valid"));
    };

    let domain_ok = domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty());
    if local.is_empty() || !domain_ok || value.contains(char::is_whitespace) {
        return Err(DomainError::validation("email format must be valid"));
    }

    Ok(())
}

/// Chronology number: positive sequence value.
pub fn chrono_number(value: i64) -> DomainResult<()> {
    if value < 1 {
        return Err(DomainError::validation(
            "chrono must be a positive sequence number",
        ));
    }
    Ok(())
}
