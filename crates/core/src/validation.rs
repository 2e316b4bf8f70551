//! Input validation for accounts and cards.
//!
//! Each validator returns `Ok(())` or a [`CoreError::Validation`] carrying a
//! message that is safe to show to the client.

use validator::{ValidateEmail, ValidateUrl};

use crate::error::CoreError;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum accepted password length (bounds hashing cost).
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for first/last names.
pub const MAX_NAME_LENGTH: usize = 50;

/// Maximum length for card titles and subtitles.
pub const MAX_TITLE_LENGTH: usize = 100;

/// Maximum length for card descriptions.
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

/// Maximum number of tags on a card.
pub const MAX_TAGS: usize = 10;

/// Maximum length of a single tag.
pub const MAX_TAG_LENGTH: usize = 30;

/// Lowercase and trim an email so lookups and uniqueness are case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Require a non-blank value for a named field.
pub fn require_field(name: &str, value: Option<&str>) -> Result<(), CoreError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(CoreError::Validation(format!("{name} is required"))),
    }
}

pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if email.validate_email() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "'{email}' is not a valid email address"
        )))
    }
}

/// Enforce the password policy: length bounds plus at least one uppercase
/// letter, one lowercase letter, one digit and one symbol.
pub fn validate_password_strength(password: &str) -> Result<(), CoreError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    if len > MAX_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "Password must be at most {MAX_PASSWORD_LENGTH} characters long"
        )));
    }

    let has_upper = password.chars().any(char::is_uppercase);
    let has_lower = password.chars().any(char::is_lowercase);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password
        .chars()
        .any(|c| !c.is_alphanumeric() && !c.is_whitespace());

    if !(has_upper && has_lower && has_digit && has_symbol) {
        return Err(CoreError::Validation(
            "Password must contain an uppercase letter, a lowercase letter, a digit and a symbol"
                .into(),
        ));
    }
    Ok(())
}

pub fn validate_name(field: &str, value: &str) -> Result<(), CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Phone numbers: digits with optional `+`, spaces, dashes and parentheses,
/// 9 to 15 digits in total.
pub fn validate_phone(phone: &str) -> Result<(), CoreError> {
    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'));
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if allowed && (9..=15).contains(&digits) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "'{phone}' is not a valid phone number"
        )))
    }
}

/// Websites must be absolute `http`/`https` URLs.
pub fn validate_website(url: &str) -> Result<(), CoreError> {
    let lower = url.to_ascii_lowercase();
    let has_scheme = lower.starts_with("http://") || lower.starts_with("https://");
    if has_scheme && url.validate_url() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "'{url}' is not a valid website URL"
        )))
    }
}

/// Theme colors are `#rgb` or `#rrggbb` hex strings.
pub fn validate_hex_color(field: &str, color: &str) -> Result<(), CoreError> {
    let hex = color.strip_prefix('#').unwrap_or("");
    let valid = matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "{field} must be a hex color like #1a2b3c"
        )))
    }
}

pub fn validate_length(field: &str, value: &str, max: usize) -> Result<(), CoreError> {
    if value.chars().count() > max {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

/// Trim, lowercase and de-duplicate tags, rejecting oversized input.
pub fn normalize_tags(tags: &[String]) -> Result<Vec<String>, CoreError> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let t = tag.trim().to_lowercase();
        if t.is_empty() {
            continue;
        }
        validate_length("tag", &t, MAX_TAG_LENGTH)?;
        if !out.contains(&t) {
            out.push(t);
        }
    }
    if out.len() > MAX_TAGS {
        return Err(CoreError::Validation(format!(
            "A card can have at most {MAX_TAGS} tags"
        )));
    }
    Ok(out)
}
