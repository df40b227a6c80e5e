//! Column limits enforced by the store before a write is committed.
//!
//! Only lengths are checked. Any string the columns can hold is accepted,
//! including an empty title or an email without `@`.

use crate::error::{BlogError, Result};

/// Maximum allowed length for a post title, in characters.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum allowed length for post content, in characters.
pub const MAX_CONTENT_LENGTH: usize = 50_000;

/// Maximum allowed length for an email address, in characters.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum allowed length for a user name, in characters.
pub const MAX_NAME_LENGTH: usize = 100;

fn check_length(column: &str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(BlogError::Validation(format!(
            "{} exceeds maximum length of {} characters",
            column, max
        )));
    }
    Ok(())
}

pub fn validate_title(title: &str) -> Result<()> {
    check_length("Title", title, MAX_TITLE_LENGTH)
}

pub fn validate_content(content: Option<&str>) -> Result<()> {
    match content {
        Some(content) => check_length("Content", content, MAX_CONTENT_LENGTH),
        None => Ok(()),
    }
}

pub fn validate_email(email: &str) -> Result<()> {
    check_length("Email", email, MAX_EMAIL_LENGTH)
}

pub fn validate_name(name: Option<&str>) -> Result<()> {
    match name {
        Some(name) => check_length("Name", name, MAX_NAME_LENGTH),
        None => Ok(()),
    }
}
