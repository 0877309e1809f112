//! Request validation shared by the HTTP handlers.

use crate::error::AppError;

const MAX_EMAIL_LEN: usize = 254;

/// Loose structural check: one `@`, non-empty local part, dotted domain
/// with no empty labels, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

pub fn require_email(email: &str) -> Result<(), AppError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(AppError::InvalidRequest("Invalid email address".to_string()))
    }
}

pub fn require_positive_amount(amount: i64) -> Result<(), AppError> {
    if amount > 0 {
        Ok(())
    } else {
        Err(AppError::InvalidRequest("Invalid amount".to_string()))
    }
}
