//! Local checks run before credentials are sent anywhere.

use super::AuthError;

/// Minimum password length accepted at signup
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Validate signup fields, returning the trimmed name and email.
pub fn validate_signup<'a>(
    name: &'a str,
    email: &'a str,
    password: &str,
) -> Result<(&'a str, &'a str), AuthError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AuthError::Validation("Please enter your name".to_string()));
    }
    let email = require_email(email)?;
    require_password(password)?;
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok((name, email))
}

/// Validate login fields, returning the trimmed email.
pub fn validate_login<'a>(email: &'a str, password: &str) -> Result<&'a str, AuthError> {
    let email = require_email(email)?;
    require_password(password)?;
    Ok(email)
}

fn require_email(email: &str) -> Result<&str, AuthError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AuthError::Validation("Please enter your email".to_string()));
    }
    Ok(email)
}

fn require_password(password: &str) -> Result<(), AuthError> {
    if password.is_empty() {
        return Err(AuthError::Validation("Please enter your password".to_string()));
    }
    Ok(())
}
