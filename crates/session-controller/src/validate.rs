//! Local checks run before any call to the auth service.

use crate::{SessionError, SessionResult};

const MIN_CODE_LEN: usize = 6;
const MAX_CODE_LEN: usize = 10;

/// Trim and lowercase an email, rejecting anything that is clearly not
/// an address. The auth service stays the authority on deliverability.
pub fn normalize_email(raw: &str) -> SessionResult<String> {
    let email = raw.trim().to_ascii_lowercase();
    let Some((local, domain)) = email.split_once('@') else {
        return Err(SessionError::InvalidEmail(raw.trim().to_string()));
    };
    let valid = !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace);
    if !valid {
        return Err(SessionError::InvalidEmail(raw.trim().to_string()));
    }
    Ok(email)
}

/// Strip whitespace from a typed code and require 6 to 10 digits.
pub fn normalize_code(raw: &str) -> SessionResult<String> {
    let code: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if code.len() < MIN_CODE_LEN
        || code.len() > MAX_CODE_LEN
        || !code.chars().all(|c| c.is_ascii_digit())
    {
        return Err(SessionError::InvalidCode);
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_trimmed_and_lowercased() {
        assert_eq!(
            normalize_email("  A@Example.COM ").unwrap(),
            "a@example.com"
        );
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for raw in ["", "a", "a@", "@example.com", "a@b", "a@@b.com", "a b@c.com", "a@.com"] {
            assert!(
                matches!(normalize_email(raw), Err(SessionError::InvalidEmail(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn code_accepts_spaced_digits() {
        assert_eq!(normalize_code(" 123 456 ").unwrap(), "123456");
    }

    #[test]
    fn code_rejects_letters_and_bad_lengths() {
        assert_eq!(normalize_code("12345"), Err(SessionError::InvalidCode));
        assert_eq!(normalize_code("12345678901"), Err(SessionError::InvalidCode));
        assert_eq!(normalize_code("12a456"), Err(SessionError::InvalidCode));
    }
}
