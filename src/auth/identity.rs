// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity normalization.
//!
//! Usernames and emails are NFKC-normalized and trimmed before they are
//! stored or looked up, so visually identical identities map to the same
//! account. Emails are additionally lowercased. Usernames may not contain
//! `@`, which keeps "is this an email?" unambiguous at login.

use unicode_normalization::UnicodeNormalization;

use super::AuthError;

/// Maximum username length in characters.
pub const MAX_USERNAME_CHARS: usize = 64;

/// Maximum email length in characters.
pub const MAX_EMAIL_CHARS: usize = 254;

/// Maximum secret length in bytes.
pub const MAX_SECRET_BYTES: usize = 1024;

/// How a login identity should be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Username(String),
    Email(String),
}

fn nfkc_trimmed(raw: &str) -> String {
    raw.trim().nfkc().collect()
}

/// Normalize and validate a username for registration.
pub fn normalize_username(raw: &str) -> Result<String, AuthError> {
    let username = nfkc_trimmed(raw);
    if username.is_empty() {
        return Err(AuthError::Validation("username must not be empty".to_string()));
    }
    if username.chars().count() > MAX_USERNAME_CHARS {
        return Err(AuthError::Validation(format!(
            "username must be at most {MAX_USERNAME_CHARS} characters"
        )));
    }
    if username.contains('@') {
        return Err(AuthError::Validation("username must not contain '@'".to_string()));
    }
    if username.chars().any(char::is_control) {
        return Err(AuthError::Validation(
            "username must not contain control characters".to_string(),
        ));
    }
    Ok(username)
}

/// Normalize and validate an email for registration.
pub fn normalize_email(raw: &str) -> Result<String, AuthError> {
    let email = nfkc_trimmed(raw).to_lowercase();
    if email.chars().count() > MAX_EMAIL_CHARS {
        return Err(AuthError::Validation(format!(
            "email must be at most {MAX_EMAIL_CHARS} characters"
        )));
    }
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace) =>
        {
            Ok(email)
        }
        _ => Err(AuthError::Validation("email is not a valid address".to_string())),
    }
}

/// Check a secret's shape. Secrets are never normalized.
pub fn validate_secret(secret: &str) -> Result<(), AuthError> {
    if secret.is_empty() {
        return Err(AuthError::Validation("password must not be empty".to_string()));
    }
    if secret.len() > MAX_SECRET_BYTES {
        return Err(AuthError::Validation(format!(
            "password must be at most {MAX_SECRET_BYTES} bytes"
        )));
    }
    Ok(())
}

/// Classify a login identity without validating it.
///
/// Anything that fails registration rules simply won't match an account.
/// Classification happens after normalization, so compatibility forms of
/// `@` (e.g. U+FF20) still select an email lookup.
pub fn parse_identity(raw: &str) -> Identity {
    let normalized = nfkc_trimmed(raw);
    if normalized.contains('@') {
        Identity::Email(normalized.to_lowercase())
    } else {
        Identity::Username(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_is_trimmed_and_nfkc_normalized() {
        // Fullwidth letters fold to ASCII under NFKC
        assert_eq!(normalize_username("  ａｌｉｃｅ ").unwrap(), "alice");
        // Case is preserved
        assert_eq!(normalize_username("Alice").unwrap(), "Alice");
    }

    #[test]
    fn invalid_usernames_are_rejected() {
        assert!(matches!(normalize_username("   "), Err(AuthError::Validation(_))));
        assert!(matches!(normalize_username("a@b"), Err(AuthError::Validation(_))));
        assert!(matches!(
            normalize_username(&"x".repeat(MAX_USERNAME_CHARS + 1)),
            Err(AuthError::Validation(_))
        ));
        assert!(matches!(normalize_username("bad\u{0007}"), Err(AuthError::Validation(_))));
    }

    #[test]
    fn email_is_lowercased() {
        assert_eq!(
            normalize_email(" Alice@Example.COM ").unwrap(),
            "alice@example.com"
        );
    }

    #[test]
    fn invalid_emails_are_rejected() {
        for raw in ["", "alice", "@example.com", "alice@", "a@b@c", "al ice@example.com"] {
            assert!(
                matches!(normalize_email(raw), Err(AuthError::Validation(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn secrets_are_checked_but_not_altered() {
        assert!(validate_secret("secret1").is_ok());
        assert!(validate_secret(" spaced ").is_ok());
        assert!(matches!(validate_secret(""), Err(AuthError::Validation(_))));
        assert!(matches!(
            validate_secret(&"p".repeat(MAX_SECRET_BYTES + 1)),
            Err(AuthError::Validation(_))
        ));
    }

    #[test]
    fn identity_classification() {
        assert_eq!(parse_identity(" alice "), Identity::Username("alice".to_string()));
        assert_eq!(
            parse_identity("Alice@Example.com"),
            Identity::Email("alice@example.com".to_string())
        );
    }

    #[test]
    fn fullwidth_at_sign_is_classified_as_email() {
        assert_eq!(
            parse_identity("Alice\u{FF20}Example.com"),
            Identity::Email("alice@example.com".to_string())
        );
    }
}
