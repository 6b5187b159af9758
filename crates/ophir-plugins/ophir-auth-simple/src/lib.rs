//! # ophir-auth-simple
//!
//! Cookie-token implementation of `AuthProvider`.
//! Issues unsigned base64 session tokens and checks them against a fixed
//! 24h TTL. Credentials are compared as stored, in plain text.

pub mod token;
pub mod validator;

use ophir_core::error::{Result as AppResult, SessionError};
use ophir_core::models::{Role, Session};
use ophir_core::traits::AuthProvider;

pub use token::{decode, encode, DecodeError, EncodeError, Token};
pub use validator::{check, is_valid, role_of, MAX_CLOCK_SKEW_MILLIS, SESSION_TTL_MILLIS};

#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleAuthProvider;

impl SimpleAuthProvider {
    pub fn new() -> Self {
        Self
    }
}

impl AuthProvider for SimpleAuthProvider {
    fn issue_token(&self, email: &str, role: Role, issued_at_millis: i64) -> AppResult<String> {
        Ok(encode(email, role, issued_at_millis)?)
    }

    fn verify_token(&self, token: &str, now_millis: i64) -> Result<Session, SessionError> {
        check(token, now_millis)
    }

    // TODO: switch to argon2 hashes once the credential table stores them.
    fn verify_password(&self, supplied: &str, stored: &str) -> bool {
        supplied == stored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_issues_tokens_it_accepts() {
        let auth = SimpleAuthProvider::new();
        let token = auth.issue_token("dev@ophirestate.com", Role::Dev, 10).unwrap();
        let session = auth.verify_token(&token, 20).unwrap();
        assert_eq!(session.role, Role::Dev);
        assert_eq!(session.issued_at_millis, 10);
    }

    #[test]
    fn provider_refuses_emails_it_could_not_decode() {
        let err = SimpleAuthProvider::new()
            .issue_token("a:b@ophirestate.com", Role::Admin, 10)
            .unwrap_err();
        assert!(matches!(err, ophir_core::error::AppError::Validation(_)));
    }

    #[test]
    fn password_comparison_is_exact() {
        let auth = SimpleAuthProvider::new();
        assert!(auth.verify_password("s3cret", "s3cret"));
        assert!(!auth.verify_password("s3cret ", "s3cret"));
        assert!(!auth.verify_password("S3cret", "s3cret"));
    }
}
