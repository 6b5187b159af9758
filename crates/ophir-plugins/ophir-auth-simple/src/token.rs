//! Session token codec.
//!
//! A token is `base64("email:role:issuedAtMillis")`. Tokens minted before
//! roles existed carry only `email:issuedAtMillis`; they still decode and are
//! normalized to `admin`. Tokens are not signed.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ophir_core::error::{AppError, SessionError};
use ophir_core::models::{Role, Session};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("token is not valid base64")]
    Base64,

    #[error("token is not valid UTF-8")]
    Utf8,

    #[error("expected 2 or 3 fields, found {0}")]
    Shape(usize),

    #[error("token carries no email")]
    MissingEmail,

    #[error("unknown role '{0}'")]
    Role(String),

    #[error("timestamp '{0}' is not a number")]
    Timestamp(String),
}

impl From<DecodeError> for SessionError {
    fn from(_: DecodeError) -> Self {
        SessionError::Malformed
    }
}

impl From<DecodeError> for AppError {
    fn from(err: DecodeError) -> Self {
        AppError::Unauthorized(err.to_string())
    }
}

/// Why a session token could not be minted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// `:` separates the token fields, so it cannot appear in the email.
    #[error("email '{0}' contains ':' and cannot carry a session")]
    Separator(String),
}

impl From<EncodeError> for AppError {
    fn from(err: EncodeError) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// A decoded token, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `email:issuedAt`
    Legacy { email: String, issued_at_millis: i64 },
    /// `email:role:issuedAt`
    Versioned {
        email: String,
        role: Role,
        issued_at_millis: i64,
    },
}

impl Token {
    pub fn email(&self) -> &str {
        match self {
            Token::Legacy { email, .. } | Token::Versioned { email, .. } => email,
        }
    }

    pub fn issued_at_millis(&self) -> i64 {
        match self {
            Token::Legacy {
                issued_at_millis, ..
            }
            | Token::Versioned {
                issued_at_millis, ..
            } => *issued_at_millis,
        }
    }

    /// Legacy tokens predate the dev role and were only ever issued to admins.
    pub fn role(&self) -> Role {
        match self {
            Token::Legacy { .. } => Role::Admin,
            Token::Versioned { role, .. } => *role,
        }
    }

    pub fn normalize(self) -> Session {
        let role = self.role();
        match self {
            Token::Legacy {
                email,
                issued_at_millis,
            }
            | Token::Versioned {
                email,
                issued_at_millis,
                ..
            } => Session {
                email,
                role,
                issued_at_millis,
            },
        }
    }
}

/// Refuses emails containing `:`; they would not decode back.
pub fn encode(email: &str, role: Role, issued_at_millis: i64) -> Result<String, EncodeError> {
    if email.contains(':') {
        return Err(EncodeError::Separator(email.to_string()));
    }
    Ok(STANDARD.encode(format!("{email}:{role}:{issued_at_millis}")))
}

pub fn decode(token: &str) -> Result<Token, DecodeError> {
    let raw = STANDARD.decode(token).map_err(|_| DecodeError::Base64)?;
    let text = String::from_utf8(raw).map_err(|_| DecodeError::Utf8)?;
    let parts: Vec<&str> = text.split(':').collect();

    let (email, role, timestamp) = match parts.as_slice() {
        [email, timestamp] => (*email, None, *timestamp),
        [email, role, timestamp] => (*email, Some(*role), *timestamp),
        other => return Err(DecodeError::Shape(other.len())),
    };

    if email.is_empty() {
        return Err(DecodeError::MissingEmail);
    }

    let issued_at_millis = timestamp
        .parse::<i64>()
        .map_err(|_| DecodeError::Timestamp(timestamp.to_string()))?;

    match role {
        None => Ok(Token::Legacy {
            email: email.to_string(),
            issued_at_millis,
        }),
        Some(role) => Ok(Token::Versioned {
            email: email.to_string(),
            role: role
                .parse()
                .map_err(|_| DecodeError::Role(role.to_string()))?,
            issued_at_millis,
        }),
    }
}
