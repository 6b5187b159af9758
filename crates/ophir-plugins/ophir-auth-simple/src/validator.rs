//! Session validation: pure functions over the token string and the
//! current time.

use ophir_core::error::SessionError;
use ophir_core::models::{Role, Session};
use tracing::debug;

use crate::token::{decode, DecodeError};

/// Sessions older than this are refused.
pub const SESSION_TTL_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// How far in the future `issuedAt` may sit before the token is refused.
pub const MAX_CLOCK_SKEW_MILLIS: i64 = 5 * 60 * 1000;

/// Decodes `token` and refuses it once `now_millis - issuedAt` exceeds the TTL.
/// Tokens dated further ahead than the allowed skew are malformed.
pub fn check(token: &str, now_millis: i64) -> Result<Session, SessionError> {
    let decoded = decode(token).map_err(|err| {
        debug!(error = %err, "rejecting undecodable session token");
        SessionError::from(err)
    })?;

    let issued = decoded.issued_at_millis();
    let age = match now_millis.checked_sub(issued) {
        Some(age) => age,
        None if issued > now_millis => return Err(SessionError::Malformed),
        None => return Err(SessionError::Expired),
    };
    if age > SESSION_TTL_MILLIS {
        return Err(SessionError::Expired);
    }
    if age < -MAX_CLOCK_SKEW_MILLIS {
        debug!(age, "rejecting session issued in the future");
        return Err(SessionError::Malformed);
    }

    Ok(decoded.normalize())
}

pub fn is_valid(token: &str, now_millis: i64) -> bool {
    check(token, now_millis).is_ok()
}

/// Role carried by a decodable token, `admin` for legacy ones.
pub fn role_of(token: &str) -> Result<Role, DecodeError> {
    decode(token).map(|t| t.role())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::encode;

    const T: i64 = 1_700_000_000_000;

    #[test]
    fn ttl_boundary() {
        let token = encode("ops@ophirestate.com", Role::Admin, T).unwrap();
        assert!(is_valid(&token, T));
        assert!(is_valid(&token, T + SESSION_TTL_MILLIS - 1));
        assert!(is_valid(&token, T + SESSION_TTL_MILLIS));
        assert!(!is_valid(&token, T + SESSION_TTL_MILLIS + 1));
    }

    #[test]
    fn expired_and_malformed_are_distinguished() {
        let token = encode("ops@ophirestate.com", Role::Admin, T).unwrap();
        assert_eq!(
            check(&token, T + SESSION_TTL_MILLIS + 1),
            Err(SessionError::Expired)
        );
        assert_eq!(check("not base64!", T), Err(SessionError::Malformed));
    }

    #[test]
    fn extreme_timestamps_are_refused_without_panicking() {
        use base64::Engine;
        let forged = |issued: i64| {
            base64::engine::general_purpose::STANDARD.encode(format!("a@b.co:admin:{issued}"))
        };
        assert_eq!(check(&forged(i64::MIN), T), Err(SessionError::Expired));
        assert_eq!(check(&forged(i64::MAX), T), Err(SessionError::Malformed));
        assert_eq!(check(&forged(0), i64::MIN), Err(SessionError::Malformed));
        assert!(!is_valid(&forged(i64::MIN), i64::MAX));
    }

    #[test]
    fn small_clock_skew_is_tolerated() {
        let token = encode("ops@ophirestate.com", Role::Dev, T).unwrap();
        assert!(is_valid(&token, T - MAX_CLOCK_SKEW_MILLIS));
        assert_eq!(
            check(&token, T - MAX_CLOCK_SKEW_MILLIS - 1),
            Err(SessionError::Malformed)
        );
    }

    #[test]
    fn role_of_defaults_legacy_to_admin() {
        use base64::Engine;
        let legacy = base64::engine::general_purpose::STANDARD.encode(format!("a@b.co:{T}"));
        assert_eq!(role_of(&legacy), Ok(Role::Admin));
        assert_eq!(role_of(&encode("a@b.co", Role::Dev, T).unwrap()), Ok(Role::Dev));
        assert!(role_of("###").is_err());
    }
}
