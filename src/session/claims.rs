//! Unverified JWT payload decoding.
//!
//! Only used to read profile claims and `exp` for local bookkeeping. Signatures are the
//! gateway's concern; nothing here grants trust.

use crate::{Error, ErrorContext, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Decode the payload segment of a compact JWT into a JSON value.
pub fn decode_claims(token: &str) -> Result<serde_json::Value> {
    let payload = token.split('.').nth(1).ok_or_else(|| {
        Error::decode_with_context(
            "access token is not a compact JWT",
            ErrorContext::new().with_source("session_claims"),
        )
    })?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| {
            Error::decode_with_context(
                format!("invalid base64 in token payload: {}", e),
                ErrorContext::new().with_source("session_claims"),
            )
        })?;

    let claims: serde_json::Value = serde_json::from_slice(&bytes)?;
    if !claims.is_object() {
        return Err(Error::decode_with_context(
            "token payload is not a JSON object",
            ErrorContext::new().with_source("session_claims"),
        ));
    }
    Ok(claims)
}

/// `exp` (seconds since the epoch) as a `SystemTime`.
pub fn expiry_from_claims(claims: &serde_json::Value) -> Option<SystemTime> {
    let exp = claims.get("exp")?.as_u64()?;
    UNIX_EPOCH.checked_add(Duration::from_secs(exp))
}

#[cfg(test)]
pub(crate) fn encode_test_token(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.sig", header, payload)
}
