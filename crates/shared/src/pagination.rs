//! Cursor-based pagination utilities.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use thiserror::Error;

/// Error type for cursor operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CursorError {
    #[error("Invalid cursor format")]
    InvalidFormat,
    #[error("Invalid cursor encoding")]
    InvalidEncoding,
    #[error("Invalid sequence number in cursor")]
    InvalidSequence,
    #[error("Cursor does not belong to this resource")]
    ScopeMismatch,
}

/// Encodes a cursor from a scope key and the last sequence number seen.
///
/// The cursor format is: base64(scope:sequence). Binding the scope into the
/// cursor stops a cursor issued for one task from paging through another.
pub fn encode_cursor(scope: &str, sequence: i64) -> String {
    let raw = format!("{}:{}", scope, sequence);
    URL_SAFE_NO_PAD.encode(raw.as_bytes())
}

/// Decodes a cursor issued for `expected_scope` into its sequence number.
pub fn decode_cursor(cursor: &str, expected_scope: &str) -> Result<i64, CursorError> {
    let decoded = URL_SAFE_NO_PAD
        .decode(cursor)
        .map_err(|_| CursorError::InvalidEncoding)?;

    let s = String::from_utf8(decoded).map_err(|_| CursorError::InvalidFormat)?;

    // Split on last colon (the scope may itself contain colons)
    let (scope, sequence) = s.rsplit_once(':').ok_or(CursorError::InvalidFormat)?;

    let sequence: i64 = sequence.parse().map_err(|_| CursorError::InvalidSequence)?;

    if scope != expected_scope {
        return Err(CursorError::ScopeMismatch);
    }

    Ok(sequence)
}
