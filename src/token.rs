// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Compact unsecured claim tokens.
//!
//! A token is `header.payload`, where each segment is the base64url encoding
//! (without padding) of a compact JSON document. Only the unsecured `"alg":"none"`
//! form is produced; there is no signature segment.
//!
//! # Example
//!
//! ```rust
//! use diem_dns::token::{decode, default_header, encode, ClaimRecord};
//! use serde_json::json;
//!
//! let mut claims = ClaimRecord::new();
//! claims.insert("diem_asset_id".to_string(), json!("123"));
//!
//! let token = encode(&claims).unwrap();
//! assert!(token.starts_with("eyJhbGciOiJub25lIn0."));
//!
//! let (header, decoded) = decode(&token).unwrap();
//! assert_eq!(header, default_header());
//! assert_eq!(decoded, claims);
//! ```

use crate::errors::PublishError;
use base64::{
    alphabet,
    engine::general_purpose::{GeneralPurpose, PAD, URL_SAFE_NO_PAD},
    Engine,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::LazyLock;

/// A claim record: string keys mapped to arbitrary JSON values.
pub type ClaimRecord = serde_json::Map<String, Value>;

/// Padded base64url decoder that accepts non-zero trailing bits in the last symbol.
const URL_SAFE_LENIENT: GeneralPurpose =
    GeneralPurpose::new(&alphabet::URL_SAFE, PAD.with_decode_allow_trailing_bits(true));

/// Base64url encoding of the default unsecured header, computed once.
static UNSECURED_HEADER_ENCODED: LazyLock<String> =
    LazyLock::new(|| URL_SAFE_NO_PAD.encode(default_header().to_string()));

/// The unsecured header `{"alg":"none"}`.
#[must_use]
pub fn default_header() -> Value {
    json!({ "alg": "none" })
}

/// Encode a claim record under the default unsecured header.
///
/// # Errors
///
/// Returns a decoding error only if the claims cannot be serialized to JSON,
/// which does not happen for a [`ClaimRecord`].
pub fn encode(claims: &ClaimRecord) -> Result<String, PublishError> {
    Ok(format!(
        "{}.{}",
        UNSECURED_HEADER_ENCODED.as_str(),
        encode_segment(claims)?
    ))
}

/// Encode a claim record under an explicit header.
///
/// # Errors
///
/// Returns a decoding error if either document cannot be serialized to JSON.
pub fn encode_with_header(claims: &ClaimRecord, header: &Value) -> Result<String, PublishError> {
    Ok(format!("{}.{}", encode_segment(header)?, encode_segment(claims)?))
}

/// Decode a token into its header and claim record.
///
/// # Errors
///
/// Returns [`PublishError::Decoding`] if the token has no `.` separator, if a
/// segment has an impossible base64 length or invalid characters, or if a segment
/// is not JSON (the payload must be a JSON object).
pub fn decode(token: &str) -> Result<(Value, ClaimRecord), PublishError> {
    let (header_enc, claims_enc) = token
        .split_once('.')
        .ok_or_else(|| PublishError::decoding("token has no '.' separator"))?;

    let header: Value = serde_json::from_str(&decode_segment(header_enc)?)?;
    let claims: ClaimRecord = serde_json::from_str(&decode_segment(claims_enc)?)?;

    Ok((header, claims))
}

fn encode_segment<T: Serialize + ?Sized>(value: &T) -> Result<String, PublishError> {
    let json = serde_json::to_string(value)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn decode_segment(segment: &str) -> Result<String, PublishError> {
    // Restore the padding stripped by the encoder; a remainder of 1 cannot occur
    // in any base64 output.
    let padded = match segment.len() % 4 {
        0 => segment.to_string(),
        2 => format!("{segment}=="),
        3 => format!("{segment}="),
        _ => {
            return Err(PublishError::decoding(format!(
                "incorrect length of base64-encoded segment: {segment}"
            )))
        }
    };

    let bytes = URL_SAFE_LENIENT
        .decode(padded)
        .map_err(|e| PublishError::decoding(format!("invalid base64 segment '{segment}': {e}")))?;

    String::from_utf8(bytes)
        .map_err(|e| PublishError::decoding(format!("segment '{segment}' is not UTF-8: {e}")))
}

#[cfg(test)]
#[path = "token_tests.rs"]
mod token_tests;
