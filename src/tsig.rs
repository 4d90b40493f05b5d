// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! TSIG key loading and signer construction.
//!
//! Keys are read from BIND9 key files:
//!
//! ```text
//! key "ddns-key" {
//!     algorithm hmac-sha256;
//!     secret "base64secret==";
//! };
//! ```
//!
//! The key name, algorithm, and secret are each matched independently on every
//! line; when a field appears more than once the last occurrence wins. The
//! algorithm is optional and defaults to [`KeyAlgorithm::HmacSha256`].

use crate::constants::TSIG_FUDGE_TIME_SECS;
use crate::errors::PublishError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hickory_client::rr::rdata::tsig::TsigAlgorithm;
use hickory_client::rr::Name;
use hickory_proto::rr::dnssec::tsig::TSigner;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// HMAC algorithm of a TSIG key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyAlgorithm {
    HmacMd5,
    HmacSha1,
    HmacSha224,
    #[default]
    HmacSha256,
    HmacSha384,
    HmacSha512,
}

impl KeyAlgorithm {
    /// The algorithm name as written in BIND9 key files.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HmacMd5 => "hmac-md5",
            Self::HmacSha1 => "hmac-sha1",
            Self::HmacSha224 => "hmac-sha224",
            Self::HmacSha256 => "hmac-sha256",
            Self::HmacSha384 => "hmac-sha384",
            Self::HmacSha512 => "hmac-sha512",
        }
    }

    fn to_tsig_algorithm(self) -> TsigAlgorithm {
        match self {
            Self::HmacMd5 => TsigAlgorithm::HmacMd5,
            Self::HmacSha1 => TsigAlgorithm::HmacSha1,
            Self::HmacSha224 => TsigAlgorithm::HmacSha224,
            Self::HmacSha256 => TsigAlgorithm::HmacSha256,
            Self::HmacSha384 => TsigAlgorithm::HmacSha384,
            Self::HmacSha512 => TsigAlgorithm::HmacSha512,
        }
    }
}

impl FromStr for KeyAlgorithm {
    type Err = PublishError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().trim_end_matches('.') {
            "hmac-md5" | "hmac-md5.sig-alg.reg.int" => Ok(Self::HmacMd5),
            "hmac-sha1" => Ok(Self::HmacSha1),
            "hmac-sha224" => Ok(Self::HmacSha224),
            "hmac-sha256" => Ok(Self::HmacSha256),
            "hmac-sha384" => Ok(Self::HmacSha384),
            "hmac-sha512" => Ok(Self::HmacSha512),
            _ => Err(PublishError::configuration(format!(
                "Unsupported TSIG algorithm '{s}'. Supported algorithms: hmac-md5, hmac-sha1, \
                 hmac-sha224, hmac-sha256, hmac-sha384, hmac-sha512"
            ))),
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A TSIG key used to sign dynamic updates.
#[derive(Clone, PartialEq, Eq)]
pub struct TsigKey {
    /// Key name
    pub name: Name,
    /// HMAC algorithm
    pub algorithm: KeyAlgorithm,
    /// Decoded shared secret
    pub secret: Vec<u8>,
}

// Debug output omits the secret.
impl fmt::Debug for TsigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TsigKey")
            .field("name", &self.name)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl TsigKey {
    /// Create a TSIG signer for this key.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if hickory cannot sign with the key's algorithm.
    pub fn signer(&self) -> Result<TSigner, PublishError> {
        TSigner::new(
            self.secret.clone(),
            self.algorithm.to_tsig_algorithm(),
            self.name.clone(),
            TSIG_FUDGE_TIME_SECS,
        )
        .map_err(|e| {
            PublishError::configuration(format!(
                "Failed to create TSIG signer for key '{}' ({}): {e}",
                self.name, self.algorithm
            ))
        })
    }
}

/// Parse a BIND9 key file to extract the key name, algorithm, and secret.
///
/// The returned key is checked by building a signer from it, so an algorithm
/// that cannot be used for signing is rejected here rather than on first use.
///
/// # Errors
///
/// Returns a configuration error if the key name or secret is missing, the
/// algorithm is unknown, or the secret is not valid base64.
pub fn parse_tsig_key(content: &str) -> Result<TsigKey, PublishError> {
    let mut name = None;
    let mut algorithm = None;
    let mut secret = None;

    for line in content.lines() {
        if let Some(value) = keyword_value(line, "key", quoted) {
            name = Some(value);
        }
        if let Some(value) = keyword_value(line, "algorithm", bare_word) {
            algorithm = Some(value);
        }
        if let Some(value) = keyword_value(line, "secret", quoted) {
            secret = Some(value);
        }
    }

    let name = name.ok_or_else(|| PublishError::configuration("TSIG key file has no key name"))?;
    let secret =
        secret.ok_or_else(|| PublishError::configuration("TSIG key file has no secret"))?;
    let algorithm = algorithm
        .map(KeyAlgorithm::from_str)
        .transpose()?
        .unwrap_or_default();

    let key = TsigKey {
        name: Name::from_ascii(name)
            .map_err(|e| PublishError::configuration(format!("Invalid TSIG key name '{name}': {e}")))?,
        algorithm,
        secret: BASE64
            .decode(secret)
            .map_err(|e| PublishError::configuration(format!("Failed to decode TSIG secret: {e}")))?,
    };
    key.signer()?;

    Ok(key)
}

/// Read and parse a BIND9 key file.
///
/// # Errors
///
/// Returns a configuration error if the file cannot be read or parsed.
pub fn load_tsig_key_file(path: &Path) -> Result<TsigKey, PublishError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        PublishError::configuration(format!(
            "Failed to read TSIG key file {}: {e}",
            path.display()
        ))
    })?;
    parse_tsig_key(&content)
}

/// Find `keyword` as a whole word followed by whitespace and parse what follows.
fn keyword_value<'a>(
    line: &'a str,
    keyword: &str,
    parse: fn(&'a str) -> Option<&'a str>,
) -> Option<&'a str> {
    line.match_indices(keyword).find_map(|(start, _)| {
        let preceded_by_word = line[..start]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric() || c == '-' || c == '_');
        if preceded_by_word {
            return None;
        }
        let rest = &line[start + keyword.len()..];
        let value = rest.trim_start();
        if value.len() == rest.len() {
            // no whitespace after the keyword
            return None;
        }
        parse(value)
    })
}

/// A non-empty double-quoted string.
fn quoted(s: &str) -> Option<&str> {
    let inner = s.strip_prefix('"')?;
    let end = inner.find('"')?;
    Some(&inner[..end]).filter(|v| !v.is_empty())
}

/// A non-empty word ending at `;` or whitespace.
fn bare_word(s: &str) -> Option<&str> {
    let end = s
        .find(|c: char| c == ';' || c.is_whitespace())
        .unwrap_or(s.len());
    Some(&s[..end]).filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "tsig_tests.rs"]
mod tsig_tests;
