// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for diem-dns.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

use std::num::NonZeroUsize;

// ============================================================================
// Claim Constants
// ============================================================================

/// Claim key holding the target URI of a claim record
pub const DIEM_ID_KEY: &str = "diem_id";

/// URI scheme of claim target URIs
pub const DIEM_URI_SCHEME: &str = "dns";

/// Record class every target URI must request
pub const DIEM_RECORD_CLASS: &str = "IN";

/// Record type every target URI must request
pub const DIEM_RECORD_TYPE: &str = "TXT";

// ============================================================================
// DNS Protocol Constants
// ============================================================================

/// Standard DNS port for queries and dynamic updates
pub const DNS_PORT: u16 = 53;

/// Default TTL for published claim records (1 hour)
pub const DEFAULT_CLAIM_TTL_SECS: u32 = 3600;

/// Maximum length of a single DNS character-string in octets
pub const MAX_CHARACTER_STRING_LEN: NonZeroUsize = match NonZeroUsize::new(255) {
    Some(len) => len,
    None => unreachable!(),
};

/// TSIG fudge time in seconds (allows for clock skew)
pub const TSIG_FUDGE_TIME_SECS: u16 = 300;

/// Default network timeout for resolver queries and update exchanges
pub const DEFAULT_DNS_TIMEOUT_SECS: u64 = 5;

// ============================================================================
// Metrics Constants
// ============================================================================

/// Namespace prefix for all diem-dns metrics
pub const METRICS_NAMESPACE: &str = "diem_dns";
