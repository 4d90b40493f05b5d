// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # diem-dns - DNS publication of asset claims
//!
//! diem-dns publishes machine-verifiable claim records into the DNS as TXT records,
//! using DNS dynamic update (RFC 2136) with optional TSIG authentication.
//!
//! ## Overview
//!
//! Each claim record is a JSON object whose `diem_id` names its target, for example
//! `dns:_diem.123.asn.example.com?CLASS=IN;TYPE=TXT`. Publishing a claim:
//!
//! - encodes the claim into a compact unsecured token (`alg: none`)
//! - derives the target's zone and finds the zone's primary server
//! - splits the token into 255-byte character-strings
//! - adds the TXT record with one update over TCP, signed when a key is configured
//!
//! ## Modules
//!
//! - [`token`] - Token encoding and decoding
//! - [`tsig`] - BIND key file parsing
//! - [`target`] - Target URI parsing, zone derivation and server selection
//! - [`lookup`] - SOA and address lookups through the system resolver
//! - [`chunk`] - Splitting tokens into character-strings
//! - [`ddns`] - Dynamic update transactions
//! - [`driver`] - Batch processing of claim records
//! - [`config`] - Run configuration
//! - [`metrics`] - Prometheus metrics
//!
//! ## Example
//!
//! ```rust,no_run
//! use diem_dns::driver::Publisher;
//! use std::io::Cursor;
//!
//! let input = r#"{"diem_id": "dns:_diem.123.asn.example.com?CLASS=IN;TYPE=TXT"}"#;
//! let mut tokens = Vec::new();
//! let summary = Publisher::encode_only()
//!     .run(Cursor::new(input), Some(&mut tokens))
//!     .unwrap();
//! assert!(summary.is_success());
//! ```

pub mod chunk;
pub mod cli;
pub mod config;
pub mod constants;
pub mod ddns;
pub mod driver;
pub mod errors;
pub mod lookup;
pub mod metrics;
pub mod target;
pub mod token;
pub mod tsig;
