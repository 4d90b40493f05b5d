// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Publication driver.
//!
//! Claim records are read one JSON object per line and processed strictly in
//! input order. For each record the driver:
//!
//! 1. parses the claim and encodes it into a token,
//! 2. writes the token to the output sink, if any,
//! 3. when updates are enabled, resolves the claim's target, chunks the token,
//!    and sends the update.
//!
//! A failure at any stage is logged with the line number and `diem_id`, counted,
//! and processing continues with the next record. Only failures writing the
//! output sink or reading the input abort the run.

use crate::chunk::chunk;
use crate::config::PublishSettings;
use crate::constants::{DIEM_ID_KEY, MAX_CHARACTER_STRING_LEN};
use crate::ddns::{DnsUpdater, UpdateSender, UpdateTransaction};
use crate::errors::PublishError;
use crate::lookup::{resolve_address, NameLookup, SystemLookup};
use crate::metrics;
use crate::target::{TargetResolver, UpdateTarget};
use crate::token::{self, ClaimRecord};
use crate::tsig::load_tsig_key_file;
use hickory_client::rr::{Name, RecordType};
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, error, info};

/// A record that could not be encoded or published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    /// 1-based input line number
    pub line: usize,
    /// The claim's `diem_id`, when the claim could be parsed and has one
    pub diem_id: Option<String>,
    pub error: PublishError,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Non-blank input lines
    pub lines: usize,
    /// Claims encoded into tokens
    pub encoded: usize,
    /// Claims published to the DNS
    pub published: usize,
    /// Failed records, in input order
    pub failures: Vec<RecordFailure>,
}

impl BatchSummary {
    /// Number of failed records.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Returns true if no record failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn record_failure(&mut self, line: usize, diem_id: Option<&str>, error: PublishError) {
        error!(
            line = line,
            diem_id = diem_id.unwrap_or("-"),
            error_type = error.kind(),
            "Failed to process claim record: {}",
            error
        );
        metrics::record_claim_failed(&error);
        self.failures.push(RecordFailure {
            line,
            diem_id: diem_id.map(str::to_string),
            error,
        });
    }
}

/// Target resolution and update transmission for runs that publish.
struct UpdatePipeline {
    resolver: TargetResolver,
    sender: Box<dyn UpdateSender>,
}

impl UpdatePipeline {
    fn publish(&self, uri: &str, token: &str) -> Result<(), PublishError> {
        let (target, server) = self.resolver.resolve(uri)?;
        send_chunked(self.sender.as_ref(), target, server, token)
    }
}

/// Runs the publication pipeline over a stream of claim records.
pub struct Publisher {
    pipeline: Option<UpdatePipeline>,
}

impl Publisher {
    /// A publisher that only encodes tokens.
    #[must_use]
    pub fn encode_only() -> Self {
        Self { pipeline: None }
    }

    /// A publisher that also sends each token as a dynamic update.
    #[must_use]
    pub fn with_updates(resolver: TargetResolver, sender: Box<dyn UpdateSender>) -> Self {
        Self {
            pipeline: Some(UpdatePipeline { resolver, sender }),
        }
    }

    /// Build a publisher from validated settings.
    ///
    /// When updates are enabled this loads the TSIG key, creates the system
    /// resolver, and resolves the configured server.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any of those steps fail.
    pub fn from_settings(settings: &PublishSettings) -> Result<Self, PublishError> {
        if !settings.update_enabled() {
            return Ok(Self::encode_only());
        }

        let key = settings
            .tsig_key_file
            .as_deref()
            .map(load_tsig_key_file)
            .transpose()?;
        match &key {
            Some(key) => info!("Signing updates with TSIG key {} ({})", key.name, key.algorithm),
            None => info!("Sending unsigned updates (no TSIG key configured)"),
        }

        let lookup = SystemLookup::new(settings.timeout)?;
        let resolver = TargetResolver::new(settings, Box::new(lookup))?;
        let sender = DnsUpdater::new(key, settings.timeout);

        Ok(Self::with_updates(resolver, Box::new(sender)))
    }

    /// Process every claim record in `input`, writing tokens to `output`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if reading `input` or writing `output` fails. Errors of
    /// individual records, including lines that are not UTF-8, are collected in
    /// the returned [`BatchSummary`].
    pub fn run<R: BufRead>(
        &self,
        input: R,
        mut output: Option<&mut dyn Write>,
    ) -> io::Result<BatchSummary> {
        let mut summary = BatchSummary::default();

        for (index, line) in input.split(b'\n').enumerate() {
            let line_no = index + 1;
            let line = match line_text(line?) {
                Ok(line) => line,
                Err(e) => {
                    summary.lines += 1;
                    summary.record_failure(line_no, None, e);
                    continue;
                }
            };
            let line = line.trim();
            if line.is_empty() {
                debug!("Skipping blank line {}", line_no);
                continue;
            }
            summary.lines += 1;

            let claims = match parse_claim(line) {
                Ok(claims) => claims,
                Err(e) => {
                    summary.record_failure(line_no, None, e);
                    continue;
                }
            };
            let diem_id = claims.get(DIEM_ID_KEY).and_then(Value::as_str);

            let token = match token::encode(&claims) {
                Ok(token) => token,
                Err(e) => {
                    summary.record_failure(line_no, diem_id, e);
                    continue;
                }
            };
            summary.encoded += 1;
            metrics::record_claim_encoded();

            if let Some(out) = output.as_mut() {
                writeln!(out, "{token}")?;
            }

            let Some(pipeline) = &self.pipeline else {
                continue;
            };
            let result = diem_id
                .ok_or_else(|| {
                    PublishError::invalid_target(
                        format!("line {line_no}"),
                        format!("claim has no string '{DIEM_ID_KEY}'"),
                    )
                })
                .and_then(|uri| pipeline.publish(uri, &token));
            match result {
                Ok(()) => {
                    info!(line = line_no, "Published claim {}", diem_id.unwrap_or("-"));
                    summary.published += 1;
                    metrics::record_claim_published();
                }
                Err(e) => summary.record_failure(line_no, diem_id, e),
            }
        }

        if let Some(out) = output.as_mut() {
            out.flush()?;
        }

        info!(
            "Processed {} claim records: {} encoded, {} published, {} failed",
            summary.lines,
            summary.encoded,
            summary.published,
            summary.failed()
        );
        Ok(summary)
    }
}

/// Convert one raw input line to text; a line that is not UTF-8 is a decoding error.
fn line_text(bytes: Vec<u8>) -> Result<String, PublishError> {
    String::from_utf8(bytes)
        .map_err(|e| PublishError::decoding(format!("line is not valid UTF-8: {e}")))
}

fn parse_claim(line: &str) -> Result<ClaimRecord, PublishError> {
    match serde_json::from_str::<Value>(line) {
        Ok(Value::Object(claims)) => Ok(claims),
        Ok(_) => Err(PublishError::decoding(format!(
            "claim record is not a JSON object: {line}"
        ))),
        Err(e) => Err(PublishError::decoding(format!("invalid JSON ({e}): {line}"))),
    }
}

/// Chunk `contents` and send it as one TXT update.
fn send_chunked(
    sender: &dyn UpdateSender,
    target: UpdateTarget,
    server: SocketAddr,
    contents: &str,
) -> Result<(), PublishError> {
    let chunks = chunk(contents, MAX_CHARACTER_STRING_LEN);
    let transaction = UpdateTransaction::new(target, server, &chunks);

    let started = Instant::now();
    let result = sender.send(&transaction);
    metrics::record_update_duration(started.elapsed(), result.is_ok());
    result
}

/// A single update with arbitrary contents, sent outside of a claim batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleUpdate {
    pub zone: String,
    pub name: String,
    pub record_type: String,
    pub contents: String,
    /// Server host name or address
    pub server: String,
    pub port: u16,
    pub ttl: u32,
}

/// Send one update adding `contents` as a TXT record at `request.name`.
///
/// # Errors
///
/// Returns [`PublishError::InvalidTarget`] for an invalid zone or name, a name
/// outside the zone, or a type other than TXT; a resolution error if the server
/// has no address; and the sender's error if the update fails.
pub fn send_single_update(
    request: &SingleUpdate,
    lookup: &dyn NameLookup,
    sender: &dyn UpdateSender,
) -> Result<(), PublishError> {
    let record_type = RecordType::from_str(&request.record_type.to_ascii_uppercase())
        .map_err(|e| PublishError::invalid_target(&request.record_type, e.to_string()))?;
    if record_type != RecordType::TXT {
        return Err(PublishError::invalid_target(
            &request.name,
            format!("only TXT records can be sent, not {record_type}"),
        ));
    }

    let zone_name = fqdn(&request.zone)?;
    let owner_name = fqdn(&request.name)?;
    if !zone_name.zone_of(&owner_name) {
        return Err(PublishError::invalid_target(
            owner_name.to_string(),
            format!("name is not in zone {zone_name}"),
        ));
    }

    let addr = resolve_address(lookup, &request.server)
        .map_err(|e| e.in_zone(zone_name.to_string()))?
        .ok_or_else(|| PublishError::Resolution {
            zone: zone_name.to_string(),
            reason: format!("server {} has no address", request.server),
        })?;

    let target = UpdateTarget {
        owner_name,
        zone_name,
        record_type,
        ttl: request.ttl,
    };
    send_chunked(sender, target, SocketAddr::new(addr, request.port), &request.contents)
}

fn fqdn(name: &str) -> Result<Name, PublishError> {
    let mut parsed = Name::from_ascii(name)
        .map_err(|e| PublishError::invalid_target(name, format!("invalid domain name: {e}")))?;
    parsed.set_fqdn(true);
    Ok(parsed)
}

/// Decode one token per line, writing `{"header":...,"claims":...}` per token.
///
/// # Errors
///
/// Returns an I/O error if reading `input` or writing `output` fails. Tokens that
/// cannot be decoded are collected in the returned [`BatchSummary`].
pub fn decode_tokens<R: BufRead>(input: R, output: &mut dyn Write) -> io::Result<BatchSummary> {
    let mut summary = BatchSummary::default();

    for (index, line) in input.split(b'\n').enumerate() {
        let line_no = index + 1;
        let line = match line_text(line?) {
            Ok(line) => line,
            Err(e) => {
                summary.lines += 1;
                summary.record_failure(line_no, None, e);
                continue;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        summary.lines += 1;

        match token::decode(line) {
            Ok((header, claims)) => {
                let diem_id = claims.get(DIEM_ID_KEY).and_then(Value::as_str);
                debug!(line = line_no, "Decoded token for {}", diem_id.unwrap_or("-"));
                writeln!(output, "{}", json!({ "header": header, "claims": claims }))?;
                summary.encoded += 1;
            }
            Err(e) => summary.record_failure(line_no, None, e),
        }
    }

    output.flush()?;
    Ok(summary)
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod driver_tests;
