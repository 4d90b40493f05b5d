// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Dynamic DNS updates (RFC 2136) over TCP.
//!
//! Each claim is published with one update transaction:
//!
//! 1. **Build** - an update scoped to the zone, adding one TXT record whose
//!    character-strings are the chunked token
//! 2. **Sign** - attach TSIG when a key is configured
//! 3. **Send** - one attempt over TCP, bounded by the configured timeout
//! 4. **Check** - `NOERROR` means published, any other response code is a
//!    [`PublishError::Protocol`]
//!
//! No prerequisites are set, so an existing record with the same data is left in
//! place and additional data is appended to the RRset.

use crate::errors::PublishError;
use crate::target::UpdateTarget;
use crate::tsig::TsigKey;
use hickory_client::client::{Client, SyncClient};
use hickory_client::op::ResponseCode;
use hickory_client::rr::{rdata, DNSClass, Name, RData, Record, RecordType};
use hickory_client::tcp::TcpClientConnection;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{debug, info};

/// A single update: one record added to one zone on one server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTransaction {
    pub zone_name: Name,
    pub owner_name: Name,
    pub record_type: RecordType,
    pub ttl: u32,
    /// Character-strings of the TXT rdata, in order
    pub rdata: Vec<Vec<u8>>,
    pub server: SocketAddr,
}

impl UpdateTransaction {
    /// Create a transaction publishing `chunks` at `target`.
    #[must_use]
    pub fn new(target: UpdateTarget, server: SocketAddr, chunks: &[&[u8]]) -> Self {
        Self {
            zone_name: target.zone_name,
            owner_name: target.owner_name,
            record_type: target.record_type,
            ttl: target.ttl,
            rdata: chunks.iter().map(|c| c.to_vec()).collect(),
            server,
        }
    }

    /// Build the resource record added by this transaction.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::InvalidRecordData`] if there are no character-strings
    /// or the record type is not TXT.
    pub fn record(&self) -> Result<Record, PublishError> {
        if self.record_type != RecordType::TXT {
            return Err(PublishError::InvalidRecordData {
                name: self.owner_name.to_string(),
                reason: format!("unsupported record type {}", self.record_type),
            });
        }
        if self.rdata.is_empty() {
            return Err(PublishError::InvalidRecordData {
                name: self.owner_name.to_string(),
                reason: "TXT record has no character-strings".to_string(),
            });
        }

        let txt = rdata::TXT::from_bytes(self.rdata.iter().map(Vec::as_slice).collect());
        let mut record = Record::from_rdata(self.owner_name.clone(), self.ttl, RData::TXT(txt));
        record.set_dns_class(DNSClass::IN);
        Ok(record)
    }
}

/// Sends update transactions.
pub trait UpdateSender {
    /// Send one transaction and wait for its response.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Transport`] on connection failure or timeout and
    /// [`PublishError::Protocol`] when the server does not answer `NOERROR`.
    fn send(&self, transaction: &UpdateTransaction) -> Result<(), PublishError>;
}

/// [`UpdateSender`] using hickory's blocking client over TCP.
#[derive(Debug, Clone)]
pub struct DnsUpdater {
    key: Option<TsigKey>,
    timeout: Duration,
}

impl DnsUpdater {
    /// Create an updater signing with `key`, if any.
    #[must_use]
    pub fn new(key: Option<TsigKey>, timeout: Duration) -> Self {
        Self { key, timeout }
    }
}

impl UpdateSender for DnsUpdater {
    fn send(&self, transaction: &UpdateTransaction) -> Result<(), PublishError> {
        let record = transaction.record()?;
        let server = transaction.server;
        let transport_error = |reason: String| PublishError::Transport {
            server: server.to_string(),
            reason,
        };

        let conn = TcpClientConnection::with_timeout(server, self.timeout)
            .map_err(|e| transport_error(format!("failed to create TCP connection: {e}")))?;
        let client = match &self.key {
            Some(key) => SyncClient::with_tsigner(conn, key.signer()?),
            None => SyncClient::new(conn),
        };

        info!(
            "Adding {} record: {} in zone {} (TTL: {}, {} character-strings) via {}",
            transaction.record_type,
            transaction.owner_name,
            transaction.zone_name,
            transaction.ttl,
            transaction.rdata.len(),
            server
        );
        let response = client
            .append(record, transaction.zone_name.clone(), false)
            .map_err(|e| transport_error(e.to_string()))?;

        check_response_code(response.response_code(), transaction)
    }
}

/// Interpret the response code of an update.
///
/// # Errors
///
/// Returns [`PublishError::Protocol`] carrying `code` for anything but `NOERROR`.
pub fn check_response_code(
    code: ResponseCode,
    transaction: &UpdateTransaction,
) -> Result<(), PublishError> {
    match code {
        ResponseCode::NoError => {
            debug!(
                "Successfully added {} record: {}",
                transaction.record_type, transaction.owner_name
            );
            Ok(())
        }
        code => Err(PublishError::Protocol {
            zone: transaction.zone_name.to_string(),
            server: transaction.server.to_string(),
            code,
        }),
    }
}

#[cfg(test)]
#[path = "ddns_tests.rs"]
mod ddns_tests;
