// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNS lookups needed to find where updates are sent.
//!
//! [`NameLookup`] is the seam between target resolution and the network;
//! [`SystemLookup`] implements it with the system resolver configuration.

use crate::errors::PublishError;
use hickory_client::rr::Name;
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::Resolver;
use std::net::IpAddr;
use std::time::Duration;
use tracing::debug;

/// Lookups used to locate the primary server of a zone.
pub trait NameLookup {
    /// Return the MNAME of the zone's SOA record, or `None` if the zone has no SOA.
    ///
    /// # Errors
    ///
    /// Returns a resolution error if the query itself fails (timeout, SERVFAIL, ...).
    fn primary_server(&self, zone: &Name) -> Result<Option<Name>, PublishError>;

    /// Return the first address of `host`, or `None` if it has no address records.
    ///
    /// # Errors
    ///
    /// Returns a resolution error naming `host` if the query itself fails. The
    /// error's zone is left empty; callers attribute it with [`PublishError::in_zone`].
    fn resolve_host(&self, host: &str) -> Result<Option<IpAddr>, PublishError>;
}

/// [`NameLookup`] backed by a blocking hickory resolver using the system configuration.
pub struct SystemLookup {
    resolver: Resolver,
}

impl SystemLookup {
    /// Create a resolver from the system configuration with a per-query timeout.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the system resolver configuration cannot be read.
    pub fn new(timeout: Duration) -> Result<Self, PublishError> {
        let (config, mut options) = hickory_resolver::system_conf::read_system_conf()
            .map_err(|e| {
                PublishError::configuration(format!(
                    "Failed to read system resolver configuration: {e}"
                ))
            })?;
        options.timeout = timeout;

        let resolver = Resolver::new(config, options).map_err(|e| {
            PublishError::configuration(format!("Failed to create resolver: {e}"))
        })?;

        Ok(Self { resolver })
    }
}

impl NameLookup for SystemLookup {
    fn primary_server(&self, zone: &Name) -> Result<Option<Name>, PublishError> {
        debug!("Looking up SOA record for zone {}", zone);
        match self.resolver.soa_lookup(zone.clone()) {
            Ok(lookup) => Ok(lookup.iter().next().map(|soa| soa.mname().clone())),
            Err(e) if matches!(e.kind(), ResolveErrorKind::NoRecordsFound { .. }) => Ok(None),
            Err(e) => Err(PublishError::Resolution {
                zone: zone.to_string(),
                reason: format!("SOA lookup failed: {e}"),
            }),
        }
    }

    fn resolve_host(&self, host: &str) -> Result<Option<IpAddr>, PublishError> {
        debug!("Resolving address of {}", host);
        match self.resolver.lookup_ip(host) {
            Ok(lookup) => Ok(lookup.iter().next()),
            Err(e) if matches!(e.kind(), ResolveErrorKind::NoRecordsFound { .. }) => Ok(None),
            Err(e) => Err(PublishError::Resolution {
                zone: String::new(),
                reason: format!("address lookup for {host} failed: {e}"),
            }),
        }
    }
}

/// Resolve `host` to an address, using it as is when it is an IP literal.
///
/// # Errors
///
/// Propagates lookup failures from `lookup`.
pub fn resolve_address(
    lookup: &dyn NameLookup,
    host: &str,
) -> Result<Option<IpAddr>, PublishError> {
    if let Ok(addr) = host.parse::<IpAddr>() {
        return Ok(Some(addr));
    }
    lookup.resolve_host(host)
}
