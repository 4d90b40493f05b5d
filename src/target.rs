// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Resolution of claim target URIs into update targets.
//!
//! A claim names its DNS location with a URI such as
//! `dns:_diem.123.asn.example?CLASS=IN;TYPE=TXT`. Resolving a target:
//!
//! 1. checks the scheme and the `CLASS`/`TYPE` query parameters,
//! 2. parses the owner name from the path,
//! 3. derives the zone from the run's [`ZoneSelection`],
//! 4. finds the server address: the configured server, or the zone's SOA MNAME.

use crate::config::{PublishSettings, ZoneSelection};
use crate::constants::{DIEM_RECORD_CLASS, DIEM_URI_SCHEME};
use crate::errors::PublishError;
use crate::lookup::{resolve_address, NameLookup};
use hickory_client::rr::{Name, RecordType};
use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};
use tracing::debug;
use url::Url;

/// Owner name and record type parsed from a target URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUri {
    pub owner_name: Name,
    pub record_type: RecordType,
}

/// Where and how a claim is published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTarget {
    pub owner_name: Name,
    pub zone_name: Name,
    pub record_type: RecordType,
    pub ttl: u32,
}

/// Parse a target URI, requiring `CLASS=IN` and `TYPE=<expected_type>`.
///
/// Scheme, parameter names, and parameter values are matched exactly.
///
/// # Errors
///
/// Returns [`PublishError::InvalidTarget`] for a wrong scheme, a missing or
/// malformed query, a class/type mismatch, or an invalid owner name.
pub fn parse_target_uri(uri: &str, expected_type: RecordType) -> Result<TargetUri, PublishError> {
    let scheme = uri.split_once(':').map_or("", |(scheme, _)| scheme);
    if scheme != DIEM_URI_SCHEME {
        return Err(PublishError::invalid_target(
            uri,
            format!("incorrect scheme '{scheme}', expected '{DIEM_URI_SCHEME}'"),
        ));
    }

    let url = Url::parse(uri).map_err(|e| PublishError::invalid_target(uri, e.to_string()))?;

    let params = parse_query(uri, url.query().unwrap_or_default())?;
    let class = required_param(uri, &params, "CLASS")?;
    let rtype = required_param(uri, &params, "TYPE")?;
    let expected_type_str = expected_type.to_string();
    if (class, rtype) != (DIEM_RECORD_CLASS, expected_type_str.as_str()) {
        return Err(PublishError::invalid_target(
            uri,
            format!(
                "incorrect class/type CLASS={class};TYPE={rtype}, \
                 expected CLASS={DIEM_RECORD_CLASS};TYPE={expected_type_str}"
            ),
        ));
    }

    // An RFC 4501 authority form ("dns://server/name") leaves a leading slash.
    let path = url.path().trim_start_matches('/');
    if path.is_empty() {
        return Err(PublishError::invalid_target(uri, "empty owner name"));
    }
    let mut owner_name = Name::from_ascii(path).map_err(|e| {
        PublishError::invalid_target(uri, format!("invalid owner name '{path}': {e}"))
    })?;
    owner_name.set_fqdn(true);

    Ok(TargetUri {
        owner_name,
        record_type: expected_type,
    })
}

/// Split a query into `key=value` pairs separated by `;`.
fn parse_query<'a>(uri: &str, query: &'a str) -> Result<BTreeMap<&'a str, &'a str>, PublishError> {
    if query.is_empty() {
        return Err(PublishError::invalid_target(uri, "missing CLASS/TYPE query"));
    }

    let mut params = BTreeMap::new();
    for pair in query.split(';') {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            PublishError::invalid_target(uri, format!("malformed query parameter '{pair}'"))
        })?;
        if params.insert(key, value).is_some() {
            return Err(PublishError::invalid_target(
                uri,
                format!("duplicate query parameter '{key}'"),
            ));
        }
    }
    Ok(params)
}

fn required_param<'a>(
    uri: &str,
    params: &BTreeMap<&str, &'a str>,
    key: &str,
) -> Result<&'a str, PublishError> {
    params
        .get(key)
        .copied()
        .ok_or_else(|| PublishError::invalid_target(uri, format!("missing {key} parameter")))
}

/// Derive the zone an owner name is updated in.
///
/// With [`ZoneSelection::StripLabels`], at least one label must remain: the root
/// zone is never an update target.
///
/// # Errors
///
/// Returns [`PublishError::InvalidTarget`] if the owner is outside the explicit
/// zone or the strip count leaves no label.
pub fn derive_zone(owner_name: &Name, selection: &ZoneSelection) -> Result<Name, PublishError> {
    match selection {
        ZoneSelection::Explicit(zone) => {
            if zone.zone_of(owner_name) {
                Ok(zone.clone())
            } else {
                Err(PublishError::invalid_target(
                    owner_name.to_string(),
                    format!("name is not in zone {zone}"),
                ))
            }
        }
        ZoneSelection::StripLabels(count) => {
            let labels = owner_name.iter().count();
            if *count >= labels {
                return Err(PublishError::invalid_target(
                    owner_name.to_string(),
                    format!("cannot strip {count} labels from a name with {labels} labels"),
                ));
            }
            Ok(owner_name.trim_to(labels - count))
        }
    }
}

/// Resolves claim target URIs into update targets and server addresses.
pub struct TargetResolver {
    zone_selection: ZoneSelection,
    ttl: u32,
    port: u16,
    server: Option<IpAddr>,
    lookup: Box<dyn NameLookup>,
}

impl TargetResolver {
    /// Create a resolver for a run with updates enabled.
    ///
    /// A configured server is resolved once, here.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if updates are disabled in `settings` or the
    /// configured server has no address.
    pub fn new(settings: &PublishSettings, lookup: Box<dyn NameLookup>) -> Result<Self, PublishError> {
        let zone_selection = settings.zone_selection.clone().ok_or_else(|| {
            PublishError::configuration("Target resolution requires update to be enabled")
        })?;

        let server = match &settings.server {
            Some(host) => {
                let addr = resolve_address(lookup.as_ref(), host)
                    .map_err(|e| {
                        let reason = match e {
                            PublishError::Resolution { reason, .. } => reason,
                            other => other.to_string(),
                        };
                        PublishError::configuration(format!("Invalid server name {host}: {reason}"))
                    })?
                    .ok_or_else(|| {
                        PublishError::configuration(format!("Invalid server name: {host}"))
                    })?;
                debug!("Sending all updates to {} ({})", host, addr);
                Some(addr)
            }
            None => None,
        };

        Ok(Self {
            zone_selection,
            ttl: settings.ttl,
            port: settings.port,
            server,
            lookup,
        })
    }

    /// Parse a target URI and derive its zone.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::InvalidTarget`] from URI parsing or zone derivation.
    pub fn target(&self, uri: &str) -> Result<UpdateTarget, PublishError> {
        let TargetUri {
            owner_name,
            record_type,
        } = parse_target_uri(uri, RecordType::TXT)?;
        let zone_name = derive_zone(&owner_name, &self.zone_selection)?;

        Ok(UpdateTarget {
            owner_name,
            zone_name,
            record_type,
            ttl: self.ttl,
        })
    }

    /// Find the address updates for `zone` are sent to.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Resolution`] naming the zone if it has no SOA record
    /// or its primary server has no address.
    pub fn server_for(&self, zone: &Name) -> Result<SocketAddr, PublishError> {
        if let Some(addr) = self.server {
            return Ok(SocketAddr::new(addr, self.port));
        }

        let mname = self
            .lookup
            .primary_server(zone)?
            .ok_or_else(|| PublishError::Resolution {
                zone: zone.to_string(),
                reason: "no SOA record (MNAME) for zone".to_string(),
            })?;

        let host = mname.to_string();
        let addr = resolve_address(self.lookup.as_ref(), &host)
            .map_err(|e| e.in_zone(zone.to_string()))?
            .ok_or_else(|| PublishError::Resolution {
                zone: zone.to_string(),
                reason: format!("primary server {host} has no address"),
            })?;
        debug!("Primary server for zone {} is {} ({})", zone, host, addr);

        Ok(SocketAddr::new(addr, self.port))
    }

    /// Resolve a target URI into an update target and its server address.
    ///
    /// # Errors
    ///
    /// See [`TargetResolver::target`] and [`TargetResolver::server_for`].
    pub fn resolve(&self, uri: &str) -> Result<(UpdateTarget, SocketAddr), PublishError> {
        let target = self.target(uri)?;
        let server = self.server_for(&target.zone_name)?;
        Ok((target, server))
    }
}

#[cfg(test)]
#[path = "target_tests.rs"]
mod target_tests;
