// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Run configuration for claim publication.
//!
//! Options can come from a YAML file (camelCase keys) and from the command
//! line; command-line values override the file. [`PublishConfig::settings`]
//! validates the merged options once, before any record is processed.
//!
//! ```yaml
//! update: true
//! labelStripCount: 3
//! ttl: 3600
//! tsigKeyFile: /etc/bind/diem-update.key
//! timeoutSecs: 5
//! ```

use crate::constants::{DEFAULT_CLAIM_TTL_SECS, DEFAULT_DNS_TIMEOUT_SECS, DNS_PORT};
use crate::errors::PublishError;
use hickory_client::rr::Name;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Publication options as written by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PublishConfig {
    /// Publish tokens with dynamic updates
    #[serde(default)]
    pub update: bool,
    /// Zone all target names must belong to
    pub zone: Option<String>,
    /// Number of left-most labels stripped from a target name to form its zone
    pub label_strip_count: Option<usize>,
    /// TTL of published records
    pub ttl: Option<u32>,
    /// Server receiving all updates instead of each zone's SOA MNAME
    pub server: Option<String>,
    /// Destination port for updates
    pub port: Option<u16>,
    /// BIND9 key file used to sign updates
    pub tsig_key_file: Option<PathBuf>,
    /// Timeout for each resolver query and update exchange
    pub timeout_secs: Option<u64>,
}

/// How the zone of a target name is determined, fixed for the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneSelection {
    /// Every target name must be in this zone.
    Explicit(Name),
    /// Strip this many left-most labels from the target name.
    StripLabels(usize),
}

/// Validated, typed publication settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishSettings {
    /// Zone derivation; `None` when updates are disabled
    pub zone_selection: Option<ZoneSelection>,
    pub ttl: u32,
    pub server: Option<String>,
    pub port: u16,
    pub tsig_key_file: Option<PathBuf>,
    pub timeout: Duration,
}

impl PublishSettings {
    /// Returns true if tokens are published to the DNS.
    #[must_use]
    pub fn update_enabled(&self) -> bool {
        self.zone_selection.is_some()
    }
}

impl PublishConfig {
    /// Load options from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file cannot be read or is not valid YAML
    /// for this structure (unknown keys are rejected).
    pub fn from_yaml_file(path: &Path) -> Result<Self, PublishError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PublishError::configuration(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        serde_yaml::from_str(&content).map_err(|e| {
            PublishError::configuration(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Overlay `overrides` on top of `self`; set values in `overrides` win.
    #[must_use]
    pub fn merge(self, overrides: Self) -> Self {
        Self {
            update: self.update || overrides.update,
            zone: overrides.zone.or(self.zone),
            label_strip_count: overrides.label_strip_count.or(self.label_strip_count),
            ttl: overrides.ttl.or(self.ttl),
            server: overrides.server.or(self.server),
            port: overrides.port.or(self.port),
            tsig_key_file: overrides.tsig_key_file.or(self.tsig_key_file),
            timeout_secs: overrides.timeout_secs.or(self.timeout_secs),
        }
    }

    /// Validate the options and apply defaults.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if updates are enabled and not exactly one of
    /// `zone` and `labelStripCount` is set, if the zone is not a valid domain name,
    /// or if the timeout is zero.
    pub fn settings(&self) -> Result<PublishSettings, PublishError> {
        let zone_selection = if self.update {
            Some(match (&self.zone, self.label_strip_count) {
                (Some(zone), None) => ZoneSelection::Explicit(parse_zone(zone)?),
                (None, Some(count)) => ZoneSelection::StripLabels(count),
                _ => {
                    return Err(PublishError::configuration(
                        "Exactly one of zone or labelStripCount must be set when update is enabled",
                    ))
                }
            })
        } else {
            None
        };

        let timeout_secs = self.timeout_secs.unwrap_or(DEFAULT_DNS_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(PublishError::configuration(
                "timeoutSecs must be greater than zero",
            ));
        }

        Ok(PublishSettings {
            zone_selection,
            ttl: self.ttl.unwrap_or(DEFAULT_CLAIM_TTL_SECS),
            server: self.server.clone(),
            port: self.port.unwrap_or(DNS_PORT),
            tsig_key_file: self.tsig_key_file.clone(),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_zone(zone: &str) -> Result<Name, PublishError> {
    let mut name = Name::from_ascii(zone)
        .map_err(|e| PublishError::configuration(format!("Invalid zone name '{zone}': {e}")))?;
    name.set_fqdn(true);
    if name.is_root() {
        return Err(PublishError::configuration(
            "The root zone cannot be used as an update zone",
        ));
    }
    Ok(name)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
