// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Command-line interface.

use crate::config::PublishConfig;
use crate::constants::{DEFAULT_CLAIM_TTL_SECS, DEFAULT_DNS_TIMEOUT_SECS, DNS_PORT};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Publish asset claims as TXT records with DNS dynamic updates.
#[derive(Debug, Parser)]
#[command(name = "diem-dns", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Encode claim records into tokens and optionally publish them
    Publish(PublishArgs),
    /// Send a single TXT update with arbitrary contents
    Send(SendArgs),
    /// Decode tokens back into header and claims
    Decode(DecodeArgs),
}

#[derive(Debug, Args)]
pub struct PublishArgs {
    /// Claim records, one JSON object per line (`-` for stdin)
    pub input: PathBuf,

    /// YAML file with publication options
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Publish each token with a dynamic update
    #[arg(long)]
    pub update: bool,

    /// Zone all target names belong to
    #[arg(long, conflicts_with = "label_strip_count")]
    pub zone: Option<String>,

    /// Strip this many left-most labels from a target name to form its zone
    #[arg(long, value_name = "COUNT")]
    pub label_strip_count: Option<usize>,

    /// TTL of published records [default: 3600]
    #[arg(long)]
    pub ttl: Option<u32>,

    /// Send all updates to this server instead of each zone's primary
    #[arg(long)]
    pub server: Option<String>,

    /// Destination port for updates [default: 53]
    #[arg(long)]
    pub port: Option<u16>,

    /// BIND key file used to sign updates with TSIG
    #[arg(long, value_name = "FILE")]
    pub tsig_key_file: Option<PathBuf>,

    /// Timeout in seconds for each lookup and update [default: 5]
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Write tokens to this file instead of stdout
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write Prometheus metrics to this file when the run ends
    #[arg(long, value_name = "FILE")]
    pub metrics_file: Option<PathBuf>,
}

impl PublishArgs {
    /// Options given on the command line, to be merged over the config file.
    #[must_use]
    pub fn to_config(&self) -> PublishConfig {
        PublishConfig {
            update: self.update,
            zone: self.zone.clone(),
            label_strip_count: self.label_strip_count,
            ttl: self.ttl,
            server: self.server.clone(),
            port: self.port,
            tsig_key_file: self.tsig_key_file.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

#[derive(Debug, Args)]
pub struct SendArgs {
    /// Zone to update
    pub zone: String,
    /// Owner name of the record
    pub name: String,
    /// Record type (only TXT is supported)
    #[arg(value_name = "TYPE")]
    pub record_type: String,
    /// Record contents, sent as raw text (quotes are sent literally, not parsed
    /// as presentation format) and split into 255-byte character-strings
    pub contents: String,
    /// Server host name or address
    pub server: String,

    #[arg(long, default_value_t = DEFAULT_CLAIM_TTL_SECS)]
    pub ttl: u32,

    #[arg(long, default_value_t = DNS_PORT)]
    pub port: u16,

    /// BIND key file used to sign the update with TSIG
    #[arg(long, value_name = "FILE")]
    pub tsig_key_file: Option<PathBuf>,

    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_DNS_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

#[derive(Debug, Args)]
pub struct DecodeArgs {
    /// Tokens, one per line (`-` for stdin)
    #[arg(default_value = "-")]
    pub input: PathBuf,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod cli_tests;
