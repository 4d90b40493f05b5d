// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::Parser;
use diem_dns::{
    cli::{Cli, Command, DecodeArgs, PublishArgs, SendArgs},
    config::PublishConfig,
    ddns::DnsUpdater,
    driver::{decode_tokens, send_single_update, Publisher, SingleUpdate},
    errors::PublishError,
    lookup::SystemLookup,
    metrics::gather_metrics,
    tsig::load_tsig_key_file,
};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, error, info};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Command::Publish(args) => publish(&args),
        Command::Send(args) => send(&args),
        Command::Decode(args) => decode(&args),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

// Logs go to stderr so stdout carries only tokens.
//
// Respects RUST_LOG, otherwise defaults to INFO level
// Example: RUST_LOG=debug diem-dns publish claims.ndjson
//
// Respects RUST_LOG_FORMAT for output format
// Example: RUST_LOG_FORMAT=json diem-dns publish claims.ndjson
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    debug!("Logging initialized with file and line number tracking");
}

fn publish(args: &PublishArgs) -> Result<bool> {
    let file_config = match &args.config {
        Some(path) => PublishConfig::from_yaml_file(path)?,
        None => PublishConfig::default(),
    };
    let settings = file_config.merge(args.to_config()).settings()?;
    let publisher = Publisher::from_settings(&settings)?;

    let input = open_input(&args.input)?;
    let mut output: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    info!("Processing claim records from {}", args.input.display());
    let sink: &mut dyn Write = &mut output;
    let summary = publisher.run(input, Some(sink))?;

    if let Some(path) = &args.metrics_file {
        std::fs::write(path, gather_metrics()?)
            .with_context(|| format!("failed to write metrics to {}", path.display()))?;
        debug!("Wrote metrics to {}", path.display());
    }

    Ok(summary.is_success())
}

fn send(args: &SendArgs) -> Result<bool> {
    if args.timeout_secs == 0 {
        return Err(PublishError::configuration("timeout-secs must be greater than 0").into());
    }
    let timeout = Duration::from_secs(args.timeout_secs);
    let key = args
        .tsig_key_file
        .as_deref()
        .map(load_tsig_key_file)
        .transpose()?;

    let lookup = SystemLookup::new(timeout)?;
    let updater = DnsUpdater::new(key, timeout);
    let request = SingleUpdate {
        zone: args.zone.clone(),
        name: args.name.clone(),
        record_type: args.record_type.clone(),
        contents: args.contents.clone(),
        server: args.server.clone(),
        port: args.port,
        ttl: args.ttl,
    };

    send_single_update(&request, &lookup, &updater)?;
    info!("Added {} record {} in zone {}", args.record_type, args.name, args.zone);
    Ok(true)
}

fn decode(args: &DecodeArgs) -> Result<bool> {
    let input = open_input(&args.input)?;
    let mut stdout = io::stdout().lock();
    let summary = decode_tokens(input, &mut stdout)?;
    Ok(summary.is_success())
}

fn open_input(path: &Path) -> Result<Box<dyn BufRead>> {
    if path == Path::new("-") {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}
