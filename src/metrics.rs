// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for claim publication.
//!
//! All metrics use the namespace prefix `diem_dns_`. A batch run can write them in
//! the text exposition format at the end (see [`gather_metrics`]), which suits a
//! node-exporter textfile collector.
//!
//! # Example
//!
//! ```rust,no_run
//! use diem_dns::metrics::{gather_metrics, record_claim_encoded};
//!
//! record_claim_encoded();
//! println!("{}", gather_metrics().unwrap());
//! ```

use crate::constants::METRICS_NAMESPACE;
use crate::errors::PublishError;
use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;
use std::time::Duration;

/// Global Prometheus metrics registry
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Total number of claim records by outcome
///
/// Labels:
/// - `status`: `encoded`, `published`, or `failed`
pub static CLAIMS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_claims_total"),
        "Total number of claim records by outcome",
    );
    let counter = CounterVec::new(opts, &["status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of per-record errors by kind
///
/// Labels:
/// - `error_type`: the error kind (e.g., `ResolutionError`, `ProtocolError`)
pub static ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_errors_total"),
        "Total number of per-record errors by kind",
    );
    let counter = CounterVec::new(opts, &["error_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of dynamic update exchanges in seconds
///
/// Labels:
/// - `outcome`: `success` or `error`
pub static UPDATE_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_update_duration_seconds"),
        "Duration of dynamic update exchanges in seconds",
    )
    .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]);
    let histogram = HistogramVec::new(opts, &["outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

/// Record a claim encoded into a token.
pub fn record_claim_encoded() {
    CLAIMS_TOTAL.with_label_values(&["encoded"]).inc();
}

/// Record a claim published to the DNS.
pub fn record_claim_published() {
    CLAIMS_TOTAL.with_label_values(&["published"]).inc();
}

/// Record a claim that failed at any stage.
pub fn record_claim_failed(error: &PublishError) {
    CLAIMS_TOTAL.with_label_values(&["failed"]).inc();
    ERRORS_TOTAL.with_label_values(&[error.kind()]).inc();
}

/// Record the duration of an update exchange.
pub fn record_update_duration(duration: Duration, success: bool) {
    let outcome = if success { "success" } else { "error" };
    UPDATE_DURATION_SECONDS
        .with_label_values(&[outcome])
        .observe(duration.as_secs_f64());
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
