//! HTTP reachability probes.
//!
//! One pass fires a GET at every target URL at once and counts the URLs
//! that answered with a status the bypass is assumed to have let through.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::future::join_all;
use reqwest::StatusCode;
use tracing::info;

/// Successful probes in one pass, in `[0, urls.len()]`.
pub type PassScore = usize;

/// What a single GET produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// A response arrived with this status code.
    Status(u16),
    /// Transport-level failure (timeout, refused, DNS, TLS).
    Error(String),
}

/// Result of probing one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub url: String,
    pub outcome: ProbeOutcome,
}

impl ProbeResult {
    pub fn status(url: &str, code: u16) -> Self {
        Self {
            url: url.to_string(),
            outcome: ProbeOutcome::Status(code),
        }
    }

    pub fn error(url: &str, error: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            outcome: ProbeOutcome::Error(error.into()),
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::Status(code) if is_reachable_status(code))
    }
}

/// Status codes counted as "the path works": `[200, 405)` except 403.
///
/// 403 is what blocking middleboxes typically answer with, so it is the one
/// client error treated as failure.
pub fn is_reachable_status(code: u16) -> bool {
    (200..405).contains(&code) && code != 403
}

/// A single-URL reachability check.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, url: &str) -> ProbeResult;
}

/// Plain GET probe backed by reqwest.
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    /// Build a probe whose requests are bounded by `timeout`.
    ///
    /// Idle connections are not pooled, so every probe opens a fresh
    /// connection through whichever bypass process is running.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()
            .context("failed to build probe client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn probe(&self, url: &str) -> ProbeResult {
        match self.client.get(url).send().await {
            Ok(resp) => ProbeResult::status(url, resp.status().as_u16()),
            Err(e) => ProbeResult::error(url, e.to_string()),
        }
    }
}

fn describe_status(code: u16) -> String {
    match StatusCode::from_u16(code).ok().and_then(|s| s.canonical_reason()) {
        Some(reason) => format!("{code} {reason}"),
        None => code.to_string(),
    }
}

fn log_result(result: &ProbeResult) {
    match &result.outcome {
        ProbeOutcome::Status(code) if result.succeeded() => {
            info!("Working: {} -> {}", result.url, describe_status(*code));
        }
        ProbeOutcome::Status(code) => {
            info!("Not working: {} -> {}", result.url, describe_status(*code));
        }
        ProbeOutcome::Error(e) => {
            info!("Request to {} failed: {e}", result.url);
        }
    }
}

/// Probe every URL concurrently and return how many succeeded.
///
/// Waits for all probes; the slowest one bounds the pass duration.
pub async fn run_pass<P: Probe + ?Sized>(probe: &P, urls: &[String]) -> PassScore {
    let successes = AtomicUsize::new(0);
    let futures = urls.iter().map(|url| {
        let successes = &successes;
        async move {
            let result = probe.probe(url).await;
            log_result(&result);
            if result.succeeded() {
                successes.fetch_add(1, Ordering::Relaxed);
            }
        }
    });
    join_all(futures).await;
    successes.into_inner()
}
