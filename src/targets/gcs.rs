//! Automatic ISP Google cache server (GCS) address.
//!
//! Google's report-mapping endpoint answers with a line whose third token is
//! the cluster codename of the nearest cache. The codename is turned into a
//! `googlevideo.com` host by a fixed per-character substitution.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::debug;

/// Source alphabet of the codename substitution.
const CODENAME_ALPHABET: &str = "uzpkfa50vqlgb61wrmhc72xsnid83ytoje94-";

/// Target alphabet, index-aligned with `CODENAME_ALPHABET`.
const HOST_ALPHABET: &str = "0123456789abcdefghijklmnopqrstuvwxyz-";

/// Timeout for each report-mapping request.
const REPORT_MAPPING_TIMEOUT: Duration = Duration::from_secs(5);

/// Map a cluster codename onto the cache server's host label.
///
/// Characters missing from the codename alphabet are dropped.
pub fn decode_cluster_name(codename: &str) -> String {
    codename
        .chars()
        .filter_map(|ch| {
            CODENAME_ALPHABET
                .chars()
                .position(|a| a == ch)
                .and_then(|i| HOST_ALPHABET.chars().nth(i))
        })
        .collect()
}

/// Full probe URL for a cluster codename.
pub fn auto_gcs_url(codename: &str) -> String {
    format!(
        "https://rr1---sn-{}.googlevideo.com",
        decode_cluster_name(codename)
    )
}

/// Extract the codename (third whitespace-separated token) from a
/// report-mapping body.
pub fn parse_codename(body: &str) -> Option<&str> {
    body.split_whitespace().nth(2)
}

/// Query each report-mapping URL in order; the first usable answer wins.
pub async fn fetch_cluster_codename(urls: &[String]) -> Result<String> {
    let client = reqwest::Client::builder()
        .timeout(REPORT_MAPPING_TIMEOUT)
        .build()
        .context("failed to build report-mapping client")?;

    for url in urls {
        let body = match client.get(url).send().await {
            Ok(resp) => match resp.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!("report mapping {url}: failed to read body: {e}");
                    continue;
                }
            },
            Err(e) => {
                debug!("report mapping {url}: {e}");
                continue;
            }
        };
        if let Some(codename) = parse_codename(&body) {
            return Ok(codename.to_string());
        }
        debug!("report mapping {url}: no codename in response");
    }

    bail!("could not obtain cluster codename from {} report mapping URL(s)", urls.len())
}
