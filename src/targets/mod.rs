//! Test target assembly.
//!
//! Produces the ordered URL list probed for every strategy, and reads the
//! line-oriented strategy and checklist files.

pub mod gcs;

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::TargetsConfig;

pub use gcs::{auto_gcs_url, decode_cluster_name, fetch_cluster_codename};

/// Read all non-empty lines of a file. A trailing `\r` is stripped.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading '{}'", path.display()))?;
    Ok(content
        .lines()
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect())
}

/// Normalize one checklist entry: trim, skip blanks, default to `https://`.
pub fn normalize_checklist_entry(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if line.starts_with("http://") || line.starts_with("https://") {
        Some(line.to_string())
    } else {
        Some(format!("https://{line}"))
    }
}

/// Checklist URLs from a file, normalized.
pub fn load_checklist(path: &Path) -> Result<Vec<String>> {
    Ok(read_lines(path)?
        .iter()
        .filter_map(|line| normalize_checklist_entry(line))
        .collect())
}

/// Build the full URL list: TLS 1.2 probe, auto GCS, then checklist entries.
///
/// Every source is optional and failures are logged, so the result may be
/// empty; the caller decides what to do then.
pub async fn build_test_urls(targets: &TargetsConfig, checklist: Option<&Path>) -> Vec<String> {
    let mut urls = Vec::new();

    if targets.skip_tls12_test {
        info!("Skipping TLS 1.2 breakage test");
    } else {
        urls.push(targets.tls12_url.clone());
    }

    if targets.skip_isp_gcs {
        info!("Skipping ISP's GCS test");
    } else {
        match fetch_cluster_codename(&targets.report_mapping_urls).await {
            Ok(codename) => {
                info!("Cluster codename: {codename}");
                let gcs = auto_gcs_url(&codename);
                info!("Using automatic ISP's GCS address: {gcs}");
                urls.push(gcs);
            }
            Err(e) => warn!("Failed to get cluster codename: {e}"),
        }
    }

    if let Some(path) = checklist {
        if path.is_file() {
            match load_checklist(path) {
                Ok(entries) => {
                    info!("Loaded {} URL(s) from checklist {}", entries.len(), path.display());
                    urls.extend(entries);
                }
                Err(e) => warn!("Failed to read checklist: {e:#}"),
            }
        } else {
            warn!("Checklist {} not found, ignoring", path.display());
        }
    }

    urls
}
