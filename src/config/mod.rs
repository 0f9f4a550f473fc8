//! Configuration for goodcheck.
//!
//! Loaded once at startup from TOML and passed around by reference.
//! Every section has defaults matching the stock distribution, so an
//! absent or partial file is valid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "goodcheck.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Write every top-scoring strategy to `paths.best_strategies_file`.
    pub output_best_separately: bool,
    pub probe: ProbeConfig,
    pub paths: PathsConfig,
    pub targets: TargetsConfig,
    pub providers: ProvidersConfig,
}

/// HTTP probe and bypass process timing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Delay between spawning a bypass process and the first probe.
    pub warmup_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 2_000,
            warmup_ms: 1_000,
        }
    }
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn warmup(&self) -> Duration {
        Duration::from_millis(self.warmup_ms)
    }
}

/// Folders and files, relative to the working directory unless absolute.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub strategies_dir: PathBuf,
    pub checklists_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub best_strategies_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            strategies_dir: PathBuf::from("Strategies"),
            checklists_dir: PathBuf::from("CheckLists"),
            logs_dir: PathBuf::from("Logs"),
            best_strategies_file: PathBuf::from("MostSuccessfulStrategies.txt"),
        }
    }
}

/// Built-in test targets.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TargetsConfig {
    /// Skip deriving the ISP's Google cache server address.
    pub skip_isp_gcs: bool,
    /// Skip probing the TLS 1.2 breakage URL.
    pub skip_tls12_test: bool,
    pub tls12_url: String,
    /// Tried in order until one yields a cluster codename.
    pub report_mapping_urls: Vec<String>,
}

impl Default for TargetsConfig {
    fn default() -> Self {
        Self {
            skip_isp_gcs: false,
            skip_tls12_test: true,
            tls12_url: "https://tls-v1-2.badssl.com:1012".into(),
            report_mapping_urls: vec![
                "https://redirector.gvt1.com/report_mapping?di=no".into(),
                "https://redirector.googlevideo.com/report_mapping?di=no".into(),
            ],
        }
    }
}

/// Overrides for one bypass program. Unset fields keep the stock values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProviderEntry {
    /// Human-readable name shown in the interactive menu.
    pub name: Option<String>,
    /// Executable path or bare name resolved through `PATH`.
    pub executable: Option<PathBuf>,
}

/// Executables for the three supported bypass programs.
///
/// Resolved against the stock names and paths by
/// [`Provider`](crate::providers::Provider).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub gdpi: ProviderEntry,
    pub zapret: ProviderEntry,
    pub cia: ProviderEntry,
}

impl Config {
    /// Parse a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config '{}'", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing config '{}'", path.display()))
    }

    /// Load config with search order:
    /// explicit path → `./goodcheck.toml` → `<config dir>/goodcheck/config.toml`.
    /// Falls back to defaults when nothing is found. An explicit path must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                bail!("config file not found: {}", path.display());
            }
            return Self::from_file(path);
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Self::from_file(&local);
        }

        if let Some(global) = Self::global_config_path() {
            if global.is_file() {
                return Self::from_file(&global);
            }
        }

        Ok(Self::default())
    }

    /// `<config dir>/goodcheck/config.toml`, when a home directory is known.
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "goodcheck")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
