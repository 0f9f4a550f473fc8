//! Bypass program registry.
//!
//! Maps the provider identifiers accepted on the command line to the
//! executables configured in `[providers]`. Unknown identifiers are not a
//! parse failure: the evaluator scores every strategy 0 for them.

use std::path::{Path, PathBuf};

use crate::config::{ProviderEntry, ProvidersConfig};

/// Supported bypass programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// GoodbyeDPI.
    Gdpi,
    /// Zapret (winws).
    Zapret,
    /// ByeDPI (ciadpi).
    Cia,
}

impl Provider {
    /// Menu order.
    pub const ALL: [Provider; 3] = [Provider::Gdpi, Provider::Zapret, Provider::Cia];

    /// Identifier as accepted by `--provider`.
    pub fn id(self) -> &'static str {
        match self {
            Self::Gdpi => "gdpi",
            Self::Zapret => "zapret",
            Self::Cia => "cia",
        }
    }

    /// Parse a `--provider` identifier. Exact, case-sensitive match.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.id() == id)
    }

    fn entry(self, providers: &ProvidersConfig) -> &ProviderEntry {
        match self {
            Self::Gdpi => &providers.gdpi,
            Self::Zapret => &providers.zapret,
            Self::Cia => &providers.cia,
        }
    }

    fn stock_name(self) -> &'static str {
        match self {
            Self::Gdpi => "GoodbyeDPI",
            Self::Zapret => "Zapret",
            Self::Cia => "ByeDPI",
        }
    }

    fn stock_executable(self) -> &'static str {
        match self {
            Self::Gdpi => "goodbyedpi.exe",
            Self::Zapret => r"C:\zapret-discord-youtube-1.6.2\bin\winws.exe",
            Self::Cia => "ciadpi.exe",
        }
    }

    /// Menu name: the configured one, else the stock one.
    pub fn name<'a>(self, providers: &'a ProvidersConfig) -> &'a str {
        self.entry(providers)
            .name
            .as_deref()
            .unwrap_or(self.stock_name())
    }

    /// Executable: the configured one, else the stock path.
    pub fn executable(self, providers: &ProvidersConfig) -> PathBuf {
        self.entry(providers)
            .executable
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.stock_executable()))
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Resolve a provider identifier to its configured executable.
///
/// Returns `None` for identifiers outside `gdpi`, `zapret`, `cia`.
pub fn resolve_executable(id: &str, providers: &ProvidersConfig) -> Option<PathBuf> {
    Provider::from_id(id).map(|p| p.executable(providers))
}

/// Whether an executable can be launched: an existing file, or a bare
/// command name found on `PATH`.
pub fn is_installed(executable: &Path) -> bool {
    if executable.is_file() {
        return true;
    }
    let bare = executable.components().count() == 1;
    bare && which::which(executable).is_ok()
}

/// Providers whose executable is present, in menu order.
pub fn installed(providers: &ProvidersConfig) -> Vec<Provider> {
    Provider::ALL
        .into_iter()
        .filter(|p| is_installed(&p.executable(providers)))
        .collect()
}
