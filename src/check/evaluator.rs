//! Strategy evaluation loop.
//!
//! For each strategy, in order: start the bypass program with it, run the
//! probe passes, record the worst pass, kill the program. Strategies run one
//! at a time because every bypass program hooks the same network interface.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{error, info};

use super::harness::{BypassProcess, HarnessError, DEFAULT_WARMUP};
use super::passes::{run_passes, StrategyScore};
use super::probe::Probe;
use super::results::ResultTable;
use crate::config::Config;
use crate::providers::resolve_executable;

/// Immutable evaluation parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluatorSettings {
    /// Provider identifier as given by the user, kept for diagnostics.
    pub provider: String,
    /// Resolved executable; `None` when the provider is unknown.
    pub executable: Option<PathBuf>,
    /// Probe passes per strategy, at least 1.
    pub passes: usize,
    /// Delay between starting the bypass program and the first pass.
    pub warmup: Duration,
}

impl EvaluatorSettings {
    pub fn new(provider: &str, executable: Option<PathBuf>, passes: usize) -> Self {
        Self {
            provider: provider.to_string(),
            executable,
            passes: passes.max(1),
            warmup: DEFAULT_WARMUP,
        }
    }

    /// Resolve `provider` against the configured executables.
    pub fn from_config(provider: &str, passes: usize, config: &Config) -> Self {
        Self {
            warmup: config.probe.warmup(),
            ..Self::new(
                provider,
                resolve_executable(provider, &config.providers),
                passes,
            )
        }
    }

    pub fn with_warmup(mut self, warmup: Duration) -> Self {
        self.warmup = warmup;
        self
    }
}

/// Runs every strategy through the bypass program and the probe passes.
pub struct StrategyEvaluator<P> {
    settings: EvaluatorSettings,
    probe: P,
}

impl<P: Probe> StrategyEvaluator<P> {
    pub fn new(settings: EvaluatorSettings, probe: P) -> Self {
        Self { settings, probe }
    }

    pub fn settings(&self) -> &EvaluatorSettings {
        &self.settings
    }

    /// Score one strategy. Harness failures are logged and score 0.
    pub async fn evaluate_strategy(&self, strategy: &str, urls: &[String]) -> StrategyScore {
        match self.try_evaluate_strategy(strategy, urls).await {
            Ok(score) => score,
            Err(e) => {
                error!("{e}");
                0
            }
        }
    }

    async fn try_evaluate_strategy(
        &self,
        strategy: &str,
        urls: &[String],
    ) -> Result<StrategyScore, HarnessError> {
        let exe = self
            .settings
            .executable
            .as_deref()
            .ok_or_else(|| HarnessError::UnknownProvider(self.settings.provider.clone()))?;

        let process = BypassProcess::start(exe, strategy, self.settings.warmup).await?;
        let score = run_passes(&self.probe, urls, self.settings.passes).await;
        process.stop().await;
        Ok(score)
    }

    /// Score every strategy in list order.
    pub async fn evaluate(&self, strategies: &[String], urls: &[String]) -> ResultTable {
        let mut table = ResultTable::new();
        for strategy in strategies {
            info!("Testing strategy: {strategy}");
            let score = self.evaluate_strategy(strategy, urls).await;
            table.insert(strategy, score);
            info!("Strategy: {strategy}, successes: {score} of {}", urls.len());
        }
        table
    }
}
