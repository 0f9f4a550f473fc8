use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::{Input, Select};
use tracing::{info, warn};

use goodcheck::check::persist_best_strategies;
use goodcheck::providers;
use goodcheck::targets::{build_test_urls, read_lines};
use goodcheck::{Config, EvaluatorSettings, HttpProbe, StrategyEvaluator};

/// Test DPI bypass strategies against a set of URLs and report the best.
#[derive(Parser, Debug)]
#[command(name = "goodcheck", version, about)]
struct Cli {
    /// Bypass program: gdpi, zapret or cia. Prompts when omitted.
    #[arg(long)]
    provider: Option<String>,

    /// Probe passes per strategy; the worst pass is the strategy's score.
    #[arg(long, default_value_t = 1)]
    passes: usize,

    /// File with one strategy per line. Prompts when omitted.
    #[arg(long)]
    strategy: Option<PathBuf>,

    /// Extra URLs to check, one per line (scheme optional).
    #[arg(long)]
    checklist: Option<PathBuf>,

    /// Config file (default: ./goodcheck.toml, then the user config dir).
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Write the top-scoring strategies to the best-strategies file.
    #[arg(long)]
    output_best: bool,

    /// Per-request timeout in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Pause after starting the bypass program, in milliseconds.
    #[arg(long)]
    warmup_ms: Option<u64>,
}

impl Cli {
    fn apply_overrides(&self, config: &mut Config) {
        if self.output_best {
            config.output_best_separately = true;
        }
        if let Some(ms) = self.timeout_ms {
            config.probe.timeout_ms = ms;
        }
        if let Some(ms) = self.warmup_ms {
            config.probe.warmup_ms = ms;
        }
    }
}

/// Interactive provider menu listing installed programs only.
/// `None` means the user cancelled.
fn prompt_provider(config: &Config) -> Result<Option<String>> {
    let installed = providers::installed(&config.providers);
    let mut items: Vec<String> = installed
        .iter()
        .map(|provider| provider.name(&config.providers).to_string())
        .collect();
    items.push("Cancel".to_string());

    let choice = Select::new()
        .with_prompt("Select the program to test")
        .items(&items)
        .default(0)
        .interact_opt()
        .context("provider selection failed")?;

    Ok(choice
        .and_then(|i| installed.get(i))
        .map(|provider| provider.id().to_string()))
}

/// Strategy files (`*.txt`) in the strategies folder, sorted by name.
fn list_strategy_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .map(|e| e.path())
                .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "txt"))
                .collect()
        })
        .unwrap_or_default();
    files.sort();
    files
}

fn prompt_strategy_file(dir: &Path) -> Result<PathBuf> {
    let files = list_strategy_files(dir);
    if files.is_empty() {
        let name: String = Input::new()
            .with_prompt(format!("Strategy file name (in {})", dir.display()))
            .interact_text()
            .context("strategy file prompt failed")?;
        return Ok(dir.join(name.trim()));
    }

    let names: Vec<String> = files
        .iter()
        .map(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
        .collect();
    let choice = Select::new()
        .with_prompt("Select a strategy file")
        .items(&names)
        .default(0)
        .interact()
        .context("strategy file selection failed")?;
    Ok(files[choice].clone())
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    let provider = match cli.provider.clone() {
        Some(provider) => provider,
        None => match prompt_provider(&config)? {
            Some(provider) => provider,
            None => {
                info!("Cancelled");
                return Ok(());
            }
        },
    };

    let strategy_file = match cli.strategy.clone() {
        Some(path) => path,
        None => prompt_strategy_file(&config.paths.strategies_dir)?,
    };
    let strategies = read_lines(&strategy_file).context("failed to read strategy file")?;
    info!("Loaded {} strategies from {}", strategies.len(), strategy_file.display());
    if strategies.is_empty() {
        info!("No strategies to test, exiting.");
        return Ok(());
    }

    let checklist = cli.checklist.as_deref().map(|path| {
        if path.is_file() || path.is_absolute() {
            path.to_path_buf()
        } else {
            config.paths.checklists_dir.join(path)
        }
    });
    let urls = build_test_urls(&config.targets, checklist.as_deref()).await;
    if urls.is_empty() {
        info!("No URLs to check, exiting.");
        return Ok(());
    }
    info!("Total URLs to check: {}", urls.len());

    let settings = EvaluatorSettings::from_config(&provider, cli.passes, &config);
    info!("Passes per strategy: {}", settings.passes);
    let probe = HttpProbe::new(config.probe.timeout())?;
    let evaluator = StrategyEvaluator::new(settings, probe);

    // Dropping the evaluation future kills the running bypass process.
    let table = tokio::select! {
        table = evaluator.evaluate(&strategies, &urls) => table,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, stopping");
            return Ok(());
        }
    };

    info!("Testing finished. Results for {} strategies:", table.len());
    print!("{}", table.render_report(urls.len()));

    if config.output_best_separately {
        persist_best_strategies(&table, &config.paths.best_strategies_file);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);

    let log_path = goodcheck::logging::init(&config.paths.logs_dir)?;
    info!("Starting goodcheck v{}", env!("CARGO_PKG_VERSION"));

    run(cli, config).await?;

    info!("Log saved to {}. Done.", log_path.display());
    Ok(())
}
