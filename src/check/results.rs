//! Strategy scores and winner selection.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{error, info};

use super::passes::StrategyScore;

/// Scores keyed by strategy text, iterated in first-insertion order.
///
/// Re-inserting a strategy overwrites its score in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultTable {
    entries: Vec<(String, StrategyScore)>,
    index: HashMap<String, usize>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a strategy's score. Last write wins for duplicates.
    pub fn insert(&mut self, strategy: &str, score: StrategyScore) {
        match self.index.get(strategy) {
            Some(&i) => self.entries[i].1 = score,
            None => {
                self.index.insert(strategy.to_string(), self.entries.len());
                self.entries.push((strategy.to_string(), score));
            }
        }
    }

    pub fn get(&self, strategy: &str) -> Option<StrategyScore> {
        self.index.get(strategy).map(|&i| self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, StrategyScore)> {
        self.entries.iter().map(|(s, score)| (s.as_str(), *score))
    }

    /// Highest score in the table, `None` when empty.
    pub fn best_score(&self) -> Option<StrategyScore> {
        self.entries.iter().map(|(_, score)| *score).max()
    }

    /// Every strategy attaining the best score, in table order.
    ///
    /// When all strategies score 0 (e.g. an unknown provider) every one of
    /// them ties for first.
    pub fn best_strategies(&self) -> Vec<&str> {
        let Some(best) = self.best_score() else {
            return Vec::new();
        };
        self.iter()
            .filter(|(_, score)| *score == best)
            .map(|(s, _)| s)
            .collect()
    }

    /// Human-readable report, one `strategy -> n/total` line per entry.
    pub fn render_report(&self, total_urls: usize) -> String {
        let best = self.best_score();
        let mut out = String::new();
        for (strategy, score) in self.iter() {
            let line = format!("Strategy: {strategy} -> {score}/{total_urls} successful requests");
            if Some(score) == best && score > 0 {
                out.push_str(&console::style(line).green().bold().to_string());
            } else {
                out.push_str(&line);
            }
            out.push('\n');
        }
        out
    }
}

/// Write the best strategies to `path`, one per line. Returns how many.
pub fn write_best_strategies(table: &ResultTable, path: &Path) -> Result<usize> {
    let best = table.best_strategies();
    let mut content = String::new();
    for strategy in &best {
        content.push_str(strategy);
        content.push('\n');
    }
    std::fs::write(path, content)
        .with_context(|| format!("failed to write best strategies to {}", path.display()))?;
    Ok(best.len())
}

/// [`write_best_strategies`], logging instead of failing.
pub fn persist_best_strategies(table: &ResultTable, path: &Path) {
    match write_best_strategies(table, path) {
        Ok(count) => info!("Best strategies ({count}) written to {}", path.display()),
        Err(e) => error!("{e:#}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn table(entries: &[(&str, usize)]) -> ResultTable {
        let mut t = ResultTable::new();
        for (s, score) in entries {
            t.insert(s, *score);
        }
        t
    }

    #[test]
    fn duplicates_overwrite_in_place() {
        let t = table(&[("a", 1), ("b", 2), ("a", 3)]);
        assert_eq!(t.len(), 2);
        assert_eq!(t.get("a"), Some(3));
        let order: Vec<&str> = t.iter().map(|(s, _)| s).collect();
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn best_strategies_collects_ties_in_order() {
        let t = table(&[("a", 2), ("b", 1), ("c", 2)]);
        assert_eq!(t.best_score(), Some(2));
        assert_eq!(t.best_strategies(), vec!["a", "c"]);
    }

    #[test]
    fn all_zero_ties_everything() {
        let t = table(&[("a", 0), ("b", 0)]);
        assert_eq!(t.best_score(), Some(0));
        assert_eq!(t.best_strategies(), vec!["a", "b"]);
    }

    #[test]
    fn empty_table_has_no_best() {
        let t = ResultTable::new();
        assert!(t.is_empty());
        assert_eq!(t.best_score(), None);
        assert!(t.best_strategies().is_empty());
    }

    #[test]
    fn report_lists_every_strategy() {
        console::set_colors_enabled(false);
        let report = table(&[("--a", 2), ("--b", 0)]).render_report(2);
        assert!(report.contains("Strategy: --a -> 2/2 successful requests"));
        assert!(report.contains("Strategy: --b -> 0/2 successful requests"));
        assert_eq!(report.lines().count(), 2);
    }

    #[test]
    fn writes_best_strategies_one_per_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("best.txt");
        let count = write_best_strategies(&table(&[("a", 1), ("b", 2), ("c", 2)]), &path).unwrap();
        assert_eq!(count, 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "b\nc\n");
    }

    #[test]
    fn unwritable_path_is_error_and_persist_does_not_panic() {
        let path = Path::new("/nonexistent/dir/best.txt");
        let t = table(&[("a", 1)]);
        assert!(write_best_strategies(&t, path).is_err());
        persist_best_strategies(&t, path);
    }
}
