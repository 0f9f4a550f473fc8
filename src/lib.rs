//! goodcheck: find the DPI bypass strategy that restores the most URLs.
//!
//! Each candidate strategy is handed to an external bypass program
//! (GoodbyeDPI, Zapret or ByeDPI). While it runs, every test URL is probed
//! in parallel, a configurable number of times, and the strategy keeps its
//! worst pass as its score.

pub mod check;
pub mod config;
pub mod logging;
pub mod providers;
pub mod targets;

pub use check::{EvaluatorSettings, HttpProbe, ResultTable, StrategyEvaluator};
pub use config::Config;
pub use providers::Provider;
