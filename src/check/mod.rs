//! Strategy checking core.
//!
//! Probes a URL set through each candidate strategy of a bypass program and
//! scores strategies by their worst pass.

pub mod evaluator;
pub mod harness;
pub mod passes;
pub mod probe;
pub mod results;

pub use evaluator::{EvaluatorSettings, StrategyEvaluator};
pub use harness::{BypassProcess, HarnessError, DEFAULT_WARMUP};
pub use passes::{run_passes, StrategyScore};
pub use probe::{is_reachable_status, run_pass, HttpProbe, PassScore, Probe, ProbeOutcome, ProbeResult};
pub use results::{persist_best_strategies, write_best_strategies, ResultTable};
