//! Repeated probe passes for one strategy, scored by the worst pass.

use tracing::info;

use super::probe::{run_pass, PassScore, Probe};

/// Worst pass score across all passes of one strategy.
pub type StrategyScore = usize;

/// Run `passes` probe passes back to back and keep the lowest score.
///
/// Passes never overlap: they all go through the same live bypass process.
/// `passes` below 1 is treated as 1.
pub async fn run_passes<P: Probe + ?Sized>(
    probe: &P,
    urls: &[String],
    passes: usize,
) -> StrategyScore {
    let passes = passes.max(1);
    let mut lowest: PassScore = PassScore::MAX;
    for pass in 1..=passes {
        let score = run_pass(probe, urls).await;
        lowest = lowest.min(score);
        info!("Pass {pass}/{passes}: {score}/{} requests succeeded", urls.len());
    }
    lowest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::probe::ProbeResult;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Succeeds for `plan[pass]` of the URLs in each pass.
    struct PlannedProbe {
        plan: Mutex<VecDeque<usize>>,
        served: Mutex<usize>,
        url_count: usize,
    }

    impl PlannedProbe {
        fn new(plan: &[usize], url_count: usize) -> Self {
            Self {
                plan: Mutex::new(plan.iter().copied().collect()),
                served: Mutex::new(0),
                url_count,
            }
        }
    }

    #[async_trait]
    impl Probe for PlannedProbe {
        async fn probe(&self, url: &str) -> ProbeResult {
            let mut served = self.served.lock();
            let index_in_pass = *served % self.url_count;
            *served += 1;
            let ok_in_pass = {
                let mut plan = self.plan.lock();
                let ok = plan.front().copied().unwrap_or(0);
                if index_in_pass + 1 == self.url_count {
                    plan.pop_front();
                }
                ok
            };
            if index_in_pass < ok_in_pass {
                ProbeResult::status(url, 200)
            } else {
                ProbeResult::status(url, 403)
            }
        }
    }

    fn urls(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://u{i}.example")).collect()
    }

    #[tokio::test]
    async fn keeps_minimum_not_average() {
        let probe = PlannedProbe::new(&[3, 1, 2], 3);
        assert_eq!(run_passes(&probe, &urls(3), 3).await, 1);
    }

    #[tokio::test]
    async fn minimum_can_come_from_last_pass() {
        let probe = PlannedProbe::new(&[4, 4, 0], 4);
        assert_eq!(run_passes(&probe, &urls(4), 3).await, 0);
    }

    #[tokio::test]
    async fn zero_passes_is_clamped_to_one() {
        let probe = PlannedProbe::new(&[2], 2);
        assert_eq!(run_passes(&probe, &urls(2), 0).await, 2);
        assert_eq!(*probe.served.lock(), 2);
    }

    #[tokio::test]
    async fn runs_exactly_the_requested_passes() {
        let probe = PlannedProbe::new(&[1, 1, 1, 1, 1], 2);
        run_passes(&probe, &urls(2), 5).await;
        assert_eq!(*probe.served.lock(), 10);
    }

    /// Records how many probes overlap, and whether any probe started
    /// before every probe of the previous pass had finished.
    struct OverlapProbe {
        url_count: usize,
        started: AtomicUsize,
        finished: AtomicUsize,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        early_starts: AtomicUsize,
    }

    impl OverlapProbe {
        fn new(url_count: usize) -> Self {
            Self {
                url_count,
                started: AtomicUsize::new(0),
                finished: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                early_starts: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Probe for OverlapProbe {
        async fn probe(&self, url: &str) -> ProbeResult {
            let pass = self.started.fetch_add(1, Ordering::SeqCst) / self.url_count;
            if self.finished.load(Ordering::SeqCst) < pass * self.url_count {
                self.early_starts.fetch_add(1, Ordering::SeqCst);
            }
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            tokio::time::sleep(Duration::from_millis(5)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.finished.fetch_add(1, Ordering::SeqCst);
            ProbeResult::status(url, 200)
        }
    }

    #[tokio::test]
    async fn passes_run_back_to_back_without_overlap() {
        let probe = OverlapProbe::new(4);
        let score = run_passes(&probe, &urls(4), 3).await;

        assert_eq!(score, 4);
        assert_eq!(probe.finished.load(Ordering::SeqCst), 12);
        // A whole pass is in flight at once, never more.
        assert_eq!(probe.peak.load(Ordering::SeqCst), 4);
        assert_eq!(probe.early_starts.load(Ordering::SeqCst), 0);
    }
}
