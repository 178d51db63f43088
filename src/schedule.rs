//! Serial cycle trigger
//!
//! Fires one cycle per interval tick until the cycle cap is reached or the
//! shutdown future resolves. Cycles never overlap: a tick that arrives while
//! a cycle is still running is delayed, not queued in parallel. Shutdown is
//! only observed between cycles, so an in-flight search always completes.

use crate::etl::{CycleOutcome, CycleReport, Emitter, ExtractionCycle};
use crate::search::CommandRunner;
use crate::state::StateStore;

use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// When and how often to run cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub interval: Duration,
    /// Stop after this many cycles; `None` runs until shutdown
    pub max_cycles: Option<u64>,
}

impl Schedule {
    /// A schedule that runs exactly one cycle
    pub fn once() -> Self {
        Self {
            interval: Duration::ZERO,
            max_cycles: Some(1),
        }
    }

    pub fn every(interval: Duration) -> Self {
        Self {
            interval,
            max_cycles: None,
        }
    }

    pub fn with_max_cycles(mut self, max: u64) -> Self {
        self.max_cycles = Some(max);
        self
    }
}

/// Tally of cycle outcomes over a schedule run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleSummary {
    pub cycles: u64,
    pub emitted: u64,
    pub empty: u64,
    pub failed: u64,
    /// Cycles whose counter could not be committed
    pub uncommitted: u64,
}

impl ScheduleSummary {
    fn record(&mut self, report: &CycleReport) {
        self.cycles += 1;
        match report.outcome {
            CycleOutcome::Emitted { .. } => self.emitted += 1,
            CycleOutcome::Empty => self.empty += 1,
            _ => self.failed += 1,
        }
        if !report.committed {
            self.uncommitted += 1;
        }
    }
}

/// Run cycles on `schedule` until done or `shutdown` resolves
///
/// `on_report` is called after every cycle.
pub async fn run_schedule<S, R, E>(
    cycle: &mut ExtractionCycle<S, R, E>,
    schedule: Schedule,
    shutdown: impl Future<Output = ()>,
    mut on_report: impl FnMut(&CycleReport),
) -> ScheduleSummary
where
    S: StateStore,
    R: CommandRunner,
    E: Emitter,
{
    let mut summary = ScheduleSummary::default();
    if schedule.max_cycles == Some(0) {
        return summary;
    }

    // tokio panics on a zero period
    let period = schedule.interval.max(Duration::from_millis(1));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                log::info!("Shutdown requested, stopping after {} cycle(s)", summary.cycles);
                break;
            }
            _ = ticker.tick() => {}
        }

        let report = cycle.run_once().await;
        summary.record(&report);
        on_report(&report);

        if schedule.max_cycles.is_some_and(|max| summary.cycles >= max) {
            log::debug!("Reached cycle limit of {}", summary.cycles);
            break;
        }
    }

    summary
}
