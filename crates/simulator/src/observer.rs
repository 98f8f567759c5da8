use core_types::DailyResult;

/// Progress seam for a simulation run.
///
/// The loop reports through this trait instead of a process-wide console or
/// log handle, so hosts can attach a progress bar, a metrics hook, or nothing
/// at all. Every method has a no-op default.
pub trait SimulationObserver: Send + Sync {
    /// Called once before the first day, with the number of trading days.
    fn simulation_started(&self, _total_days: usize) {}

    /// Called after each day's `DailyResult` is appended.
    fn day_completed(&self, _result: &DailyResult) {}

    /// Called once after the last day.
    fn simulation_completed(&self) {}
}

/// The default observer: observes nothing.
#[derive(Debug, Default)]
pub struct NullObserver;

impl SimulationObserver for NullObserver {}
