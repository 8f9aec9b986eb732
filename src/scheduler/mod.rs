mod display;
mod fcfs;
mod io_device;
mod mlfq;
mod process;
mod round_robin;
mod runner;
mod shortest_job;
mod trace;

use std::time::Duration;

pub use fcfs::FcfsQueue;
pub use io_device::IoDevice;
pub use mlfq::{MultiLevelFeedbackQueue, Simulation, LEVEL_COUNT};
pub use process::{Process, ProcessError};
pub use round_robin::RoundRobinQueue;
pub use runner::{RunnerError, SimulationRunner};
pub use shortest_job::ShortestJobFirstQueue;
pub use trace::{ProcessStats, SimulationReport, TickTrace};

pub const DEFAULT_TIME_QUANTUM: u32 = 4;
pub const DEFAULT_TICK_RATE: Duration = Duration::from_millis(200);

/// One feedback level. The orchestrator only talks to levels through this
/// trait, so policies can be swapped per level.
pub trait PriorityQueue {
    fn name(&self) -> &'static str;
    fn time_allotment(&self) -> Option<u32>;

    fn processes(&self) -> &[Process];
    fn push(&mut self, process: Process);

    /// Advances the selected resident by one tick. No-op when empty.
    fn on_tick(&mut self);

    /// Removes the resident whose burst completed or whose allotment ran out.
    fn release_on_expiry(&mut self) -> Option<Process>;

    /// The resident that should get the CPU next, without removing it.
    fn select_next(&mut self) -> Option<&Process>;

    fn is_empty(&self) -> bool {
        self.processes().is_empty()
    }
}

/// Burst completion wins over allotment exhaustion.
fn has_expired(process: &Process, time_allotment: Option<u32>) -> bool {
    process.is_burst_complete()
        || time_allotment.map_or(false, |allotment| !process.is_within_allotment(allotment))
}
