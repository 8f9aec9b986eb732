//! Multi-level feedback queue scheduler simulation.
//!
//! Three feedback levels (round robin, first come first served, shortest job
//! first) share one CPU; processes alternate CPU and I/O bursts, get demoted
//! when they exhaust a level's allotment and pay a fixed penalty on every
//! context switch.

pub mod config;
pub mod scheduler;

pub use config::{parse_input, ConfigError, SchedulerConfig, SimulationInput};
pub use scheduler::{MultiLevelFeedbackQueue, Process, Simulation, SimulationReport, TickTrace};
