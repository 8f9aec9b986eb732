use super::{
    FcfsQueue, IoDevice, PriorityQueue, Process, ProcessError, RoundRobinQueue,
    ShortestJobFirstQueue, SimulationReport, TickTrace,
};
use crate::config::SchedulerConfig;
use log::{debug, trace};

pub const LEVEL_COUNT: usize = 3;

/// A finished run: every tick block plus the final statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    pub trace: Vec<TickTrace>,
    pub report: SimulationReport,
}

/// Drives the feedback levels, the I/O device and context switching one tick
/// at a time.
pub struct MultiLevelFeedbackQueue {
    time: u32,
    future_processes: Vec<Process>,
    levels: [Box<dyn PriorityQueue>; LEVEL_COUNT],
    io_device: IoDevice,
    finished_processes: Vec<Process>,
    context_switch_time: u32,
    context_switch_counter: u32,
    last_running_process: Option<String>,
    current_process: Option<String>,
    started: bool,
}

#[derive(Default)]
struct Expirations {
    completed: Vec<String>,
    demoted: Vec<String>,
}

impl MultiLevelFeedbackQueue {
    pub fn new(config: &SchedulerConfig, processes: Vec<Process>) -> Self {
        MultiLevelFeedbackQueue::with_levels(
            [
                Box::new(RoundRobinQueue::with_quantum(
                    Some(config.time_allotment_q1),
                    config.time_quantum,
                )),
                Box::new(FcfsQueue::new(Some(config.time_allotment_q2))),
                Box::new(ShortestJobFirstQueue::new()),
            ],
            config.context_switch_time,
            processes,
        )
    }

    pub fn with_levels(
        levels: [Box<dyn PriorityQueue>; LEVEL_COUNT],
        context_switch_time: u32,
        processes: Vec<Process>,
    ) -> Self {
        Self {
            time: 0,
            future_processes: processes,
            levels,
            io_device: IoDevice::new(),
            finished_processes: Vec::new(),
            context_switch_time,
            context_switch_counter: 0,
            last_running_process: None,
            current_process: None,
            started: false,
        }
    }

    pub fn time(&self) -> u32 {
        self.time
    }

    pub fn levels(&self) -> &[Box<dyn PriorityQueue>] {
        &self.levels
    }

    pub fn io_device(&self) -> &IoDevice {
        &self.io_device
    }

    pub fn future_processes(&self) -> &[Process] {
        &self.future_processes
    }

    pub fn finished_processes(&self) -> &[Process] {
        &self.finished_processes
    }

    pub fn current_process(&self) -> Option<&str> {
        self.current_process.as_deref()
    }

    pub fn is_switching(&self) -> bool {
        self.context_switch_counter > 0
    }

    pub fn is_finished(&self) -> bool {
        self.future_processes.is_empty()
            && self.io_device.is_empty()
            && self.levels.iter().all(|level| level.is_empty())
    }

    /// Runs every remaining tick and collects the final statistics.
    pub fn run(&mut self) -> Result<Simulation, ProcessError> {
        let mut trace = Vec::new();
        while !self.is_finished() {
            trace.push(self.step()?);
        }
        debug!("Simulation finished at time {}", self.time);

        Ok(Simulation {
            trace,
            report: self.report()?,
        })
    }

    /// Executes one full tick: arrivals, expirations, context switch decision,
    /// then time advance.
    pub fn step(&mut self) -> Result<TickTrace, ProcessError> {
        if !self.started {
            self.started = true;
            self.switch_context();
        }

        let time = self.time;
        let mut expirations = Expirations::default();
        let arrivals = self.admit_arrivals(&mut expirations)?;
        self.reschedule_expired(&mut expirations)?;
        self.switch_context();
        self.advance_time();

        expirations.completed.sort();
        expirations.demoted.sort();
        Ok(self.snapshot(time, arrivals, expirations))
    }

    pub fn report(&self) -> Result<SimulationReport, ProcessError> {
        SimulationReport::from_processes(&self.finished_processes)
    }

    fn admit_arrivals(
        &mut self,
        expirations: &mut Expirations,
    ) -> Result<Vec<String>, ProcessError> {
        let time = self.time;
        let (mut arriving, future): (Vec<Process>, Vec<Process>) =
            std::mem::take(&mut self.future_processes)
                .into_iter()
                .partition(|process| process.arrival_time() == time);
        self.future_processes = future;

        arriving.sort_by(|a, b| a.name().cmp(b.name()));
        let names: Vec<String> = arriving
            .iter()
            .map(|process| process.name().to_owned())
            .collect();
        if !names.is_empty() {
            debug!("t={} arriving: {:?}", time, names);
        }

        for process in arriving {
            self.route(process, expirations)?;
        }
        Ok(names)
    }

    fn reschedule_expired(&mut self, expirations: &mut Expirations) -> Result<(), ProcessError> {
        let mut released: Vec<Process> = self
            .levels
            .iter_mut()
            .filter_map(|level| level.release_on_expiry())
            .collect();
        released.sort_by(|a, b| a.name().cmp(b.name()));

        for mut process in released {
            if process.is_burst_complete() {
                process.advance_to_next_burst();
                self.route(process, expirations)?;
            } else {
                self.demote(process, expirations);
            }
        }

        let mut io_released = self.io_device.release_expired();
        io_released.sort_by(|a, b| a.name().cmp(b.name()));
        for mut process in io_released {
            process.advance_to_next_burst();
            self.route(process, expirations)?;
        }
        Ok(())
    }

    /// Places a process according to its active burst: finished, a CPU level,
    /// or the I/O device. Zero-length bursts are skipped.
    fn route(
        &mut self,
        mut process: Process,
        expirations: &mut Expirations,
    ) -> Result<(), ProcessError> {
        while process.is_burst_complete() && !process.is_process_complete() {
            process.advance_to_next_burst();
        }

        if process.is_process_complete() {
            process.mark_complete(self.time)?;
            debug!("t={} {} completed", self.time, process.name());
            expirations.completed.push(process.name().to_owned());
            self.finished_processes.push(process);
        } else if process.is_cpu_burst() {
            let level = process.queue_level();
            self.levels[level].push(process);
        } else {
            self.io_device.push(process);
        }
        Ok(())
    }

    fn demote(&mut self, mut process: Process, expirations: &mut Expirations) {
        if process.queue_level() + 1 < LEVEL_COUNT {
            process.demote();
            debug!(
                "t={} {} demoted to level {}",
                self.time,
                process.name(),
                process.queue_level()
            );
            expirations.demoted.push(process.name().to_owned());
        }
        let level = process.queue_level();
        self.levels[level].push(process);
    }

    fn switch_context(&mut self) {
        if self.context_switch_counter > 0 {
            return;
        }

        let selected = self
            .levels
            .iter_mut()
            .find(|level| !level.is_empty())
            .and_then(|level| level.select_next())
            .map(|process| process.name().to_owned());

        let Some(selected) = selected else {
            self.current_process = None;
            return;
        };

        if self.last_running_process.as_deref() != Some(selected.as_str()) {
            debug!(
                "t={} context switch {:?} -> {}",
                self.time, self.last_running_process, selected
            );
            self.current_process = None;
            self.context_switch_counter = self.context_switch_time;
            self.last_running_process = Some(selected.clone());
        }
        if self.context_switch_counter == 0 {
            self.current_process = Some(selected);
        }
    }

    fn advance_time(&mut self) {
        self.time += 1;
        self.io_device.on_tick();

        if self.context_switch_counter > 0 {
            self.context_switch_counter -= 1;
            return;
        }

        if let Some(level) = self.levels.iter_mut().find(|level| !level.is_empty()) {
            level.on_tick();
            trace!("t={} cpu: {:?}", self.time - 1, self.current_process);
        }
    }

    fn snapshot(&self, time: u32, arrivals: Vec<String>, expirations: Expirations) -> TickTrace {
        let current = self.current_process.as_deref();
        let queues: Vec<Vec<String>> = self
            .levels
            .iter()
            .map(|level| {
                level
                    .processes()
                    .iter()
                    .map(Process::name)
                    .filter(|&name| Some(name) != current)
                    .map(str::to_owned)
                    .collect::<Vec<String>>()
            })
            .collect();

        let mut io: Vec<String> = self
            .io_device
            .processes()
            .iter()
            .map(|process| process.name().to_owned())
            .collect();
        io.sort();

        TickTrace {
            time,
            arrivals,
            completed: expirations.completed,
            demoted: expirations.demoted,
            queues,
            cpu: self.current_process.clone(),
            io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(context_switch_time: u32) -> SchedulerConfig {
        SchedulerConfig {
            process_count: 0,
            time_allotment_q1: 8,
            time_allotment_q2: 8,
            context_switch_time,
            time_quantum: 4,
        }
    }

    #[test]
    fn test_idle_until_first_arrival() {
        let processes = vec![Process::new("P", 3, vec![1])];
        let mut mlfq = MultiLevelFeedbackQueue::new(&config(0), processes);
        let simulation = mlfq.run().unwrap();

        assert!(simulation.trace[..3].iter().all(|tick| tick.cpu.is_none()));
        assert_eq!(simulation.trace[3].arrivals, vec!["P"]);
        assert_eq!(simulation.trace[3].cpu.as_deref(), Some("P"));
        assert_eq!(simulation.trace[4].completed, vec!["P"]);
        assert_eq!(simulation.report.processes()[0].turnaround_time, 1);
    }

    #[test]
    fn test_zero_switch_time_runs_selection_immediately() {
        let processes = vec![Process::new("A", 0, vec![2])];
        let mut mlfq = MultiLevelFeedbackQueue::new(&config(0), processes);
        let tick = mlfq.step().unwrap();
        assert_eq!(tick.cpu.as_deref(), Some("A"));
        assert!(!mlfq.is_switching());
        assert_eq!(mlfq.levels()[0].processes()[0].remaining_burst(), 1);
    }

    #[test]
    fn test_context_switch_blocks_cpu_but_not_io() {
        let mut mlfq = MultiLevelFeedbackQueue::new(
            &config(2),
            vec![
                Process::new("A", 0, vec![1, 3, 1]),
                Process::new("B", 1, vec![2]),
            ],
        );

        // A pays the switch penalty before its first tick
        let tick = mlfq.step().unwrap();
        assert_eq!(tick.cpu, None);
        assert!(mlfq.is_switching());
        mlfq.step().unwrap();
        let tick = mlfq.step().unwrap();
        assert_eq!(tick.cpu.as_deref(), Some("A"));

        // A moves to I/O, B needs its own switch while A's I/O keeps going
        let tick = mlfq.step().unwrap();
        assert_eq!(tick.cpu, None);
        assert_eq!(tick.io, vec!["A"]);
        assert_eq!(mlfq.io_device().processes()[0].remaining_burst(), 2);
    }

    #[test]
    fn test_single_burst_process_never_touches_io() {
        let processes = vec![Process::new("C", 0, vec![30])];
        let mut mlfq = MultiLevelFeedbackQueue::new(&config(0), processes);
        while !mlfq.is_finished() {
            let tick = mlfq.step().unwrap();
            assert!(tick.io.is_empty());
        }

        let report = mlfq.report().unwrap();
        assert_eq!(report.processes()[0].completion_time, 30);
        assert_eq!(report.processes()[0].waiting_time, 0);
    }

    #[test]
    fn test_demotion_moves_process_down_one_level() {
        let processes = vec![Process::new("C", 0, vec![20])];
        let mut mlfq = MultiLevelFeedbackQueue::new(&config(0), processes);
        let trace = mlfq.run().unwrap().trace;

        assert_eq!(trace[8].demoted, vec!["C"]);
        assert_eq!(trace[16].demoted, vec!["C"]);
        assert_eq!(mlfq.finished_processes()[0].queue_level(), 2);
    }

    #[test]
    fn test_zero_length_io_burst_is_skipped() {
        let processes = vec![Process::new("A", 0, vec![1, 0, 1])];
        let mut mlfq = MultiLevelFeedbackQueue::new(&config(0), processes);
        let trace = mlfq.run().unwrap().trace;

        assert!(trace.iter().all(|tick| tick.io.is_empty()));
        assert_eq!(mlfq.report().unwrap().processes()[0].completion_time, 2);
    }

    #[test]
    fn test_empty_simulation_is_finished() {
        let mut mlfq = MultiLevelFeedbackQueue::new(&config(0), Vec::new());
        let simulation = mlfq.run().unwrap();
        assert!(simulation.trace.is_empty());
        assert!(simulation.report.processes().is_empty());
    }
}
