use super::Process;

/// Simulated I/O device with unlimited capacity: every resident advances on
/// every tick.
#[derive(Default)]
pub struct IoDevice {
    processes: Vec<Process>,
}

impl IoDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn push(&mut self, process: Process) {
        self.processes.push(process);
    }

    pub fn on_tick(&mut self) {
        for process in self.processes.iter_mut() {
            process.on_tick();
        }
    }

    /// Removes every resident whose I/O burst is done, in residence order.
    pub fn release_expired(&mut self) -> Vec<Process> {
        let (expired, waiting): (Vec<Process>, Vec<Process>) = std::mem::take(&mut self.processes)
            .into_iter()
            .partition(Process::is_burst_complete);
        self.processes = waiting;
        expired
    }
}
