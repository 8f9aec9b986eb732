use super::{has_expired, PriorityQueue, Process, DEFAULT_TIME_QUANTUM};

pub struct RoundRobinQueue {
    processes: Vec<Process>,
    time_allotment: Option<u32>,
    time_quantum: u32,
    quantum_remaining: u32,
}

impl RoundRobinQueue {
    pub fn new(time_allotment: Option<u32>) -> Self {
        RoundRobinQueue::with_quantum(time_allotment, DEFAULT_TIME_QUANTUM)
    }

    pub fn with_quantum(time_allotment: Option<u32>, time_quantum: u32) -> Self {
        Self {
            processes: Vec::new(),
            time_allotment,
            time_quantum,
            quantum_remaining: time_quantum,
        }
    }

    pub fn quantum_remaining(&self) -> u32 {
        self.quantum_remaining
    }
}

impl PriorityQueue for RoundRobinQueue {
    fn name(&self) -> &'static str {
        "Round Robin"
    }

    fn time_allotment(&self) -> Option<u32> {
        self.time_allotment
    }

    fn processes(&self) -> &[Process] {
        &self.processes
    }

    fn push(&mut self, mut process: Process) {
        process.enter_level();
        self.processes.push(process);
    }

    fn on_tick(&mut self) {
        if let Some(process) = self.processes.first_mut() {
            process.on_tick();
            self.quantum_remaining = self.quantum_remaining.saturating_sub(1);
        }
    }

    fn release_on_expiry(&mut self) -> Option<Process> {
        let front = self.processes.first()?;
        if !has_expired(front, self.time_allotment) {
            return None;
        }

        self.quantum_remaining = self.time_quantum;
        Some(self.processes.remove(0))
    }

    fn select_next(&mut self) -> Option<&Process> {
        if self.processes.is_empty() {
            return None;
        }

        if self.quantum_remaining == 0 {
            self.processes.rotate_left(1);
            self.quantum_remaining = self.time_quantum;
        }
        self.processes.first()
    }
}
