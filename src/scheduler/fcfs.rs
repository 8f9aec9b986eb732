use super::{has_expired, PriorityQueue, Process};

pub struct FcfsQueue {
    processes: Vec<Process>,
    time_allotment: Option<u32>,
}

impl FcfsQueue {
    pub fn new(time_allotment: Option<u32>) -> Self {
        Self {
            processes: Vec::new(),
            time_allotment,
        }
    }
}

impl PriorityQueue for FcfsQueue {
    fn name(&self) -> &'static str {
        "First Come First Served"
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
        }
    }

    fn release_on_expiry(&mut self) -> Option<Process> {
        match self.processes.first() {
            Some(front) if has_expired(front, self.time_allotment) => {
                Some(self.processes.remove(0))
            }
            _ => None,
        }
    }

    fn select_next(&mut self) -> Option<&Process> {
        self.processes.first()
    }
}
