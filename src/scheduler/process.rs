use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    #[error("Process {0} has not completed yet")]
    NotComplete(String),

    #[error("Process {name} already completed at time {completed_at}")]
    AlreadyComplete { name: String, completed_at: u32 },
}

/// A simulated process alternating between CPU bursts (even indices) and I/O
/// bursts (odd indices).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    name: String,
    arrival_time: u32,
    bursts: Vec<u32>,
    burst_index: usize,
    queue_level: usize,
    time_in_level: u32,
    completion_time: Option<u32>,
    total_cpu_time: u32,
}

impl Process {
    pub fn new(name: &str, arrival_time: u32, bursts: Vec<u32>) -> Self {
        let total_cpu_time = bursts
            .iter()
            .step_by(2)
            .fold(0u32, |total, &burst| total.saturating_add(burst));
        Self {
            name: name.to_owned(),
            arrival_time,
            bursts,
            burst_index: 0,
            queue_level: 0,
            time_in_level: 0,
            completion_time: None,
            total_cpu_time,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arrival_time(&self) -> u32 {
        self.arrival_time
    }

    pub fn bursts(&self) -> &[u32] {
        &self.bursts
    }

    pub fn burst_index(&self) -> usize {
        self.burst_index
    }

    pub fn queue_level(&self) -> usize {
        self.queue_level
    }

    pub fn time_in_level(&self) -> u32 {
        self.time_in_level
    }

    pub fn total_cpu_time(&self) -> u32 {
        self.total_cpu_time
    }

    /// Remaining time of the active burst.
    pub fn remaining_burst(&self) -> u32 {
        self.bursts.get(self.burst_index).copied().unwrap_or(0)
    }

    pub fn is_cpu_burst(&self) -> bool {
        self.burst_index % 2 == 0
    }

    /// Consumes one tick of the active burst. Callers only tick a process that
    /// is actually running on the CPU or the I/O device.
    pub fn on_tick(&mut self) {
        if let Some(burst) = self.bursts.get_mut(self.burst_index) {
            *burst = burst.saturating_sub(1);
        }
        self.time_in_level += 1;
    }

    pub fn is_burst_complete(&self) -> bool {
        self.remaining_burst() == 0
    }

    pub fn is_process_complete(&self) -> bool {
        self.bursts.iter().all(|&burst| burst == 0)
    }

    pub fn is_within_allotment(&self, allotment: u32) -> bool {
        self.time_in_level < allotment
    }

    pub fn advance_to_next_burst(&mut self) {
        if self.burst_index + 1 < self.bursts.len() {
            self.burst_index += 1;
        }
    }

    /// Called by the owning queue whenever the process is (re-)admitted.
    pub fn enter_level(&mut self) {
        self.time_in_level = 0;
    }

    pub fn demote(&mut self) {
        self.queue_level += 1;
        self.time_in_level = 0;
    }

    pub fn mark_complete(&mut self, time: u32) -> Result<(), ProcessError> {
        if let Some(completed_at) = self.completion_time {
            return Err(ProcessError::AlreadyComplete {
                name: self.name.clone(),
                completed_at,
            });
        }
        self.completion_time = Some(time);
        Ok(())
    }

    pub fn completion_time(&self) -> Result<u32, ProcessError> {
        self.completion_time
            .ok_or_else(|| ProcessError::NotComplete(self.name.clone()))
    }

    pub fn turnaround_time(&self) -> Result<u32, ProcessError> {
        Ok(self.completion_time()? - self.arrival_time)
    }

    pub fn waiting_time(&self) -> Result<u32, ProcessError> {
        Ok(self.turnaround_time()?.saturating_sub(self.total_cpu_time))
    }
}
