use super::{PriorityQueue, Process};

/// Non-preemptive shortest-job-first level without an allotment.
///
/// Each resident is compared by the length of its CPU burst at the moment it
/// entered the queue; ties go to the lexicographically smaller name. Once a
/// resident is picked it stays pinned until its burst completes.
pub struct ShortestJobFirstQueue {
    processes: Vec<Process>,
    burst_snapshots: Vec<u32>,
    pinned: Option<String>,
}

impl ShortestJobFirstQueue {
    pub fn new() -> Self {
        Self {
            processes: Vec::new(),
            burst_snapshots: Vec::new(),
            pinned: None,
        }
    }

    pub fn pinned(&self) -> Option<&str> {
        self.pinned.as_deref()
    }

    pub fn burst_snapshot(&self, name: &str) -> Option<u32> {
        self.position(name).map(|index| self.burst_snapshots[index])
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.processes
            .iter()
            .position(|process| process.name() == name)
    }

    fn pinned_index(&self) -> Option<usize> {
        self.pinned.as_deref().and_then(|name| self.position(name))
    }

    fn shortest_index(&self) -> Option<usize> {
        self.processes
            .iter()
            .zip(&self.burst_snapshots)
            .enumerate()
            .min_by(|(_, (a, a_burst)), (_, (b, b_burst))| {
                a_burst.cmp(b_burst).then_with(|| a.name().cmp(b.name()))
            })
            .map(|(index, _)| index)
    }
}

impl Default for ShortestJobFirstQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl PriorityQueue for ShortestJobFirstQueue {
    fn name(&self) -> &'static str {
        "Shortest Job First"
    }

    fn time_allotment(&self) -> Option<u32> {
        None
    }

    fn processes(&self) -> &[Process] {
        &self.processes
    }

    fn push(&mut self, mut process: Process) {
        process.enter_level();
        self.burst_snapshots.push(process.remaining_burst());
        self.processes.push(process);
    }

    fn on_tick(&mut self) {
        if let Some(index) = self.pinned_index() {
            self.processes[index].on_tick();
        }
    }

    fn release_on_expiry(&mut self) -> Option<Process> {
        let index = self.pinned_index()?;
        if !self.processes[index].is_burst_complete() {
            return None;
        }

        self.pinned = None;
        self.burst_snapshots.remove(index);
        Some(self.processes.remove(index))
    }

    fn select_next(&mut self) -> Option<&Process> {
        let index = match self.pinned_index() {
            Some(index) => index,
            None => {
                let index = self.shortest_index()?;
                self.pinned = Some(self.processes[index].name().to_owned());
                index
            }
        };
        self.processes.get(index)
    }
}
