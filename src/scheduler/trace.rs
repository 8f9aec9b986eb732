use super::{Process, ProcessError};
use std::fmt;

/// What happened during one tick, and the state the CPU ran with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickTrace {
    pub time: u32,
    pub arrivals: Vec<String>,
    pub completed: Vec<String>,
    pub demoted: Vec<String>,
    /// Residents per level, excluding the CPU occupant.
    pub queues: Vec<Vec<String>>,
    pub cpu: Option<String>,
    pub io: Vec<String>,
}

fn bracketed(names: &[String]) -> String {
    format!("[{}]", names.join(", "))
}

impl fmt::Display for TickTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "At Time = {}", self.time)?;
        if !self.arrivals.is_empty() {
            writeln!(f, "Arriving : {}", bracketed(&self.arrivals))?;
        }
        for name in &self.completed {
            writeln!(f, "{} DONE", name)?;
        }
        for name in &self.demoted {
            writeln!(f, "{} DEMOTED", name)?;
        }

        let queues: Vec<String> = self.queues.iter().map(|level| bracketed(level)).collect();
        writeln!(f, "Queues : {}", queues.join(";"))?;

        match &self.cpu {
            Some(name) => writeln!(f, "CPU : {}", name)?,
            None => writeln!(f, "CPU : []")?,
        }
        if !self.io.is_empty() {
            writeln!(f, "I/O : {}", bracketed(&self.io))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessStats {
    pub name: String,
    pub arrival_time: u32,
    pub completion_time: u32,
    pub turnaround_time: u32,
    pub waiting_time: u32,
}

impl ProcessStats {
    pub fn from_process(process: &Process) -> Result<Self, ProcessError> {
        Ok(Self {
            name: process.name().to_owned(),
            arrival_time: process.arrival_time(),
            completion_time: process.completion_time()?,
            turnaround_time: process.turnaround_time()?,
            waiting_time: process.waiting_time()?,
        })
    }
}

/// Final per-process statistics, sorted by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationReport {
    processes: Vec<ProcessStats>,
}

impl SimulationReport {
    pub fn from_processes<'a, I>(processes: I) -> Result<Self, ProcessError>
    where
        I: IntoIterator<Item = &'a Process>,
    {
        let mut processes = processes
            .into_iter()
            .map(ProcessStats::from_process)
            .collect::<Result<Vec<_>, _>>()?;
        processes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Self { processes })
    }

    pub fn processes(&self) -> &[ProcessStats] {
        &self.processes
    }

    pub fn average_turnaround_time(&self) -> f64 {
        if self.processes.is_empty() {
            return 0.0;
        }
        let total: u64 = self
            .processes
            .iter()
            .map(|stats| u64::from(stats.turnaround_time))
            .sum();
        total as f64 / self.processes.len() as f64
    }

    /// The average as printed in the report: always shown with a fractional
    /// part.
    pub fn formatted_average(&self) -> String {
        let average = self.average_turnaround_time();
        if average.fract() == 0.0 {
            format!("{:.1}", average)
        } else {
            average.to_string()
        }
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SIMULATION DONE")?;
        for stats in &self.processes {
            writeln!(
                f,
                "Turn-around time for Process {} : {} - {} = {} ms",
                stats.name, stats.completion_time, stats.arrival_time, stats.turnaround_time
            )?;
        }
        writeln!(f, "Average Turn-around time = {} ms", self.formatted_average())?;
        for stats in &self.processes {
            writeln!(f, "Waiting time for Process {} : {} ms", stats.name, stats.waiting_time)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_tick_block_format() {
        let trace = TickTrace {
            time: 15,
            arrivals: names(&["D"]),
            completed: names(&["A"]),
            demoted: names(&["C"]),
            queues: vec![names(&["B"]), names(&["C"]), Vec::new()],
            cpu: Some("D".to_owned()),
            io: names(&["E", "F"]),
        };

        assert_eq!(
            trace.to_string(),
            "At Time = 15\n\
             Arriving : [D]\n\
             A DONE\n\
             C DEMOTED\n\
             Queues : [B];[C];[]\n\
             CPU : D\n\
             I/O : [E, F]\n"
        );
    }

    #[test]
    fn test_idle_tick_omits_optional_lines() {
        let trace = TickTrace {
            time: 0,
            arrivals: Vec::new(),
            completed: Vec::new(),
            demoted: Vec::new(),
            queues: vec![Vec::new(); 3],
            cpu: None,
            io: Vec::new(),
        };

        assert_eq!(trace.to_string(), "At Time = 0\nQueues : [];[];[]\nCPU : []\n");
    }

    #[test]
    fn test_report_sorted_and_averaged() {
        let mut b = Process::new("B", 0, vec![1]);
        b.mark_complete(4).unwrap();
        let mut a = Process::new("A", 1, vec![2, 1, 1]);
        a.mark_complete(7).unwrap();

        let report = SimulationReport::from_processes([&b, &a]).unwrap();
        assert_eq!(
            report.to_string(),
            "SIMULATION DONE\n\
             Turn-around time for Process A : 7 - 1 = 6 ms\n\
             Turn-around time for Process B : 4 - 0 = 4 ms\n\
             Average Turn-around time = 5.0 ms\n\
             Waiting time for Process A : 3 ms\n\
             Waiting time for Process B : 3 ms\n"
        );
    }

    #[test]
    fn test_report_rejects_unfinished_process() {
        let process = Process::new("A", 0, vec![1]);
        assert_eq!(
            SimulationReport::from_processes([&process]),
            Err(ProcessError::NotComplete("A".to_owned()))
        );
    }

    #[test]
    fn test_fractional_average() {
        let mut processes = Vec::new();
        for (name, completion) in [("A", 1), ("B", 1), ("C", 2)] {
            let mut process = Process::new(name, 0, vec![1]);
            process.mark_complete(completion).unwrap();
            processes.push(process);
        }

        let report = SimulationReport::from_processes(&processes).unwrap();
        assert_eq!(report.formatted_average(), "1.3333333333333333");
    }
}
