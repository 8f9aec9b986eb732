//! Scheduler details and process records, parsed from the line-oriented input
//! format: four scheduler lines followed by `name;arrival;burst;...` records.

use crate::scheduler::{Process, DEFAULT_TIME_QUANTUM};
use std::collections::HashSet;
use std::io::{self, BufRead, Write};
use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing scheduler detail: {0}")]
    MissingSchedulerDetail(&'static str),

    #[error("Invalid {field} on line {line}: {value:?} is not a non-negative integer")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error(
        "Process record on line {line} has {found} fields, expected name;arrival;burst[;burst...]"
    )]
    TooFewFields { line: usize, found: usize },

    #[error("Process record on line {line} has an empty name")]
    EmptyName { line: usize },

    #[error("Duplicate process name {name:?} on line {line}")]
    DuplicateName { line: usize, name: String },

    #[error(
        "Process {name:?} on line {line} has {count} bursts; \
         the list must start and end with a CPU burst"
    )]
    EvenBurstCount {
        line: usize,
        name: String,
        count: usize,
    },

    #[error("Process {name:?} on line {line} runs past the largest representable time")]
    TimeOverflow { line: usize, name: String },

    #[error("Expected {expected} process records, found {found}")]
    ProcessCountMismatch { expected: usize, found: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub process_count: usize,
    pub time_allotment_q1: u32,
    pub time_allotment_q2: u32,
    pub context_switch_time: u32,
    pub time_quantum: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationInput {
    pub config: SchedulerConfig,
    pub processes: Vec<Process>,
}

const SCHEDULER_FIELDS: [&str; 4] = [
    "process count",
    "level 0 time allotment",
    "level 1 time allotment",
    "context switch time",
];

fn parse_number(line: usize, field: &'static str, value: &str) -> ConfigResult<u32> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        line,
        field,
        value: value.trim().to_owned(),
    })
}

pub fn parse_input(input: &str) -> ConfigResult<SimulationInput> {
    let mut lines = input
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let mut details = [0u32; 4];
    for (detail, field) in details.iter_mut().zip(SCHEDULER_FIELDS) {
        let (line, value) = lines
            .next()
            .ok_or(ConfigError::MissingSchedulerDetail(field))?;
        *detail = parse_number(line, field, value)?;
    }

    let [process_count, time_allotment_q1, time_allotment_q2, context_switch_time] = details;
    let config = SchedulerConfig {
        process_count: process_count as usize,
        time_allotment_q1,
        time_allotment_q2,
        context_switch_time,
        time_quantum: DEFAULT_TIME_QUANTUM,
    };
    config.validate()?;

    let mut names = HashSet::new();
    let mut processes = Vec::new();
    for (line, record) in lines {
        let process = parse_process(line, record)?;
        if !names.insert(process.name().to_owned()) {
            return Err(ConfigError::DuplicateName {
                line,
                name: process.name().to_owned(),
            });
        }
        processes.push(process);
    }

    if processes.len() != config.process_count {
        return Err(ConfigError::ProcessCountMismatch {
            expected: config.process_count,
            found: processes.len(),
        });
    }

    Ok(SimulationInput { config, processes })
}

fn parse_process(line: usize, record: &str) -> ConfigResult<Process> {
    let fields: Vec<&str> = record.split(';').map(str::trim).collect();
    if fields.len() < 3 {
        return Err(ConfigError::TooFewFields {
            line,
            found: fields.len(),
        });
    }

    let name = fields[0];
    if name.is_empty() {
        return Err(ConfigError::EmptyName { line });
    }

    let arrival_time = parse_number(line, "arrival time", fields[1])?;
    let bursts = fields[2..]
        .iter()
        .map(|burst| parse_number(line, "burst time", burst))
        .collect::<ConfigResult<Vec<u32>>>()?;

    if bursts.len() % 2 == 0 {
        return Err(ConfigError::EvenBurstCount {
            line,
            name: name.to_owned(),
            count: bursts.len(),
        });
    }

    // The simulation clock must be able to reach the end of every burst
    bursts
        .iter()
        .try_fold(arrival_time, |total, &burst| total.checked_add(burst))
        .ok_or_else(|| ConfigError::TimeOverflow {
            line,
            name: name.to_owned(),
        })?;

    Ok(Process::new(name, arrival_time, bursts))
}

impl SchedulerConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.process_count == 0 {
            return Err(ConfigError::ZeroValue("process count"));
        }
        if self.time_allotment_q1 == 0 {
            return Err(ConfigError::ZeroValue("level 0 time allotment"));
        }
        if self.time_allotment_q2 == 0 {
            return Err(ConfigError::ZeroValue("level 1 time allotment"));
        }
        if self.time_quantum == 0 {
            return Err(ConfigError::ZeroValue("time quantum"));
        }
        Ok(())
    }
}

/// Asks for the input on a terminal, one line at a time, and returns the
/// collected text for `parse_input`.
pub fn prompt_input<R, W>(mut input: R, mut prompt: W) -> io::Result<String>
where
    R: BufRead,
    W: Write,
{
    let mut text = String::new();
    // None once the input is exhausted
    let mut read_line = |text: &mut String| -> io::Result<Option<String>> {
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        text.push_str(line.trim_end());
        text.push('\n');
        Ok(Some(line))
    };

    writeln!(prompt, "# Enter Scheduler Details #")?;
    let Some(process_count) = read_line(&mut text)? else {
        return Ok(text);
    };
    for _ in 1..SCHEDULER_FIELDS.len() {
        if read_line(&mut text)?.is_none() {
            return Ok(text);
        }
    }

    // A malformed count is reported by the parser; prompt for nothing more
    let Ok(process_count) = process_count.trim().parse::<usize>() else {
        return Ok(text);
    };

    writeln!(prompt, "# Enter {} Process Details #", process_count)?;
    for _ in 0..process_count {
        if read_line(&mut text)?.is_none() {
            break;
        }
    }
    Ok(text)
}
