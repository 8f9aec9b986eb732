use super::{
    display::DisplayTerminal, MultiLevelFeedbackQueue, ProcessError, SimulationReport, TickTrace,
};
use log::info;
use std::{io, time::Duration};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Terminal error: {0}")]
    Terminal(#[from] io::Error),

    #[error(transparent)]
    Process(#[from] ProcessError),
}

pub enum RunnerEvent {
    Quit,
    Pause,
    Resume,
    Step,
    Tick,
    None,
}

/// Plays a simulation in the terminal, one tick per display tick.
pub struct SimulationRunner {
    terminal: DisplayTerminal,
    mlfq: MultiLevelFeedbackQueue,
    last_tick: Option<TickTrace>,
    report: Option<SimulationReport>,
    paused: bool,
}

impl SimulationRunner {
    pub fn new(mlfq: MultiLevelFeedbackQueue, tick_rate: Duration) -> Result<Self, RunnerError> {
        let terminal = DisplayTerminal::new(tick_rate)?;

        Ok(Self {
            terminal,
            mlfq,
            last_tick: None,
            report: None,
            paused: false,
        })
    }

    pub fn report(&self) -> Option<&SimulationReport> {
        self.report.as_ref()
    }

    fn step(&mut self) -> Result<(), RunnerError> {
        if self.report.is_some() {
            return Ok(());
        }

        if self.mlfq.is_finished() {
            info!("Simulation finished at time {}", self.mlfq.time());
            self.report = Some(self.mlfq.report()?);
        } else {
            self.last_tick = Some(self.mlfq.step()?);
        }
        Ok(())
    }

    // Returns false if the program should quit
    pub fn run(&mut self) -> Result<bool, RunnerError> {
        self.terminal.draw(
            &self.mlfq,
            self.last_tick.as_ref(),
            self.report.as_ref(),
            self.paused,
        )?;

        match self.terminal.get_input() {
            RunnerEvent::Quit => return Ok(false),
            RunnerEvent::Pause if !self.paused => self.paused = true,
            RunnerEvent::Resume if self.paused => self.paused = false,
            RunnerEvent::Step if self.paused => self.step()?,
            RunnerEvent::Tick if !self.paused => self.step()?,
            _ => {}
        }
        Ok(true)
    }
}
