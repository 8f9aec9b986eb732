use super::{runner::RunnerEvent, MultiLevelFeedbackQueue, SimulationReport, TickTrace};
use crossterm::event::{self, Event, KeyCode, KeyEvent};
use std::{
    io::{self, Stdout},
    sync::mpsc::{self, Receiver},
    thread,
    time::{Duration, Instant},
};
use tui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table},
    Terminal,
};

pub enum DisplayEvent {
    Input(KeyEvent),
    Tick,
}

pub struct DisplayTerminal {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    input_rx: Receiver<DisplayEvent>,
}

fn bracketed(names: &[String]) -> String {
    format!("[{}]", names.join(", "))
}

impl DisplayTerminal {
    pub fn new(tick_rate: Duration) -> Result<Self, io::Error> {
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)?;

        // Input handling thread, also emitting a tick event every `tick_rate`
        let (input_tx, input_rx) = mpsc::channel();
        thread::spawn(move || {
            let mut last_tick = Instant::now();
            loop {
                let timeout = tick_rate
                    .checked_sub(last_tick.elapsed())
                    .unwrap_or(Duration::ZERO);

                if event::poll(timeout).unwrap_or(false) {
                    if let Ok(Event::Key(key)) = event::read() {
                        if input_tx.send(DisplayEvent::Input(key)).is_err() {
                            return;
                        }
                    }
                }

                if last_tick.elapsed() >= tick_rate {
                    if input_tx.send(DisplayEvent::Tick).is_err() {
                        return;
                    }
                    last_tick = Instant::now();
                }
            }
        });

        // Raw mode is only entered once Drop is in place to leave it again
        crossterm::terminal::enable_raw_mode()?;
        let mut display = Self { terminal, input_rx };
        display.terminal.clear()?;

        Ok(display)
    }

    pub fn draw(
        &mut self,
        mlfq: &MultiLevelFeedbackQueue,
        last_tick: Option<&TickTrace>,
        report: Option<&SimulationReport>,
        paused: bool,
    ) -> Result<(), io::Error> {
        self.terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .margin(1)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Length(6),
                    Constraint::Length(3),
                    Constraint::Min(5),
                ])
                .split(f.size());

            let cpu = match last_tick {
                Some(tick) => match (&tick.cpu, mlfq.is_switching()) {
                    (Some(name), _) => format!("Time {} | CPU : {}", tick.time, name),
                    (None, true) => format!("Time {} | Context switch in progress", tick.time),
                    (None, false) => format!("Time {} | CPU : []", tick.time),
                },
                None => "Simulation has not started.".to_owned(),
            };
            let status = if report.is_some() {
                "Done"
            } else if paused {
                "Paused"
            } else {
                "Running"
            };
            let header = Paragraph::new(cpu)
                .style(
                    Style::default()
                        .add_modifier(Modifier::BOLD)
                        .fg(Color::LightBlue),
                )
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(format!("{} | q quit, p pause, r resume, s step", status))
                        .border_type(BorderType::Rounded),
                );
            f.render_widget(header, chunks[0]);

            let rows = mlfq.levels().iter().enumerate().map(|(index, level)| {
                let residents = last_tick
                    .and_then(|tick| tick.queues.get(index))
                    .map(|names| bracketed(names))
                    .unwrap_or_else(|| "[]".to_owned());
                let allotment = level
                    .time_allotment()
                    .map(|allotment| allotment.to_string())
                    .unwrap_or_else(|| "-".to_owned());
                Row::new(vec![
                    Cell::from(index.to_string())
                        .style(Style::default().add_modifier(Modifier::BOLD)),
                    Cell::from("|"),
                    Cell::from(level.name()),
                    Cell::from("|"),
                    Cell::from(allotment),
                    Cell::from("|"),
                    Cell::from(residents),
                ])
            });
            let levels = Table::new(rows)
                .header(
                    Row::new(vec!["Lvl", "|", "Policy", "|", "Allot", "|", "Queue"])
                        .style(Style::default().add_modifier(Modifier::BOLD)),
                )
                .widths(&[
                    Constraint::Length(3),
                    Constraint::Length(1),
                    Constraint::Length(24),
                    Constraint::Length(1),
                    Constraint::Length(5),
                    Constraint::Length(1),
                    Constraint::Min(10),
                ])
                .block(Block::default().title("Feedback Levels").borders(Borders::ALL))
                .style(Style::default().fg(Color::LightGreen))
                .column_spacing(1);
            f.render_widget(levels, chunks[1]);

            let io = Paragraph::new(
                last_tick
                    .map(|tick| bracketed(&tick.io))
                    .unwrap_or_else(|| "[]".to_owned()),
            )
            .block(Block::default().title("I/O").borders(Borders::ALL));
            f.render_widget(io, chunks[2]);

            match report {
                Some(report) => f.render_widget(report_table(report), chunks[3]),
                None => {
                    let events = last_tick.map(events_text).unwrap_or_default();
                    let events = Paragraph::new(events)
                        .block(Block::default().title("Events").borders(Borders::ALL));
                    f.render_widget(events, chunks[3]);
                }
            }
        })?;
        Ok(())
    }

    pub fn get_input(&self) -> RunnerEvent {
        match self.input_rx.recv() {
            Ok(DisplayEvent::Input(key)) => {
                if key.modifiers.is_empty() {
                    match key.code {
                        KeyCode::Char('q') => return RunnerEvent::Quit,
                        KeyCode::Char('p') => return RunnerEvent::Pause,
                        KeyCode::Char('r') => return RunnerEvent::Resume,
                        KeyCode::Char('s') => return RunnerEvent::Step,
                        _ => {}
                    };
                }
                RunnerEvent::None
            }
            Ok(DisplayEvent::Tick) => RunnerEvent::Tick,
            Err(_) => RunnerEvent::Quit,
        }
    }
}

impl Drop for DisplayTerminal {
    fn drop(&mut self) {
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = self.terminal.show_cursor();
    }
}

fn events_text(tick: &TickTrace) -> String {
    let mut lines = Vec::new();
    if !tick.arrivals.is_empty() {
        lines.push(format!("Arriving : {}", bracketed(&tick.arrivals)));
    }
    lines.extend(tick.completed.iter().map(|name| format!("{} DONE", name)));
    lines.extend(tick.demoted.iter().map(|name| format!("{} DEMOTED", name)));
    lines.join("\n")
}

fn report_table(report: &SimulationReport) -> Table<'static> {
    let rows: Vec<Row> = report
        .processes()
        .iter()
        .map(|stats| {
            Row::new(vec![
                Cell::from(stats.name.clone()).style(Style::default().add_modifier(Modifier::BOLD)),
                Cell::from("|"),
                Cell::from(stats.arrival_time.to_string()),
                Cell::from("|"),
                Cell::from(stats.completion_time.to_string()),
                Cell::from("|"),
                Cell::from(stats.turnaround_time.to_string()),
                Cell::from("|"),
                Cell::from(stats.waiting_time.to_string()),
            ])
        })
        .collect();

    Table::new(rows)
        .header(
            Row::new(vec!["Name", "|", "Arrival", "|", "Done", "|", "Turnaround", "|", "Waiting"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .widths(&[
            Constraint::Length(8),
            Constraint::Length(1),
            Constraint::Length(7),
            Constraint::Length(1),
            Constraint::Length(6),
            Constraint::Length(1),
            Constraint::Length(10),
            Constraint::Length(1),
            Constraint::Length(7),
        ])
        .block(
            Block::default()
                .title(format!(
                    "SIMULATION DONE | Average Turn-around time = {} ms",
                    report.formatted_average()
                ))
                .borders(Borders::ALL),
        )
        .style(Style::default().fg(Color::LightGreen))
        .column_spacing(1)
}
