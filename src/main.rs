use anyhow::Context;
use clap::Parser;
use log::info;
use mlfq_scheduler::{
    config::{parse_input, prompt_input},
    scheduler::{MultiLevelFeedbackQueue, SimulationRunner, DEFAULT_TICK_RATE},
};
use std::{
    fs,
    io::{self, IsTerminal, Read},
    path::PathBuf,
    time::Duration,
};

#[derive(Parser)]
#[command(name = "mlfq", about = "Multi-level feedback queue scheduler simulation")]
struct Args {
    /// Input file with scheduler details and process records (stdin if omitted)
    input: Option<PathBuf>,

    /// Round robin time quantum of the top level
    #[arg(long)]
    quantum: Option<u32>,

    /// Step through the simulation in an interactive terminal view
    #[arg(long)]
    tui: bool,

    /// Milliseconds per simulated tick in the terminal view
    #[arg(long, default_value_t = DEFAULT_TICK_RATE.as_millis() as u64)]
    tick_rate: u64,
}

fn read_input(path: Option<&PathBuf>) -> anyhow::Result<String> {
    if let Some(path) = path {
        return fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file {}", path.display()));
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(prompt_input(stdin.lock(), io::stderr())?);
    }

    let mut text = String::new();
    stdin
        .lock()
        .read_to_string(&mut text)
        .context("Failed to read input from stdin")?;
    Ok(text)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let text = read_input(args.input.as_ref())?;
    let mut input = parse_input(&text)?;
    if let Some(quantum) = args.quantum {
        input.config.time_quantum = quantum;
        input.config.validate()?;
    }
    info!(
        "Simulating {} processes with {:?}",
        input.processes.len(),
        input.config
    );

    let mut mlfq = MultiLevelFeedbackQueue::new(&input.config, input.processes);

    if args.tui {
        let mut runner = SimulationRunner::new(mlfq, Duration::from_millis(args.tick_rate))?;
        while runner.run()? {}

        let report = runner.report().cloned();
        drop(runner);
        if let Some(report) = report {
            print!("{}", report);
        }
        return Ok(());
    }

    let simulation = mlfq.run()?;
    for tick in &simulation.trace {
        println!("{}", tick);
    }
    print!("{}", simulation.report);
    Ok(())
}
