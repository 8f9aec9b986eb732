/*!
 * Property Tests
 * Invariants that hold for any process mix and scheduler configuration
 */

use mlfq_scheduler::{MultiLevelFeedbackQueue, Process, SchedulerConfig};
use proptest::prelude::*;
use std::collections::HashMap;

const MAX_TICKS: usize = 10_000;

fn process_strategy(name: String) -> impl Strategy<Value = Process> {
    (0u32..12, 0usize..3).prop_flat_map(move |(arrival, io_bursts)| {
        let name = name.clone();
        prop::collection::vec(0u32..9, io_bursts * 2 + 1)
            .prop_map(move |bursts| Process::new(&name, arrival, bursts))
    })
}

fn scenario() -> impl Strategy<Value = (SchedulerConfig, Vec<Process>)> {
    (1usize..6, 1u32..10, 1u32..10, 0u32..4, 1u32..6).prop_flat_map(
        |(count, q1, q2, context_switch_time, time_quantum)| {
            let processes: Vec<_> = (0..count)
                .map(|index| process_strategy(format!("P{}", index)))
                .collect();
            let config = SchedulerConfig {
                process_count: count,
                time_allotment_q1: q1,
                time_allotment_q2: q2,
                context_switch_time,
                time_quantum,
            };
            (Just(config), processes)
        },
    )
}

fn all_names(mlfq: &MultiLevelFeedbackQueue) -> Vec<String> {
    let mut names: Vec<String> = mlfq
        .future_processes()
        .iter()
        .chain(mlfq.levels().iter().flat_map(|level| level.processes()))
        .chain(mlfq.io_device().processes())
        .chain(mlfq.finished_processes())
        .map(|process| process.name().to_owned())
        .collect();
    names.sort();
    names
}

proptest! {
    #[test]
    fn prop_processes_are_conserved((config, processes) in scenario()) {
        let mut expected: Vec<String> = processes.iter().map(|p| p.name().to_owned()).collect();
        expected.sort();

        let mut mlfq = MultiLevelFeedbackQueue::new(&config, processes);
        let mut ticks = 0;
        while !mlfq.is_finished() {
            mlfq.step().unwrap();
            prop_assert_eq!(all_names(&mlfq), expected.clone());
            ticks += 1;
            prop_assert!(ticks < MAX_TICKS);
        }
        prop_assert_eq!(mlfq.finished_processes().len(), expected.len());
    }

    #[test]
    fn prop_levels_never_decrease((config, processes) in scenario()) {
        let mut mlfq = MultiLevelFeedbackQueue::new(&config, processes);
        let mut levels: HashMap<String, usize> = HashMap::new();
        while !mlfq.is_finished() {
            mlfq.step().unwrap();
            for level in mlfq.levels() {
                for process in level.processes() {
                    let queue_level = process.queue_level();
                    let previous = levels.insert(process.name().to_owned(), queue_level);
                    prop_assert!(previous.map_or(true, |previous| previous <= queue_level));
                }
            }
        }
    }

    #[test]
    fn prop_running_process_is_in_highest_nonempty_level((config, processes) in scenario()) {
        let mut mlfq = MultiLevelFeedbackQueue::new(&config, processes);
        while !mlfq.is_finished() {
            mlfq.step().unwrap();
            if let Some(current) = mlfq.current_process() {
                let first = mlfq.levels().iter().position(|level| !level.is_empty());
                let holder = mlfq
                    .levels()
                    .iter()
                    .position(|level| level.processes().iter().any(|p| p.name() == current));
                prop_assert_eq!(first, holder);
            }
        }
    }

    #[test]
    fn prop_time_in_level_counts_cpu_ticks_since_admission((config, processes) in scenario()) {
        let mut mlfq = MultiLevelFeedbackQueue::new(&config, processes);
        let mut previous: HashMap<String, u32> = HashMap::new();
        while !mlfq.is_finished() {
            let tick = mlfq.step().unwrap();
            let mut current = HashMap::new();
            for level in mlfq.levels() {
                for process in level.processes() {
                    // Freshly admitted residents restart from zero
                    let ran = u32::from(tick.cpu.as_deref() == Some(process.name()));
                    let stayed = previous.get(process.name()).map(|time| time + ran);
                    let time = process.time_in_level();
                    prop_assert!(time == ran || Some(time) == stayed);
                    if let Some(allotment) = level.time_allotment() {
                        prop_assert!(time <= allotment);
                    }
                    current.insert(process.name().to_owned(), time);
                }
            }
            previous = current;
        }
    }

    #[test]
    fn prop_round_robin_runs_at_most_one_quantum((config, processes) in scenario()) {
        let mut mlfq = MultiLevelFeedbackQueue::new(&config, processes);
        let mut streak: Option<(String, u32)> = None;
        while !mlfq.is_finished() {
            let tick = mlfq.step().unwrap();
            // Only contended ticks count; a lone resident keeps the CPU
            let top_level = mlfq.levels()[0].processes();
            let on_top_level = tick.cpu.as_deref().filter(|name| {
                top_level.len() > 1 && top_level.iter().any(|p| p.name() == *name)
            });
            streak = match (on_top_level, streak) {
                (Some(name), Some((last, count))) if last == name => Some((last, count + 1)),
                (Some(name), _) => Some((name.to_owned(), 1)),
                (None, _) => None,
            };
            if let Some((_, count)) = &streak {
                prop_assert!(*count <= config.time_quantum);
            }
        }
    }

    #[test]
    fn prop_completion_accounts_for_cpu_time((config, processes) in scenario()) {
        let simulation = MultiLevelFeedbackQueue::new(&config, processes.clone()).run().unwrap();
        for stats in simulation.report.processes() {
            let original = processes.iter().find(|p| p.name() == stats.name).unwrap();
            let earliest = original.arrival_time() + original.total_cpu_time();
            prop_assert!(stats.completion_time >= earliest);
            prop_assert_eq!(
                stats.waiting_time,
                stats.turnaround_time - original.total_cpu_time()
            );
        }
    }

    #[test]
    fn prop_runs_are_deterministic((config, processes) in scenario()) {
        let first = MultiLevelFeedbackQueue::new(&config, processes.clone()).run().unwrap();
        let second = MultiLevelFeedbackQueue::new(&config, processes).run().unwrap();

        let render = |simulation: &mlfq_scheduler::Simulation| {
            simulation.trace.iter().map(|tick| tick.to_string()).collect::<String>()
                + &simulation.report.to_string()
        };
        prop_assert_eq!(render(&first), render(&second));
    }
}
