#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Result-to-task matching.
//!
//! [`Matching::handle`] consumes the event batch broadcast by the world and
//! decides which active tasks a submitted research result satisfies. Tasks
//! pinned to a region demand byte-exact subject equality. Tasks left
//! region-ambiguous accept any region of their target, with a low-value guard
//! that posts an advisory instead of completing when the matched region has
//! little science left to give.

use std::collections::HashSet;

use tracing::debug;

use survey_core::{
    AdvisoryNotice, Command, Event, ExperimentCatalog, ResultSubject, TaskId, TaskState, TaskView,
    EXHAUSTED_FRACTION,
};

/// Pure system that translates result events into completion commands.
#[derive(Clone, Copy, Debug, Default)]
pub struct Matching;

impl Matching {
    /// Creates the system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Scans the event batch and emits one command per satisfied task.
    ///
    /// A task is satisfied at most once per batch even when several results
    /// in the same batch would match it, and receives at most one advisory
    /// per batch. An advisory does not block a later, stronger result in the
    /// same batch from completing the task.
    pub fn handle(
        &self,
        events: &[Event],
        tasks: TaskView<'_>,
        catalog: &ExperimentCatalog,
        out_commands: &mut Vec<Command>,
    ) {
        let mut satisfied: HashSet<TaskId> = HashSet::new();
        let mut advised: HashSet<TaskId> = HashSet::new();
        for event in events {
            let Event::ResultReceived { amount, subject } = event else {
                continue;
            };
            for (id, state) in tasks.iter() {
                if satisfied.contains(&id) {
                    continue;
                }
                let Some(command) = match_result(id, state, *amount, subject, catalog) else {
                    continue;
                };
                match command {
                    Command::CompleteTask { .. } => {
                        let _ = satisfied.insert(id);
                    }
                    Command::PostAdvisory { .. } => {
                        if !advised.insert(id) {
                            continue;
                        }
                    }
                    _ => {}
                }
                out_commands.push(command);
            }
        }
    }
}

/// Decides what a single result means for a single active task.
fn match_result(
    id: TaskId,
    state: &TaskState,
    amount: f32,
    subject: &ResultSubject,
    catalog: &ExperimentCatalog,
) -> Option<Command> {
    let wanted = state.subject();
    if wanted.as_str().is_empty() {
        return None;
    }
    if !state.spec().region().is_empty() {
        // Region-pinned: nothing short of the exact subject satisfies it.
        if subject.id() == wanted.as_str() {
            debug!(task = id.get(), subject = subject.id(), "exact match");
            return Some(Command::CompleteTask { task: id });
        }
        return None;
    }
    // Region-ambiguous: the result key carries a region suffix the task key
    // lacks, so compare delimiter-stripped prefixes.
    if !subject.id().replace('@', "").starts_with(&wanted.stripped()) {
        return None;
    }
    if let Some(definition) = catalog.get(state.spec().experiment_name()) {
        let floor = EXHAUSTED_FRACTION * definition.spec().base_value() * subject.remaining();
        if amount < floor {
            debug!(
                task = id.get(),
                subject = subject.id(),
                amount,
                floor,
                "matched region is tapped out"
            );
            return Some(Command::PostAdvisory {
                task: id,
                notice: AdvisoryNotice::RegionAlreadyStudied,
            });
        }
    }
    debug!(task = id.get(), subject = subject.id(), "ambiguous match");
    Some(Command::CompleteTask { task: id })
}
