#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the survey task engine.
//!
//! The world owns the location table, the research subject ledger, the
//! progression store and the active-task index. All mutation flows through
//! [`World::apply`], which broadcasts [`Event`] values for systems to react
//! to. Registration of a task into the index brackets its matching lifetime
//! exactly: once completed or abandoned the task leaves the index and no
//! later event can reach it. Completed tasks move into a terminal store so
//! their final state stays inspectable.

use std::collections::{BTreeMap, HashMap, HashSet};

use survey_core::{
    Command, Event, LocationTable, PartId, PartInfo, ProgressionView, SubjectKey, SubjectRecord,
    SubjectView, TaskId, TaskState, TaskView,
};
use tracing::debug;

/// Authoritative state container mutated exclusively through commands.
#[derive(Debug, Default)]
pub struct World {
    locations: LocationTable,
    subjects: HashMap<SubjectKey, SubjectRecord>,
    parts: HashMap<PartId, PartInfo>,
    nodes: HashSet<String>,
    tasks: BTreeMap<TaskId, TaskState>,
    completed: BTreeMap<TaskId, TaskState>,
    next_task: u32,
}

impl World {
    /// Creates a world around the provided location table.
    #[must_use]
    pub fn new(locations: LocationTable) -> Self {
        Self {
            locations,
            ..Self::default()
        }
    }

    /// Records (or replaces) a research subject in the ledger.
    pub fn record_subject(&mut self, key: SubjectKey, record: SubjectRecord) {
        let _ = self.subjects.insert(key, record);
    }

    /// Marks a part as unlocked in the progression store.
    pub fn unlock_part(&mut self, id: PartId, info: PartInfo) {
        let _ = self.parts.insert(id, info);
    }

    /// Marks a research node as purchased in the progression store.
    pub fn research_node(&mut self, node: impl Into<String>) {
        let _ = self.nodes.insert(node.into());
    }

    /// Location table the world was built around.
    #[must_use]
    pub fn locations(&self) -> &LocationTable {
        &self.locations
    }

    /// Read-only view into the subject ledger.
    #[must_use]
    pub fn subjects(&self) -> SubjectView<'_> {
        SubjectView::new(&self.subjects)
    }

    /// Read-only view into the progression store.
    #[must_use]
    pub fn progression(&self) -> ProgressionView<'_> {
        ProgressionView::new(&self.parts, &self.nodes)
    }

    /// Read-only view over the active-task index.
    #[must_use]
    pub fn tasks(&self) -> TaskView<'_> {
        TaskView::new(&self.tasks)
    }

    /// Read-only view over the terminal store of completed tasks.
    #[must_use]
    pub fn completed(&self) -> TaskView<'_> {
        TaskView::new(&self.completed)
    }

    /// Executes a command batch entry and broadcasts the resulting events.
    ///
    /// Commands referring to tasks that already left the active index are
    /// ignored: completion and abandonment are terminal.
    pub fn apply(&mut self, command: &Command, out_events: &mut Vec<Event>) {
        match command {
            Command::AcceptTask { state } => {
                let task = TaskId::new(self.next_task);
                self.next_task += 1;
                let subject = state.subject().clone();
                debug!(task = task.get(), subject = %subject, "task accepted");
                let _ = self.tasks.insert(task, state.clone());
                out_events.push(Event::TaskAccepted { task, subject });
            }
            Command::SubmitResult { amount, subject } => {
                debug!(subject = subject.id(), amount, "result submitted");
                out_events.push(Event::ResultReceived {
                    amount: *amount,
                    subject: subject.clone(),
                });
            }
            Command::CompleteTask { task } => {
                if let Some(mut state) = self.tasks.remove(task) {
                    state.mark_completed();
                    debug!(task = task.get(), "task completed");
                    let _ = self.completed.insert(*task, state);
                    out_events.push(Event::TaskCompleted { task: *task });
                } else {
                    debug!(task = task.get(), "completion for inactive task ignored");
                }
            }
            Command::AbandonTask { task } => {
                if self.tasks.remove(task).is_some() {
                    debug!(task = task.get(), "task abandoned");
                    out_events.push(Event::TaskAbandoned { task: *task });
                } else {
                    debug!(task = task.get(), "abandonment for inactive task ignored");
                }
            }
            Command::PostAdvisory { task, notice } => {
                if self.tasks.contains_key(task) {
                    out_events.push(Event::AdvisoryPosted {
                        task: *task,
                        notice: *notice,
                    });
                } else {
                    debug!(task = task.get(), "advisory for inactive task ignored");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_core::{
        AdvisoryNotice, LocationIndex, PrestigeTier, RegionName, ResultSubject, RewardEnvelope,
        Situation, TaskSpec, TaskStatus,
    };

    fn sample_state(region: &str) -> TaskState {
        TaskState::new(
            TaskSpec::new(
                "Thermal Scan",
                LocationIndex::new(1),
                Situation::Landed,
                RegionName::new(region),
            ),
            SubjectKey::from_raw(format!("thermalScan@RylaLanded{}", region.replace(' ', ""))),
            None,
            PrestigeTier::Trivial,
            RewardEnvelope {
                expiry_min_days: 10.0,
                expiry_max_days: 15.0,
                deadline_days: 20.0,
                science: 30.0,
                reputation_gain: 5.0,
                reputation_loss: 10.0,
                funds_forward: 100.0,
                funds_reward: 1000.0,
                funds_penalty: 500.0,
            },
        )
    }

    #[test]
    fn accept_allocates_sequential_ids_and_emits_events() {
        let mut world = World::new(LocationTable::default());
        let mut events = Vec::new();
        world.apply(
            &Command::AcceptTask {
                state: sample_state("Dust Sea"),
            },
            &mut events,
        );
        world.apply(
            &Command::AcceptTask {
                state: sample_state("Highlands"),
            },
            &mut events,
        );

        assert_eq!(world.tasks().len(), 2);
        match events.as_slice() {
            [Event::TaskAccepted { task: first, .. }, Event::TaskAccepted { task: second, .. }] => {
                assert_eq!(first.get(), 0);
                assert_eq!(second.get(), 1);
            }
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn completion_detaches_the_task_from_the_index() {
        let mut world = World::new(LocationTable::default());
        let mut events = Vec::new();
        world.apply(
            &Command::AcceptTask {
                state: sample_state("Dust Sea"),
            },
            &mut events,
        );
        let task = match events.as_slice() {
            [Event::TaskAccepted { task, .. }] => *task,
            other => panic!("unexpected events: {other:?}"),
        };

        events.clear();
        world.apply(&Command::CompleteTask { task }, &mut events);
        assert_eq!(events, vec![Event::TaskCompleted { task }]);
        assert!(world.tasks().is_empty());
        assert!(world.tasks().get(task).is_none());

        // Terminal: a second completion and a late advisory are both ignored.
        events.clear();
        world.apply(&Command::CompleteTask { task }, &mut events);
        world.apply(
            &Command::PostAdvisory {
                task,
                notice: AdvisoryNotice::RegionAlreadyStudied,
            },
            &mut events,
        );
        assert!(events.is_empty());
    }

    #[test]
    fn completed_tasks_land_in_the_terminal_store() {
        let mut world = World::new(LocationTable::default());
        let mut events = Vec::new();
        world.apply(
            &Command::AcceptTask {
                state: sample_state("Dust Sea"),
            },
            &mut events,
        );
        let task = match events.as_slice() {
            [Event::TaskAccepted { task, .. }] => *task,
            other => panic!("unexpected events: {other:?}"),
        };
        world.apply(&Command::CompleteTask { task }, &mut events);

        let state = world.completed().get(task).expect("completed state");
        assert_eq!(state.status(), TaskStatus::Completed);
        assert!(world.tasks().get(task).is_none());
    }

    #[test]
    fn abandonment_emits_and_removes() {
        let mut world = World::new(LocationTable::default());
        let mut events = Vec::new();
        world.apply(
            &Command::AcceptTask {
                state: sample_state("Dust Sea"),
            },
            &mut events,
        );
        events.clear();

        world.apply(
            &Command::AbandonTask {
                task: TaskId::new(0),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::TaskAbandoned {
                task: TaskId::new(0)
            }]
        );
        assert!(world.tasks().is_empty());
    }

    #[test]
    fn submitted_results_are_rebroadcast() {
        let mut world = World::new(LocationTable::default());
        let mut events = Vec::new();
        world.apply(
            &Command::SubmitResult {
                amount: 12.5,
                subject: ResultSubject::new("thermalScan@RylaLandedDustSea", 0.8),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::ResultReceived {
                amount: 12.5,
                subject: ResultSubject::new("thermalScan@RylaLandedDustSea", 0.8),
            }]
        );
    }

    #[test]
    fn accepted_tasks_stay_active_until_matched() {
        let mut world = World::new(LocationTable::default());
        let mut events = Vec::new();
        world.apply(
            &Command::AcceptTask {
                state: sample_state("Dust Sea"),
            },
            &mut events,
        );
        let state = world.tasks().get(TaskId::new(0)).expect("task");
        assert_eq!(state.status(), TaskStatus::Active);
    }

    #[test]
    fn ledger_and_progression_views_reflect_seeded_data() {
        let mut world = World::new(LocationTable::default());
        let key = SubjectKey::from_raw("thermalScan@RylaLanded");
        world.record_subject(key.clone(), SubjectRecord::new(5.0, 0.25));
        world.unlock_part(
            PartId::new("sensor.thermal"),
            PartInfo::new("Thermometer", survey_core::SponsorId::new("OrbCo")),
        );
        world.research_node("advancedScience");

        assert!(world.subjects().get(&key).expect("record").is_exhausted());
        assert!(world
            .progression()
            .is_part_unlocked(&PartId::new("sensor.thermal")));
        assert!(world.progression().is_node_researched("advancedScience"));
        assert!(!world.progression().is_node_researched("other"));
    }
}
