//! Canonical task representation and its persisted string codec.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    ExperimentCatalog, LocationIndex, LocationTable, PrestigeTier, RegionName, RewardEnvelope,
    Situation, SponsorId, SubjectKey,
};

const FIELD_DELIMITER: char = '|';

/// Errors that can occur while decoding a saved task string.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TaskCodecError {
    /// The saved string did not contain the named field.
    #[error("saved task is missing the {0} field")]
    MissingField(&'static str),
}

/// Identity of a task: which experiment, where, in which situation, and for
/// which region (empty for region-insensitive or deliberately ambiguous
/// tasks).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskSpec {
    experiment_name: String,
    location: Option<LocationIndex>,
    situation: Option<Situation>,
    region: RegionName,
}

impl TaskSpec {
    /// Creates a new task identity.
    #[must_use]
    pub fn new(
        experiment_name: impl Into<String>,
        location: LocationIndex,
        situation: Situation,
        region: RegionName,
    ) -> Self {
        Self {
            experiment_name: experiment_name.into(),
            location: Some(location),
            situation: Some(situation),
            region,
        }
    }

    /// Registration name of the experiment in the catalog.
    #[must_use]
    pub fn experiment_name(&self) -> &str {
        &self.experiment_name
    }

    /// Index of the target location. `None` for a record whose index field
    /// failed to parse.
    #[must_use]
    pub const fn location(&self) -> Option<LocationIndex> {
        self.location
    }

    /// Situation the result must be recorded in. `None` for a record whose
    /// situation field failed to parse.
    #[must_use]
    pub const fn situation(&self) -> Option<Situation> {
        self.situation
    }

    /// Target region; empty for ambiguous and region-insensitive tasks.
    #[must_use]
    pub const fn region(&self) -> &RegionName {
        &self.region
    }

    /// Encodes the identity as the persisted delimited string
    /// `name|locationIndex|situationBits|region`.
    ///
    /// Unresolvable fields encode as empty, so re-saving a partially decoded
    /// record keeps it partial instead of inventing a valid target.
    #[must_use]
    pub fn encode(&self) -> String {
        let location = self
            .location
            .map(|index| index.get().to_string())
            .unwrap_or_default();
        let situation = self
            .situation
            .map(|situation| situation.bits().to_string())
            .unwrap_or_default();
        format!(
            "{}{FIELD_DELIMITER}{location}{FIELD_DELIMITER}{situation}{FIELD_DELIMITER}{}",
            self.experiment_name, self.region
        )
    }

    /// Decodes a persisted delimited string.
    ///
    /// Decoding is lossy in the way loading a hand-edited save must be: a
    /// missing region field decodes as the empty region, and an unparseable
    /// location index or situation code decodes as `None` (such a record can
    /// never derive a subject key, so it can never match a result). Only a
    /// structurally truncated string is an error. The experiment name is
    /// kept verbatim even when unknown — resolution happens in
    /// [`TaskState::restore`].
    pub fn decode(value: &str) -> Result<Self, TaskCodecError> {
        let mut fields = value.split(FIELD_DELIMITER);
        let name = fields
            .next()
            .filter(|name| !name.is_empty())
            .ok_or(TaskCodecError::MissingField("experiment name"))?;
        let raw_location = fields
            .next()
            .ok_or(TaskCodecError::MissingField("location index"))?;
        let raw_situation = fields
            .next()
            .ok_or(TaskCodecError::MissingField("situation code"))?;
        let region = fields.next().unwrap_or_default();

        let location = raw_location.parse::<u32>().ok().map(LocationIndex::new);
        let situation = raw_situation
            .parse::<u32>()
            .ok()
            .and_then(Situation::from_bits);

        Ok(Self {
            experiment_name: name.to_owned(),
            location,
            situation,
            region: RegionName::new(region),
        })
    }

    /// Derives the canonical subject key for this identity.
    ///
    /// Returns `None` when the experiment name or the location index cannot
    /// be resolved against the current catalog and location table, or when
    /// the identity itself is partial.
    #[must_use]
    pub fn subject_key(
        &self,
        catalog: &ExperimentCatalog,
        locations: &LocationTable,
    ) -> Option<SubjectKey> {
        let definition = catalog.get(&self.experiment_name)?;
        let location = locations.get(self.location?)?;
        Some(SubjectKey::derive(
            definition.spec().id(),
            location.name(),
            self.situation?,
            &self.region,
        ))
    }
}

/// Lifecycle state of a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// The task is registered for result matching.
    Active,
    /// The task matched a result; terminal.
    Completed,
}

/// Fully generated task, owned by the active-task index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskState {
    spec: TaskSpec,
    subject: SubjectKey,
    sponsor: Option<SponsorId>,
    tier: PrestigeTier,
    envelope: RewardEnvelope,
    status: TaskStatus,
}

impl TaskState {
    /// Creates a newly generated, active task.
    #[must_use]
    pub fn new(
        spec: TaskSpec,
        subject: SubjectKey,
        sponsor: Option<SponsorId>,
        tier: PrestigeTier,
        envelope: RewardEnvelope,
    ) -> Self {
        Self {
            spec,
            subject,
            sponsor,
            tier,
            envelope,
            status: TaskStatus::Active,
        }
    }

    /// Rebuilds a task from its persisted identity.
    ///
    /// The subject key is re-derived from scratch and is byte-identical to the
    /// key computed at generation time. Returns `None` when the identity no
    /// longer resolves (unknown experiment name, stale location index): such a
    /// record is dropped by the host and can never match a result.
    #[must_use]
    pub fn restore(
        spec: TaskSpec,
        sponsor: Option<SponsorId>,
        tier: PrestigeTier,
        envelope: RewardEnvelope,
        catalog: &ExperimentCatalog,
        locations: &LocationTable,
    ) -> Option<Self> {
        let subject = spec.subject_key(catalog, locations)?;
        Some(Self {
            spec,
            subject,
            sponsor,
            tier,
            envelope,
            status: TaskStatus::Active,
        })
    }

    /// Task identity.
    #[must_use]
    pub const fn spec(&self) -> &TaskSpec {
        &self.spec
    }

    /// Canonical subject key the task targets.
    #[must_use]
    pub const fn subject(&self) -> &SubjectKey {
        &self.subject
    }

    /// Sponsoring agency, when one was assigned at generation time.
    #[must_use]
    pub const fn sponsor(&self) -> Option<&SponsorId> {
        self.sponsor.as_ref()
    }

    /// Prestige tier the task was generated for.
    #[must_use]
    pub const fn tier(&self) -> PrestigeTier {
        self.tier
    }

    /// Reward, expiry and penalty envelope.
    #[must_use]
    pub const fn envelope(&self) -> &RewardEnvelope {
        &self.envelope
    }

    /// Current lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Transitions the task to its terminal completed state.
    pub fn mark_completed(&mut self) {
        self.status = TaskStatus::Completed;
    }

    /// Encodes the persisted representation of the task identity.
    #[must_use]
    pub fn encode(&self) -> String {
        self.spec.encode()
    }

    /// Player-facing title for the task.
    ///
    /// Falls back to a generic label when the identity no longer resolves,
    /// so a partially reconstructed record still renders.
    #[must_use]
    pub fn title(&self, catalog: &ExperimentCatalog, locations: &LocationTable) -> String {
        let Some(definition) = catalog.get(self.spec.experiment_name()) else {
            return String::from("Collect experiment data");
        };
        let Some(location) = self
            .spec
            .location()
            .and_then(|index| locations.get(index))
        else {
            return String::from("Collect experiment data");
        };
        let Some(situation) = self.spec.situation() else {
            return String::from("Collect experiment data");
        };
        let experiment = definition.spec().title();
        let place = location.display_name();
        let region = self.spec.region();
        if region.is_empty() {
            match situation {
                Situation::OrbitHigh => {
                    format!("Collect {experiment} data from high orbit around {place}")
                }
                Situation::OrbitLow => {
                    format!("Collect {experiment} data from low orbit around {place}")
                }
                Situation::Landed => {
                    format!("Collect {experiment} data from the surface of {place}")
                }
                Situation::Splashed => {
                    format!("Collect {experiment} data from the oceans of {place}")
                }
                Situation::FlightHigh => {
                    format!("Collect {experiment} data during high altitude flight at {place}")
                }
                Situation::FlightLow => {
                    format!("Collect {experiment} data during low altitude flight at {place}")
                }
            }
        } else {
            match situation {
                Situation::OrbitHigh => {
                    format!("Collect {experiment} data from high orbit around {place}'s {region}")
                }
                Situation::OrbitLow => {
                    format!("Collect {experiment} data from low orbit around {place}'s {region}")
                }
                Situation::Landed => {
                    format!("Collect {experiment} data from the surface at {place}'s {region}")
                }
                Situation::Splashed => {
                    format!("Collect {experiment} data from the oceans at {place}'s {region}")
                }
                Situation::FlightHigh => format!(
                    "Collect {experiment} data during high altitude flight over {place}'s {region}"
                ),
                Situation::FlightLow => format!(
                    "Collect {experiment} data during low altitude flight over {place}'s {region}"
                ),
            }
        }
    }

    /// Player-facing synopsis for the task.
    #[must_use]
    pub fn synopsis(&self, catalog: &ExperimentCatalog, locations: &LocationTable) -> String {
        let Some(definition) = catalog.get(self.spec.experiment_name()) else {
            return String::from("We need you to record some observations");
        };
        let Some(location) = self
            .spec
            .location()
            .and_then(|index| locations.get(index))
        else {
            return String::from("We need you to record some observations");
        };
        let Some(situation) = self.spec.situation() else {
            return String::from("We need you to record some observations");
        };
        let experiment = definition.spec().title();
        let place = location.display_name();
        let region = self.spec.region();
        if region.is_empty() {
            match situation {
                Situation::OrbitHigh => format!(
                    "We need you to record some {experiment} observations from high orbit \
                     around {place}"
                ),
                Situation::OrbitLow => format!(
                    "We need you to record some {experiment} observations from low orbit \
                     around {place}"
                ),
                Situation::Landed => format!(
                    "We need you to record some {experiment} observations from the surface \
                     of {place}"
                ),
                Situation::Splashed => format!(
                    "We need you to record some {experiment} observations from the oceans \
                     of {place}"
                ),
                Situation::FlightHigh => format!(
                    "We need you to record some {experiment} observations during high altitude \
                     atmospheric flight at {place}"
                ),
                Situation::FlightLow => format!(
                    "We need you to record some {experiment} observations during low altitude \
                     atmospheric flight at {place}"
                ),
            }
        } else {
            match situation {
                Situation::OrbitHigh => format!(
                    "We need you to record some {experiment} observations from high orbit \
                     above the {region} around {place}"
                ),
                Situation::OrbitLow => format!(
                    "We need you to record some {experiment} observations from low orbit \
                     above the {region} around {place}"
                ),
                Situation::Landed => format!(
                    "We need you to record some {experiment} observations from the {region} \
                     while on the surface of {place}"
                ),
                Situation::Splashed => format!(
                    "We need you to record some {experiment} observations from the {region} \
                     while on the oceans of {place}"
                ),
                Situation::FlightHigh => format!(
                    "We need you to record some {experiment} observations during high altitude \
                     atmospheric flight over the {region} at {place}"
                ),
                Situation::FlightLow => format!(
                    "We need you to record some {experiment} observations during low altitude \
                     atmospheric flight over the {region} at {place}"
                ),
            }
        }
    }
}
