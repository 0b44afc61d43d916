#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the survey task engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! views, and respond exclusively with new command batches.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

mod catalog;
mod task;

pub use catalog::{
    ExperimentArchive, ExperimentCatalog, ExperimentDefinition, ScienceSpec, StoryTemplate,
};
pub use task::{TaskCodecError, TaskSpec, TaskState, TaskStatus};

/// Remaining-value fraction below which a research subject counts as exhausted.
pub const EXHAUSTED_FRACTION: f32 = 0.4;

/// Physical context in which an experiment runs.
///
/// Each situation owns one bit of the [`SituationSet`] mask so an experiment
/// definition can permit an arbitrary subset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Situation {
    /// Resting on the solid surface of a location.
    Landed,
    /// Floating on the oceans of a location.
    Splashed,
    /// Low-altitude atmospheric flight.
    FlightLow,
    /// High-altitude atmospheric flight.
    FlightHigh,
    /// Low orbit around a location.
    OrbitLow,
    /// High orbit around a location.
    OrbitHigh,
}

impl Situation {
    /// All situations in ascending bit order.
    pub const ALL: [Situation; 6] = [
        Situation::Landed,
        Situation::Splashed,
        Situation::FlightLow,
        Situation::FlightHigh,
        Situation::OrbitLow,
        Situation::OrbitHigh,
    ];

    /// Bit owned by this situation within a [`SituationSet`] mask.
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Situation::Landed => 1,
            Situation::Splashed => 2,
            Situation::FlightLow => 4,
            Situation::FlightHigh => 8,
            Situation::OrbitLow => 16,
            Situation::OrbitHigh => 32,
        }
    }

    /// Recovers a situation from a mask containing exactly one set bit.
    #[must_use]
    pub fn from_bits(bits: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|situation| situation.bits() == bits)
    }

    /// Canonical name used inside subject keys and saved task strings.
    #[must_use]
    pub const fn canonical_name(self) -> &'static str {
        match self {
            Situation::Landed => "Landed",
            Situation::Splashed => "Splashed",
            Situation::FlightLow => "FlightLow",
            Situation::FlightHigh => "FlightHigh",
            Situation::OrbitLow => "OrbitLow",
            Situation::OrbitHigh => "OrbitHigh",
        }
    }

    /// Reports whether the situation only exists inside an atmosphere.
    #[must_use]
    pub const fn needs_atmosphere(self) -> bool {
        matches!(self, Situation::FlightLow | Situation::FlightHigh)
    }
}

impl fmt::Display for Situation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// Bitmask over the six [`Situation`] values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SituationSet(u32);

impl SituationSet {
    /// Set containing no situations.
    pub const EMPTY: SituationSet = SituationSet(0);

    /// Creates a set from a raw mask, discarding bits outside the six situations.
    #[must_use]
    pub const fn from_mask(mask: u32) -> Self {
        Self(mask & 0b11_1111)
    }

    /// Creates a set containing the listed situations.
    #[must_use]
    pub fn of(situations: &[Situation]) -> Self {
        let mut set = Self::EMPTY;
        for &situation in situations {
            set.insert(situation);
        }
        set
    }

    /// Raw mask value of the set.
    #[must_use]
    pub const fn mask(&self) -> u32 {
        self.0
    }

    /// Reports whether the set contains the provided situation.
    #[must_use]
    pub const fn contains(&self, situation: Situation) -> bool {
        self.0 & situation.bits() != 0
    }

    /// Adds a situation to the set.
    pub fn insert(&mut self, situation: Situation) {
        self.0 |= situation.bits();
    }

    /// Computes the set of situations present in both operands.
    #[must_use]
    pub const fn intersection(&self, other: SituationSet) -> SituationSet {
        SituationSet(self.0 & other.0)
    }

    /// Reports whether the set contains no situations.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of situations contained in the set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates the contained situations in ascending bit order.
    pub fn iter(&self) -> impl Iterator<Item = Situation> + '_ {
        Situation::ALL
            .into_iter()
            .filter(|situation| self.contains(*situation))
    }
}

/// Difficulty and scope classification of a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PrestigeTier {
    /// Home-system objectives with small rewards.
    Trivial,
    /// Objectives across every already-reached location.
    Significant,
    /// Objectives pushing toward not-yet-reached locations.
    Exceptional,
}

impl PrestigeTier {
    /// Zero-based rank used by reward scaling.
    #[must_use]
    pub const fn rank(self) -> u32 {
        match self {
            PrestigeTier::Trivial => 0,
            PrestigeTier::Significant => 1,
            PrestigeTier::Exceptional => 2,
        }
    }
}

/// Index of a location within the [`LocationTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocationIndex(u32);

impl LocationIndex {
    /// Creates a new location index wrapper.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an accepted task by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(u32);

impl TaskId {
    /// Creates a new task identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of an experiment inside the research archive.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExperimentId(String);

impl ExperimentId {
    /// Creates a new experiment identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// String form of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExperimentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of an unlockable vessel part.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartId(String);

impl PartId {
    /// Creates a new part identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// String form of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier of a sponsoring agency.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SponsorId(String);

impl SponsorId {
    /// Creates a new sponsor identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// String form of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SponsorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a region within a location. The empty name means "no region".
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionName(String);

impl RegionName {
    /// Creates a new region name.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The empty region, used for region-insensitive and ambiguous tasks.
    #[must_use]
    pub fn none() -> Self {
        Self(String::new())
    }

    /// String form of the region name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reports whether this is the empty region.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Region name with interior spaces stripped, as used inside subject keys.
    #[must_use]
    pub fn compact(&self) -> String {
        self.0.replace(' ', "")
    }
}

impl fmt::Display for RegionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Physical attributes of a location that gate experiment situations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalTraits {
    /// The location carries an atmosphere.
    pub atmosphere: bool,
    /// The location has liquid oceans.
    pub ocean: bool,
    /// The location has a solid surface model.
    pub surface: bool,
}

impl PhysicalTraits {
    /// Creates a new trait descriptor with explicit flags.
    #[must_use]
    pub const fn new(atmosphere: bool, ocean: bool, surface: bool) -> Self {
        Self {
            atmosphere,
            ocean,
            surface,
        }
    }
}

/// Per-situation base value coefficients of a location.
///
/// The High flight and orbit variants share the Low coefficient of their
/// family.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SituationValues {
    /// Coefficient applied to surface results.
    pub landed: f32,
    /// Coefficient applied to ocean results.
    pub splashed: f32,
    /// Coefficient applied to atmospheric flight results.
    pub flight_low: f32,
    /// Coefficient applied to orbital results.
    pub orbit_low: f32,
}

impl SituationValues {
    /// Creates a new coefficient table.
    #[must_use]
    pub const fn new(landed: f32, splashed: f32, flight_low: f32, orbit_low: f32) -> Self {
        Self {
            landed,
            splashed,
            flight_low,
            orbit_low,
        }
    }

    /// Uniform coefficient table, useful for home-world defaults.
    #[must_use]
    pub const fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    /// Coefficient that applies to the provided situation.
    #[must_use]
    pub const fn coefficient(&self, situation: Situation) -> f32 {
        match situation {
            Situation::Landed => self.landed,
            Situation::Splashed => self.splashed,
            Situation::FlightLow | Situation::FlightHigh => self.flight_low,
            Situation::OrbitLow | Situation::OrbitHigh => self.orbit_low,
        }
    }
}

/// A location in the exploration world. The engine only reads it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    name: String,
    display_name: String,
    traits: PhysicalTraits,
    values: SituationValues,
    regions: Vec<RegionName>,
}

impl Location {
    /// Creates a new location description.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        traits: PhysicalTraits,
        values: SituationValues,
        regions: Vec<RegionName>,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            traits,
            values,
            regions,
        }
    }

    /// Key name used inside canonical subject keys.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name shown to players in titles and synopses.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Physical attributes of the location.
    #[must_use]
    pub const fn traits(&self) -> PhysicalTraits {
        self.traits
    }

    /// Per-situation value coefficients.
    #[must_use]
    pub const fn values(&self) -> SituationValues {
        self.values
    }

    /// Ordered region table. Empty when the location has no regions.
    #[must_use]
    pub fn regions(&self) -> &[RegionName] {
        &self.regions
    }
}

/// Ordered, index-addressed table of every location in the world.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationTable {
    locations: Vec<Location>,
}

impl LocationTable {
    /// Creates a table from the provided locations, preserving their order.
    #[must_use]
    pub fn new(locations: Vec<Location>) -> Self {
        Self { locations }
    }

    /// Looks up a location by index.
    #[must_use]
    pub fn get(&self, index: LocationIndex) -> Option<&Location> {
        self.locations.get(index.get() as usize)
    }

    /// Finds the index of a location by its key name.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<LocationIndex> {
        self.locations
            .iter()
            .position(|location| location.name() == name)
            .and_then(|index| u32::try_from(index).ok())
            .map(LocationIndex::new)
    }

    /// Number of locations in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Reports whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Iterates locations with their indices in table order.
    pub fn iter(&self) -> impl Iterator<Item = (LocationIndex, &Location)> {
        self.locations
            .iter()
            .enumerate()
            .map(|(index, location)| (LocationIndex::new(index as u32), location))
    }
}

/// Canonical key addressing one (experiment, location, situation, region)
/// combination in the research ledger.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubjectKey(String);

impl SubjectKey {
    /// Derives the canonical key for the provided combination.
    ///
    /// Equal inputs always yield byte-identical keys; the region contributes
    /// its space-stripped form and the empty region contributes nothing.
    #[must_use]
    pub fn derive(
        experiment: &ExperimentId,
        location_name: &str,
        situation: Situation,
        region: &RegionName,
    ) -> Self {
        Self(format!(
            "{}@{}{}{}",
            experiment.as_str(),
            location_name,
            situation,
            region.compact()
        ))
    }

    /// Wraps an externally produced key string.
    #[must_use]
    pub fn from_raw(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// String form of the key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key with the `@` delimiter removed, used by ambiguous matching.
    #[must_use]
    pub fn stripped(&self) -> String {
        self.0.replace('@', "")
    }
}

impl fmt::Display for SubjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Externally tracked research record for one subject key.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubjectRecord {
    value: f32,
    remaining: f32,
}

impl SubjectRecord {
    /// Creates a new record from the stored value multiplier and the
    /// remaining-value fraction.
    #[must_use]
    pub const fn new(value: f32, remaining: f32) -> Self {
        Self { value, remaining }
    }

    /// Value multiplier recorded for the subject.
    #[must_use]
    pub const fn value(&self) -> f32 {
        self.value
    }

    /// Fraction of scientific value still unharvested, in `[0, 1]`.
    #[must_use]
    pub const fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Reports whether the subject has been studied past the offer threshold.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining < EXHAUSTED_FRACTION
    }
}

/// Globally configured reward multipliers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlobalMultipliers {
    /// Multiplier applied to the scientific reward.
    pub science: f32,
    /// Multiplier applied to the completion funds.
    pub fund_reward: f32,
    /// Multiplier applied to the up-front funds advance.
    pub fund_forward: f32,
    /// Multiplier applied to the failure penalty.
    pub fund_penalty: f32,
}

impl Default for GlobalMultipliers {
    fn default() -> Self {
        Self {
            science: 1.0,
            fund_reward: 1.0,
            fund_forward: 1.0,
            fund_penalty: 1.0,
        }
    }
}

/// Reward, expiry and penalty envelope computed for a generated task.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RewardEnvelope {
    /// Minimum days before the unaccepted offer expires.
    pub expiry_min_days: f32,
    /// Maximum days before the unaccepted offer expires.
    pub expiry_max_days: f32,
    /// Days allowed for completion after acceptance.
    pub deadline_days: f32,
    /// Scientific reward granted on completion.
    pub science: f32,
    /// Reputation gained on completion.
    pub reputation_gain: f32,
    /// Reputation lost on failure.
    pub reputation_loss: f32,
    /// Funds advanced on acceptance.
    pub funds_forward: f32,
    /// Funds granted on completion.
    pub funds_reward: f32,
    /// Funds withdrawn on failure.
    pub funds_penalty: f32,
}

/// Subject payload carried by a submitted result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultSubject {
    id: String,
    remaining: f32,
}

impl ResultSubject {
    /// Creates a new result subject payload.
    #[must_use]
    pub fn new(id: impl Into<String>, remaining: f32) -> Self {
        Self {
            id: id.into(),
            remaining,
        }
    }

    /// Canonical subject id the result was recorded against.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Remaining-value fraction of the subject at submission time.
    #[must_use]
    pub const fn remaining(&self) -> f32 {
        self.remaining
    }
}

/// Advisory notices surfaced to the player instead of a completion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdvisoryNotice {
    /// The matched region holds too little value to satisfy the task.
    RegionAlreadyStudied,
}

impl AdvisoryNotice {
    /// Player-facing message for the notice.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            AdvisoryNotice::RegionAlreadyStudied => {
                "This area has already been studied, try investigating another \
                 region to complete the task"
            }
        }
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Registers a freshly generated task into the active-task index.
    AcceptTask {
        /// Generated task to activate.
        state: TaskState,
    },
    /// Reports a research result submitted by the player.
    SubmitResult {
        /// Scientific amount carried by the result.
        amount: f32,
        /// Subject the result was recorded against.
        subject: ResultSubject,
    },
    /// Marks an active task as completed and detaches it from matching.
    CompleteTask {
        /// Identifier of the task to complete.
        task: TaskId,
    },
    /// Removes an active task without completing it.
    AbandonTask {
        /// Identifier of the task to abandon.
        task: TaskId,
    },
    /// Surfaces an advisory notice for an active task.
    PostAdvisory {
        /// Identifier of the task the notice concerns.
        task: TaskId,
        /// Notice to surface.
        notice: AdvisoryNotice,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a task entered the active-task index.
    TaskAccepted {
        /// Identifier assigned to the task by the world.
        task: TaskId,
        /// Canonical subject key the task targets.
        subject: SubjectKey,
    },
    /// Announces a submitted research result to interested systems.
    ResultReceived {
        /// Scientific amount carried by the result.
        amount: f32,
        /// Subject the result was recorded against.
        subject: ResultSubject,
    },
    /// Confirms that a task completed and left the active-task index.
    TaskCompleted {
        /// Identifier of the completed task.
        task: TaskId,
    },
    /// Confirms that a task was abandoned and left the active-task index.
    TaskAbandoned {
        /// Identifier of the abandoned task.
        task: TaskId,
    },
    /// Reports an advisory notice for an active task.
    AdvisoryPosted {
        /// Identifier of the task the notice concerns.
        task: TaskId,
        /// Notice surfaced to the player.
        notice: AdvisoryNotice,
    },
}

/// Read-only view into the research subject ledger.
#[derive(Clone, Copy, Debug)]
pub struct SubjectView<'a> {
    records: &'a HashMap<SubjectKey, SubjectRecord>,
}

impl<'a> SubjectView<'a> {
    /// Captures a new view backed by the provided ledger.
    #[must_use]
    pub fn new(records: &'a HashMap<SubjectKey, SubjectRecord>) -> Self {
        Self { records }
    }

    /// Looks up the record stored for a subject key, if any.
    #[must_use]
    pub fn get(&self, key: &SubjectKey) -> Option<&'a SubjectRecord> {
        self.records.get(key)
    }
}

/// Metadata describing an unlocked part.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartInfo {
    title: String,
    manufacturer: SponsorId,
}

impl PartInfo {
    /// Creates a new part descriptor.
    #[must_use]
    pub fn new(title: impl Into<String>, manufacturer: SponsorId) -> Self {
        Self {
            title: title.into(),
            manufacturer,
        }
    }

    /// Player-facing part title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Agency that manufactures the part.
    #[must_use]
    pub const fn manufacturer(&self) -> &SponsorId {
        &self.manufacturer
    }
}

/// Read-only view into the progression store.
#[derive(Clone, Copy, Debug)]
pub struct ProgressionView<'a> {
    parts: &'a HashMap<PartId, PartInfo>,
    nodes: &'a HashSet<String>,
}

impl<'a> ProgressionView<'a> {
    /// Captures a new view backed by the provided stores.
    #[must_use]
    pub fn new(parts: &'a HashMap<PartId, PartInfo>, nodes: &'a HashSet<String>) -> Self {
        Self { parts, nodes }
    }

    /// Looks up an unlocked part by id. Unknown or locked parts yield `None`.
    #[must_use]
    pub fn part(&self, id: &PartId) -> Option<&'a PartInfo> {
        self.parts.get(id)
    }

    /// Reports whether the part is currently unlocked.
    #[must_use]
    pub fn is_part_unlocked(&self, id: &PartId) -> bool {
        self.parts.contains_key(id)
    }

    /// Reports whether the research node has been purchased.
    #[must_use]
    pub fn is_node_researched(&self, node: &str) -> bool {
        self.nodes.contains(node)
    }
}

/// Read-only view over the active-task index in [`TaskId`] order.
#[derive(Clone, Copy, Debug)]
pub struct TaskView<'a> {
    tasks: &'a BTreeMap<TaskId, TaskState>,
}

impl<'a> TaskView<'a> {
    /// Captures a new view backed by the provided index.
    #[must_use]
    pub fn new(tasks: &'a BTreeMap<TaskId, TaskState>) -> Self {
        Self { tasks }
    }

    /// Iterates active tasks in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (TaskId, &'a TaskState)> {
        self.tasks.iter().map(|(id, state)| (*id, state))
    }

    /// Looks up a single active task.
    #[must_use]
    pub fn get(&self, task: TaskId) -> Option<&'a TaskState> {
        self.tasks.get(&task)
    }

    /// Number of active tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Reports whether the index holds no active tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::DeserializeOwned;

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn situation_bits_round_trip() {
        for situation in Situation::ALL {
            assert_eq!(Situation::from_bits(situation.bits()), Some(situation));
        }
        assert_eq!(Situation::from_bits(0), None);
        assert_eq!(Situation::from_bits(3), None);
        assert_eq!(Situation::from_bits(64), None);
    }

    #[test]
    fn situation_set_operations() {
        let mut set = SituationSet::EMPTY;
        assert!(set.is_empty());
        set.insert(Situation::OrbitLow);
        set.insert(Situation::Landed);
        assert!(set.contains(Situation::OrbitLow));
        assert!(!set.contains(Situation::Splashed));
        assert_eq!(set.len(), 2);

        let other = SituationSet::of(&[Situation::OrbitLow, Situation::FlightLow]);
        let common = set.intersection(other);
        assert_eq!(common.iter().collect::<Vec<_>>(), vec![Situation::OrbitLow]);
    }

    #[test]
    fn situation_set_masks_stray_bits() {
        let set = SituationSet::from_mask(0xffff_ffc1);
        assert_eq!(set.mask(), 1);
    }

    #[test]
    fn subject_key_is_pure() {
        let experiment = ExperimentId::new("thermalScan");
        let region = RegionName::new("Northern Dunes");
        let a = SubjectKey::derive(&experiment, "Ryla", Situation::OrbitLow, &region);
        let b = SubjectKey::derive(&experiment, "Ryla", Situation::OrbitLow, &region);
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "thermalScan@RylaOrbitLowNorthernDunes");
    }

    #[test]
    fn subject_key_empty_region_contributes_nothing() {
        let experiment = ExperimentId::new("thermalScan");
        let key = SubjectKey::derive(&experiment, "Ryla", Situation::Landed, &RegionName::none());
        assert_eq!(key.as_str(), "thermalScan@RylaLanded");
    }

    #[test]
    fn subject_key_stripping_removes_delimiter() {
        let key = SubjectKey::from_raw("exp@LocOrbitLow");
        assert_eq!(key.stripped(), "expLocOrbitLow");
    }

    #[test]
    fn subject_record_exhaustion_threshold() {
        assert!(SubjectRecord::new(1.0, 0.39).is_exhausted());
        assert!(!SubjectRecord::new(1.0, 0.4).is_exhausted());
        assert!(!SubjectRecord::new(1.0, 1.0).is_exhausted());
    }

    #[test]
    fn situation_values_share_low_coefficients() {
        let values = SituationValues::new(2.0, 3.0, 4.0, 5.0);
        assert_eq!(values.coefficient(Situation::FlightHigh), 4.0);
        assert_eq!(values.coefficient(Situation::FlightLow), 4.0);
        assert_eq!(values.coefficient(Situation::OrbitHigh), 5.0);
        assert_eq!(values.coefficient(Situation::OrbitLow), 5.0);
        assert_eq!(values.coefficient(Situation::Landed), 2.0);
        assert_eq!(values.coefficient(Situation::Splashed), 3.0);
    }

    #[test]
    fn location_table_lookup_by_name_and_index() {
        let table = LocationTable::new(vec![
            Location::new(
                "Tellus",
                "Tellus",
                PhysicalTraits::new(true, true, true),
                SituationValues::uniform(1.0),
                Vec::new(),
            ),
            Location::new(
                "Lune",
                "the Lune",
                PhysicalTraits::new(false, false, true),
                SituationValues::uniform(4.0),
                Vec::new(),
            ),
        ]);
        let index = table.index_of("Lune").expect("index");
        assert_eq!(index, LocationIndex::new(1));
        assert_eq!(table.get(index).expect("location").display_name(), "the Lune");
        assert!(table.get(LocationIndex::new(7)).is_none());
    }

    #[test]
    fn subject_key_round_trips_through_bincode() {
        let key = SubjectKey::from_raw("exp@LocOrbitLow");
        assert_round_trip(&key);
    }

    #[test]
    fn prestige_tier_round_trips_through_bincode() {
        assert_round_trip(&PrestigeTier::Exceptional);
    }

    #[test]
    fn location_round_trips_through_bincode() {
        let location = Location::new(
            "Ryla",
            "Ryla",
            PhysicalTraits::new(true, false, true),
            SituationValues::new(5.0, 5.0, 4.0, 3.0),
            vec![RegionName::new("Highlands")],
        );
        assert_round_trip(&location);
    }
}
