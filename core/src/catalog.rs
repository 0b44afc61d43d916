//! Experiment archive, task catalog and narrative templates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ExperimentId, PartId, Situation, SituationSet, SponsorId};

/// Physical description of an experiment held by the research archive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScienceSpec {
    id: ExperimentId,
    title: String,
    situations: SituationSet,
    region_relevant: SituationSet,
    base_value: f32,
    requires_atmosphere: bool,
}

impl ScienceSpec {
    /// Creates a new experiment description.
    #[must_use]
    pub fn new(
        id: ExperimentId,
        title: impl Into<String>,
        situations: SituationSet,
        region_relevant: SituationSet,
        base_value: f32,
        requires_atmosphere: bool,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            situations,
            region_relevant,
            base_value,
            requires_atmosphere,
        }
    }

    /// Identifier used inside subject keys.
    #[must_use]
    pub const fn id(&self) -> &ExperimentId {
        &self.id
    }

    /// Player-facing experiment title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Situations in which the experiment may run at all.
    #[must_use]
    pub const fn situations(&self) -> SituationSet {
        self.situations
    }

    /// Base scientific value of a full result.
    #[must_use]
    pub const fn base_value(&self) -> f32 {
        self.base_value
    }

    /// Reports whether the experiment needs an atmosphere regardless of
    /// situation.
    #[must_use]
    pub const fn requires_atmosphere(&self) -> bool {
        self.requires_atmosphere
    }

    /// Reports whether results in the situation are recorded per region.
    #[must_use]
    pub const fn region_matters(&self, situation: Situation) -> bool {
        self.region_relevant.contains(situation)
    }
}

/// Process-wide table of experiment physics, populated once at startup.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentArchive {
    specs: BTreeMap<String, ScienceSpec>,
}

impl ExperimentArchive {
    /// Creates an empty archive.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an experiment, replacing any previous spec with the same id.
    pub fn register(&mut self, spec: ScienceSpec) {
        let _ = self.specs.insert(spec.id().as_str().to_owned(), spec);
    }

    /// Looks up an experiment by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ScienceSpec> {
        self.specs.get(id)
    }

    /// Number of registered experiments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Reports whether the archive is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Catalog entry binding an experiment spec to its task registration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExperimentDefinition {
    name: String,
    spec: ScienceSpec,
    part: Option<PartId>,
    node: Option<String>,
    sponsor: Option<SponsorId>,
}

impl ExperimentDefinition {
    /// Creates a new catalog entry.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        spec: ScienceSpec,
        part: Option<PartId>,
        node: Option<String>,
        sponsor: Option<SponsorId>,
    ) -> Self {
        Self {
            name: name.into(),
            spec,
            part,
            node,
            sponsor,
        }
    }

    /// Registration name, also the display name used in stories.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Physical description of the experiment.
    #[must_use]
    pub const fn spec(&self) -> &ScienceSpec {
        &self.spec
    }

    /// Part that must be unlocked before the task can be offered.
    #[must_use]
    pub const fn required_part(&self) -> Option<&PartId> {
        self.part.as_ref()
    }

    /// Research node that must be purchased before the task can be offered.
    #[must_use]
    pub fn required_node(&self) -> Option<&str> {
        self.node.as_deref()
    }

    /// Sponsor fixed by the registration, if any.
    #[must_use]
    pub const fn sponsor(&self) -> Option<&SponsorId> {
        self.sponsor.as_ref()
    }
}

/// Narrative template with positional placeholders.
///
/// `{0}` is the sponsor, `{1}` the experiment display name, `{2}` the
/// location display name and `{3}` the required-part title or a generic
/// fallback label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryTemplate(String);

impl StoryTemplate {
    /// Wraps a template string.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Raw template text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Substitutes the positional placeholders.
    #[must_use]
    pub fn render(&self, sponsor: &str, experiment: &str, location: &str, part: &str) -> String {
        self.0
            .replace("{0}", sponsor)
            .replace("{1}", experiment)
            .replace("{2}", location)
            .replace("{3}", part)
    }
}

/// Registered experiment catalog plus narrative templates.
///
/// Iteration order is the sorted registration-name order, so uniform random
/// selection over the catalog is deterministic given a seed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentCatalog {
    entries: BTreeMap<String, ExperimentDefinition>,
    stories: Vec<StoryTemplate>,
}

impl ExperimentCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a definition under its registration name.
    pub fn register(&mut self, definition: ExperimentDefinition) {
        let _ = self
            .entries
            .insert(definition.name().to_owned(), definition);
    }

    /// Appends a narrative template.
    pub fn add_story(&mut self, story: StoryTemplate) {
        self.stories.push(story);
    }

    /// Looks up a definition by registration name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ExperimentDefinition> {
        self.entries.get(name)
    }

    /// Definition at the provided position in sorted-name order.
    #[must_use]
    pub fn nth(&self, index: usize) -> Option<&ExperimentDefinition> {
        self.entries.values().nth(index)
    }

    /// Iterates definitions in sorted-name order.
    pub fn iter(&self) -> impl Iterator<Item = &ExperimentDefinition> {
        self.entries.values()
    }

    /// Number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the catalog holds no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Narrative templates available for task descriptions.
    #[must_use]
    pub fn stories(&self) -> &[StoryTemplate] {
        &self.stories
    }
}
