//! Catalog and settings loading on top of the node parser.

use tracing::{debug, warn};

use survey_core::{
    ExperimentArchive, ExperimentCatalog, ExperimentDefinition, GlobalMultipliers, PartId,
    SponsorId, StoryTemplate,
};

use crate::node::ConfigNode;

const SETTINGS_NODE: &str = "TASK_SETTINGS";
const SETTINGS_NAME: &str = "Task Settings";
const EXPERIMENT_NODE: &str = "TASK_EXPERIMENT";
const STORY_NODE: &str = "SURVEY_STORY_DEF";
const BACKSTORY_NODE: &str = "BACKSTORY";

/// Sentinel meaning "no part required" in experiment entries.
const PART_SENTINEL: &str = "None";
/// Sentinel meaning "any agency may sponsor" in experiment entries.
const SPONSOR_SENTINEL: &str = "Any";

/// Loads the global reward multipliers from the settings node.
///
/// Looks for the first `TASK_SETTINGS` node named `Task Settings`. Missing or
/// malformed entries keep their defaults of `1.0`.
#[must_use]
pub fn load_multipliers(nodes: &[ConfigNode]) -> GlobalMultipliers {
    let mut multipliers = GlobalMultipliers::default();
    let Some(settings) = nodes
        .iter()
        .filter(|node| node.name() == SETTINGS_NODE)
        .find(|node| node.value("name") == Some(SETTINGS_NAME))
    else {
        debug!("no settings node found, multipliers stay at 1.0");
        return multipliers;
    };
    for (key, slot) in [
        ("Global_Science_Return", &mut multipliers.science),
        ("Global_Fund_Reward", &mut multipliers.fund_reward),
        ("Global_Fund_Forward", &mut multipliers.fund_forward),
        ("Global_Fund_Penalty", &mut multipliers.fund_penalty),
    ] {
        match settings.value(key).map(str::parse::<f32>) {
            Some(Ok(value)) => *slot = value,
            Some(Err(_)) => warn!(key, "malformed multiplier, keeping default"),
            None => {}
        }
    }
    multipliers
}

/// Builds the experiment catalog from `TASK_EXPERIMENT` entries and
/// narrative templates from `SURVEY_STORY_DEF` blocks.
///
/// Entries naming an experiment id absent from the archive are skipped with
/// a warning. Story strings swap `[`/`]` for the brace placeholders the
/// template renderer expects.
#[must_use]
pub fn load_catalog(nodes: &[ConfigNode], archive: &ExperimentArchive) -> ExperimentCatalog {
    let mut catalog = ExperimentCatalog::new();
    for node in nodes.iter().filter(|node| node.name() == EXPERIMENT_NODE) {
        let Some(id) = node.value("experimentID") else {
            warn!("experiment entry without an experimentID, skipping");
            continue;
        };
        let Some(spec) = archive.get(id) else {
            warn!(id, "experiment id not present in the archive, skipping");
            continue;
        };
        let Some(name) = node.value("name") else {
            warn!(id, "experiment entry without a name, skipping");
            continue;
        };
        let part = node
            .value("part")
            .filter(|value| *value != PART_SENTINEL)
            .map(PartId::new);
        let tech_node = node.value("node").map(str::to_owned);
        let sponsor = node
            .value("agent")
            .filter(|value| *value != SPONSOR_SENTINEL)
            .map(SponsorId::new);
        debug!(name, id, "experiment registered for tasks");
        catalog.register(ExperimentDefinition::new(
            name,
            spec.clone(),
            part,
            tech_node,
            sponsor,
        ));
    }
    for node in nodes.iter().filter(|node| node.name() == STORY_NODE) {
        for backstory in node.nodes(BACKSTORY_NODE) {
            for story in backstory.values_of("generic") {
                if story.is_empty() {
                    continue;
                }
                let template = story.replace('[', "{").replace(']', "}");
                catalog.add_story(StoryTemplate::new(template));
            }
        }
    }
    catalog
}
