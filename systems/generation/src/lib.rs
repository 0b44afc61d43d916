#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic task generation pipeline.
//!
//! [`TaskGenerator::generate`] runs a fixed sequence of filter → choose →
//! validate steps over the experiment catalog and the world views. Every step
//! is a hard filter: the first failure aborts the attempt with `None` and the
//! caller re-invokes generation from scratch if it wants another sample.
//! Given the same configuration and the same request order, the generator
//! reproduces identical tasks.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};
use tracing::debug;

use survey_core::{
    ExperimentCatalog, ExperimentDefinition, GlobalMultipliers, LocationIndex, LocationTable,
    PrestigeTier, ProgressionView, RegionName, Situation, SponsorId, SubjectKey, SubjectView,
    TaskSpec, TaskState,
};

pub mod select;
pub mod value;

/// Probability numerator (out of 3) that a part's manufacturer sponsors the
/// task when the registration leaves the sponsor open.
const MANUFACTURER_ODDS: u32 = 2;

/// Configuration required to construct the generator.
#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    /// Seed from which every per-request rng stream is derived.
    pub global_seed: u64,
    /// Externally configured reward multipliers.
    pub multipliers: GlobalMultipliers,
    /// Home-system locations: the first entry is the home world, the rest are
    /// its near moons. Drives the tier rules in [`select::select_location`].
    pub home_system: Vec<LocationIndex>,
}

/// One task-creation request.
#[derive(Clone, Debug)]
pub struct GenerateRequest {
    /// Prestige tier the task is generated for.
    pub tier: PrestigeTier,
    /// Locations the caller has already reached.
    pub reachable: Vec<LocationIndex>,
    /// Locations the caller is expected to reach next.
    pub next_unreached: Vec<LocationIndex>,
    /// Fixes the target location instead of delegating to the selector.
    pub fixed_location: Option<LocationIndex>,
    /// Fixes the experiment registration by name.
    pub fixed_experiment: Option<String>,
    /// Fixes the situation; must survive the resolver intersection.
    pub fixed_situation: Option<Situation>,
}

impl GenerateRequest {
    /// Creates a request for the provided tier with no fixed fields.
    #[must_use]
    pub fn new(tier: PrestigeTier) -> Self {
        Self {
            tier,
            reachable: Vec::new(),
            next_unreached: Vec::new(),
            fixed_location: None,
            fixed_experiment: None,
            fixed_situation: None,
        }
    }
}

/// Pure system that generates one [`TaskState`] per successful request.
#[derive(Clone, Debug)]
pub struct TaskGenerator {
    config: GeneratorConfig,
    requests: u64,
}

impl TaskGenerator {
    /// Creates a generator using the supplied configuration.
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            requests: 0,
        }
    }

    /// Runs the selection pipeline once.
    ///
    /// Returns `None` whenever any step fails; failures are expected and
    /// silent beyond a debug log line. No step retries internally.
    pub fn generate(
        &mut self,
        request: &GenerateRequest,
        catalog: &ExperimentCatalog,
        locations: &LocationTable,
        subjects: SubjectView<'_>,
        progression: ProgressionView<'_>,
    ) -> Option<TaskState> {
        let seed = derive_request_seed(self.config.global_seed, self.requests, request.tier);
        self.requests += 1;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        // Step 1: experiment.
        let definition = match &request.fixed_experiment {
            Some(name) => catalog.get(name),
            None => choose_definition(catalog, &mut rng),
        }?;

        // Step 2: part/tech gate.
        if !requirements_met(definition, &progression) {
            debug!(experiment = definition.name(), "requirement not met");
            return None;
        }

        // Step 3: location.
        let location_index = match request.fixed_location {
            Some(index) => locations.get(index).map(|_| index),
            None => select::select_location(request, &self.config.home_system, locations, &mut rng),
        }?;
        let location = locations.get(location_index)?;

        // Step 4: situation.
        let resolved = select::resolve_situations(definition.spec(), location);
        if resolved.is_empty() {
            debug!(
                experiment = definition.name(),
                location = location.name(),
                "no legal situation"
            );
            return None;
        }
        let situation = match request.fixed_situation {
            Some(fixed) if resolved.contains(fixed) => fixed,
            Some(_) => return None,
            None => select::choose_situation(resolved, &mut rng)?,
        };

        // Step 5: region.
        let region = if definition.spec().region_matters(situation) && !location.regions().is_empty()
        {
            let candidates =
                select::eligible_regions(definition.spec(), location, situation, &subjects);
            if candidates.is_empty() {
                debug!(location = location.name(), "all regions tapped out");
                return None;
            }
            if rng.gen_bool(0.5) {
                candidates.choose(&mut rng).cloned()?
            } else {
                // Deliberately ambiguous: any region of the location will do.
                RegionName::none()
            }
        } else {
            // Region-insensitive situation, or a location with no mapped
            // regions; the subject falls back to the empty-region sentinel.
            RegionName::none()
        };

        // Step 6: exhaustion check on the exact subject.
        let subject = SubjectKey::derive(
            definition.spec().id(),
            location.name(),
            situation,
            &region,
        );
        if subjects
            .get(&subject)
            .is_some_and(survey_core::SubjectRecord::is_exhausted)
        {
            debug!(subject = %subject, "subject already sufficiently studied");
            return None;
        }

        // Step 7: sponsor.
        let sponsor = choose_sponsor(definition, &progression, &mut rng);

        // Step 8: reward envelope.
        let subject_value = subjects
            .get(&subject)
            .map(survey_core::SubjectRecord::value)
            .unwrap_or_else(|| value::subject_value(situation, location));
        let envelope = value::reward_envelope(
            definition.spec().base_value(),
            subject_value,
            request.tier,
            &self.config.multipliers,
        );

        // Step 9: emit.
        let spec = TaskSpec::new(definition.name(), location_index, situation, region);
        debug!(subject = %subject, tier = ?request.tier, "task generated");
        Some(TaskState::new(
            spec,
            subject,
            sponsor,
            request.tier,
            envelope,
        ))
    }
}

fn choose_definition<'a>(
    catalog: &'a ExperimentCatalog,
    rng: &mut ChaCha8Rng,
) -> Option<&'a ExperimentDefinition> {
    if catalog.is_empty() {
        return None;
    }
    catalog.nth(rng.gen_range(0..catalog.len()))
}

fn requirements_met(
    definition: &ExperimentDefinition,
    progression: &ProgressionView<'_>,
) -> bool {
    if let Some(part) = definition.required_part() {
        if !progression.is_part_unlocked(part) {
            return false;
        }
    }
    if let Some(node) = definition.required_node() {
        if !progression.is_node_researched(node) {
            return false;
        }
    }
    true
}

fn choose_sponsor(
    definition: &ExperimentDefinition,
    progression: &ProgressionView<'_>,
    rng: &mut ChaCha8Rng,
) -> Option<SponsorId> {
    if let Some(fixed) = definition.sponsor() {
        return Some(fixed.clone());
    }
    let part = definition.required_part()?;
    let info = progression.part(part)?;
    if rng.gen_range(0..3) < MANUFACTURER_ODDS {
        Some(info.manufacturer().clone())
    } else {
        None
    }
}

fn derive_request_seed(global_seed: u64, request_index: u64, tier: PrestigeTier) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(global_seed.to_le_bytes());
    hasher.update(request_index.to_le_bytes());
    hasher.update(tier.rank().to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_seeds_differ_across_requests_and_tiers() {
        let base = derive_request_seed(7, 0, PrestigeTier::Trivial);
        assert_ne!(base, derive_request_seed(7, 1, PrestigeTier::Trivial));
        assert_ne!(base, derive_request_seed(7, 0, PrestigeTier::Significant));
        assert_ne!(base, derive_request_seed(8, 0, PrestigeTier::Trivial));
        assert_eq!(base, derive_request_seed(7, 0, PrestigeTier::Trivial));
    }
}
