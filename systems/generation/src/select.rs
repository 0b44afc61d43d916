//! Location, situation and region selection rules.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use survey_core::{
    Location, LocationIndex, LocationTable, PrestigeTier, RegionName, ScienceSpec, Situation,
    SituationSet, SubjectKey, SubjectView,
};

use crate::GenerateRequest;

/// Picks a candidate location for the request, applying tier rules.
///
/// Trivial tasks stay within the configured home system. Significant tasks
/// draw from the caller's reachable set with the home system's moons forced
/// in. Exceptional tasks draw from the next-unreached set with the whole
/// home system forced out, falling back to the reachable set when the
/// exclusion empties the pool. Returns `None` when the resulting pool is
/// empty or no pool entry resolves against the table.
#[must_use]
pub fn select_location(
    request: &GenerateRequest,
    home_system: &[LocationIndex],
    locations: &LocationTable,
    rng: &mut ChaCha8Rng,
) -> Option<LocationIndex> {
    let mut pool: Vec<LocationIndex> = match request.tier {
        PrestigeTier::Trivial => home_system.to_vec(),
        PrestigeTier::Significant => {
            let mut pool = request.reachable.clone();
            for near in home_system.iter().skip(1) {
                if !pool.contains(near) {
                    pool.push(*near);
                }
            }
            pool
        }
        PrestigeTier::Exceptional => {
            let mut pool: Vec<LocationIndex> = request
                .next_unreached
                .iter()
                .copied()
                .filter(|candidate| !home_system.contains(candidate))
                .collect();
            if pool.is_empty() {
                pool = request.reachable.clone();
            }
            pool
        }
    };
    pool.retain(|candidate| locations.get(*candidate).is_some());
    pool.choose(rng).copied()
}

/// Intersects the experiment's permitted situations with what is physically
/// possible at the location.
///
/// Atmospheric flight needs an atmosphere, splashdown needs both an ocean and
/// a solid surface model, landing needs a solid surface, and an experiment
/// that requires an atmosphere outright is impossible anywhere airless.
#[must_use]
pub fn resolve_situations(spec: &ScienceSpec, location: &Location) -> SituationSet {
    let traits = location.traits();
    if spec.requires_atmosphere() && !traits.atmosphere {
        return SituationSet::EMPTY;
    }
    let mut possible = SituationSet::EMPTY;
    for situation in spec.situations().iter() {
        let legal = match situation {
            Situation::FlightLow | Situation::FlightHigh => traits.atmosphere,
            Situation::Splashed => traits.ocean && traits.surface,
            Situation::Landed => traits.surface,
            Situation::OrbitLow | Situation::OrbitHigh => true,
        };
        if legal {
            possible.insert(situation);
        }
    }
    possible
}

/// Uniform-random choice among a non-empty situation set.
#[must_use]
pub fn choose_situation(set: SituationSet, rng: &mut ChaCha8Rng) -> Option<Situation> {
    let candidates: Vec<Situation> = set.iter().collect();
    candidates.choose(rng).copied()
}

/// Regions of the location that still hold enough unharvested value for the
/// (experiment, situation) pair.
///
/// A region qualifies when its derived subject does not exist yet or still
/// has at least the offer-threshold fraction remaining.
#[must_use]
pub fn eligible_regions(
    spec: &ScienceSpec,
    location: &Location,
    situation: Situation,
    subjects: &SubjectView<'_>,
) -> Vec<RegionName> {
    location
        .regions()
        .iter()
        .filter(|region| {
            let key = SubjectKey::derive(spec.id(), location.name(), situation, region);
            subjects
                .get(&key)
                .map_or(true, |record| !record.is_exhausted())
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::HashMap;
    use survey_core::{ExperimentId, PhysicalTraits, SituationValues, SubjectRecord};

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(11)
    }

    fn spec(situations: &[Situation], requires_atmosphere: bool) -> ScienceSpec {
        ScienceSpec::new(
            ExperimentId::new("probe"),
            "Probe",
            SituationSet::of(situations),
            SituationSet::EMPTY,
            20.0,
            requires_atmosphere,
        )
    }

    fn location(atmosphere: bool, ocean: bool, surface: bool) -> Location {
        Location::new(
            "Thule",
            "Thule",
            PhysicalTraits::new(atmosphere, ocean, surface),
            SituationValues::uniform(2.0),
            vec![
                RegionName::new("Crater Rim"),
                RegionName::new("Basin"),
                RegionName::new("Polar Ice"),
            ],
        )
    }

    #[test]
    fn flight_requires_an_atmosphere() {
        let spec = spec(&[Situation::FlightLow, Situation::FlightHigh], false);
        assert!(resolve_situations(&spec, &location(false, false, true)).is_empty());
        assert_eq!(
            resolve_situations(&spec, &location(true, false, true)).len(),
            2
        );
    }

    #[test]
    fn splashdown_requires_ocean_and_surface() {
        let spec = spec(&[Situation::Splashed], false);
        assert!(resolve_situations(&spec, &location(true, true, false)).is_empty());
        assert!(resolve_situations(&spec, &location(true, false, true)).is_empty());
        assert!(resolve_situations(&spec, &location(true, true, true)).contains(Situation::Splashed));
    }

    #[test]
    fn landing_requires_a_surface() {
        let spec = spec(&[Situation::Landed, Situation::OrbitLow], false);
        let resolved = resolve_situations(&spec, &location(false, false, false));
        assert_eq!(resolved.iter().collect::<Vec<_>>(), vec![Situation::OrbitLow]);
    }

    #[test]
    fn atmosphere_requiring_experiments_never_run_airless() {
        let spec = spec(&[Situation::OrbitLow], true);
        assert!(resolve_situations(&spec, &location(false, false, true)).is_empty());
        assert!(!resolve_situations(&spec, &location(true, false, true)).is_empty());
    }

    #[test]
    fn trivial_tier_draws_from_the_home_system() {
        let table = LocationTable::new(vec![
            location(true, true, true),
            location(false, false, true),
            location(false, false, true),
        ]);
        let home = vec![LocationIndex::new(0), LocationIndex::new(1)];
        let request = GenerateRequest::new(PrestigeTier::Trivial);
        let mut rng = rng();
        for _ in 0..16 {
            let chosen = select_location(&request, &home, &table, &mut rng).expect("choice");
            assert!(home.contains(&chosen));
        }
    }

    #[test]
    fn significant_tier_forces_the_near_moons_in() {
        let table = LocationTable::new(vec![
            location(true, true, true),
            location(false, false, true),
            location(false, false, true),
        ]);
        let home = vec![
            LocationIndex::new(0),
            LocationIndex::new(1),
            LocationIndex::new(2),
        ];
        let mut request = GenerateRequest::new(PrestigeTier::Significant);
        request.reachable = vec![LocationIndex::new(0)];
        let mut seen = Vec::new();
        let mut rng = rng();
        for _ in 0..64 {
            let chosen = select_location(&request, &home, &table, &mut rng).expect("choice");
            if !seen.contains(&chosen) {
                seen.push(chosen);
            }
        }
        assert!(seen.contains(&LocationIndex::new(1)));
        assert!(seen.contains(&LocationIndex::new(2)));
    }

    #[test]
    fn exceptional_tier_excludes_the_home_system() {
        let table = LocationTable::new(vec![
            location(true, true, true),
            location(false, false, true),
            location(true, false, true),
            location(true, false, false),
        ]);
        let home = vec![LocationIndex::new(0), LocationIndex::new(1)];
        let mut request = GenerateRequest::new(PrestigeTier::Exceptional);
        request.next_unreached = vec![
            LocationIndex::new(0),
            LocationIndex::new(2),
            LocationIndex::new(3),
        ];
        let mut rng = rng();
        for _ in 0..16 {
            let chosen = select_location(&request, &home, &table, &mut rng).expect("choice");
            assert!(!home.contains(&chosen));
        }
    }

    #[test]
    fn exceptional_tier_falls_back_to_reachable_when_emptied() {
        let table = LocationTable::new(vec![
            location(true, true, true),
            location(false, false, true),
            location(true, false, true),
        ]);
        let home = vec![LocationIndex::new(0), LocationIndex::new(1)];
        let mut request = GenerateRequest::new(PrestigeTier::Exceptional);
        request.next_unreached = vec![LocationIndex::new(0), LocationIndex::new(1)];
        request.reachable = vec![LocationIndex::new(2)];
        let chosen = select_location(&request, &home, &table, &mut rng()).expect("choice");
        assert_eq!(chosen, LocationIndex::new(2));
    }

    #[test]
    fn empty_pools_yield_no_location() {
        let table = LocationTable::new(vec![location(true, true, true)]);
        let request = GenerateRequest::new(PrestigeTier::Significant);
        assert!(select_location(&request, &[], &table, &mut rng()).is_none());
    }

    #[test]
    fn stale_indices_are_dropped_from_the_pool() {
        let table = LocationTable::new(vec![location(true, true, true)]);
        let home = vec![LocationIndex::new(5)];
        let request = GenerateRequest::new(PrestigeTier::Trivial);
        assert!(select_location(&request, &home, &table, &mut rng()).is_none());
    }

    #[test]
    fn only_unexhausted_regions_qualify() {
        let spec = spec(&[Situation::Landed], false);
        let place = location(false, false, true);
        let mut ledger = HashMap::new();
        for region in ["Crater Rim", "Basin"] {
            let key = SubjectKey::derive(
                spec.id(),
                place.name(),
                Situation::Landed,
                &RegionName::new(region),
            );
            let _ = ledger.insert(key, SubjectRecord::new(2.0, 0.1));
        }
        let key = SubjectKey::derive(
            spec.id(),
            place.name(),
            Situation::Landed,
            &RegionName::new("Polar Ice"),
        );
        let _ = ledger.insert(key, SubjectRecord::new(2.0, 1.0));

        let view = SubjectView::new(&ledger);
        let regions = eligible_regions(&spec, &place, Situation::Landed, &view);
        assert_eq!(regions, vec![RegionName::new("Polar Ice")]);
    }

    #[test]
    fn unrecorded_regions_always_qualify() {
        let spec = spec(&[Situation::Landed], false);
        let place = location(false, false, true);
        let ledger = HashMap::new();
        let view = SubjectView::new(&ledger);
        let regions = eligible_regions(&spec, &place, Situation::Landed, &view);
        assert_eq!(regions.len(), 3);
    }
}
