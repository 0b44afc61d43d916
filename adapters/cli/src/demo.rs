//! Built-in demo star system and survey definitions.

use survey_core::{
    ExperimentArchive, ExperimentId, Location, LocationIndex, LocationTable, PartId, PartInfo,
    PhysicalTraits, RegionName, ScienceSpec, Situation, SituationSet, SituationValues, SponsorId,
};
use survey_world::World;

/// Definition file text exercised by both subcommands.
pub(crate) const CONFIG_TEXT: &str = "
TASK_SETTINGS
{
    name = Task Settings
    Global_Science_Return = 1
    Global_Fund_Reward = 1
    Global_Fund_Forward = 1
    Global_Fund_Penalty = 1
}

TASK_EXPERIMENT
{
    experimentID = thermalScan
    name = Thermal Scan
    part = sensor.thermal
}

TASK_EXPERIMENT
{
    experimentID = pressureScan
    name = Atmospheric Pressure Survey
    part = sensor.baro
    agent = Rokea Instruments
}

TASK_EXPERIMENT
{
    experimentID = seismicScan
    name = Seismic Survey
    part = sensor.seismic
    node = basicScience
}

SURVEY_STORY_DEF
{
    BACKSTORY
    {
        generic = [0] would like to gather [1] readings from [2] using the [3].
        generic = Researchers at [0] believe that [2] holds secrets only a [3] can uncover.
        generic = A [1] campaign around [2] is the next step in [0]'s exploration program.
    }
}
";

/// Locations of the demo system, home world first.
pub(crate) fn locations() -> LocationTable {
    LocationTable::new(vec![
        Location::new(
            "Tellus",
            "Tellus",
            PhysicalTraits::new(true, true, true),
            SituationValues::new(0.3, 0.4, 0.7, 1.0),
            vec![
                RegionName::new("Grasslands"),
                RegionName::new("Shores"),
                RegionName::new("Mountains"),
            ],
        ),
        Location::new(
            "Lune",
            "the Lune",
            PhysicalTraits::new(false, false, true),
            SituationValues::new(4.0, 4.0, 4.0, 3.0),
            vec![
                RegionName::new("Crater Rim"),
                RegionName::new("Basin"),
                RegionName::new("Polar Ice"),
            ],
        ),
        Location::new(
            "Nix",
            "Nix",
            PhysicalTraits::new(false, false, true),
            SituationValues::new(5.0, 5.0, 5.0, 4.0),
            vec![RegionName::new("Canyons"), RegionName::new("Flats")],
        ),
        Location::new(
            "Ryla",
            "Ryla",
            PhysicalTraits::new(true, true, true),
            SituationValues::new(6.0, 6.0, 6.0, 5.0),
            vec![RegionName::new("Dust Sea"), RegionName::new("Highlands")],
        ),
        Location::new(
            "Vorga",
            "Vorga",
            PhysicalTraits::new(true, false, false),
            SituationValues::new(10.0, 10.0, 9.0, 8.0),
            Vec::new(),
        ),
    ])
}

/// Home world and its two moons, in [`locations`] order.
pub(crate) fn home_system() -> Vec<LocationIndex> {
    vec![
        LocationIndex::new(0),
        LocationIndex::new(1),
        LocationIndex::new(2),
    ]
}

/// Everything the demo program has already visited.
pub(crate) fn reachable() -> Vec<LocationIndex> {
    vec![
        LocationIndex::new(0),
        LocationIndex::new(1),
        LocationIndex::new(2),
        LocationIndex::new(3),
    ]
}

/// The expected next destination.
pub(crate) fn next_unreached() -> Vec<LocationIndex> {
    vec![LocationIndex::new(4)]
}

/// Research archive the definition file is resolved against.
pub(crate) fn archive() -> ExperimentArchive {
    let mut archive = ExperimentArchive::new();
    archive.register(ScienceSpec::new(
        ExperimentId::new("thermalScan"),
        "2HOT Thermometer",
        SituationSet::of(&[
            Situation::Landed,
            Situation::Splashed,
            Situation::OrbitLow,
            Situation::OrbitHigh,
        ]),
        SituationSet::of(&[Situation::Landed, Situation::Splashed]),
        30.0,
        false,
    ));
    archive.register(ScienceSpec::new(
        ExperimentId::new("pressureScan"),
        "PresMat Barometer",
        SituationSet::of(&[
            Situation::Landed,
            Situation::FlightLow,
            Situation::FlightHigh,
        ]),
        SituationSet::of(&[Situation::Landed]),
        25.0,
        true,
    ));
    archive.register(ScienceSpec::new(
        ExperimentId::new("seismicScan"),
        "Double-C Seismic Accelerometer",
        SituationSet::of(&[Situation::Landed]),
        SituationSet::of(&[Situation::Landed]),
        40.0,
        false,
    ));
    archive
}

/// World seeded with the demo progression state.
pub(crate) fn world() -> World {
    let mut world = World::new(locations());
    world.unlock_part(
        PartId::new("sensor.thermal"),
        PartInfo::new("2HOT Thermometer", SponsorId::new("Probodyne")),
    );
    world.unlock_part(
        PartId::new("sensor.baro"),
        PartInfo::new("PresMat Barometer", SponsorId::new("Rokea Instruments")),
    );
    world.unlock_part(
        PartId::new("sensor.seismic"),
        PartInfo::new("Double-C Seismic Accelerometer", SponsorId::new("Probodyne")),
    );
    world.research_node("basicScience");
    world
}
