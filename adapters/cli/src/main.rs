#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives the survey task engine against a
//! built-in demo star system.

mod demo;

use std::fs;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use survey_config::{load_catalog, load_multipliers, ConfigNode};
use survey_core::{
    Command, Event, ExperimentCatalog, LocationTable, PrestigeTier, ResultSubject, TaskState,
};
use survey_system_generation::{GenerateRequest, GeneratorConfig, TaskGenerator};
use survey_system_matching::Matching;
use survey_world::World;

/// Generation attempts allowed per requested offer before giving up.
const ATTEMPTS_PER_OFFER: usize = 32;

/// Fallback sponsor name used when a task carries no sponsoring agency.
const OPEN_SPONSOR: &str = "The Exploration Consortium";

#[derive(Parser)]
#[command(name = "survey", about = "Procedural survey task engine demo")]
struct Cli {
    /// Seed for deterministic task generation.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Survey definition file; the built-in demo definitions are used when
    /// omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Prestige tier of the generated tasks.
    #[arg(long, value_enum, default_value_t = TierArg::Significant)]
    tier: TierArg,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Generates task offers and prints them.
    Generate {
        /// Number of offers to produce.
        #[arg(long, default_value_t = 5)]
        count: usize,
    },
    /// Generates tasks, submits scripted results and reports the outcome.
    Simulate {
        /// Number of tasks to accept before submitting results.
        #[arg(long, default_value_t = 3)]
        count: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TierArg {
    Trivial,
    Significant,
    Exceptional,
}

impl From<TierArg> for PrestigeTier {
    fn from(value: TierArg) -> Self {
        match value {
            TierArg::Trivial => PrestigeTier::Trivial,
            TierArg::Significant => PrestigeTier::Significant,
            TierArg::Exceptional => PrestigeTier::Exceptional,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let text = match &cli.config {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading survey definitions from {}", path.display()))?,
        None => demo::CONFIG_TEXT.to_owned(),
    };
    let nodes = ConfigNode::parse(&text).context("parsing survey definitions")?;
    let catalog = load_catalog(&nodes, &demo::archive());
    let multipliers = load_multipliers(&nodes);
    let world = demo::world();
    let generator = TaskGenerator::new(GeneratorConfig {
        global_seed: cli.seed,
        multipliers,
        home_system: demo::home_system(),
    });
    info!(experiments = catalog.len(), "survey definitions loaded");

    match cli.command {
        CliCommand::Generate { count } => {
            generate(count, cli.tier.into(), generator, &catalog, world);
        }
        CliCommand::Simulate { count } => {
            simulate(count, cli.tier.into(), generator, &catalog, world);
        }
    }
    Ok(())
}

/// Produces up to `count` offers and prints one block per offer.
fn generate(
    count: usize,
    tier: PrestigeTier,
    mut generator: TaskGenerator,
    catalog: &ExperimentCatalog,
    world: World,
) {
    let offers = collect_offers(count, tier, &mut generator, catalog, &world);
    if offers.is_empty() {
        println!("No offers could be generated at this tier.");
        return;
    }
    for (index, state) in offers.iter().enumerate() {
        print_offer(index, state, catalog, world.locations(), &world);
    }
}

/// Accepts `count` tasks, submits scripted results and prints the outcome.
fn simulate(
    count: usize,
    tier: PrestigeTier,
    mut generator: TaskGenerator,
    catalog: &ExperimentCatalog,
    mut world: World,
) {
    let offers = collect_offers(count, tier, &mut generator, catalog, &world);
    if offers.is_empty() {
        println!("No offers could be generated at this tier.");
        return;
    }

    let mut events = Vec::new();
    for state in offers {
        world.apply(
            &Command::AcceptTask {
                state: state.clone(),
            },
            &mut events,
        );
    }
    for event in &events {
        if let Event::TaskAccepted { task, subject } = event {
            println!("Accepted task {}: {subject}", task.get());
        }
    }

    // A deliberately feeble first pass, then the real submissions.
    let matching = Matching::new();
    let weak: Vec<(f32, ResultSubject)> = world
        .tasks()
        .iter()
        .map(|(_, state)| (0.5, result_for(state, world.locations())))
        .collect();
    run_submissions(&weak, &matching, &mut world, catalog);

    let strong: Vec<(f32, ResultSubject)> = world
        .tasks()
        .iter()
        .map(|(_, state)| (state.envelope().science, result_for(state, world.locations())))
        .collect();
    run_submissions(&strong, &matching, &mut world, catalog);

    println!("{} task(s) still active.", world.tasks().len());
}

fn collect_offers(
    count: usize,
    tier: PrestigeTier,
    generator: &mut TaskGenerator,
    catalog: &ExperimentCatalog,
    world: &World,
) -> Vec<TaskState> {
    let mut request = GenerateRequest::new(tier);
    request.reachable = demo::reachable();
    request.next_unreached = demo::next_unreached();
    let mut offers = Vec::new();
    for _ in 0..count.saturating_mul(ATTEMPTS_PER_OFFER) {
        if offers.len() == count {
            break;
        }
        if let Some(state) = generator.generate(
            &request,
            catalog,
            world.locations(),
            world.subjects(),
            world.progression(),
        ) {
            offers.push(state);
        }
    }
    offers
}

fn print_offer(
    index: usize,
    state: &TaskState,
    catalog: &ExperimentCatalog,
    locations: &LocationTable,
    world: &World,
) {
    println!("Offer {}: {}", index + 1, state.title(catalog, locations));
    println!("  {}", state.synopsis(catalog, locations));
    if let Some(story) = story_for(index, state, catalog, locations, world) {
        println!("  {story}");
    }
    let sponsor = state
        .sponsor()
        .map_or(OPEN_SPONSOR, survey_core::SponsorId::as_str);
    println!("  Sponsor: {sponsor}");
    let envelope = state.envelope();
    println!(
        "  Science: {:.0}  Funds: {:.0} up front, {:.0} on completion",
        envelope.science, envelope.funds_forward, envelope.funds_reward
    );
    println!("  Save string: {}", state.encode());
}

/// Renders a narrative blurb for the offer, cycling through the templates.
fn story_for(
    index: usize,
    state: &TaskState,
    catalog: &ExperimentCatalog,
    locations: &LocationTable,
    world: &World,
) -> Option<String> {
    let stories = catalog.stories();
    if stories.is_empty() {
        return None;
    }
    let definition = catalog.get(state.spec().experiment_name())?;
    let location = locations.get(state.spec().location()?)?;
    let sponsor = state
        .sponsor()
        .map_or(OPEN_SPONSOR, survey_core::SponsorId::as_str);
    let part = definition
        .required_part()
        .and_then(|id| world.progression().part(id))
        .map_or("standard instruments", survey_core::PartInfo::title);
    Some(stories[index % stories.len()].render(
        sponsor,
        definition.name(),
        location.display_name(),
        part,
    ))
}

/// Builds the result a dutiful surveyor would submit for the task.
///
/// Region-ambiguous tasks get a result from the first region of their
/// target, the case the prefix matcher exists for.
fn result_for(state: &TaskState, locations: &LocationTable) -> ResultSubject {
    let id = if state.spec().region().is_empty() {
        let region = state
            .spec()
            .location()
            .and_then(|index| locations.get(index))
            .and_then(|location| location.regions().first());
        match region {
            Some(region) => format!("{}{}", state.subject(), region.compact()),
            None => state.subject().as_str().to_owned(),
        }
    } else {
        state.subject().as_str().to_owned()
    };
    ResultSubject::new(id, 1.0)
}

fn run_submissions(
    results: &[(f32, ResultSubject)],
    matching: &Matching,
    world: &mut World,
    catalog: &ExperimentCatalog,
) {
    let mut events = Vec::new();
    for (amount, subject) in results {
        println!("Submitting {:.1} science for {}", amount, subject.id());
        world.apply(
            &Command::SubmitResult {
                amount: *amount,
                subject: subject.clone(),
            },
            &mut events,
        );
    }
    let mut commands = Vec::new();
    matching.handle(&events, world.tasks(), catalog, &mut commands);
    let mut outcomes = Vec::new();
    for command in &commands {
        world.apply(command, &mut outcomes);
    }
    for outcome in &outcomes {
        match outcome {
            Event::TaskCompleted { task } => match world.completed().get(*task) {
                Some(state) => {
                    println!("{}", completion_note(state, catalog, world.locations()));
                }
                None => println!("Task {} completed.", task.get()),
            },
            Event::AdvisoryPosted { task, notice } => {
                println!("Task {}: {}", task.get(), notice.message());
            }
            _ => {}
        }
    }
}

fn completion_note(
    state: &TaskState,
    catalog: &ExperimentCatalog,
    locations: &LocationTable,
) -> String {
    let experiment = catalog
        .get(state.spec().experiment_name())
        .map_or("experiment", |definition| definition.name());
    let location = state
        .spec()
        .location()
        .and_then(|index| locations.get(index))
        .map_or("the target", survey_core::Location::display_name);
    format!("You recovered {experiment} data from {location}, well done.")
}
