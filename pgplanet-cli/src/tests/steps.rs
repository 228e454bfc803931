//! Behaviour-driven step definitions driving the convert CLI scenarios.

use super::helpers::{OsmWorkspace, read_stats};
use super::*;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

/// Aggregates CLI scenario state so each step only needs a single world
/// argument.
struct ConvertWorld {
    workspace: RefCell<Option<OsmWorkspace>>,
    stats_path: RefCell<Option<Utf8PathBuf>>,
    outcome: RefCell<Option<Result<(), CliError>>>,
    script: RefCell<String>,
}

impl ConvertWorld {
    fn new() -> Self {
        Self {
            workspace: RefCell::new(None),
            stats_path: RefCell::new(None),
            outcome: RefCell::new(None),
            script: RefCell::new(String::new()),
        }
    }

    fn input(&self) -> String {
        self.workspace
            .borrow()
            .as_ref()
            .map(|workspace| workspace.input().to_string())
            .expect("an OSM file should exist")
    }

    fn invoke(&self, args: Vec<String>) {
        let mut invocation = vec!["pgplanet".to_owned()];
        invocation.extend(args);
        let mut output = Vec::new();
        let outcome = Cli::try_parse_from(invocation)
            .map_err(CliError::ArgumentParsing)
            .and_then(|cli| resolve_convert_config(cli.args))
            .and_then(|config| execute(&config, &mut output, &CancelFlag::default()));
        self.script
            .replace(String::from_utf8(output).expect("script should be UTF-8"));
        self.outcome.replace(Some(outcome));
    }

    fn outcome(&self) -> std::cell::Ref<'_, Option<Result<(), CliError>>> {
        self.outcome.borrow()
    }
}

#[fixture]
fn world() -> ConvertWorld {
    ConvertWorld::new()
}

#[given("an OSM file on disk")]
fn osm_file_exists(#[from(world)] world: &ConvertWorld) {
    let workspace = OsmWorkspace::new();
    assert!(workspace.input().is_file(), "expected the OSM file on disk");
    world.workspace.replace(Some(workspace));
}

#[when("I run pgplanet with the file path")]
fn run_with_path(#[from(world)] world: &ConvertWorld) {
    world.invoke(vec![world.input()]);
}

#[when("I run pgplanet choosing table {table:word} with duplicate suppression")]
fn run_with_table_and_dedup(#[from(world)] world: &ConvertWorld, table: String) {
    world.invoke(vec![
        format!("--{ARG_TABLE}={}", table.trim_matches('"')),
        format!("--{ARG_SUPPRESS_DUPLICATES}=true"),
        world.input(),
    ]);
}

#[when("I run pgplanet with the file path and a statistics file")]
fn run_with_stats(#[from(world)] world: &ConvertWorld) {
    let stats_path = world
        .workspace
        .borrow()
        .as_ref()
        .map(|workspace| workspace.path("stats.json"))
        .expect("an OSM file should exist");
    world.stats_path.replace(Some(stats_path.clone()));
    world.invoke(vec![
        format!("--{ARG_STATS_JSON}={stats_path}"),
        world.input(),
    ]);
}

#[when("I run pgplanet with the file path twice")]
fn run_with_two_paths(#[from(world)] world: &ConvertWorld) {
    world.invoke(vec![world.input(), world.input()]);
}

#[when("I run pgplanet without arguments")]
fn run_without_arguments(#[from(world)] world: &ConvertWorld) {
    world.invoke(Vec::new());
}

#[then("the run succeeds")]
fn run_succeeds(#[from(world)] world: &ConvertWorld) {
    match world.outcome().as_ref() {
        Some(Ok(())) => {}
        Some(Err(err)) => panic!("expected success, found {err:?}"),
        None => panic!("pgplanet was not run"),
    }
}

#[then("the script creates the {table:word} table")]
fn script_creates_table(#[from(world)] world: &ConvertWorld, table: String) {
    let table = table.trim_matches('"');
    let script = world.script.borrow();
    assert!(
        script.contains(&format!("CREATE TABLE {table} (")),
        "unexpected script:\n{script}"
    );
    assert!(script.ends_with(&format!("VACUUM ANALYZE {table};\n")));
}

#[then("the script contains {count} rows")]
fn script_row_count(#[from(world)] world: &ConvertWorld, count: usize) {
    assert_eq!(world.script.borrow().matches("INSERT INTO").count(), count);
}

#[then("the statistics report {count} emitted nodes")]
fn statistics_report_nodes(#[from(world)] world: &ConvertWorld, count: u64) {
    let path = world
        .stats_path
        .borrow()
        .clone()
        .expect("a statistics path should be chosen");
    assert_eq!(read_stats(&path)["points"]["emitted"], count);
}

#[then("argument parsing fails")]
fn argument_parsing_fails(#[from(world)] world: &ConvertWorld) {
    match world.outcome().as_ref() {
        Some(Err(CliError::ArgumentParsing(_))) => {}
        other => panic!("expected an argument error, found {other:?}"),
    }
}

#[then("the input is reported missing")]
fn input_reported_missing(#[from(world)] world: &ConvertWorld) {
    match world.outcome().as_ref() {
        Some(Err(CliError::MissingArgument { field, .. })) => assert_eq!(*field, ARG_INPUT),
        other => panic!("expected MissingArgument, found {other:?}"),
    }
    assert!(world.script.borrow().is_empty());
}

macro_rules! register_convert_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/convert_command.feature", name = $scenario_title)]
        fn $fn_name(world: ConvertWorld) {
            let _ = world;
        }
    };
}

register_convert_scenario!(converting_named_file, "converting a file named on the command line");
register_convert_scenario!(
    choosing_table_and_dedup,
    "choosing the table and suppressing duplicates"
);
register_convert_scenario!(writing_statistics, "writing run statistics");
register_convert_scenario!(rejecting_extra_arguments, "rejecting extra positional arguments");
register_convert_scenario!(rejecting_missing_input, "rejecting a missing input");
