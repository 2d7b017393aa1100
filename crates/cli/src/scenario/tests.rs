use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;

const TABS: &str = r#"
[[items]]
name = "a"

[[items]]
name = "b"

[[collections]]
name = "tabs"
kind = "single"
members = ["a", "b"]

[[collections]]
name = "picks"
kind = "multi"
members = ["a", "b"]
"#;

const PICKS: &str = r#"
[[items]]
name = "a"

[[items]]
name = "b"

[[collections]]
name = "picks"
kind = "multi"
members = ["a", "b"]
"#;

fn runner(extra: &str) -> (Runner, Vec<Step>) {
	runner_over(TABS, extra)
}

fn runner_over(base: &str, extra: &str) -> (Runner, Vec<Step>) {
	let scenario = Scenario::parse(&format!("{base}{extra}")).unwrap();
	(Runner::new(&scenario).unwrap(), scenario.steps)
}

fn run_all(runner: &mut Runner, steps: &[Step]) -> Vec<Vec<String>> {
	steps.iter().map(|step| runner.run_step(step).unwrap()).collect()
}

#[test]
fn select_in_a_shared_single_collection() {
	let (mut runner, steps) = runner(
		r#"
[[steps]]
op = "select"
collection = "tabs"
item = "a"

[[steps]]
op = "select"
collection = "tabs"
item = "b"
"#,
	);

	let transcript = run_all(&mut runner, &steps);

	assert_eq!(
		transcript[0],
		vec![
			"select:one:selected tabs a",
			"selected:selected a",
			"select:some:selected picks +[a] -[]",
		]
	);
	assert_eq!(
		transcript[1],
		vec![
			"deselect:one:selected tabs a",
			"deselected:selected a",
			"select:some:selected picks +[b] -[a]",
			"select:one:selected tabs b",
			"selected:selected b",
		]
	);
}

#[test]
fn membership_and_labels() {
	let (mut runner, steps) = runner_over(
		PICKS,
		r#"
[[steps]]
op = "select_all"
collection = "picks"
label = "starred"

[[steps]]
op = "remove"
collection = "picks"
items = ["a"]
silent = true

[[steps]]
op = "deselect"
collection = "picks"
label = "starred"
"#,
	);

	let transcript = run_all(&mut runner, &steps);

	assert_eq!(transcript[0][0], "select:all:starred picks +[a, b] -[]");
	assert!(transcript[1].is_empty());
	assert_eq!(transcript[2], vec!["select:none:starred picks +[] -[b]", "deselected:starred b"]);
	let starred = Label::new("starred").unwrap();
	assert!(!runner.selections.is_selected(runner.items["a"], &starred));
}

#[test]
fn check_counts_entities() {
	let (runner, steps) = runner("");
	assert_eq!(runner.item_count(), 2);
	assert_eq!(runner.collection_count(), 2);
	assert!(steps.is_empty());
}

#[test]
fn missing_members_is_a_config_error() {
	let scenario = Scenario::parse(
		r#"
[[collections]]
name = "tabs"
kind = "single"
"#,
	)
	.unwrap();
	let Err(err) = Runner::new(&scenario) else {
		panic!("setup without members must fail");
	};
	assert!(matches!(
		err,
		ScenarioError::Config(ConfigError::MissingField(field)) if field == "collections.tabs.members"
	));
}

#[rstest]
#[case::unknown_field("[[items]]\nname = \"a\"\ncolour = \"red\"\n")]
#[case::unknown_kind("[[collections]]\nname = \"c\"\nkind = \"double\"\nmembers = []\n")]
#[case::unknown_op("[[steps]]\nop = \"select_many\"\n")]
fn malformed_scenarios_are_rejected(#[case] text: &str) {
	assert!(matches!(Scenario::parse(text), Err(ScenarioError::Parse(_))));
}

#[rstest]
#[case::reserved("[[items]]\nname = \"a\"\nconfig = { default_label = \"select\" }\n")]
#[case::ignored_default(
	"[[collections]]\nname = \"c\"\nkind = \"multi\"\nmembers = []\nconfig = { ignored_labels = [\"selected\"] }\n"
)]
fn invalid_configs_fail_setup(#[case] text: &str) {
	let scenario = Scenario::parse(text).unwrap();
	assert!(matches!(Runner::new(&scenario), Err(ScenarioError::Select(SelectError::Config(_)))));
}

#[test]
fn unknown_references_are_reported() {
	let scenario = Scenario::parse("[[collections]]\nname = \"c\"\nkind = \"multi\"\nmembers = [\"ghost\"]\n").unwrap();
	assert!(matches!(Runner::new(&scenario), Err(ScenarioError::UnknownItem(name)) if name == "ghost"));

	let (mut runner, steps) = runner("[[steps]]\nop = \"select_all\"\ncollection = \"nowhere\"\n");
	assert!(matches!(
		runner.run_step(&steps[0]),
		Err(ScenarioError::UnknownCollection(name)) if name == "nowhere"
	));
}

#[test]
fn missing_step_fields_are_reported() {
	let (mut runner, steps) = runner("[[steps]]\nop = \"select\"\ncollection = \"tabs\"\n");
	assert!(matches!(
		runner.run_step(&steps[0]),
		Err(ScenarioError::Config(ConfigError::MissingField(field))) if field == "select.item"
	));
}

#[test]
fn closed_collections_reject_further_steps() {
	let (mut runner, steps) = runner(
		r#"
[[steps]]
op = "close"
collection = "tabs"

[[steps]]
op = "select"
collection = "tabs"
item = "a"
"#,
	);
	assert!(runner.run_step(&steps[0]).unwrap().is_empty());
	assert!(matches!(
		runner.run_step(&steps[1]),
		Err(ScenarioError::Select(SelectError::UnknownCollection(_)))
	));
}
