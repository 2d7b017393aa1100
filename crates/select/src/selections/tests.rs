use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;
use crate::error::ConfigError;
use crate::log::EventLog;

fn label(name: &str) -> Label {
	Label::new(name).unwrap()
}

fn items<const N: usize>(sel: &mut Selections) -> [ItemId; N] {
	std::array::from_fn(|_| sel.create_item(&ItemConfig::default()).unwrap())
}

#[test]
fn ids_are_never_reused() {
	let mut sel = Selections::new();
	let a = sel.create_item(&ItemConfig::default()).unwrap();
	let c = sel.create_multi(&CollectionConfig::default(), [a]).unwrap();
	sel.close(c, MembershipOptions::default()).unwrap();
	let d = sel.create_multi(&CollectionConfig::default(), [a]).unwrap();
	assert_ne!(c, d);
	assert_eq!(sel.select_all(c, SelectOptions::default()), Err(SelectError::UnknownCollection(c)));
}

#[test]
fn unknown_member_rejects_creation() {
	let mut sel = Selections::new();
	let mut other = Selections::new();
	let [.., stray] = items::<3>(&mut other);
	let err = sel.create_single(&CollectionConfig::default(), [stray]).unwrap_err();
	assert_eq!(err, SelectError::UnknownItem(stray));
	assert_eq!(sel.collection_ids().count(), 0);
}

#[test]
fn invalid_config_rejects_creation() {
	let mut sel = Selections::new();
	let err = sel
		.create_multi(&CollectionConfig::default().ignore("selected"), [])
		.unwrap_err();
	assert_eq!(err, SelectError::Config(ConfigError::IgnoredDefaultLabel("selected".into())));

	let err = sel
		.create_item(&ItemConfig::default().with_default_label("select"))
		.unwrap_err();
	assert_eq!(err, SelectError::Config(ConfigError::ReservedLabel("select".into())));
}

#[rstest]
#[case::select_all("select_all")]
#[case::deselect_all("deselect_all")]
#[case::select_none("select_none")]
#[case::invert_selection("invert_selection")]
#[case::toggle_select_all("toggle_select_all")]
fn bulk_operations_need_multi(#[case] operation: &'static str) {
	let mut sel = Selections::new();
	let [a] = items(&mut sel);
	let c = sel.create_single(&CollectionConfig::default(), [a]).unwrap();
	let opts = SelectOptions::default();
	let result = match operation {
		"select_all" => sel.select_all(c, opts),
		"deselect_all" => sel.deselect_all(c, opts),
		"select_none" => sel.select_none(c, opts),
		"invert_selection" => sel.invert_selection(c, opts),
		_ => sel.toggle_select_all(c, opts),
	};
	assert_eq!(
		result,
		Err(SelectError::WrongKind {
			operation,
			collection: c,
			expected: CollectionKind::Multi,
			actual: CollectionKind::Single,
		})
	);
	assert!(!sel.is_selected(a, &Label::selected()));
}

#[test]
fn select_requires_membership() {
	let mut sel = Selections::new();
	let [a, b] = items(&mut sel);
	let c = sel.create_single(&CollectionConfig::default(), [a]).unwrap();
	assert_eq!(
		sel.select(c, b, SelectOptions::default()),
		Err(SelectError::NotMember { collection: c, item: b })
	);
	assert!(!sel.is_selected(b, &Label::selected()));
}

#[test]
fn observer_kind_is_checked() {
	let mut sel = Selections::new();
	let c = sel.create_single(&CollectionConfig::default(), []).unwrap();
	let err = sel.observe_multi(c, Topic::Any, EventLog::new()).unwrap_err();
	assert!(matches!(err, SelectError::WrongKind { operation: "observe_multi", .. }));
	assert!(sel.observe_single(c, Topic::Any, EventLog::new()).is_ok());
}

#[test]
fn unobserve_stops_delivery() {
	let mut sel = Selections::new();
	let [a] = items(&mut sel);
	let log = EventLog::new();
	let id = sel.observe_item(a, Topic::Any, log.clone()).unwrap();
	sel.select_item(a, SelectOptions::default()).unwrap();
	assert!(sel.unobserve(id));
	assert!(!sel.unobserve(id));
	sel.deselect_item(a, SelectOptions::default()).unwrap();
	assert_eq!(log.channels(), vec!["selected"]);
}

#[test]
fn creation_takes_over_preselected_members() {
	let mut sel = Selections::new();
	let [a, b, c] = items(&mut sel);
	sel.select_item(a, SelectOptions::default()).unwrap();
	sel.select_item(c, SelectOptions::default()).unwrap();

	let multi = sel.create_multi(&CollectionConfig::default(), [a, b, c]).unwrap();
	assert_eq!(sel.selected_items(multi, &Label::selected()), vec![a, c]);
	assert_eq!(sel.selected_count(multi, &Label::selected()), 2);

	let single = sel.create_single(&CollectionConfig::default(), [a, b, c]).unwrap();
	assert_eq!(sel.selected_item(single, &Label::selected()), Some(c));
	assert!(!sel.is_selected(a, &Label::selected()));
	// Losing `a` in the single-select collection releases it everywhere.
	assert_eq!(sel.selected_items(multi, &Label::selected()), vec![c]);
}

#[test]
fn adding_a_member_twice_is_skipped() {
	let mut sel = Selections::new();
	let [a] = items(&mut sel);
	let c = sel.create_multi(&CollectionConfig::default(), [a]).unwrap();
	let log = EventLog::new();
	sel.observe_membership(c, log.clone()).unwrap();

	sel.add_members(c, [a, a], MembershipOptions::default()).unwrap();
	sel.remove_members(c, [a], MembershipOptions::default()).unwrap();
	sel.remove_members(c, [a], MembershipOptions::default()).unwrap();

	assert_eq!(log.channels(), vec!["remove"]);
	assert!(sel.owners(a).is_empty());
}

#[test]
fn deselecting_an_unselected_item_registers_the_label() {
	let mut sel = Selections::new();
	let [a] = items(&mut sel);
	let c = sel.create_multi(&CollectionConfig::default(), [a]).unwrap();
	let log = EventLog::new();
	sel.observe_multi(c, Topic::Any, log.clone()).unwrap();

	sel.deselect_item(a, SelectOptions::label(label("starred"))).unwrap();

	assert_eq!(sel.labels(c), vec![label("starred")]);
	assert!(log.is_empty());
	assert_eq!(sel.flags(a), vec![(label("starred"), false)]);
}

#[test]
fn ignored_labels_do_not_reach_the_collection() {
	let mut sel = Selections::new();
	let [a] = items(&mut sel);
	let c = sel
		.create_single(&CollectionConfig::default().ignore("starred"), [a])
		.unwrap();

	sel.select_item(a, SelectOptions::label(label("starred"))).unwrap();
	assert!(sel.is_selected(a, &label("starred")));
	assert_eq!(sel.selected_item(c, &label("starred")), None);
	assert!(sel.labels(c).is_empty());

	sel.select(c, a, SelectOptions::label(label("starred"))).unwrap();
	assert_eq!(sel.selected_item(c, &label("starred")), None);
}

#[test]
fn ignoring_collection_does_not_keep_the_item_selected() {
	let mut sel = Selections::new();
	let [a] = items(&mut sel);
	let tracking = sel.create_multi(&CollectionConfig::default(), [a]).unwrap();
	let ignoring = sel
		.create_multi(&CollectionConfig::default().ignore("starred"), [a])
		.unwrap();
	let starred = SelectOptions::label(label("starred"));

	sel.select(tracking, a, starred).unwrap();
	assert!(sel.selected_items(ignoring, &label("starred")).is_empty());

	sel.remove_members(tracking, [a], MembershipOptions::default()).unwrap();
	assert!(!sel.is_selected(a, &label("starred")));
	assert_eq!(sel.owners(a), vec![ignoring]);
}

#[test]
fn close_releases_members_unless_claimed_elsewhere() {
	let mut sel = Selections::new();
	let [a, b] = items(&mut sel);
	let first = sel.create_multi(&CollectionConfig::default(), [a, b]).unwrap();
	let second = sel.create_single(&CollectionConfig::default(), [b]).unwrap();
	sel.select_all(first, SelectOptions::default()).unwrap();

	let log = EventLog::new();
	sel.observe_multi(first, Topic::Any, log.clone()).unwrap();
	sel.observe_item(a, Topic::Any, log.clone()).unwrap();
	sel.close(first, MembershipOptions::default()).unwrap();

	assert!(!sel.contains_collection(first));
	assert!(!sel.is_selected(a, &Label::selected()));
	assert!(sel.is_selected(b, &Label::selected()));
	assert_eq!(sel.selected_item(second, &Label::selected()), Some(b));
	assert_eq!(log.channels(), vec!["deselected"]);
	assert_eq!(sel.owners(b), vec![second]);
}

#[test]
fn toggle_select_all_flips_between_all_and_none() {
	let mut sel = Selections::new();
	let ids: [ItemId; 3] = items(&mut sel);
	let c = sel.create_multi(&CollectionConfig::default(), ids).unwrap();
	sel.select(c, ids[0], SelectOptions::default()).unwrap();

	sel.toggle_select_all(c, SelectOptions::default()).unwrap();
	assert_eq!(sel.selected_count(c, &Label::selected()), 3);
	sel.toggle_select_all(c, SelectOptions::default()).unwrap();
	assert_eq!(sel.selected_count(c, &Label::selected()), 0);
}

#[test]
fn labels_are_independent() {
	let mut sel = Selections::new();
	let [a, b] = items(&mut sel);
	let c = sel.create_single(&CollectionConfig::default(), [a, b]).unwrap();
	let starred = label("starred");

	sel.select(c, a, SelectOptions::default()).unwrap();
	sel.select(c, b, SelectOptions::label(starred.clone())).unwrap();

	assert_eq!(sel.selected_item(c, &Label::selected()), Some(a));
	assert_eq!(sel.selected_item(c, &starred), Some(b));
	assert_eq!(sel.labels(c), vec![Label::selected(), starred]);
}

#[test]
fn collection_default_label_applies_to_its_calls() {
	let mut sel = Selections::new();
	let [a] = items(&mut sel);
	let c = sel
		.create_multi(&CollectionConfig::default().with_default_label("picked"), [a])
		.unwrap();
	sel.select(c, a, SelectOptions::default()).unwrap();
	assert!(sel.is_selected(a, &label("picked")));
	assert!(!sel.is_selected(a, &Label::selected()));
}
