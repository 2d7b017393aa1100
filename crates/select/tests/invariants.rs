//! Random operation sequences over overlapping collections, checking the
//! cross-collection invariants and the delivered item events after every
//! step.

use proptest::prelude::*;
use rustc_hash::FxHashMap;
use tandem_select::{
	CollectionConfig, CollectionId, CollectionKind, EventLog, ItemConfig, ItemEventKind, ItemId, Label,
	MembershipOptions, SelectOptions, SelectionEvent, Selections, Topic,
};

const ITEMS: usize = 5;

#[derive(Debug, Clone, Copy)]
enum Bulk {
	SelectAll,
	DeselectAll,
	Invert,
	Toggle,
}

#[derive(Debug, Clone)]
enum Op {
	SelectItem { item: usize, starred: bool, silent: bool },
	DeselectItem { item: usize, starred: bool },
	ToggleItem { item: usize, starred: bool },
	Select { collection: usize, item: usize, starred: bool, exclusive: bool },
	Deselect { collection: usize, item: Option<usize>, starred: bool },
	Bulk { collection: usize, starred: bool, action: Bulk },
	Add { collection: usize, item: usize, silent: bool },
	Remove { collection: usize, item: usize, silent: bool },
	Reset { collection: usize, items: Vec<usize> },
}

fn arb_op() -> impl Strategy<Value = Op> {
	let item = 0..ITEMS;
	let collection = 0..4usize;
	prop_oneof![
		(item.clone(), any::<bool>(), any::<bool>())
			.prop_map(|(item, starred, silent)| Op::SelectItem { item, starred, silent }),
		(item.clone(), any::<bool>()).prop_map(|(item, starred)| Op::DeselectItem { item, starred }),
		(item.clone(), any::<bool>()).prop_map(|(item, starred)| Op::ToggleItem { item, starred }),
		(collection.clone(), item.clone(), any::<bool>(), any::<bool>()).prop_map(
			|(collection, item, starred, exclusive)| Op::Select {
				collection,
				item,
				starred,
				exclusive
			}
		),
		(collection.clone(), proptest::option::of(item.clone()), any::<bool>())
			.prop_map(|(collection, item, starred)| Op::Deselect { collection, item, starred }),
		(
			collection.clone(),
			any::<bool>(),
			prop::sample::select(vec![Bulk::SelectAll, Bulk::DeselectAll, Bulk::Invert, Bulk::Toggle])
		)
			.prop_map(|(collection, starred, action)| Op::Bulk {
				collection,
				starred,
				action
			}),
		(collection.clone(), item.clone(), any::<bool>())
			.prop_map(|(collection, item, silent)| Op::Add { collection, item, silent }),
		(collection.clone(), item.clone(), any::<bool>())
			.prop_map(|(collection, item, silent)| Op::Remove { collection, item, silent }),
		(collection, proptest::collection::vec(item, 0..ITEMS))
			.prop_map(|(collection, items)| Op::Reset { collection, items }),
	]
}

struct World {
	sel: Selections,
	items: [ItemId; ITEMS],
	collections: [CollectionId; 4],
	/// Every item event, on the plain channel.
	log: EventLog,
}

impl World {
	/// Two single-select and two multi-select collections sharing items.
	fn new() -> Self {
		let mut sel = Selections::new();
		let items: [ItemId; ITEMS] = std::array::from_fn(|_| sel.create_item(&ItemConfig::default()).unwrap());
		let config = CollectionConfig::default();
		let collections = [
			sel.create_single(&config, [items[0], items[1], items[2]]).unwrap(),
			sel.create_single(&config, [items[2], items[3], items[4]]).unwrap(),
			sel.create_multi(&config, [items[0], items[1], items[2], items[3]]).unwrap(),
			sel.create_multi(&config, [items[1], items[3], items[4]]).unwrap(),
		];
		let log = EventLog::new();
		for &item in &items {
			sel.observe_item(item, Topic::Any, log.clone()).unwrap();
		}
		Self {
			sel,
			items,
			collections,
			log,
		}
	}

	fn apply(&mut self, op: &Op) -> Result<(), TestCaseError> {
		let sel = &mut self.sel;
		let item = |index: usize| self.items[index];
		let collection = |index: usize| self.collections[index];
		// Membership and kind mismatches are rejected up front and are part
		// of the generated noise.
		let _ = match op {
			Op::SelectItem { item: i, starred, silent } => {
				sel.select_item(item(*i), opts(*starred).with_silent(*silent))
			}
			Op::DeselectItem { item: i, starred } => sel.deselect_item(item(*i), opts(*starred)),
			Op::ToggleItem { item: i, starred } => sel.toggle_item(item(*i), opts(*starred)),
			Op::Select {
				collection: c,
				item: i,
				starred,
				exclusive,
			} => sel.select(collection(*c), item(*i), opts(*starred).with_exclusive(*exclusive)),
			Op::Deselect {
				collection: c,
				item: i,
				starred,
			} => sel.deselect(collection(*c), i.map(item), opts(*starred)),
			Op::Bulk {
				collection: c,
				starred,
				action,
			} => {
				let (c, options) = (collection(*c), opts(*starred));
				match action {
					Bulk::SelectAll => sel.select_all(c, options),
					Bulk::DeselectAll => sel.deselect_all(c, options),
					Bulk::Invert => sel.invert_selection(c, options),
					Bulk::Toggle => sel.toggle_select_all(c, options),
				}
			}
			Op::Add {
				collection: c,
				item: i,
				silent,
			} => sel.add_members(collection(*c), [item(*i)], MembershipOptions { silent: *silent }),
			Op::Remove {
				collection: c,
				item: i,
				silent,
			} => {
				let (c, i) = (collection(*c), item(*i));
				let was_member = sel.is_member(c, i);
				let before: Vec<Label> = labels().into_iter().filter(|l| sel.is_selected(i, l)).collect();
				sel.remove_members(c, [i], MembershipOptions { silent: *silent })
					.map_err(|err| TestCaseError::fail(err.to_string()))?;
				if was_member {
					let kept = !sel.owners(i).is_empty();
					for label in before {
						prop_assert_eq!(
							sel.is_selected(i, &label),
							kept,
							"{} removed from {} with owners {:?}",
							i,
							c,
							sel.owners(i)
						);
					}
				}
				Ok(())
			}
			Op::Reset { collection: c, items } => sel.reset_members(
				collection(*c),
				items.iter().map(|&i| item(i)),
				MembershipOptions::default(),
			),
		};
		Ok(())
	}

	fn check(&self) -> Result<(), TestCaseError> {
		let sel = &self.sel;
		for &collection in &self.collections {
			let members = sel.members(collection);
			for label in labels() {
				let flagged: Vec<ItemId> =
					members.iter().copied().filter(|&member| sel.is_selected(member, &label)).collect();
				match sel.kind(collection) {
					Some(CollectionKind::Single) => {
						let holder: Vec<ItemId> = sel.selected_item(collection, &label).into_iter().collect();
						prop_assert!(flagged.len() <= 1, "{} has {:?} flagged for {}", collection, flagged, label);
						prop_assert_eq!(&flagged, &holder, "{} holder for {}", collection, label);
					}
					Some(CollectionKind::Multi) => {
						let mut selected = sel.selected_items(collection, &label);
						let mut expected = flagged.clone();
						selected.sort();
						expected.sort();
						prop_assert_eq!(&selected, &expected, "{} selection for {}", collection, label);
						prop_assert_eq!(sel.selected_count(collection, &label), expected.len());
					}
					None => prop_assert!(false, "{} vanished", collection),
				}
			}
		}
		for &item in &self.items {
			let mut owners = sel.owners(item);
			let mut expected: Vec<CollectionId> =
				self.collections.iter().copied().filter(|&c| sel.is_member(c, item)).collect();
			owners.sort();
			expected.sort();
			prop_assert_eq!(owners, expected, "owners of {}", item);
		}
		Ok(())
	}
}

impl World {
	/// Each item reports at most one change per label and operation, and the
	/// last event it receives agrees with its final flag.
	fn check_events(&self) -> Result<(), TestCaseError> {
		let mut changes: FxHashMap<(ItemId, Label), usize> = FxHashMap::default();
		let mut last: FxHashMap<(ItemId, Label), ItemEventKind> = FxHashMap::default();
		for entry in self.log.take() {
			let SelectionEvent::Item(event) = entry.event else {
				continue;
			};
			let key = (event.item, event.options.label.clone());
			if event.kind != ItemEventKind::Reselected {
				*changes.entry(key.clone()).or_default() += 1;
			}
			last.insert(key, event.kind);
		}
		for ((item, label), count) in changes {
			prop_assert!(count <= 1, "{} reported {} changes for {}", item, count, label);
		}
		for ((item, label), kind) in last {
			let expected = kind != ItemEventKind::Deselected;
			prop_assert_eq!(
				self.sel.is_selected(item, &label),
				expected,
				"{} ended with {:?} for {}",
				item,
				kind,
				label
			);
		}
		Ok(())
	}
}

fn labels() -> [Label; 2] {
	[Label::selected(), Label::new("starred").unwrap()]
}

fn opts(starred: bool) -> SelectOptions {
	if starred {
		SelectOptions::label(Label::new("starred").unwrap())
	} else {
		SelectOptions::default()
	}
}

proptest! {
	/// Single-select exclusivity, multi-select count consistency, owner
	/// bookkeeping and net item events hold after every operation.
	#[test]
	fn prop_invariants_hold(ops in proptest::collection::vec(arb_op(), 1..40)) {
		let mut world = World::new();
		world.check()?;
		for op in &ops {
			world.apply(op)?;
			world.check()?;
			world.check_events()?;
		}
	}

	/// Silent calls reach the same state as loud ones.
	#[test]
	fn prop_silence_does_not_change_state(ops in proptest::collection::vec(arb_op(), 1..30)) {
		let mut loud = World::new();
		let mut quiet = World::new();
		for op in &ops {
			loud.apply(op)?;
			quiet.apply(&silenced(op))?;
		}
		for (&a, &b) in loud.items.iter().zip(&quiet.items) {
			prop_assert_eq!(loud.sel.flags(a), quiet.sel.flags(b));
		}
		for (&a, &b) in loud.collections.iter().zip(&quiet.collections) {
			for label in labels() {
				prop_assert_eq!(loud.sel.selected_items(a, &label), quiet.sel.selected_items(b, &label));
			}
		}
	}
}

fn silenced(op: &Op) -> Op {
	match op.clone() {
		Op::SelectItem { item, starred, .. } => Op::SelectItem {
			item,
			starred,
			silent: true,
		},
		Op::Add { collection, item, .. } => Op::Add {
			collection,
			item,
			silent: true,
		},
		Op::Remove { collection, item, .. } => Op::Remove {
			collection,
			item,
			silent: true,
		},
		other => other,
	}
}
