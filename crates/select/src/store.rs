//! Entity state owned by [`crate::Selections`].
//!
//! [`Store`] is what observers see during delivery: a read-only view of the
//! final state of the operation that produced the event.

use indexmap::{IndexMap, IndexSet};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::ids::{CollectionId, ItemId};
use crate::label::Label;

/// Whether a collection holds one or many selected items per label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
	Single,
	Multi,
}

#[derive(Debug, Clone)]
pub(crate) struct ItemState {
	pub default_label: Label,
	pub flags: IndexMap<Label, bool>,
	/// Collections this item is registered with, in registration order.
	pub owners: IndexSet<CollectionId>,
}

impl ItemState {
	pub fn new(default_label: Label) -> Self {
		Self {
			default_label,
			flags: IndexMap::new(),
			owners: IndexSet::new(),
		}
	}

	pub fn flag(&self, label: &Label) -> bool {
		self.flags.get(label).copied().unwrap_or(false)
	}

	/// Labels currently set on this item, in first-seen order.
	pub fn selected_labels(&self) -> Vec<Label> {
		self.flags.iter().filter(|&(_, &on)| on).map(|(label, _)| label.clone()).collect()
	}
}

/// Per-label claims of a collection.
#[derive(Debug, Clone)]
pub(crate) enum Claims {
	Single(IndexMap<Label, Option<ItemId>>),
	Multi {
		selected: IndexMap<Label, IndexSet<ItemId>>,
		/// Cached `selected[label].len()`.
		count: IndexMap<Label, usize>,
	},
}

#[derive(Debug, Clone)]
pub(crate) struct CollectionState {
	pub default_label: Label,
	pub ignored: FxHashSet<Label>,
	/// Labels seen by this collection, including message-only signals.
	pub labels: IndexSet<Label>,
	pub members: IndexSet<ItemId>,
	pub claims: Claims,
}

impl CollectionState {
	pub fn new(kind: CollectionKind, default_label: Label, ignored: FxHashSet<Label>) -> Self {
		let claims = match kind {
			CollectionKind::Single => Claims::Single(IndexMap::new()),
			CollectionKind::Multi => Claims::Multi {
				selected: IndexMap::new(),
				count: IndexMap::new(),
			},
		};
		Self {
			default_label,
			ignored,
			labels: IndexSet::new(),
			members: IndexSet::new(),
			claims,
		}
	}

	pub fn kind(&self) -> CollectionKind {
		match self.claims {
			Claims::Single(_) => CollectionKind::Single,
			Claims::Multi { .. } => CollectionKind::Multi,
		}
	}

	pub fn tracks(&self, label: &Label) -> bool {
		!self.ignored.contains(label)
	}

	pub fn register(&mut self, label: &Label) {
		if !self.labels.contains(label) {
			self.labels.insert(label.clone());
		}
	}

	pub fn holder(&self, label: &Label) -> Option<ItemId> {
		match &self.claims {
			Claims::Single(selected) => selected.get(label).copied().flatten(),
			Claims::Multi { .. } => None,
		}
	}

	pub fn set_holder(&mut self, label: &Label, item: Option<ItemId>) {
		if let Claims::Single(selected) = &mut self.claims {
			selected.insert(label.clone(), item);
		}
	}

	/// The selected set of a multi-select collection; empty for single.
	pub fn selected_set(&self, label: &Label) -> IndexSet<ItemId> {
		match &self.claims {
			Claims::Multi { selected, .. } => selected.get(label).cloned().unwrap_or_default(),
			Claims::Single(_) => IndexSet::new(),
		}
	}

	pub fn multi_contains(&self, label: &Label, item: ItemId) -> bool {
		match &self.claims {
			Claims::Multi { selected, .. } => selected.get(label).is_some_and(|set| set.contains(&item)),
			Claims::Single(_) => false,
		}
	}

	/// Inserts into a multi-select set, keeping the cached count in step.
	/// Returns false when the item was already present.
	pub fn multi_insert(&mut self, label: &Label, item: ItemId) -> bool {
		let Claims::Multi { selected, count } = &mut self.claims else {
			return false;
		};
		let set = selected.entry(label.clone()).or_default();
		let inserted = set.insert(item);
		count.insert(label.clone(), set.len());
		inserted
	}

	/// Removes from a multi-select set, keeping the cached count in step.
	pub fn multi_remove(&mut self, label: &Label, item: ItemId) -> bool {
		let Claims::Multi { selected, count } = &mut self.claims else {
			return false;
		};
		let set = selected.entry(label.clone()).or_default();
		let removed = set.shift_remove(&item);
		count.insert(label.clone(), set.len());
		removed
	}

	pub fn multi_replace(&mut self, label: &Label, set: IndexSet<ItemId>) {
		if let Claims::Multi { selected, count } = &mut self.claims {
			count.insert(label.clone(), set.len());
			selected.insert(label.clone(), set);
		}
	}

	pub fn count(&self, label: &Label) -> usize {
		match &self.claims {
			Claims::Multi { count, .. } => count.get(label).copied().unwrap_or(0),
			Claims::Single(selected) => usize::from(selected.get(label).copied().flatten().is_some()),
		}
	}

	/// Whether this collection claims `item` for `label`.
	pub fn claims(&self, label: &Label, item: ItemId) -> bool {
		match &self.claims {
			Claims::Single(_) => self.holder(label) == Some(item),
			Claims::Multi { .. } => self.multi_contains(label, item),
		}
	}

	/// Labels for which this collection claims `item`.
	pub fn claimed_labels(&self, item: ItemId) -> Vec<Label> {
		match &self.claims {
			Claims::Single(selected) => selected
				.iter()
				.filter(|&(_, holder)| *holder == Some(item))
				.map(|(label, _)| label.clone())
				.collect(),
			Claims::Multi { selected, .. } => selected
				.iter()
				.filter(|(_, set)| set.contains(&item))
				.map(|(label, _)| label.clone())
				.collect(),
		}
	}
}

/// Every item and collection of one arena.
#[derive(Debug, Default)]
pub struct Store {
	pub(crate) items: FxHashMap<ItemId, ItemState>,
	pub(crate) collections: FxHashMap<CollectionId, CollectionState>,
}

impl Store {
	pub(crate) fn item(&self, id: ItemId) -> Option<&ItemState> {
		self.items.get(&id)
	}

	pub(crate) fn item_mut(&mut self, id: ItemId) -> Option<&mut ItemState> {
		self.items.get_mut(&id)
	}

	pub(crate) fn collection(&self, id: CollectionId) -> Option<&CollectionState> {
		self.collections.get(&id)
	}

	pub(crate) fn collection_mut(&mut self, id: CollectionId) -> Option<&mut CollectionState> {
		self.collections.get_mut(&id)
	}

	pub fn contains_item(&self, item: ItemId) -> bool {
		self.items.contains_key(&item)
	}

	pub fn contains_collection(&self, collection: CollectionId) -> bool {
		self.collections.contains_key(&collection)
	}

	/// Whether `item` carries `label`. Unknown items are not selected.
	pub fn is_selected(&self, item: ItemId, label: &Label) -> bool {
		self.item(item).is_some_and(|state| state.flag(label))
	}

	/// Every label ever set on `item` with its current value.
	pub fn flags(&self, item: ItemId) -> Vec<(Label, bool)> {
		self.item(item)
			.map(|state| state.flags.iter().map(|(label, &on)| (label.clone(), on)).collect())
			.unwrap_or_default()
	}

	pub fn default_item_label(&self, item: ItemId) -> Option<&Label> {
		self.item(item).map(|state| &state.default_label)
	}

	/// Collections `item` is registered with, in registration order.
	pub fn owners(&self, item: ItemId) -> Vec<CollectionId> {
		self.item(item).map(|state| state.owners.iter().copied().collect()).unwrap_or_default()
	}

	pub fn kind(&self, collection: CollectionId) -> Option<CollectionKind> {
		self.collection(collection).map(CollectionState::kind)
	}

	pub fn members(&self, collection: CollectionId) -> Vec<ItemId> {
		self.collection(collection)
			.map(|state| state.members.iter().copied().collect())
			.unwrap_or_default()
	}

	pub fn is_member(&self, collection: CollectionId, item: ItemId) -> bool {
		self.collection(collection).is_some_and(|state| state.members.contains(&item))
	}

	/// Labels the collection has registered so far.
	pub fn labels(&self, collection: CollectionId) -> Vec<Label> {
		self.collection(collection)
			.map(|state| state.labels.iter().cloned().collect())
			.unwrap_or_default()
	}

	pub fn default_collection_label(&self, collection: CollectionId) -> Option<&Label> {
		self.collection(collection).map(|state| &state.default_label)
	}

	pub fn ignores(&self, collection: CollectionId, label: &Label) -> bool {
		self.collection(collection).is_some_and(|state| !state.tracks(label))
	}

	/// The holder of a single-select collection.
	pub fn selected_item(&self, collection: CollectionId, label: &Label) -> Option<ItemId> {
		self.collection(collection).and_then(|state| state.holder(label))
	}

	/// The selected items of a collection, in selection order.
	///
	/// For a single-select collection this is the holder, if any.
	pub fn selected_items(&self, collection: CollectionId, label: &Label) -> Vec<ItemId> {
		let Some(state) = self.collection(collection) else {
			return Vec::new();
		};
		match &state.claims {
			Claims::Single(_) => state.holder(label).into_iter().collect(),
			Claims::Multi { selected, .. } => {
				selected.get(label).map(|set| set.iter().copied().collect()).unwrap_or_default()
			}
		}
	}

	/// The cached selected count of a collection.
	pub fn selected_count(&self, collection: CollectionId, label: &Label) -> usize {
		self.collection(collection).map_or(0, |state| state.count(label))
	}

	pub fn item_ids(&self) -> impl Iterator<Item = ItemId> + '_ {
		self.items.keys().copied()
	}

	pub fn collection_ids(&self) -> impl Iterator<Item = CollectionId> + '_ {
		self.collections.keys().copied()
	}

	/// Whether any owner of `item` other than `except` tracks `label`.
	pub(crate) fn tracked_elsewhere(&self, item: ItemId, label: &Label, except: Option<CollectionId>) -> bool {
		let Some(state) = self.item(item) else {
			return false;
		};
		state.owners.iter().filter(|&&owner| Some(owner) != except).any(|&owner| {
			self.collection(owner).is_some_and(|collection| collection.tracks(label))
		})
	}
}
