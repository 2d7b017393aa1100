//! The transaction of one public call.
//!
//! A context records which mutations already ran (the visit guard that stops
//! item → collection → item cycles) and collects events until the top-level
//! call finishes. Nested calls share the caller's context and never deliver
//! anything themselves.

use indexmap::IndexSet;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::event::{
	Diff, EventOptions, ItemEvent, ItemEventKind, ManyClass, ManyEvent, OneEvent, OneEventKind, ReselectAnyEvent,
	SelectionEvent,
};
use crate::ids::{CollectionId, EntityId, ItemId};
use crate::label::Label;
use crate::store::{Claims, CollectionState, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Action {
	Select,
	Deselect,
	SelectAll,
	DeselectAll,
	Invert,
}

/// One mutation of one entity: who, which label, which direction, on which
/// item. Item visits target the item itself; bulk collection visits target
/// nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct VisitKey {
	entity: EntityId,
	label: Label,
	action: Action,
	target: Option<ItemId>,
}

impl VisitKey {
	pub fn item(item: ItemId, label: &Label, action: Action) -> Self {
		Self {
			entity: item.into(),
			label: label.clone(),
			action,
			target: Some(item),
		}
	}

	pub fn edge(collection: CollectionId, item: ItemId, label: &Label, action: Action) -> Self {
		Self {
			entity: collection.into(),
			label: label.clone(),
			action,
			target: Some(item),
		}
	}

	pub fn bulk(collection: CollectionId, label: &Label, action: Action) -> Self {
		Self {
			entity: collection.into(),
			label: label.clone(),
			action,
			target: None,
		}
	}
}

#[derive(Debug, Clone, Copy)]
struct Visit {
	done: bool,
	/// Mutation epoch of the target item when the visit finished.
	epoch: u32,
}

#[derive(Debug, Default)]
pub(crate) struct OperationContext {
	visited: FxHashMap<VisitKey, Visit>,
	/// Bumped whenever an item's flag for a label flips.
	epochs: FxHashMap<(ItemId, Label), u32>,
	queue: Vec<SelectionEvent>,
	/// Append-only queues of forwarded sub-calls, innermost last.
	captures: Vec<Vec<SelectionEvent>>,
	origins: Origins,
}

/// State of every entity the operation touched, as it was before the first
/// change.
#[derive(Debug, Default)]
struct Origins {
	flags: FxHashMap<(ItemId, Label), bool>,
	holders: FxHashMap<(CollectionId, Label), Option<ItemId>>,
	selections: FxHashMap<(CollectionId, Label), IndexSet<ItemId>>,
}

impl OperationContext {
	pub fn new() -> Self {
		Self::default()
	}

	/// Claims a visit. Returns false when the same mutation is still running
	/// further up the call stack, or already ran and its target item has not
	/// changed since.
	pub fn try_enter(&mut self, key: &VisitKey) -> bool {
		let epoch = self.epoch_of(key);
		if let Some(visit) = self.visited.get(key)
			&& (!visit.done || visit.epoch == epoch)
		{
			return false;
		}
		self.visited.insert(key.clone(), Visit { done: false, epoch });
		true
	}

	pub fn mark_done(&mut self, key: &VisitKey) {
		let epoch = self.epoch_of(key);
		if let Some(visit) = self.visited.get_mut(key) {
			visit.done = true;
			visit.epoch = epoch;
		}
	}

	/// Records that `item`'s flag for `label` flipped away from `was`.
	pub fn flag_changed(&mut self, item: ItemId, label: &Label, was: bool) {
		let key = (item, label.clone());
		self.origins.flags.entry(key.clone()).or_insert(was);
		*self.epochs.entry(key).or_default() += 1;
	}

	/// Records the claims of `collection` for `label` before they change.
	/// Only the first call per collection and label counts.
	pub fn note_claims(&mut self, collection: CollectionId, label: &Label, state: &CollectionState) {
		let key = (collection, label.clone());
		match &state.claims {
			Claims::Single(_) => {
				self.origins.holders.entry(key).or_insert_with(|| state.holder(label));
			}
			Claims::Multi { .. } => {
				self.origins.selections.entry(key).or_insert_with(|| state.selected_set(label));
			}
		}
	}

	fn epoch_of(&self, key: &VisitKey) -> u32 {
		key.target
			.and_then(|item| self.epochs.get(&(item, key.label.clone())).copied())
			.unwrap_or(0)
	}

	fn active(&mut self) -> &mut Vec<SelectionEvent> {
		match self.captures.last_mut() {
			Some(capture) => capture,
			None => &mut self.queue,
		}
	}

	pub fn enqueue(&mut self, event: SelectionEvent) {
		self.active().push(event);
	}

	/// Queues `reselect:any`, folding into an entry already queued for the
	/// same collection and label.
	pub fn enqueue_reselect_any(&mut self, collection: CollectionId, items: Vec<ItemId>, options: EventOptions) {
		let existing = self
			.captures
			.iter_mut()
			.rev()
			.chain(std::iter::once(&mut self.queue))
			.flat_map(|queue| queue.iter_mut())
			.find_map(|event| match event {
				SelectionEvent::ReselectAny(e) if e.collection == collection && e.options.label == options.label => Some(e),
				_ => None,
			});
		if let Some(event) = existing {
			for item in items {
				if !event.items.contains(&item) {
					event.items.push(item);
				}
			}
			event.options.union(&options);
			return;
		}
		self.enqueue(SelectionEvent::ReselectAny(ReselectAnyEvent {
			collection,
			items,
			options,
		}));
	}

	/// Starts collecting events of a forwarded sub-call separately.
	pub fn open_capture(&mut self) {
		self.captures.push(Vec::new());
	}

	/// Ends the innermost capture and returns what it collected. The caller
	/// appends it after its own events, so under last-in-first-out delivery
	/// the sub-call's events are observed first.
	pub fn close_capture(&mut self) -> Vec<SelectionEvent> {
		self.captures.pop().unwrap_or_default()
	}

	pub fn append(&mut self, events: Vec<SelectionEvent>) {
		self.active().extend(events);
	}

	/// Consumes the context: reduces the queue to the net change of every
	/// entity and returns it in delivery order, last queued first.
	pub fn finish(self, store: &Store) -> Vec<SelectionEvent> {
		debug_assert!(self.captures.is_empty(), "unclosed event capture");
		debug_assert!(self.visited.values().all(|visit| visit.done), "unfinished visit at flush");

		let merged = merge_class_events(self.queue, &self.origins, store);
		let mut events = self.origins.settle(merged, store);
		events.reverse();
		events
	}
}

impl Origins {
	/// Drops item and holder events that a later step of the same operation
	/// undid. What remains agrees with the final state: per entity and label
	/// at most one change event, the last one queued.
	fn settle(&self, queue: Vec<SelectionEvent>, store: &Store) -> Vec<SelectionEvent> {
		let mut kept: FxHashSet<(EntityId, Label, &'static str)> = FxHashSet::default();
		let mut settled: Vec<SelectionEvent> = queue
			.into_iter()
			.rev()
			.filter_map(|mut event| {
				if matches!(event, SelectionEvent::Many(_) | SelectionEvent::Membership(_)) {
					return Some(event);
				}
				let keep = match &mut event {
					SelectionEvent::Item(e) => self.keep_item(e, store),
					SelectionEvent::One(e) => self.keep_one(e, store),
					SelectionEvent::ReselectAny(e) => self.keep_reselect_any(e, store),
					SelectionEvent::Many(_) | SelectionEvent::Membership(_) => true,
				};
				let slot = (event.target(), event.label().cloned()?, event.name());
				(keep && kept.insert(slot)).then_some(event)
			})
			.collect();
		settled.reverse();
		settled
	}

	fn keep_item(&self, e: &ItemEvent, store: &Store) -> bool {
		let label = &e.options.label;
		let now = store.is_selected(e.item, label);
		let Some(&was) = self.flags.get(&(e.item, label.clone())) else {
			return e.kind != ItemEventKind::Reselected || now;
		};
		match e.kind {
			ItemEventKind::Selected => now && !was,
			ItemEventKind::Deselected => was && !now,
			ItemEventKind::Reselected => now,
		}
	}

	fn keep_one(&self, e: &OneEvent, store: &Store) -> bool {
		let label = &e.options.label;
		let (Some(&before), Some(state)) =
			(self.holders.get(&(e.collection, label.clone())), store.collection(e.collection))
		else {
			return true;
		};
		let after = state.holder(label);
		match e.kind {
			OneEventKind::Select => before != after && after == Some(e.item),
			OneEventKind::Deselect => before != after && before == Some(e.item),
			OneEventKind::Reselect => after == Some(e.item),
		}
	}

	/// Keeps only the items still selected at the end.
	fn keep_reselect_any(&self, e: &mut ReselectAnyEvent, store: &Store) -> bool {
		let label = e.options.label.clone();
		if self.selections.contains_key(&(e.collection, label.clone()))
			&& let Some(state) = store.collection(e.collection)
		{
			e.items.retain(|&item| state.multi_contains(&label, item));
		}
		!e.items.is_empty()
	}
}

/// Replaces the class events queued for one multi-select collection and
/// label by a single event at the position of the last of them. When the
/// selection before the operation is known, the diff runs from it to the
/// final selection; otherwise it is the net union of the queued diffs.
fn merge_class_events(queue: Vec<SelectionEvent>, origins: &Origins, store: &Store) -> Vec<SelectionEvent> {
	let mut groups: FxHashMap<(CollectionId, Label), Vec<usize>> = FxHashMap::default();
	for (index, event) in queue.iter().enumerate() {
		if let SelectionEvent::Many(e) = event {
			groups.entry((e.collection, e.options.label.clone())).or_default().push(index);
		}
	}

	let mut dropped = FxHashSet::default();
	let mut replacements: FxHashMap<usize, SelectionEvent> = FxHashMap::default();
	for ((collection, label), indices) in groups {
		let net = origins.selections.get(&(collection, label.clone())).and_then(|before| {
			store
				.collection(collection)
				.map(|state| Diff::between(before, &state.selected_set(&label)))
		});
		if indices.len() < 2 && net.is_none() {
			continue;
		}
		let mut diff = Diff::default();
		let mut options: Option<EventOptions> = None;
		for &index in &indices {
			if let SelectionEvent::Many(e) = &queue[index] {
				diff.union(&e.diff);
				match options.as_mut() {
					Some(merged) => merged.union(&e.options),
					None => options = Some(e.options.clone()),
				}
			}
		}
		if let Some(net) = net {
			diff = net;
		}
		dropped.extend(indices.iter().copied());
		let (Some(options), Some(&last)) = (options, indices.last()) else {
			continue;
		};
		if indices.len() > 1 {
			tracing::trace!(%collection, %label, merged = indices.len(), "merging class events");
		}
		if diff.is_empty() {
			continue;
		}
		let class = store.collection(collection).map_or(ManyClass::Some, |state| {
			ManyClass::classify(state.count(&label), state.members.len())
		});
		dropped.remove(&last);
		replacements.insert(
			last,
			SelectionEvent::Many(ManyEvent {
				class,
				collection,
				diff,
				options,
			}),
		);
	}

	queue
		.into_iter()
		.enumerate()
		.filter_map(|(index, event)| {
			if let Some(replacement) = replacements.remove(&index) {
				Some(replacement)
			} else if dropped.contains(&index) {
				None
			} else {
				Some(event)
			}
		})
		.collect()
}
