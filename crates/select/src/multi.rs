//! Multi-select collections: an arbitrary subset per label with a cached
//! count, summarized into one class event per operation.

use indexmap::IndexSet;

use crate::context::{Action, OperationContext, VisitKey};
use crate::event::{Diff, ManyClass, ManyEvent, SelectionEvent};
use crate::ids::{CollectionId, ItemId};
use crate::options::Call;
use crate::store::Store;

impl Store {
	/// Adds `item` to the selection of `call.label`.
	///
	/// With `call.exclusive`, every other selected member is deselected
	/// first; that step queues its own summary, merged at flush.
	pub(crate) fn multi_select(&mut self, ctx: &mut OperationContext, collection: CollectionId, item: ItemId, call: &Call) {
		let label = &call.label;
		let Some(state) = self.collection_mut(collection) else {
			return;
		};
		if !state.tracks(label) {
			tracing::debug!(%collection, %label, "label ignored by collection");
			return;
		}
		let key = VisitKey::edge(collection, item, label, Action::Select);
		if !ctx.try_enter(&key) {
			return;
		}
		state.register(label);
		ctx.note_claims(collection, label, state);

		let mut deselected_first = Vec::new();
		if call.exclusive {
			ctx.open_capture();
			self.multi_deselect_others(ctx, collection, item, call);
			deselected_first = ctx.close_capture();
		}

		let Some(state) = self.collection_mut(collection) else {
			ctx.mark_done(&key);
			return;
		};
		let previous = state.selected_set(label);
		let reselected = !state.multi_insert(label, item);
		let summary = summarize(self, collection, &previous, call);
		tracing::trace!(%collection, %item, %label, reselected, "multi select");

		self.item_select(ctx, item, &call.forwarded());
		ctx.mark_done(&key);

		if let Some(event) = summary {
			ctx.enqueue(event);
		}
		if reselected && call.emits_reselect() {
			ctx.enqueue_reselect_any(collection, vec![item], call.event_options());
		}
		ctx.append(deselected_first);
	}

	/// Removes `item` from the selection of `call.label`.
	pub(crate) fn multi_deselect(&mut self, ctx: &mut OperationContext, collection: CollectionId, item: ItemId, call: &Call) {
		let label = &call.label;
		let Some(state) = self.collection_mut(collection) else {
			return;
		};
		if !state.tracks(label) {
			tracing::debug!(%collection, %label, "label ignored by collection");
			return;
		}
		let key = VisitKey::edge(collection, item, label, Action::Deselect);
		if !ctx.try_enter(&key) {
			return;
		}
		state.register(label);
		ctx.note_claims(collection, label, state);

		let previous = state.selected_set(label);
		if !state.multi_remove(label, item) {
			ctx.mark_done(&key);
			return;
		}
		let summary = summarize(self, collection, &previous, call);
		tracing::trace!(%collection, %item, %label, "multi deselect");

		if !call.skip_item_call {
			self.item_deselect(ctx, item, &call.forwarded());
		}
		ctx.mark_done(&key);
		if let Some(event) = summary {
			ctx.enqueue(event);
		}
	}

	fn multi_deselect_others(&mut self, ctx: &mut OperationContext, collection: CollectionId, keep: ItemId, call: &Call) {
		let label = &call.label;
		let Some(state) = self.collection(collection) else {
			return;
		};
		let previous = state.selected_set(label);
		for &other in previous.iter().filter(|&&other| other != keep) {
			self.multi_remove_member(ctx, collection, other, call);
		}
		if let Some(event) = summarize(self, collection, &previous, call) {
			ctx.enqueue(event);
		}
	}

	pub(crate) fn multi_select_all(&mut self, ctx: &mut OperationContext, collection: CollectionId, call: &Call) {
		self.multi_bulk(ctx, collection, Action::SelectAll, call);
	}

	pub(crate) fn multi_deselect_all(&mut self, ctx: &mut OperationContext, collection: CollectionId, call: &Call) {
		self.multi_bulk(ctx, collection, Action::DeselectAll, call);
	}

	pub(crate) fn multi_invert(&mut self, ctx: &mut OperationContext, collection: CollectionId, call: &Call) {
		self.multi_bulk(ctx, collection, Action::Invert, call);
	}

	/// Applies one bulk change to every member and queues a single summary
	/// for the whole operation.
	fn multi_bulk(&mut self, ctx: &mut OperationContext, collection: CollectionId, action: Action, call: &Call) {
		let label = &call.label;
		let Some(state) = self.collection_mut(collection) else {
			return;
		};
		if !state.tracks(label) {
			tracing::debug!(%collection, %label, "label ignored by collection");
			return;
		}
		let key = VisitKey::bulk(collection, label, action);
		if !ctx.try_enter(&key) {
			return;
		}
		state.register(label);
		ctx.note_claims(collection, label, state);

		let previous = state.selected_set(label);
		let members: Vec<ItemId> = state.members.iter().copied().collect();
		tracing::trace!(%collection, %label, ?action, members = members.len(), "multi bulk");

		let mut reselected = Vec::new();
		for member in members {
			let select = match action {
				Action::SelectAll => true,
				Action::Invert => !previous.contains(&member),
				_ => false,
			};
			if select {
				if self.multi_add_member(ctx, collection, member, call) == Added::Already {
					reselected.push(member);
				}
			} else {
				self.multi_remove_member(ctx, collection, member, call);
			}
		}
		ctx.mark_done(&key);

		if let Some(event) = summarize(self, collection, &previous, call) {
			ctx.enqueue(event);
		}
		if !reselected.is_empty() && call.emits_reselect() {
			ctx.enqueue_reselect_any(collection, reselected, call.event_options());
		}
	}

	/// Inserts one member and propagates to the item without queuing a
	/// collection event.
	fn multi_add_member(&mut self, ctx: &mut OperationContext, collection: CollectionId, item: ItemId, call: &Call) -> Added {
		let label = &call.label;
		let key = VisitKey::edge(collection, item, label, Action::Select);
		if !ctx.try_enter(&key) {
			return Added::Skipped;
		}
		let inserted = self.collection_mut(collection).is_some_and(|state| state.multi_insert(label, item));
		self.item_select(ctx, item, &call.forwarded());
		ctx.mark_done(&key);
		if inserted { Added::New } else { Added::Already }
	}

	/// Removes one selected member and propagates to the item without
	/// queuing a collection event.
	fn multi_remove_member(&mut self, ctx: &mut OperationContext, collection: CollectionId, item: ItemId, call: &Call) {
		let label = &call.label;
		let key = VisitKey::edge(collection, item, label, Action::Deselect);
		if !ctx.try_enter(&key) {
			return;
		}
		let removed = self.collection_mut(collection).is_some_and(|state| state.multi_remove(label, item));
		if removed {
			self.item_deselect(ctx, item, &call.forwarded());
		}
		ctx.mark_done(&key);
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Added {
	New,
	Already,
	Skipped,
}

/// Builds the class event describing how the selection moved away from
/// `previous`, or `None` for a no-op or a call that must not emit.
fn summarize(store: &Store, collection: CollectionId, previous: &IndexSet<ItemId>, call: &Call) -> Option<SelectionEvent> {
	if !call.emits() {
		return None;
	}
	let state = store.collection(collection)?;
	let current = state.selected_set(&call.label);
	let diff = Diff::between(previous, &current);
	if diff.is_empty() {
		return None;
	}
	Some(SelectionEvent::Many(ManyEvent {
		class: ManyClass::classify(current.len(), state.members.len()),
		collection,
		diff,
		options: call.event_options(),
	}))
}
