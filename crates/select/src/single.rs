//! Single-select collections: at most one holder per label.

use crate::context::{Action, OperationContext, VisitKey};
use crate::event::{OneEvent, OneEventKind, SelectionEvent};
use crate::ids::{CollectionId, ItemId};
use crate::options::Call;
use crate::store::Store;

impl Store {
	/// Makes `item` the holder of `call.label`, displacing the previous one.
	pub(crate) fn single_select(&mut self, ctx: &mut OperationContext, collection: CollectionId, item: ItemId, call: &Call) {
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
		let holder = state.holder(label);

		if holder == Some(item) {
			tracing::trace!(%collection, %item, %label, "single reselect");
			self.item_select(ctx, item, &call.forwarded());
			ctx.mark_done(&key);
			if call.emits_reselect() {
				enqueue(ctx, OneEventKind::Reselect, collection, item, call);
			}
			return;
		}

		// The previous holder's events are appended after ours so that they
		// are delivered first.
		ctx.open_capture();
		if let Some(previous) = holder {
			self.single_clear(ctx, collection, previous, call);
		}
		let displaced = ctx.close_capture();

		if let Some(state) = self.collection_mut(collection) {
			ctx.note_claims(collection, label, state);
			state.set_holder(label, Some(item));
		}
		tracing::trace!(%collection, %item, %label, ?holder, "single select");
		self.item_select(ctx, item, &call.forwarded());
		ctx.mark_done(&key);
		if call.emits() {
			enqueue(ctx, OneEventKind::Select, collection, item, call);
		}
		ctx.append(displaced);
	}

	/// Deselects `item`, or the current holder when `item` is `None`.
	pub(crate) fn single_deselect(
		&mut self,
		ctx: &mut OperationContext,
		collection: CollectionId,
		item: Option<ItemId>,
		call: &Call,
	) {
		let label = &call.label;
		let Some(state) = self.collection_mut(collection) else {
			return;
		};
		if !state.tracks(label) {
			tracing::debug!(%collection, %label, "label ignored by collection");
			return;
		}
		state.register(label);
		let Some(target) = item.or_else(|| state.holder(label)) else {
			return;
		};
		self.single_clear(ctx, collection, target, call);
	}

	/// Clears the claim on `item` if it is the holder. A no-op otherwise.
	pub(crate) fn single_clear(&mut self, ctx: &mut OperationContext, collection: CollectionId, item: ItemId, call: &Call) {
		let label = &call.label;
		let key = VisitKey::edge(collection, item, label, Action::Deselect);
		if !ctx.try_enter(&key) {
			return;
		}
		let Some(state) = self.collection_mut(collection) else {
			ctx.mark_done(&key);
			return;
		};
		state.register(label);
		if state.holder(label) != Some(item) {
			ctx.mark_done(&key);
			return;
		}

		ctx.note_claims(collection, label, state);
		state.set_holder(label, None);
		tracing::trace!(%collection, %item, %label, "single deselect");
		if !call.skip_item_call {
			self.item_deselect(ctx, item, &call.forwarded());
		}
		ctx.mark_done(&key);
		if call.emits() {
			enqueue(ctx, OneEventKind::Deselect, collection, item, call);
		}
	}
}

fn enqueue(ctx: &mut OperationContext, kind: OneEventKind, collection: CollectionId, item: ItemId, call: &Call) {
	ctx.enqueue(SelectionEvent::One(OneEvent {
		kind,
		collection,
		item,
		options: call.event_options(),
	}));
}
