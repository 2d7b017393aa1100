use crate::context::{Action, OperationContext, VisitKey};
use crate::event::{ItemEvent, ItemEventKind, SelectionEvent};
use crate::ids::{CollectionId, ItemId};
use crate::options::Call;
use crate::store::{CollectionKind, Store};

impl Store {
	/// Sets `call.label` on `item` and lets every owner absorb the change.
	pub(crate) fn item_select(&mut self, ctx: &mut OperationContext, item: ItemId, call: &Call) {
		let label = &call.label;
		let key = VisitKey::item(item, label, Action::Select);
		if !ctx.try_enter(&key) {
			return;
		}
		let Some(state) = self.item_mut(item) else {
			ctx.mark_done(&key);
			return;
		};

		let was_selected = state.flag(label);
		state.flags.insert(label.clone(), true);
		if !was_selected {
			ctx.flag_changed(item, label, false);
		}
		let owners: Vec<CollectionId> = state.owners.iter().copied().collect();
		tracing::trace!(%item, %label, was_selected, owners = owners.len(), "item select");

		let forwarded = call.forwarded();
		for owner in owners {
			self.absorb(ctx, owner, item, &forwarded);
		}
		ctx.mark_done(&key);

		if was_selected {
			if call.emits_reselect() {
				enqueue(ctx, ItemEventKind::Reselected, item, call);
			}
		} else if call.emits() {
			enqueue(ctx, ItemEventKind::Selected, item, call);
		}
	}

	/// Clears `call.label` on `item` and releases every owner's claim.
	///
	/// When the flag was already clear, owners only register the label.
	pub(crate) fn item_deselect(&mut self, ctx: &mut OperationContext, item: ItemId, call: &Call) {
		let label = &call.label;
		let key = VisitKey::item(item, label, Action::Deselect);
		if !ctx.try_enter(&key) {
			return;
		}
		let Some(state) = self.item_mut(item) else {
			ctx.mark_done(&key);
			return;
		};

		let was_selected = state.flag(label);
		state.flags.insert(label.clone(), false);
		if was_selected {
			ctx.flag_changed(item, label, true);
		}
		let owners: Vec<CollectionId> = state.owners.iter().copied().collect();
		tracing::trace!(%item, %label, was_selected, owners = owners.len(), "item deselect");

		let forwarded = call.forwarded();
		for owner in owners {
			if was_selected {
				self.release(ctx, owner, item, &forwarded);
			} else if let Some(collection) = self.collection_mut(owner)
				&& collection.tracks(label)
			{
				collection.register(label);
			}
		}
		ctx.mark_done(&key);

		if was_selected && call.emits() {
			enqueue(ctx, ItemEventKind::Deselected, item, call);
		}
	}

	pub(crate) fn item_toggle(&mut self, ctx: &mut OperationContext, item: ItemId, call: &Call) {
		if self.is_selected(item, &call.label) {
			self.item_deselect(ctx, item, call);
		} else {
			self.item_select(ctx, item, call);
		}
	}

	/// Lets `collection` take over a selection made on one of its members.
	pub(crate) fn absorb(&mut self, ctx: &mut OperationContext, collection: CollectionId, item: ItemId, call: &Call) {
		match self.kind(collection) {
			Some(CollectionKind::Single) => self.single_select(ctx, collection, item, call),
			Some(CollectionKind::Multi) => self.multi_select(ctx, collection, item, call),
			None => {}
		}
	}

	/// Drops `collection`'s claim on a member that was deselected.
	pub(crate) fn release(&mut self, ctx: &mut OperationContext, collection: CollectionId, item: ItemId, call: &Call) {
		match self.kind(collection) {
			Some(CollectionKind::Single) => self.single_clear(ctx, collection, item, call),
			Some(CollectionKind::Multi) => self.multi_deselect(ctx, collection, item, call),
			None => {}
		}
	}
}

fn enqueue(ctx: &mut OperationContext, kind: ItemEventKind, item: ItemId, call: &Call) {
	ctx.enqueue(SelectionEvent::Item(ItemEvent {
		kind,
		item,
		options: call.event_options(),
	}));
}
