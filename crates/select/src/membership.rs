//! Membership synchronization.
//!
//! The host side of a collection (insert, remove, replace-all) is a plain
//! mutation of its member set. After every such mutation one of the hooks
//! below runs, whether or not the change itself is silent, and reconciles
//! selection state with the new membership.

use indexmap::IndexSet;

use crate::context::OperationContext;
use crate::ids::{CollectionId, ItemId};
use crate::label::Label;
use crate::options::Call;
use crate::store::{CollectionKind, Store};

impl Store {
	/// `item` joined `collection`. Every label already set on the item is
	/// taken over by the collection; in a single-select collection the item
	/// displaces the current holder, so the last pre-selected item added wins.
	pub(crate) fn on_added(&mut self, ctx: &mut OperationContext, item: ItemId, collection: CollectionId, silent: bool) {
		let Some(state) = self.item_mut(item) else {
			return;
		};
		state.owners.insert(collection);
		let labels = state.selected_labels();
		tracing::trace!(%item, %collection, labels = labels.len(), "member added");

		for label in labels {
			if self.ignores(collection, &label) {
				continue;
			}
			self.absorb(ctx, collection, item, &Call::membership(label, silent));
		}
	}

	/// `item` left `collection`. The collection's claims are cleared; the
	/// item itself is only deselected when no remaining owner tracks the
	/// label.
	///
	/// With `quiet_collection` the collection queues none of its own events.
	pub(crate) fn on_removed(
		&mut self,
		ctx: &mut OperationContext,
		item: ItemId,
		collection: CollectionId,
		silent: bool,
		quiet_collection: bool,
	) {
		if let Some(state) = self.item_mut(item) {
			state.owners.shift_remove(&collection);
		}
		let labels = self
			.collection(collection)
			.map(|state| state.claimed_labels(item))
			.unwrap_or_default();
		tracing::trace!(%item, %collection, claimed = labels.len(), "member removed");

		for label in labels {
			let call = Call::membership(label, silent);
			if !self.tracked_elsewhere(item, &call.label, None) {
				self.item_deselect(ctx, item, &call);
			}
			let mut local = call.skipping_item();
			if quiet_collection {
				local = local.locally_silent();
			}
			self.release(ctx, collection, item, &local);
		}
	}

	/// The whole membership of `collection` was replaced; `previous` is the
	/// membership before the change. Selection is recomputed from the flags
	/// of the final members and the collection itself queues nothing.
	pub(crate) fn on_replaced_all(
		&mut self,
		ctx: &mut OperationContext,
		collection: CollectionId,
		previous: &[ItemId],
		silent: bool,
	) {
		let Some(state) = self.collection(collection) else {
			return;
		};
		let current = state.members.clone();
		let kind = state.kind();

		for &gone in previous.iter().filter(|item| !current.contains(*item)) {
			self.on_removed(ctx, gone, collection, silent, true);
		}
		for &member in &current {
			if let Some(item) = self.item_mut(member) {
				item.owners.insert(collection);
			}
		}

		let labels = self.labels_to_recompute(collection, &current);
		tracing::trace!(%collection, members = current.len(), labels = labels.len(), "members replaced");
		for label in labels {
			let flagged: Vec<ItemId> =
				current.iter().copied().filter(|&member| self.is_selected(member, &label)).collect();
			let Some(state) = self.collection_mut(collection) else {
				return;
			};
			state.register(&label);
			ctx.note_claims(collection, &label, state);
			match kind {
				CollectionKind::Single => {
					let Some((&keep, earlier)) = flagged.split_last() else {
						state.set_holder(&label, None);
						continue;
					};
					state.set_holder(&label, Some(keep));
					let call = Call::membership(label, silent);
					for &loser in earlier {
						self.item_deselect(ctx, loser, &call);
					}
				}
				CollectionKind::Multi => {
					state.multi_replace(&label, flagged.into_iter().collect());
				}
			}
		}
	}

	/// The collection is going away: every member is released as if removed.
	pub(crate) fn on_closed(&mut self, ctx: &mut OperationContext, collection: CollectionId, silent: bool) {
		let members: Vec<ItemId> = self.members(collection);
		tracing::debug!(%collection, members = members.len(), "closing collection");
		for member in members {
			self.on_removed(ctx, member, collection, silent, true);
		}
	}

	/// Registered labels plus every tracked label set on a final member.
	fn labels_to_recompute(&self, collection: CollectionId, members: &IndexSet<ItemId>) -> Vec<Label> {
		let Some(state) = self.collection(collection) else {
			return Vec::new();
		};
		let mut labels: IndexSet<Label> = state.labels.clone();
		for &member in members {
			if let Some(item) = self.item(member) {
				labels.extend(item.selected_labels());
			}
		}
		labels.into_iter().filter(|label| state.tracks(label)).collect()
	}
}
