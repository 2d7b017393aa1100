use std::ops::Deref;

use indexmap::IndexSet;

use crate::config::{CollectionConfig, ItemConfig};
use crate::context::OperationContext;
use crate::error::{Result, SelectError};
use crate::event::{MembershipEvent, MembershipEventKind, SelectionEvent};
use crate::ids::{CollectionId, IdAllocator, ItemId};
use crate::label::Label;
use crate::observer::{
	Handler, ItemObserver, MembershipObserver, MultiObserver, ObserverId, Observers, SingleObserver,
	Topic,
};
use crate::options::{Call, MembershipOptions, SelectOptions};
use crate::store::{CollectionKind, CollectionState, ItemState, Store};

/// The arena owning every item and collection, and the entry point of every
/// operation.
///
/// Each public operation is one transaction: it validates its arguments,
/// cascades through every affected entity, and only then delivers the
/// queued events, last queued first. Read accessors are available through
/// `Deref<Target = Store>`.
#[derive(Debug, Default)]
pub struct Selections {
	store: Store,
	observers: Observers,
	ids: IdAllocator,
}

impl Deref for Selections {
	type Target = Store;

	fn deref(&self) -> &Store {
		&self.store
	}
}

impl Selections {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn store(&self) -> &Store {
		&self.store
	}

	/// Creates a free-standing item.
	///
	/// # Errors
	///
	/// Returns [`SelectError::Config`] when the default label is invalid.
	pub fn create_item(&mut self, config: &ItemConfig) -> Result<ItemId> {
		let setup = config.resolve()?;
		let id = self.ids.next_item();
		self.store.items.insert(id, ItemState::new(setup.default_label));
		tracing::trace!(item = %id, "item created");
		Ok(id)
	}

	/// Creates a single-select collection over `members`.
	///
	/// Members that are already selected are taken over; when several carry
	/// the same label, the last one keeps it.
	///
	/// # Errors
	///
	/// Returns [`SelectError::Config`] for an invalid configuration and
	/// [`SelectError::UnknownItem`] for an unknown member.
	pub fn create_single(
		&mut self,
		config: &CollectionConfig,
		members: impl IntoIterator<Item = ItemId>,
	) -> Result<CollectionId> {
		self.create_collection(CollectionKind::Single, config, members)
	}

	/// Creates a multi-select collection over `members`.
	///
	/// # Errors
	///
	/// See [`Self::create_single`].
	pub fn create_multi(
		&mut self,
		config: &CollectionConfig,
		members: impl IntoIterator<Item = ItemId>,
	) -> Result<CollectionId> {
		self.create_collection(CollectionKind::Multi, config, members)
	}

	fn create_collection(
		&mut self,
		kind: CollectionKind,
		config: &CollectionConfig,
		members: impl IntoIterator<Item = ItemId>,
	) -> Result<CollectionId> {
		let setup = config.resolve()?;
		let members: IndexSet<ItemId> = members.into_iter().collect();
		for &member in &members {
			self.check_item(member)?;
		}

		let id = self.ids.next_collection();
		let mut state = CollectionState::new(kind, setup.default_label, setup.ignored);
		state.members = members;
		self.store.collections.insert(id, state);
		tracing::trace!(collection = %id, ?kind, "collection created");

		self.transact(|store, ctx| store.on_replaced_all(ctx, id, &[], false));
		Ok(id)
	}

	/// Releases `collection` from all of its members, detaches its observers
	/// and removes it. Members lose a label only if no other collection
	/// still claims it.
	///
	/// # Errors
	///
	/// Returns [`SelectError::UnknownCollection`] when already closed.
	pub fn close(&mut self, collection: CollectionId, opts: MembershipOptions) -> Result<()> {
		self.collection_state(collection)?;
		let events = self.run(|store, ctx| store.on_closed(ctx, collection, opts.silent));
		self.store.collections.remove(&collection);
		self.observers.detach_all(collection.into());
		self.deliver(&events);
		Ok(())
	}

	/// Selects `item` directly, under its default label unless one is given.
	///
	/// # Errors
	///
	/// Returns [`SelectError::UnknownItem`] for an unknown item.
	pub fn select_item(&mut self, item: ItemId, opts: SelectOptions) -> Result<()> {
		let call = self.item_call(item, &opts)?;
		self.transact(|store, ctx| store.item_select(ctx, item, &call));
		Ok(())
	}

	/// Deselects `item` directly in every collection it belongs to.
	///
	/// # Errors
	///
	/// Returns [`SelectError::UnknownItem`] for an unknown item.
	pub fn deselect_item(&mut self, item: ItemId, opts: SelectOptions) -> Result<()> {
		let call = self.item_call(item, &opts)?;
		self.transact(|store, ctx| store.item_deselect(ctx, item, &call));
		Ok(())
	}

	/// Selects `item` if it is not selected, deselects it otherwise.
	///
	/// # Errors
	///
	/// Returns [`SelectError::UnknownItem`] for an unknown item.
	pub fn toggle_item(&mut self, item: ItemId, opts: SelectOptions) -> Result<()> {
		let call = self.item_call(item, &opts)?;
		self.transact(|store, ctx| store.item_toggle(ctx, item, &call));
		Ok(())
	}

	/// Selects a member of `collection`, under the collection's default
	/// label unless one is given. Labels the collection ignores are a no-op.
	///
	/// # Errors
	///
	/// Returns [`SelectError::UnknownCollection`], [`SelectError::UnknownItem`]
	/// or [`SelectError::NotMember`].
	pub fn select(&mut self, collection: CollectionId, item: ItemId, opts: SelectOptions) -> Result<()> {
		let (kind, call) = self.collection_call(collection, &opts)?;
		self.check_member(collection, item)?;
		self.transact(|store, ctx| match kind {
			CollectionKind::Single => store.single_select(ctx, collection, item, &call),
			CollectionKind::Multi => store.multi_select(ctx, collection, item, &call),
		});
		Ok(())
	}

	/// Deselects a member of `collection`. Without an item, a single-select
	/// collection deselects its holder and a multi-select collection
	/// deselects everything.
	///
	/// # Errors
	///
	/// See [`Self::select`].
	pub fn deselect(&mut self, collection: CollectionId, item: Option<ItemId>, opts: SelectOptions) -> Result<()> {
		let (kind, call) = self.collection_call(collection, &opts)?;
		if let Some(item) = item {
			self.check_member(collection, item)?;
		}
		self.transact(|store, ctx| match (kind, item) {
			(CollectionKind::Single, item) => store.single_deselect(ctx, collection, item, &call),
			(CollectionKind::Multi, Some(item)) => store.multi_deselect(ctx, collection, item, &call),
			(CollectionKind::Multi, None) => store.multi_deselect_all(ctx, collection, &call),
		});
		Ok(())
	}

	/// Selects every member of a multi-select collection.
	///
	/// # Errors
	///
	/// Returns [`SelectError::WrongKind`] for a single-select collection.
	pub fn select_all(&mut self, collection: CollectionId, opts: SelectOptions) -> Result<()> {
		let call = self.multi_call("select_all", collection, &opts)?;
		self.transact(|store, ctx| store.multi_select_all(ctx, collection, &call));
		Ok(())
	}

	/// Deselects every member of a multi-select collection.
	///
	/// # Errors
	///
	/// Returns [`SelectError::WrongKind`] for a single-select collection.
	pub fn deselect_all(&mut self, collection: CollectionId, opts: SelectOptions) -> Result<()> {
		let call = self.multi_call("deselect_all", collection, &opts)?;
		self.transact(|store, ctx| store.multi_deselect_all(ctx, collection, &call));
		Ok(())
	}

	/// Alias of [`Self::deselect_all`].
	///
	/// # Errors
	///
	/// Returns [`SelectError::WrongKind`] for a single-select collection.
	pub fn select_none(&mut self, collection: CollectionId, opts: SelectOptions) -> Result<()> {
		let call = self.multi_call("select_none", collection, &opts)?;
		self.transact(|store, ctx| store.multi_deselect_all(ctx, collection, &call));
		Ok(())
	}

	/// Selects every unselected member and deselects every selected one.
	///
	/// # Errors
	///
	/// Returns [`SelectError::WrongKind`] for a single-select collection.
	pub fn invert_selection(&mut self, collection: CollectionId, opts: SelectOptions) -> Result<()> {
		let call = self.multi_call("invert_selection", collection, &opts)?;
		self.transact(|store, ctx| store.multi_invert(ctx, collection, &call));
		Ok(())
	}

	/// Deselects everything when every member is selected, selects
	/// everything otherwise.
	///
	/// # Errors
	///
	/// Returns [`SelectError::WrongKind`] for a single-select collection.
	pub fn toggle_select_all(&mut self, collection: CollectionId, opts: SelectOptions) -> Result<()> {
		let call = self.multi_call("toggle_select_all", collection, &opts)?;
		let all_selected =
			self.store.selected_count(collection, &call.label) == self.store.members(collection).len();
		self.transact(|store, ctx| {
			if all_selected {
				store.multi_deselect_all(ctx, collection, &call);
			} else {
				store.multi_select_all(ctx, collection, &call);
			}
		});
		Ok(())
	}

	/// Inserts `items` into `collection` and synchronizes their selection.
	/// Items that already are members are skipped.
	///
	/// # Errors
	///
	/// Returns [`SelectError::UnknownCollection`] or [`SelectError::UnknownItem`].
	pub fn add_members(
		&mut self,
		collection: CollectionId,
		items: impl IntoIterator<Item = ItemId>,
		opts: MembershipOptions,
	) -> Result<()> {
		let state = self.collection_state(collection)?;
		let items: IndexSet<ItemId> = items.into_iter().collect();
		let added: Vec<ItemId> = items.iter().copied().filter(|item| !state.members.contains(item)).collect();
		for &item in &items {
			self.check_item(item)?;
		}
		if added.is_empty() {
			return Ok(());
		}

		self.transact(|store, ctx| {
			if !opts.silent {
				ctx.enqueue(membership_event(MembershipEventKind::Added, collection, added.clone()));
			}
			if let Some(state) = store.collection_mut(collection) {
				state.members.extend(added.iter().copied());
			}
			for &item in &added {
				store.on_added(ctx, item, collection, opts.silent);
			}
		});
		Ok(())
	}

	/// Removes `items` from `collection` and synchronizes their selection.
	/// Items that are not members are skipped.
	///
	/// # Errors
	///
	/// Returns [`SelectError::UnknownCollection`] or [`SelectError::UnknownItem`].
	pub fn remove_members(
		&mut self,
		collection: CollectionId,
		items: impl IntoIterator<Item = ItemId>,
		opts: MembershipOptions,
	) -> Result<()> {
		let state = self.collection_state(collection)?;
		let items: IndexSet<ItemId> = items.into_iter().collect();
		let removed: Vec<ItemId> = items.iter().copied().filter(|item| state.members.contains(item)).collect();
		for &item in &items {
			self.check_item(item)?;
		}
		if removed.is_empty() {
			return Ok(());
		}

		self.transact(|store, ctx| {
			if !opts.silent {
				ctx.enqueue(membership_event(MembershipEventKind::Removed, collection, removed.clone()));
			}
			if let Some(state) = store.collection_mut(collection) {
				state.members.retain(|member| !removed.contains(member));
			}
			for &item in &removed {
				store.on_removed(ctx, item, collection, opts.silent, false);
			}
		});
		Ok(())
	}

	/// Replaces the whole membership of `collection`.
	///
	/// Selection is recomputed from the flags of the new members. The
	/// collection emits no selection event of its own; the `reset` event is
	/// the signal.
	///
	/// # Errors
	///
	/// Returns [`SelectError::UnknownCollection`] or [`SelectError::UnknownItem`].
	pub fn reset_members(
		&mut self,
		collection: CollectionId,
		items: impl IntoIterator<Item = ItemId>,
		opts: MembershipOptions,
	) -> Result<()> {
		self.collection_state(collection)?;
		let items: IndexSet<ItemId> = items.into_iter().collect();
		for &item in &items {
			self.check_item(item)?;
		}

		self.transact(|store, ctx| {
			if !opts.silent {
				let listed = items.iter().copied().collect();
				ctx.enqueue(membership_event(MembershipEventKind::Reset, collection, listed));
			}
			let Some(state) = store.collection_mut(collection) else {
				return;
			};
			let previous: Vec<ItemId> = std::mem::replace(&mut state.members, items).into_iter().collect();
			store.on_replaced_all(ctx, collection, &previous, opts.silent);
		});
		Ok(())
	}

	/// Attaches an observer to an item.
	///
	/// # Errors
	///
	/// Returns [`SelectError::UnknownItem`] for an unknown item.
	pub fn observe_item(&mut self, item: ItemId, topic: Topic, observer: impl ItemObserver + 'static) -> Result<ObserverId> {
		self.check_item(item)?;
		Ok(self.observers.attach(item.into(), topic, Handler::Item(Box::new(observer))))
	}

	/// Attaches an observer to a single-select collection.
	///
	/// # Errors
	///
	/// Returns [`SelectError::WrongKind`] for a multi-select collection.
	pub fn observe_single(
		&mut self,
		collection: CollectionId,
		topic: Topic,
		observer: impl SingleObserver + 'static,
	) -> Result<ObserverId> {
		self.require_kind("observe_single", collection, CollectionKind::Single)?;
		Ok(self.observers.attach(collection.into(), topic, Handler::Single(Box::new(observer))))
	}

	/// Attaches an observer to a multi-select collection.
	///
	/// # Errors
	///
	/// Returns [`SelectError::WrongKind`] for a single-select collection.
	pub fn observe_multi(
		&mut self,
		collection: CollectionId,
		topic: Topic,
		observer: impl MultiObserver + 'static,
	) -> Result<ObserverId> {
		self.require_kind("observe_multi", collection, CollectionKind::Multi)?;
		Ok(self.observers.attach(collection.into(), topic, Handler::Multi(Box::new(observer))))
	}

	/// Attaches an observer of host membership changes.
	///
	/// # Errors
	///
	/// Returns [`SelectError::UnknownCollection`] for an unknown collection.
	pub fn observe_membership(
		&mut self,
		collection: CollectionId,
		observer: impl MembershipObserver + 'static,
	) -> Result<ObserverId> {
		self.collection_state(collection)?;
		Ok(self.observers.attach(collection.into(), Topic::Any, Handler::Membership(Box::new(observer))))
	}

	/// Detaches an observer. Returns false if it was not attached.
	pub fn unobserve(&mut self, id: ObserverId) -> bool {
		self.observers.detach(id)
	}

	fn transact(&mut self, f: impl FnOnce(&mut Store, &mut OperationContext)) {
		let events = self.run(f);
		self.deliver(&events);
	}

	fn run(&mut self, f: impl FnOnce(&mut Store, &mut OperationContext)) -> Vec<SelectionEvent> {
		let mut ctx = OperationContext::new();
		f(&mut self.store, &mut ctx);
		ctx.finish(&self.store)
	}

	fn deliver(&mut self, events: &[SelectionEvent]) {
		if events.is_empty() {
			return;
		}
		tracing::debug!(events = events.len(), "flushing selection events");
		self.observers.deliver(&self.store, events);
	}

	fn check_item(&self, item: ItemId) -> Result<()> {
		if self.store.contains_item(item) {
			Ok(())
		} else {
			Err(SelectError::UnknownItem(item))
		}
	}

	fn collection_state(&self, collection: CollectionId) -> Result<&CollectionState> {
		self.store
			.collection(collection)
			.ok_or(SelectError::UnknownCollection(collection))
	}

	fn check_member(&self, collection: CollectionId, item: ItemId) -> Result<()> {
		self.check_item(item)?;
		if self.collection_state(collection)?.members.contains(&item) {
			Ok(())
		} else {
			Err(SelectError::NotMember { collection, item })
		}
	}

	fn require_kind(&self, operation: &'static str, collection: CollectionId, expected: CollectionKind) -> Result<()> {
		let actual = self.collection_state(collection)?.kind();
		if actual == expected {
			Ok(())
		} else {
			Err(SelectError::WrongKind {
				operation,
				collection,
				expected,
				actual,
			})
		}
	}

	fn item_call(&self, item: ItemId, opts: &SelectOptions) -> Result<Call> {
		let state = self.store.item(item).ok_or(SelectError::UnknownItem(item))?;
		Ok(Call::new(resolve_label(opts, &state.default_label), opts))
	}

	fn collection_call(&self, collection: CollectionId, opts: &SelectOptions) -> Result<(CollectionKind, Call)> {
		let state = self.collection_state(collection)?;
		Ok((state.kind(), Call::new(resolve_label(opts, &state.default_label), opts)))
	}

	fn multi_call(&self, operation: &'static str, collection: CollectionId, opts: &SelectOptions) -> Result<Call> {
		self.require_kind(operation, collection, CollectionKind::Multi)?;
		self.collection_call(collection, opts).map(|(_, call)| call)
	}
}

fn resolve_label(opts: &SelectOptions, default: &Label) -> Label {
	opts.label.clone().unwrap_or_else(|| default.clone())
}

fn membership_event(kind: MembershipEventKind, collection: CollectionId, items: Vec<ItemId>) -> SelectionEvent {
	SelectionEvent::Membership(MembershipEvent { kind, collection, items })
}

#[cfg(test)]
mod tests;
