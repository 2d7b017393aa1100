//! Event payloads.
//!
//! Every event is delivered on two channels: the plain name (`select:one`)
//! and the label-qualified name (`select:one:<label>`).

use std::fmt;

use indexmap::IndexSet;

use crate::ids::{CollectionId, EntityId, ItemId};
use crate::label::{CHANNEL_SEPARATOR, Label};

/// Options exposed to observers.
///
/// Internal bookkeeping never appears here; the resolved label always does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventOptions {
	pub label: Label,
	pub exclusive: bool,
	pub from_membership: bool,
}

impl EventOptions {
	pub(crate) fn union(&mut self, other: &EventOptions) {
		self.exclusive |= other.exclusive;
		self.from_membership |= other.from_membership;
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemEventKind {
	Selected,
	Deselected,
	Reselected,
}

/// A change of an item's own flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemEvent {
	pub kind: ItemEventKind,
	pub item: ItemId,
	pub options: EventOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OneEventKind {
	Select,
	Deselect,
	Reselect,
}

/// A change of a single-select collection's holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneEvent {
	pub kind: OneEventKind,
	pub collection: CollectionId,
	pub item: ItemId,
	pub options: EventOptions,
}

/// Summary class of a multi-select change, derived from the final count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManyClass {
	All,
	Some,
	None,
}

impl ManyClass {
	/// `count == 0` is `None`, `count == members > 0` is `All`, anything else
	/// is `Some`.
	pub fn classify(count: usize, members: usize) -> Self {
		if count == 0 {
			ManyClass::None
		} else if count == members {
			ManyClass::All
		} else {
			ManyClass::Some
		}
	}
}

/// Items that entered and left a selection, in encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
	pub selected: Vec<ItemId>,
	pub deselected: Vec<ItemId>,
}

impl Diff {
	/// Items of `next` missing from `previous`, then items of `previous`
	/// missing from `next`.
	pub fn between(previous: &IndexSet<ItemId>, next: &IndexSet<ItemId>) -> Self {
		Self {
			selected: next.iter().copied().filter(|item| !previous.contains(item)).collect(),
			deselected: previous.iter().copied().filter(|item| !next.contains(item)).collect(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.selected.is_empty() && self.deselected.is_empty()
	}

	/// Merges `other` into `self`. An item that appears on both sides
	/// cancelled out across the merged steps and is dropped from both.
	pub(crate) fn union(&mut self, other: &Diff) {
		for &item in &other.selected {
			if !self.selected.contains(&item) {
				self.selected.push(item);
			}
		}
		for &item in &other.deselected {
			if !self.deselected.contains(&item) {
				self.deselected.push(item);
			}
		}
		let cancelled: Vec<ItemId> =
			self.selected.iter().copied().filter(|item| self.deselected.contains(item)).collect();
		self.selected.retain(|item| !cancelled.contains(item));
		self.deselected.retain(|item| !cancelled.contains(item));
	}
}

/// A multi-select summary: `select:all`, `select:some` or `select:none`.
///
/// One operation delivers at most one summary per collection and label. Its
/// diff is net: it compares the selection before the operation with the
/// selection after it, so an item selected and deselected again by the same
/// operation appears on neither side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManyEvent {
	pub class: ManyClass,
	pub collection: CollectionId,
	pub diff: Diff,
	pub options: EventOptions,
}

/// Items of a multi-select collection that were re-affirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReselectAnyEvent {
	pub collection: CollectionId,
	pub items: Vec<ItemId>,
	pub options: EventOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MembershipEventKind {
	Added,
	Removed,
	Reset,
}

/// A host membership change. Not label-specific; delivered only on the
/// plain channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipEvent {
	pub kind: MembershipEventKind,
	pub collection: CollectionId,
	pub items: Vec<ItemId>,
}

/// Any event produced by one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
	Item(ItemEvent),
	One(OneEvent),
	Many(ManyEvent),
	ReselectAny(ReselectAnyEvent),
	Membership(MembershipEvent),
}

impl SelectionEvent {
	/// The unqualified channel name.
	pub fn name(&self) -> &'static str {
		match self {
			SelectionEvent::Item(e) => match e.kind {
				ItemEventKind::Selected => "selected",
				ItemEventKind::Deselected => "deselected",
				ItemEventKind::Reselected => "reselected",
			},
			SelectionEvent::One(e) => match e.kind {
				OneEventKind::Select => "select:one",
				OneEventKind::Deselect => "deselect:one",
				OneEventKind::Reselect => "reselect:one",
			},
			SelectionEvent::Many(e) => match e.class {
				ManyClass::All => "select:all",
				ManyClass::Some => "select:some",
				ManyClass::None => "select:none",
			},
			SelectionEvent::ReselectAny(_) => "reselect:any",
			SelectionEvent::Membership(e) => match e.kind {
				MembershipEventKind::Added => "add",
				MembershipEventKind::Removed => "remove",
				MembershipEventKind::Reset => "reset",
			},
		}
	}

	/// The label-qualified channel name, e.g. `select:one:starred`.
	///
	/// Membership events carry no label and keep their plain name.
	pub fn qualified_name(&self) -> String {
		match self.label() {
			Some(label) => format!("{}{CHANNEL_SEPARATOR}{label}", self.name()),
			None => self.name().to_owned(),
		}
	}

	pub fn label(&self) -> Option<&Label> {
		self.options().map(|options| &options.label)
	}

	pub fn options(&self) -> Option<&EventOptions> {
		match self {
			SelectionEvent::Item(e) => Some(&e.options),
			SelectionEvent::One(e) => Some(&e.options),
			SelectionEvent::Many(e) => Some(&e.options),
			SelectionEvent::ReselectAny(e) => Some(&e.options),
			SelectionEvent::Membership(_) => None,
		}
	}

	/// The entity whose observers receive this event.
	pub fn target(&self) -> EntityId {
		match self {
			SelectionEvent::Item(e) => e.item.into(),
			SelectionEvent::One(e) => e.collection.into(),
			SelectionEvent::Many(e) => e.collection.into(),
			SelectionEvent::ReselectAny(e) => e.collection.into(),
			SelectionEvent::Membership(e) => e.collection.into(),
		}
	}
}

impl fmt::Display for SelectionEvent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} ", self.qualified_name())?;
		match self {
			SelectionEvent::Item(e) => write!(f, "{}", e.item),
			SelectionEvent::One(e) => write!(f, "{} {}", e.collection, e.item),
			SelectionEvent::Many(e) => write!(
				f,
				"{} +[{}] -[{}]",
				e.collection,
				join(&e.diff.selected),
				join(&e.diff.deselected)
			),
			SelectionEvent::ReselectAny(e) => write!(f, "{} [{}]", e.collection, join(&e.items)),
			SelectionEvent::Membership(e) => write!(f, "{} [{}]", e.collection, join(&e.items)),
		}
	}
}

fn join(items: &[ItemId]) -> String {
	items.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}
