use std::fmt;

/// Unique identifier for a selectable item.
///
/// Ids are allocated by [`crate::Selections`] and never reused within one
/// arena, so a stale id of a removed entity is reported as unknown rather
/// than aliasing a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub(crate) u64);

/// Unique identifier for a single- or multi-select collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionId(pub(crate) u64);

impl ItemId {
	/// Returns the raw id value.
	pub const fn get(self) -> u64 {
		self.0
	}
}

impl CollectionId {
	/// Returns the raw id value.
	pub const fn get(self) -> u64 {
		self.0
	}
}

impl fmt::Display for ItemId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "i{}", self.0)
	}
}

impl fmt::Display for CollectionId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "c{}", self.0)
	}
}

/// Any entity that can be the target of an event or a visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityId {
	Item(ItemId),
	Collection(CollectionId),
}

impl From<ItemId> for EntityId {
	fn from(id: ItemId) -> Self {
		EntityId::Item(id)
	}
}

impl From<CollectionId> for EntityId {
	fn from(id: CollectionId) -> Self {
		EntityId::Collection(id)
	}
}

impl fmt::Display for EntityId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			EntityId::Item(id) => id.fmt(f),
			EntityId::Collection(id) => id.fmt(f),
		}
	}
}

/// Monotonic id allocator shared by items and collections of one arena.
#[derive(Debug, Default)]
pub(crate) struct IdAllocator {
	next: u64,
}

impl IdAllocator {
	pub fn next_item(&mut self) -> ItemId {
		ItemId(self.bump())
	}

	pub fn next_collection(&mut self) -> CollectionId {
		CollectionId(self.bump())
	}

	fn bump(&mut self) -> u64 {
		self.next += 1;
		self.next
	}
}
