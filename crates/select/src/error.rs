//! Error types for setup and selection operations.
//!
//! Every error is raised at the entry of a public call, before any state is
//! mutated. No-op outcomes such as reselecting the current holder are not
//! errors.

use thiserror::Error;

use crate::ids::{CollectionId, ItemId};
use crate::store::CollectionKind;

/// Invalid setup: labels, collection configuration, declarative scenarios.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
	/// A label name was empty.
	#[error("label must not be empty")]
	EmptyLabel,

	/// A label name is malformed.
	#[error("invalid label {label:?}: {reason}")]
	InvalidLabel {
		/// The rejected name.
		label: String,
		/// What is wrong with it.
		reason: &'static str,
	},

	/// A label name collides with a reserved identifier.
	#[error("label {0:?} collides with a reserved name")]
	ReservedLabel(String),

	/// A collection listed its own default label as ignored.
	#[error("default label {0:?} cannot be ignored")]
	IgnoredDefaultLabel(String),

	/// A required field is missing from a declarative setup.
	#[error("missing required field: {0}")]
	MissingField(String),
}

/// Errors returned by [`crate::Selections`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
	#[error("configuration error: {0}")]
	Config(#[from] ConfigError),

	/// No item with this id exists in the arena.
	#[error("unknown item {0}")]
	UnknownItem(ItemId),

	/// No collection with this id exists in the arena (or it was closed).
	#[error("unknown collection {0}")]
	UnknownCollection(CollectionId),

	/// The operation requires a different kind of collection.
	#[error("{operation} requires a {expected:?} collection, {collection} is {actual:?}")]
	WrongKind {
		operation: &'static str,
		collection: CollectionId,
		expected: CollectionKind,
		actual: CollectionKind,
	},

	/// The item is not a member of the collection.
	#[error("{item} is not a member of {collection}")]
	NotMember { collection: CollectionId, item: ItemId },
}

/// Result type for selection operations.
pub type Result<T> = std::result::Result<T, SelectError>;
