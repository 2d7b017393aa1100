//! Selection state shared across items and the collections they belong to.
//!
//! Items carry per-label selection flags. Collections either hold at most one
//! selected item per label ([`CollectionKind::Single`]) or an arbitrary subset
//! ([`CollectionKind::Multi`]). An item may belong to several collections at
//! once; every public operation on [`Selections`] keeps all of them consistent
//! and delivers the resulting events only after the whole cascade finished.

/// Setup configuration for items and collections.
pub mod config;
/// Per-operation transaction: visit guard and deferred event queue.
mod context;
/// Error types.
pub mod error;
/// Event payloads delivered to observers.
pub mod event;
/// Entity identifiers.
pub mod ids;
/// Item-side propagation.
mod item;
/// Selection labels and reserved names.
pub mod label;
/// Shareable event recorder.
pub mod log;
/// Membership synchronization and host-side membership operations.
mod membership;
/// Multi-select collection behavior.
mod multi;
/// Observer traits and the subscription registry.
pub mod observer;
/// Caller-facing operation options.
pub mod options;
/// Public entry point owning every item and collection.
mod selections;
/// Single-select collection behavior.
mod single;
/// Entity state and read accessors.
pub mod store;

pub use config::{CollectionConfig, ItemConfig};
pub use error::{ConfigError, Result, SelectError};
pub use event::{
	Diff, EventOptions, ItemEvent, ItemEventKind, ManyClass, ManyEvent, MembershipEvent,
	MembershipEventKind, OneEvent, OneEventKind, ReselectAnyEvent, SelectionEvent,
};
pub use ids::{CollectionId, EntityId, ItemId};
pub use label::Label;
pub use log::{EventLog, LoggedEvent};
pub use observer::{
	ItemObserver, MembershipObserver, MultiObserver, ObserverId, SingleObserver, Topic,
};
pub use options::{MembershipOptions, SelectOptions};
pub use selections::Selections;
pub use store::{CollectionKind, Store};
