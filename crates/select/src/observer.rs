//! Typed observers.
//!
//! Each event category has its own trait with one method per event name.
//! Observers are attached to one entity with a [`Topic`]: [`Topic::Any`]
//! receives the plain channel of every label, [`Topic::Label`] receives the
//! qualified channel of one label. Both are delivered for every event, plain
//! first.
//!
//! Observers get the [`Store`] as it stands after the whole operation, so
//! they can inspect any entity but cannot start a new operation mid-delivery.

use std::fmt;

use crate::event::{
	ItemEvent, ItemEventKind, ManyClass, ManyEvent, MembershipEvent, MembershipEventKind, OneEvent,
	OneEventKind, ReselectAnyEvent, SelectionEvent,
};
use crate::ids::EntityId;
use crate::label::Label;
use crate::store::Store;

/// Receives `selected`, `deselected` and `reselected` of one item.
pub trait ItemObserver {
	fn selected(&mut self, _event: &ItemEvent, _store: &Store) {}
	fn deselected(&mut self, _event: &ItemEvent, _store: &Store) {}
	fn reselected(&mut self, _event: &ItemEvent, _store: &Store) {}
}

/// Receives `select:one`, `deselect:one` and `reselect:one` of one
/// single-select collection.
pub trait SingleObserver {
	fn select_one(&mut self, _event: &OneEvent, _store: &Store) {}
	fn deselect_one(&mut self, _event: &OneEvent, _store: &Store) {}
	fn reselect_one(&mut self, _event: &OneEvent, _store: &Store) {}
}

/// Receives `select:all`, `select:some`, `select:none` and `reselect:any` of
/// one multi-select collection.
pub trait MultiObserver {
	fn select_all(&mut self, _event: &ManyEvent, _store: &Store) {}
	fn select_some(&mut self, _event: &ManyEvent, _store: &Store) {}
	fn select_none(&mut self, _event: &ManyEvent, _store: &Store) {}
	fn reselect_any(&mut self, _event: &ReselectAnyEvent, _store: &Store) {}
}

/// Receives the host's `add`, `remove` and `reset` of one collection.
pub trait MembershipObserver {
	fn added(&mut self, _event: &MembershipEvent, _store: &Store) {}
	fn removed(&mut self, _event: &MembershipEvent, _store: &Store) {}
	fn reset(&mut self, _event: &MembershipEvent, _store: &Store) {}
}

/// Which channel of an entity an observer listens on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Topic {
	/// The unqualified channel of every label.
	Any,
	/// The qualified channel of one label.
	Label(Label),
}

/// Handle returned when attaching an observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

pub(crate) enum Handler {
	Item(Box<dyn ItemObserver>),
	Single(Box<dyn SingleObserver>),
	Multi(Box<dyn MultiObserver>),
	Membership(Box<dyn MembershipObserver>),
}

impl Handler {
	fn dispatch(&mut self, event: &SelectionEvent, store: &Store) {
		match (self, event) {
			(Handler::Item(observer), SelectionEvent::Item(e)) => match e.kind {
				ItemEventKind::Selected => observer.selected(e, store),
				ItemEventKind::Deselected => observer.deselected(e, store),
				ItemEventKind::Reselected => observer.reselected(e, store),
			},
			(Handler::Single(observer), SelectionEvent::One(e)) => match e.kind {
				OneEventKind::Select => observer.select_one(e, store),
				OneEventKind::Deselect => observer.deselect_one(e, store),
				OneEventKind::Reselect => observer.reselect_one(e, store),
			},
			(Handler::Multi(observer), SelectionEvent::Many(e)) => match e.class {
				ManyClass::All => observer.select_all(e, store),
				ManyClass::Some => observer.select_some(e, store),
				ManyClass::None => observer.select_none(e, store),
			},
			(Handler::Multi(observer), SelectionEvent::ReselectAny(e)) => observer.reselect_any(e, store),
			(Handler::Membership(observer), SelectionEvent::Membership(e)) => match e.kind {
				MembershipEventKind::Added => observer.added(e, store),
				MembershipEventKind::Removed => observer.removed(e, store),
				MembershipEventKind::Reset => observer.reset(e, store),
			},
			_ => {}
		}
	}
}

struct Subscription {
	id: ObserverId,
	target: EntityId,
	topic: Topic,
	handler: Handler,
}

/// Observers of every entity, in attach order.
#[derive(Default)]
pub(crate) struct Observers {
	subscriptions: Vec<Subscription>,
	next_id: u64,
}

impl Observers {
	pub fn attach(&mut self, target: EntityId, topic: Topic, handler: Handler) -> ObserverId {
		self.next_id += 1;
		let id = ObserverId(self.next_id);
		self.subscriptions.push(Subscription {
			id,
			target,
			topic,
			handler,
		});
		id
	}

	pub fn detach(&mut self, id: ObserverId) -> bool {
		let before = self.subscriptions.len();
		self.subscriptions.retain(|sub| sub.id != id);
		self.subscriptions.len() != before
	}

	/// Drops every observer of `target`.
	pub fn detach_all(&mut self, target: EntityId) {
		self.subscriptions.retain(|sub| sub.target != target);
	}

	/// Delivers `events` in order, each on its plain then its qualified
	/// channel.
	pub fn deliver(&mut self, store: &Store, events: &[SelectionEvent]) {
		for event in events {
			let target = event.target();
			for sub in self.subscriptions.iter_mut().filter(|sub| sub.target == target) {
				if sub.topic == Topic::Any {
					sub.handler.dispatch(event, store);
				}
			}
			let Some(label) = event.label() else {
				continue;
			};
			for sub in self.subscriptions.iter_mut().filter(|sub| sub.target == target) {
				if matches!(&sub.topic, Topic::Label(wanted) if wanted == label) {
					sub.handler.dispatch(event, store);
				}
			}
		}
	}
}

impl fmt::Debug for Observers {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Observers")
			.field("subscriptions", &self.subscriptions.len())
			.finish()
	}
}
