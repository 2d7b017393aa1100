use std::cell::RefCell;
use std::rc::Rc;

use crate::event::{ItemEvent, ManyEvent, MembershipEvent, OneEvent, ReselectAnyEvent, SelectionEvent};
use crate::observer::{ItemObserver, MembershipObserver, MultiObserver, SingleObserver};
use crate::store::Store;

/// One delivered event and the channel it arrived on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedEvent {
	pub channel: String,
	pub event: SelectionEvent,
}

/// Records delivered events in order.
///
/// Clones share one buffer, so the same log can be attached to several
/// entities and read back afterwards. A log made with [`Self::qualified`]
/// records label-qualified channel names; attach it with a label topic.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
	entries: Rc<RefCell<Vec<LoggedEvent>>>,
	qualified: bool,
}

impl EventLog {
	pub fn new() -> Self {
		Self::default()
	}

	/// A handle on the same buffer that records qualified channel names.
	pub fn qualified(&self) -> Self {
		Self {
			entries: Rc::clone(&self.entries),
			qualified: true,
		}
	}

	fn record(&self, event: SelectionEvent) {
		let channel = if self.qualified {
			event.qualified_name()
		} else {
			event.name().to_owned()
		};
		self.entries.borrow_mut().push(LoggedEvent { channel, event });
	}

	pub fn entries(&self) -> Vec<LoggedEvent> {
		self.entries.borrow().clone()
	}

	/// Channel names in delivery order.
	pub fn channels(&self) -> Vec<String> {
		self.entries.borrow().iter().map(|entry| entry.channel.clone()).collect()
	}

	pub fn len(&self) -> usize {
		self.entries.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.borrow().is_empty()
	}

	/// Returns everything recorded so far and empties the buffer.
	pub fn take(&self) -> Vec<LoggedEvent> {
		std::mem::take(&mut *self.entries.borrow_mut())
	}

	pub fn clear(&self) {
		self.entries.borrow_mut().clear();
	}
}

impl ItemObserver for EventLog {
	fn selected(&mut self, event: &ItemEvent, _store: &Store) {
		self.record(SelectionEvent::Item(event.clone()));
	}

	fn deselected(&mut self, event: &ItemEvent, _store: &Store) {
		self.record(SelectionEvent::Item(event.clone()));
	}

	fn reselected(&mut self, event: &ItemEvent, _store: &Store) {
		self.record(SelectionEvent::Item(event.clone()));
	}
}

impl SingleObserver for EventLog {
	fn select_one(&mut self, event: &OneEvent, _store: &Store) {
		self.record(SelectionEvent::One(event.clone()));
	}

	fn deselect_one(&mut self, event: &OneEvent, _store: &Store) {
		self.record(SelectionEvent::One(event.clone()));
	}

	fn reselect_one(&mut self, event: &OneEvent, _store: &Store) {
		self.record(SelectionEvent::One(event.clone()));
	}
}

impl MultiObserver for EventLog {
	fn select_all(&mut self, event: &ManyEvent, _store: &Store) {
		self.record(SelectionEvent::Many(event.clone()));
	}

	fn select_some(&mut self, event: &ManyEvent, _store: &Store) {
		self.record(SelectionEvent::Many(event.clone()));
	}

	fn select_none(&mut self, event: &ManyEvent, _store: &Store) {
		self.record(SelectionEvent::Many(event.clone()));
	}

	fn reselect_any(&mut self, event: &ReselectAnyEvent, _store: &Store) {
		self.record(SelectionEvent::ReselectAny(event.clone()));
	}
}

impl MembershipObserver for EventLog {
	fn added(&mut self, event: &MembershipEvent, _store: &Store) {
		self.record(SelectionEvent::Membership(event.clone()));
	}

	fn removed(&mut self, event: &MembershipEvent, _store: &Store) {
		self.record(SelectionEvent::Membership(event.clone()));
	}

	fn reset(&mut self, event: &MembershipEvent, _store: &Store) {
		self.record(SelectionEvent::Membership(event.clone()));
	}
}
