use crate::event::EventOptions;
use crate::label::Label;

/// Options accepted by every selection operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectOptions {
	/// Label to operate on; the target entity's default label when `None`.
	pub label: Option<Label>,
	/// Mutate state without delivering any event.
	pub silent: bool,
	/// Multi-select only: deselect every other member before selecting.
	pub exclusive: bool,
}

impl SelectOptions {
	pub fn label(label: Label) -> Self {
		Self {
			label: Some(label),
			..Self::default()
		}
	}

	pub fn silent() -> Self {
		Self {
			silent: true,
			..Self::default()
		}
	}

	pub fn exclusive() -> Self {
		Self {
			exclusive: true,
			..Self::default()
		}
	}

	pub fn with_label(mut self, label: Label) -> Self {
		self.label = Some(label);
		self
	}

	pub fn with_silent(mut self, silent: bool) -> Self {
		self.silent = silent;
		self
	}

	pub fn with_exclusive(mut self, exclusive: bool) -> Self {
		self.exclusive = exclusive;
		self
	}
}

/// Options carried by host membership changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MembershipOptions {
	/// Suppress every event of the membership change, including the
	/// synchronizer's. The synchronizer itself still runs.
	pub silent: bool,
}

impl MembershipOptions {
	pub fn silent() -> Self {
		Self { silent: true }
	}
}

/// Resolved options of one engine call, including internal bookkeeping that
/// never reaches observers.
#[derive(Debug, Clone)]
pub(crate) struct Call {
	pub label: Label,
	pub silent: bool,
	pub exclusive: bool,
	pub from_membership: bool,
	/// The receiving collection queues none of its own events; items and
	/// other collections still do.
	pub silent_locally: bool,
	/// Suppress `reselected`, `reselect:one` and `reselect:any`.
	pub silent_reselect: bool,
	/// The caller already dealt with the item; only the claim is cleared.
	pub skip_item_call: bool,
}

impl Call {
	pub fn new(label: Label, opts: &SelectOptions) -> Self {
		Self {
			label,
			silent: opts.silent,
			exclusive: opts.exclusive,
			from_membership: false,
			silent_locally: false,
			silent_reselect: false,
			skip_item_call: false,
		}
	}

	pub fn membership(label: Label, silent: bool) -> Self {
		Self {
			label,
			silent,
			exclusive: false,
			from_membership: true,
			silent_locally: false,
			silent_reselect: true,
			skip_item_call: false,
		}
	}

	/// Options handed to the next entity of a cascade. Flags that only
	/// concern the receiving entity are dropped.
	pub fn forwarded(&self) -> Self {
		Self {
			label: self.label.clone(),
			silent: self.silent,
			exclusive: false,
			from_membership: self.from_membership,
			silent_locally: false,
			silent_reselect: self.silent_reselect,
			skip_item_call: false,
		}
	}

	pub fn locally_silent(&self) -> Self {
		Self {
			silent_locally: true,
			..self.clone()
		}
	}

	pub fn skipping_item(&self) -> Self {
		Self {
			skip_item_call: true,
			..self.clone()
		}
	}

	/// Whether the receiving entity queues its own events.
	pub fn emits(&self) -> bool {
		!self.silent && !self.silent_locally
	}

	pub fn emits_reselect(&self) -> bool {
		self.emits() && !self.silent_reselect
	}

	pub fn event_options(&self) -> EventOptions {
		EventOptions {
			label: self.label.clone(),
			exclusive: self.exclusive,
			from_membership: self.from_membership,
		}
	}
}
