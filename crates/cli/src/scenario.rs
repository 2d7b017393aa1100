//! Declarative scenarios.
//!
//! ```toml
//! [[items]]
//! name = "a"
//!
//! [[collections]]
//! name = "tabs"
//! kind = "single"
//! members = ["a"]
//! config = { default_label = "active" }
//!
//! [[steps]]
//! op = "select"
//! collection = "tabs"
//! item = "a"
//! ```

use indexmap::IndexMap;
use serde::Deserialize;
use tandem_select::{
	CollectionConfig, CollectionId, ConfigError, EntityId, EventLog, ItemConfig, ItemId, Label, LoggedEvent,
	MembershipOptions, SelectError, SelectOptions, SelectionEvent, Selections, Topic,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
	#[error("failed to parse scenario: {0}")]
	Parse(#[from] toml::de::Error),

	#[error(transparent)]
	Config(#[from] ConfigError),

	#[error(transparent)]
	Select(#[from] SelectError),

	/// A step or collection refers to an item that was never declared.
	#[error("unknown item {0:?}")]
	UnknownItem(String),

	/// A step refers to a collection that was never declared.
	#[error("unknown collection {0:?}")]
	UnknownCollection(String),

	/// Two items or two collections share a name.
	#[error("duplicate name {0:?}")]
	DuplicateName(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
	#[serde(default)]
	pub items: Vec<ItemSpec>,
	#[serde(default)]
	pub collections: Vec<CollectionSpec>,
	#[serde(default)]
	pub steps: Vec<Step>,
}

impl Scenario {
	pub fn parse(text: &str) -> Result<Self, ScenarioError> {
		Ok(toml::from_str(text)?)
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemSpec {
	pub name: String,
	#[serde(default)]
	pub config: ItemConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
	Single,
	Multi,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectionSpec {
	pub name: String,
	pub kind: Kind,
	/// Mandatory; an empty collection lists `members = []`.
	pub members: Option<Vec<String>>,
	#[serde(default)]
	pub config: CollectionConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
	SelectItem,
	DeselectItem,
	ToggleItem,
	Select,
	Deselect,
	SelectAll,
	DeselectAll,
	SelectNone,
	InvertSelection,
	ToggleSelectAll,
	Add,
	Remove,
	Reset,
	Close,
}

impl Op {
	pub fn name(self) -> &'static str {
		match self {
			Op::SelectItem => "select_item",
			Op::DeselectItem => "deselect_item",
			Op::ToggleItem => "toggle_item",
			Op::Select => "select",
			Op::Deselect => "deselect",
			Op::SelectAll => "select_all",
			Op::DeselectAll => "deselect_all",
			Op::SelectNone => "select_none",
			Op::InvertSelection => "invert_selection",
			Op::ToggleSelectAll => "toggle_select_all",
			Op::Add => "add",
			Op::Remove => "remove",
			Op::Reset => "reset",
			Op::Close => "close",
		}
	}
}

/// One operation. Which fields are required depends on `op`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
	pub op: Op,
	pub collection: Option<String>,
	pub item: Option<String>,
	#[serde(default)]
	pub items: Vec<String>,
	pub label: Option<String>,
	#[serde(default)]
	pub silent: bool,
	#[serde(default)]
	pub exclusive: bool,
}

/// A scenario's arena with every entity observed by one shared log.
pub struct Runner {
	selections: Selections,
	items: IndexMap<String, ItemId>,
	collections: IndexMap<String, CollectionId>,
	log: EventLog,
}

impl Runner {
	/// Creates every declared item and collection.
	pub fn new(scenario: &Scenario) -> Result<Self, ScenarioError> {
		let mut runner = Self {
			selections: Selections::new(),
			items: IndexMap::new(),
			collections: IndexMap::new(),
			log: EventLog::new(),
		};

		for spec in &scenario.items {
			if runner.items.contains_key(&spec.name) {
				return Err(ScenarioError::DuplicateName(spec.name.clone()));
			}
			let id = runner.selections.create_item(&spec.config)?;
			runner.selections.observe_item(id, Topic::Any, runner.log.clone())?;
			runner.items.insert(spec.name.clone(), id);
		}

		for spec in &scenario.collections {
			if runner.collections.contains_key(&spec.name) {
				return Err(ScenarioError::DuplicateName(spec.name.clone()));
			}
			let names = spec
				.members
				.as_ref()
				.ok_or_else(|| ConfigError::MissingField(format!("collections.{}.members", spec.name)))?;
			let members = names.iter().map(|name| runner.item(name)).collect::<Result<Vec<_>, _>>()?;
			let id = match spec.kind {
				Kind::Single => {
					let id = runner.selections.create_single(&spec.config, members)?;
					runner.selections.observe_single(id, Topic::Any, runner.log.clone())?;
					id
				}
				Kind::Multi => {
					let id = runner.selections.create_multi(&spec.config, members)?;
					runner.selections.observe_multi(id, Topic::Any, runner.log.clone())?;
					id
				}
			};
			runner.selections.observe_membership(id, runner.log.clone())?;
			runner.collections.insert(spec.name.clone(), id);
		}

		tracing::debug!(
			items = runner.items.len(),
			collections = runner.collections.len(),
			"scenario set up"
		);
		Ok(runner)
	}

	pub fn item_count(&self) -> usize {
		self.items.len()
	}

	pub fn collection_count(&self) -> usize {
		self.collections.len()
	}

	/// Runs one step and renders the events it delivered, in delivery order.
	pub fn run_step(&mut self, step: &Step) -> Result<Vec<String>, ScenarioError> {
		let opts = SelectOptions {
			label: step.label.as_deref().map(Label::new).transpose()?,
			silent: step.silent,
			exclusive: step.exclusive,
		};
		let membership = MembershipOptions { silent: step.silent };
		tracing::debug!(op = step.op.name(), "running step");

		match step.op {
			Op::SelectItem => {
				let item = self.item_of(step)?;
				self.selections.select_item(item, opts)?;
			}
			Op::DeselectItem => {
				let item = self.item_of(step)?;
				self.selections.deselect_item(item, opts)?;
			}
			Op::ToggleItem => {
				let item = self.item_of(step)?;
				self.selections.toggle_item(item, opts)?;
			}
			Op::Select => {
				let (collection, item) = (self.collection_of(step)?, self.item_of(step)?);
				self.selections.select(collection, item, opts)?;
			}
			Op::Deselect => {
				let collection = self.collection_of(step)?;
				let item = step.item.as_deref().map(|name| self.item(name)).transpose()?;
				self.selections.deselect(collection, item, opts)?;
			}
			Op::SelectAll => {
				let collection = self.collection_of(step)?;
				self.selections.select_all(collection, opts)?;
			}
			Op::DeselectAll => {
				let collection = self.collection_of(step)?;
				self.selections.deselect_all(collection, opts)?;
			}
			Op::SelectNone => {
				let collection = self.collection_of(step)?;
				self.selections.select_none(collection, opts)?;
			}
			Op::InvertSelection => {
				let collection = self.collection_of(step)?;
				self.selections.invert_selection(collection, opts)?;
			}
			Op::ToggleSelectAll => {
				let collection = self.collection_of(step)?;
				self.selections.toggle_select_all(collection, opts)?;
			}
			Op::Add => {
				let (collection, items) = (self.collection_of(step)?, self.items_of(step)?);
				self.selections.add_members(collection, items, membership)?;
			}
			Op::Remove => {
				let (collection, items) = (self.collection_of(step)?, self.items_of(step)?);
				self.selections.remove_members(collection, items, membership)?;
			}
			Op::Reset => {
				let (collection, items) = (self.collection_of(step)?, self.items_of(step)?);
				self.selections.reset_members(collection, items, membership)?;
			}
			Op::Close => {
				let collection = self.collection_of(step)?;
				self.selections.close(collection, membership)?;
			}
		}

		Ok(self.log.take().iter().map(|entry| self.render(entry)).collect())
	}

	fn item(&self, name: &str) -> Result<ItemId, ScenarioError> {
		self.items
			.get(name)
			.copied()
			.ok_or_else(|| ScenarioError::UnknownItem(name.to_owned()))
	}

	fn item_of(&self, step: &Step) -> Result<ItemId, ScenarioError> {
		let name = step.item.as_deref().ok_or_else(|| missing(step, "item"))?;
		self.item(name)
	}

	/// `items`, or the single `item` when no list is given.
	fn items_of(&self, step: &Step) -> Result<Vec<ItemId>, ScenarioError> {
		if step.items.is_empty() && step.item.is_some() {
			return self.item_of(step).map(|item| vec![item]);
		}
		step.items.iter().map(|name| self.item(name)).collect()
	}

	fn collection_of(&self, step: &Step) -> Result<CollectionId, ScenarioError> {
		let name = step.collection.as_deref().ok_or_else(|| missing(step, "collection"))?;
		self.collections
			.get(name)
			.copied()
			.ok_or_else(|| ScenarioError::UnknownCollection(name.to_owned()))
	}

	fn name_of(&self, entity: EntityId) -> String {
		let found = match entity {
			EntityId::Item(id) => self.items.iter().find(|&(_, &item)| item == id).map(|(name, _)| name),
			EntityId::Collection(id) => self
				.collections
				.iter()
				.find(|&(_, &collection)| collection == id)
				.map(|(name, _)| name),
		};
		found.cloned().unwrap_or_else(|| entity.to_string())
	}

	fn names(&self, items: &[ItemId]) -> String {
		items
			.iter()
			.map(|&item| self.name_of(item.into()))
			.collect::<Vec<_>>()
			.join(", ")
	}

	/// `<qualified channel> <target> [details]`, with entity names.
	fn render(&self, entry: &LoggedEvent) -> String {
		let event = &entry.event;
		let target = self.name_of(event.target());
		let details = match event {
			SelectionEvent::Item(_) => String::new(),
			SelectionEvent::One(e) => format!(" {}", self.name_of(e.item.into())),
			SelectionEvent::Many(e) => format!(
				" +[{}] -[{}]",
				self.names(&e.diff.selected),
				self.names(&e.diff.deselected)
			),
			SelectionEvent::ReselectAny(e) => format!(" [{}]", self.names(&e.items)),
			SelectionEvent::Membership(e) => format!(" [{}]", self.names(&e.items)),
		};
		format!("{} {target}{details}", event.qualified_name())
	}
}

fn missing(step: &Step, field: &str) -> ScenarioError {
	ConfigError::MissingField(format!("{}.{field}", step.op.name())).into()
}

#[cfg(test)]
mod tests;
