//! Format-neutral setup configuration.
//!
//! These structs deserialize from any serde format. Validation into typed
//! labels happens once, when an entity is created, and never again: the
//! ignored-label set of a collection is frozen from that point on.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::label::Label;

/// Setup for a selectable item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ItemConfig {
	/// Label used when a call does not name one (defaults to `"selected"`).
	pub default_label: Option<String>,
}

/// Setup for a single- or multi-select collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectionConfig {
	/// Label used when a call does not name one (defaults to `"selected"`).
	pub default_label: Option<String>,
	/// Labels this collection refuses to track.
	pub ignored_labels: Vec<String>,
}

impl ItemConfig {
	pub fn with_default_label(mut self, label: impl Into<String>) -> Self {
		self.default_label = Some(label.into());
		self
	}

	pub(crate) fn resolve(&self) -> Result<ItemSetup, ConfigError> {
		Ok(ItemSetup {
			default_label: resolve_default(self.default_label.as_deref())?,
		})
	}
}

impl CollectionConfig {
	pub fn with_default_label(mut self, label: impl Into<String>) -> Self {
		self.default_label = Some(label.into());
		self
	}

	pub fn ignore(mut self, label: impl Into<String>) -> Self {
		self.ignored_labels.push(label.into());
		self
	}

	pub(crate) fn resolve(&self) -> Result<CollectionSetup, ConfigError> {
		let default_label = resolve_default(self.default_label.as_deref())?;
		let mut ignored = FxHashSet::default();
		for name in &self.ignored_labels {
			let label = Label::new(name)?;
			if label == default_label {
				return Err(ConfigError::IgnoredDefaultLabel(name.clone()));
			}
			ignored.insert(label);
		}
		Ok(CollectionSetup { default_label, ignored })
	}
}

fn resolve_default(name: Option<&str>) -> Result<Label, ConfigError> {
	name.map_or_else(|| Ok(Label::selected()), Label::new)
}

/// Validated item setup.
#[derive(Debug, Clone)]
pub(crate) struct ItemSetup {
	pub default_label: Label,
}

/// Validated collection setup.
#[derive(Debug, Clone)]
pub(crate) struct CollectionSetup {
	pub default_label: Label,
	pub ignored: FxHashSet<Label>,
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn empty_config_uses_selected() {
		let setup = CollectionConfig::default().resolve().unwrap();
		assert_eq!(setup.default_label, Label::selected());
		assert!(setup.ignored.is_empty());
	}

	#[test]
	fn ignoring_default_label_is_rejected() {
		let err = CollectionConfig::default().ignore("selected").resolve().unwrap_err();
		assert_eq!(err, ConfigError::IgnoredDefaultLabel("selected".into()));

		let err = CollectionConfig::default()
			.with_default_label("starred")
			.ignore("starred")
			.resolve()
			.unwrap_err();
		assert_eq!(err, ConfigError::IgnoredDefaultLabel("starred".into()));
	}

	#[test]
	fn reserved_default_label_is_rejected() {
		let err = ItemConfig::default().with_default_label("deselect").resolve().unwrap_err();
		assert_eq!(err, ConfigError::ReservedLabel("deselect".into()));
	}

	#[test]
	fn ignored_labels_are_validated() {
		let err = CollectionConfig::default().ignore("a:b").resolve().unwrap_err();
		assert!(matches!(err, ConfigError::InvalidLabel { .. }));

		let setup = CollectionConfig::default().ignore("starred").resolve().unwrap();
		assert!(setup.ignored.contains("starred"));
	}
}
