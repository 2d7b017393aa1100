use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use crate::error::ConfigError;

/// Name of the label used when neither the call nor the entity names one.
pub const DEFAULT_LABEL: &str = "selected";

/// Identifiers that may not be used as label names.
///
/// These are the operation names and option keys of the public surface. A
/// label sharing one of them would make qualified event channels and option
/// tables ambiguous.
pub const RESERVED_NAMES: &[&str] = &[
	"close",
	"count",
	"default_label",
	"deselect",
	"deselect_all",
	"exclusive",
	"flags",
	"from_membership",
	"ignored",
	"ignored_labels",
	"invert_selection",
	"label",
	"labels",
	"members",
	"message_only",
	"options",
	"owners",
	"queue",
	"select",
	"select_all",
	"select_none",
	"silent",
	"skip_item_call",
	"toggle",
	"toggle_select_all",
	"visited",
];

/// Separator between an event name and its label in qualified channels.
pub(crate) const CHANNEL_SEPARATOR: char = ':';

/// A named, independent selection dimension.
///
/// Cloning is cheap; the name is shared.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(Arc<str>);

impl Label {
	/// Validates and creates a label.
	///
	/// # Errors
	///
	/// Returns [`ConfigError`] for empty names, names containing whitespace or
	/// the channel separator `:`, and names in [`RESERVED_NAMES`].
	pub fn new(name: impl AsRef<str>) -> Result<Self, ConfigError> {
		let name = name.as_ref();
		validate(name)?;
		Ok(Self(Arc::from(name)))
	}

	/// The default `"selected"` label.
	pub fn selected() -> Self {
		Self(Arc::from(DEFAULT_LABEL))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn is_default(&self) -> bool {
		&*self.0 == DEFAULT_LABEL
	}
}

impl Default for Label {
	fn default() -> Self {
		Self::selected()
	}
}

fn validate(name: &str) -> Result<(), ConfigError> {
	if name.is_empty() {
		return Err(ConfigError::EmptyLabel);
	}
	if name.contains(CHANNEL_SEPARATOR) {
		return Err(ConfigError::InvalidLabel {
			label: name.to_owned(),
			reason: "contains ':'",
		});
	}
	if name.chars().any(char::is_whitespace) {
		return Err(ConfigError::InvalidLabel {
			label: name.to_owned(),
			reason: "contains whitespace",
		});
	}
	if RESERVED_NAMES.contains(&name) {
		return Err(ConfigError::ReservedLabel(name.to_owned()));
	}
	Ok(())
}

impl fmt::Debug for Label {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(&*self.0, f)
	}
}

impl fmt::Display for Label {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl AsRef<str> for Label {
	fn as_ref(&self) -> &str {
		self.as_str()
	}
}

impl Borrow<str> for Label {
	fn borrow(&self) -> &str {
		self.as_str()
	}
}

impl TryFrom<&str> for Label {
	type Error = ConfigError;

	fn try_from(value: &str) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}

impl TryFrom<String> for Label {
	type Error = ConfigError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
