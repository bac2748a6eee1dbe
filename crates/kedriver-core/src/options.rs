//! Typed option bag handed to drivers by the orchestration layer
//!
//! Every option may be supplied under several aliases (a hyphenated name and a
//! camel-case one, e.g. `node-count` / `nodeCount`). Drivers declare each field
//! once as an [`OptionKey`] and read it through the typed accessors on
//! [`DriverOptions`], which walk the aliases in order.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single option value
///
/// `Null` is an explicitly unset value; every accessor reads it as absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    String(String),
    StringList(Vec<String>),
    Null,
}

/// Ordered list of names an option may be supplied under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionKey {
    aliases: &'static [&'static str],
}

impl OptionKey {
    /// Declare an option; the first alias is its canonical name
    pub const fn new(aliases: &'static [&'static str]) -> Self {
        Self { aliases }
    }

    /// Canonical (first) name of the option
    pub fn name(&self) -> &'static str {
        self.aliases.first().copied().unwrap_or_default()
    }

    /// All aliases in lookup order
    pub fn aliases(&self) -> &'static [&'static str] {
        self.aliases
    }
}

/// Tri-state feature toggle
///
/// `Inherit` means the option was not supplied and the provider default
/// applies; it is never the same thing as `Disabled`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Toggle {
    #[default]
    Inherit,
    Enabled,
    Disabled,
}

impl Toggle {
    /// True only when the toggle was explicitly switched off
    pub fn is_disabled(self) -> bool {
        matches!(self, Toggle::Disabled)
    }

    /// True only when the toggle was explicitly switched on
    pub fn is_enabled(self) -> bool {
        matches!(self, Toggle::Enabled)
    }

    /// True when no value was supplied
    pub fn is_inherit(self) -> bool {
        matches!(self, Toggle::Inherit)
    }
}

impl From<bool> for Toggle {
    fn from(value: bool) -> Self {
        if value {
            Toggle::Enabled
        } else {
            Toggle::Disabled
        }
    }
}

impl From<Option<bool>> for Toggle {
    fn from(value: Option<bool>) -> Self {
        value.map(Toggle::from).unwrap_or_default()
    }
}

/// The option bag
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriverOptions {
    values: HashMap<String, OptionValue>,
}

impl DriverOptions {
    /// Create an empty option bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a string option
    pub fn with_string(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, OptionValue::String(value.into()));
        self
    }

    /// Insert an integer option
    pub fn with_int(mut self, name: impl Into<String>, value: i64) -> Self {
        self.insert(name, OptionValue::Int(value));
        self
    }

    /// Insert a boolean option
    pub fn with_bool(mut self, name: impl Into<String>, value: bool) -> Self {
        self.insert(name, OptionValue::Bool(value));
        self
    }

    /// Insert a string-list option
    pub fn with_strings<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(
            name,
            OptionValue::StringList(values.into_iter().map(Into::into).collect()),
        );
        self
    }

    /// Insert or replace a raw value
    pub fn insert(&mut self, name: impl Into<String>, value: OptionValue) {
        self.values.insert(name.into(), value);
    }

    /// Raw value stored under an exact name
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn lookup<'a, T>(
        &'a self,
        key: OptionKey,
        pick: impl Fn(&'a OptionValue) -> Option<T>,
    ) -> Option<T> {
        key.aliases
            .iter()
            .filter_map(|alias| self.values.get(*alias))
            .find_map(pick)
    }

    /// First non-empty string value across the key's aliases
    pub fn string(&self, key: OptionKey) -> String {
        self.lookup(key, |value| match value {
            OptionValue::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        })
        .unwrap_or_default()
    }

    /// First non-zero integer value across the key's aliases
    pub fn int(&self, key: OptionKey) -> i64 {
        self.lookup(key, |value| match value {
            OptionValue::Int(n) if *n != 0 => Some(*n),
            _ => None,
        })
        .unwrap_or_default()
    }

    /// Plain boolean: true when any alias is set to `true`
    pub fn flag(&self, key: OptionKey) -> bool {
        self.lookup(key, |value| match value {
            OptionValue::Bool(true) => Some(true),
            _ => None,
        })
        .unwrap_or(false)
    }

    /// Tri-state boolean: the first alias holding a boolean decides
    pub fn toggle(&self, key: OptionKey) -> Toggle {
        self.lookup(key, |value| match value {
            OptionValue::Bool(b) => Some(Toggle::from(*b)),
            _ => None,
        })
        .unwrap_or_default()
    }

    /// First non-empty string list across the key's aliases
    pub fn strings(&self, key: OptionKey) -> Vec<String> {
        self.lookup(key, |value| match value {
            OptionValue::StringList(list) if !list.is_empty() => Some(list.clone()),
            _ => None,
        })
        .unwrap_or_default()
    }
}

impl FromIterator<(String, OptionValue)> for DriverOptions {
    fn from_iter<T: IntoIterator<Item = (String, OptionValue)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
