use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

/// Identity record for one sample sheet, independent of its samples and image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    /// Canonical name, unique within a registry.
    name: String,
    /// Content hash of the sheet image, absent when no image was available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hash: Option<String>,
    /// Other names this sheet was requested under.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    aliases: Vec<String>,
}

impl Descriptor {
    pub fn new(name: impl Into<String>, hash: Option<String>) -> Self {
        Self { name: name.into(), hash, aliases: Vec::new() }
    }

    /// Builder-style helper used when reading records back or in tests.
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for alias in aliases {
            self.add_alias(&alias.into());
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Comma-separated aliases, or `None` when there are none.
    pub fn aliases_string(&self) -> Option<String> {
        if self.aliases.is_empty() {
            None
        } else {
            Some(self.aliases.join(","))
        }
    }

    /// Case-insensitive match against the name or any alias.
    pub fn is_alias(&self, candidate: &str) -> bool {
        candidate.eq_ignore_ascii_case(&self.name)
            || self.aliases.iter().any(|alias| candidate.eq_ignore_ascii_case(alias))
    }

    /// Returns false if `alias` is empty or already known.
    pub(crate) fn add_alias(&mut self, alias: &str) -> bool {
        if alias.is_empty() || self.is_alias(alias) {
            return false;
        }
        info!("Added alias {} to {}", alias, self.name);
        self.aliases.push(alias.to_string());
        true
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
