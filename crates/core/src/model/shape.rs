use std::fmt;

use serde::{Deserialize, Serialize};

/// Label assigned to a sample (e.g. "QUARTER_NOTE", "CLUTTER").
///
/// The repository treats labels as opaque; mapping shapes to symbols happens upstream.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Shape(String);

impl Shape {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Shape {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Shape {
    fn from(value: String) -> Self {
        Self(value)
    }
}
