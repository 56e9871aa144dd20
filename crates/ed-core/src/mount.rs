use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Name of a target element in the host page a chart is attached to
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MountId(String);

impl MountId {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        // Accept the CSS selector form the embed call uses
        match id.strip_prefix('#') {
            Some(stripped) => Self(stripped.to_string()),
            None => Self(id),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// CSS selector handed to the embed call
    pub fn selector(&self) -> String {
        format!("#{}", self.0)
    }
}

impl fmt::Display for MountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for MountId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

impl From<&str> for MountId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}
