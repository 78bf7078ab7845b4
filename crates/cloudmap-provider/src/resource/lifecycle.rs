//! Namespace configuration, local records and the resource state machine

use cloudmap_common::KeyValueTags;
use serde::{Deserialize, Serialize};

/// User-supplied configuration for one HTTP namespace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: KeyValueTags,
}

impl NamespaceConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags(mut self, tags: KeyValueTags) -> Self {
        self.tags = tags;
        self
    }

    /// Description with the empty string treated as unset
    pub fn normalized_description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.is_empty())
    }
}

/// Local view of a namespace after a successful Read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceRecord {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub arn: String,
    #[serde(default)]
    pub tags: KeyValueTags,
}

/// Where a namespace is in its lifecycle.
///
/// ```text
/// Absent --create--> Unsynced { id } --read--> Synced(record)
///    ^                                            |
///    +------------- delete / read (gone) ---------+
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ResourceState {
    /// No remote namespace, or it vanished out-of-band
    Absent,
    /// Identity known, attributes not yet read
    Unsynced { id: String },
    /// Identity and attributes known
    Synced(NamespaceRecord),
}

impl ResourceState {
    pub fn id(&self) -> Option<&str> {
        match self {
            ResourceState::Absent => None,
            ResourceState::Unsynced { id } => Some(id),
            ResourceState::Synced(record) => Some(&record.id),
        }
    }

    pub fn record(&self) -> Option<&NamespaceRecord> {
        match self {
            ResourceState::Synced(record) => Some(record),
            _ => None,
        }
    }

    pub fn into_record(self) -> Option<NamespaceRecord> {
        match self {
            ResourceState::Synced(record) => Some(record),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, ResourceState::Absent)
    }
}
