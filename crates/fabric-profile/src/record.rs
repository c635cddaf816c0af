//! Storable projection of a profile

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::PARENTS;

/// A profile as a registry stores it: identity, attributes and raw files.
///
/// Parents are only referenced by id through the [`PARENTS`] attribute;
/// turning a record back into a [`crate::Profile`] requires resolving them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// Version the profile belongs to
    pub version: String,
    /// Profile identifier
    pub id: String,
    /// Attributes, including the serialized parent list
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// File name to raw content
    #[serde(default)]
    pub file_configurations: BTreeMap<String, Vec<u8>>,
}

impl ProfileRecord {
    /// Create an empty record.
    pub fn new(version: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            id: id.into(),
            ..Default::default()
        }
    }

    /// Parent ids named by the [`PARENTS`] attribute, in declared order.
    pub fn parent_ids(&self) -> Vec<&str> {
        self.attributes
            .get(PARENTS)
            .map(|parents| parents.split_whitespace().collect())
            .unwrap_or_default()
    }
}
