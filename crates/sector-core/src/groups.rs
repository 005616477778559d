//! Custom sector groups ("splits") uploaded by the user.
//!
//! The upload is a JSON object mapping a group name to an array of sector
//! ids. Declaration order is kept so summary rows match the uploaded file.

use std::fmt;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GroupConfigError {
    #[error("invalid group file: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("group `{group}` must be an array of sector names/IDs")]
    InvalidGroup { group: String },
    #[error("group `{group}` is declared more than once")]
    DuplicateGroup { group: String },
}

/// A named set of sector ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomGroup {
    pub name: String,
    pub sectors: Vec<String>,
}

impl CustomGroup {
    pub fn contains(&self, sector_id: &str) -> bool {
        self.sectors.iter().any(|s| s == sector_id)
    }
}

/// Validated, ordered group configuration. Replaced wholesale on upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupConfig {
    groups: Vec<CustomGroup>,
}

impl GroupConfig {
    pub fn new(groups: Vec<CustomGroup>) -> Self {
        Self { groups }
    }

    pub fn from_json_str(input: &str) -> Result<Self, GroupConfigError> {
        let raw: RawGroups = serde_json::from_str(input)?;
        Self::try_from(raw)
    }

    pub fn groups(&self) -> &[CustomGroup] {
        &self.groups
    }
}

impl TryFrom<RawGroups> for GroupConfig {
    type Error = GroupConfigError;

    fn try_from(raw: RawGroups) -> Result<Self, Self::Error> {
        let mut groups: Vec<CustomGroup> = Vec::with_capacity(raw.0.len());
        for (name, value) in raw.0 {
            if groups.iter().any(|g| g.name == name) {
                return Err(GroupConfigError::DuplicateGroup { group: name });
            }
            let sectors = value
                .as_array()
                .and_then(|items| {
                    items
                        .iter()
                        .map(|item| item.as_str().map(str::to_string))
                        .collect::<Option<Vec<_>>>()
                })
                .ok_or_else(|| GroupConfigError::InvalidGroup { group: name.clone() })?;
            groups.push(CustomGroup { name, sectors });
        }
        Ok(Self { groups })
    }
}

impl Serialize for GroupConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for group in &self.groups {
            map.serialize_entry(&group.name, &group.sectors)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for GroupConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawGroups::deserialize(deserializer)?;
        GroupConfig::try_from(raw).map_err(de::Error::custom)
    }
}

/// Object entries in document order, values not yet validated.
struct RawGroups(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for RawGroups {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = RawGroups;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping group names to sector lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, Value>()? {
                    entries.push((key, value));
                }
                Ok(RawGroups(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}
