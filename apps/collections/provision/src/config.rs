//! The collections mapping file: `{ "collection-name": "contact-identity", ... }`.

use std::{fs, path::Path};

use serde_json::{Map, Value};

use crate::error::ConfigError;

/// Default mapping file name.
pub const DEFAULT_CONFIG_FILE: &str = "collections.json";

/// One mapping entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionEntry {
    /// Collection and sub directory name.
    pub name: String,
    /// Identity (or email like handle) that gets access.
    pub contact: String,
}

/// Collection names to contacts, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionMap {
    entries: Vec<CollectionEntry>,
}

impl CollectionMap {
    /// Read and validate a mapping file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let doc: Value = serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        match doc {
            Value::Object(map) => Self::from_object(map),
            _ => Err(ConfigError::NotAnObject),
        }
    }

    /// Parse a mapping from a JSON string.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        match serde_json::from_str(raw) {
            Ok(Value::Object(map)) => Self::from_object(map),
            Ok(_) => Err(ConfigError::NotAnObject),
            Err(source) => Err(ConfigError::Json {
                path: "<inline>".into(),
                source,
            }),
        }
    }

    fn from_object(map: Map<String, Value>) -> Result<Self, ConfigError> {
        let entries = map
            .into_iter()
            .map(|(name, contact)| {
                if name.trim().is_empty() {
                    return Err(ConfigError::EmptyName);
                }
                match contact {
                    Value::String(contact) if !contact.trim().is_empty() => {
                        Ok(CollectionEntry { name, contact })
                    }
                    _ => Err(ConfigError::BadContact(name)),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    /// Entries in file order.
    pub fn iter(&self) -> impl Iterator<Item = &CollectionEntry> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for CollectionMap {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, contact)| CollectionEntry { name, contact })
                .collect(),
        }
    }
}
