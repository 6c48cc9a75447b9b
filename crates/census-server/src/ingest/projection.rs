//! Projection of a rebuilt [`Record`] onto the stored `users` row

use census_common::record::Record;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

const NAME_KEY: &str = "name";
const FIRST_NAME_KEY: &str = "firstName";
const LAST_NAME_KEY: &str = "lastName";
const AGE_KEY: &str = "age";
const ADDRESS_KEY: &str = "address";

/// Why a line could not become a [`PersistedUser`]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("Expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("Record has no 'name' mapping")]
    MissingName,

    #[error("Record name is missing '{0}'")]
    MissingNamePart(&'static str),

    #[error("Record 'age' is a mapping, expected a single value")]
    NestedAge,
}

/// One row of the `users` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedUser {
    /// `name.firstName` and `name.lastName` joined by a space
    pub name: String,
    /// Raw `age` value, stored untyped
    pub age: Option<String>,
    /// Subtree under `address`
    pub address: Option<Value>,
    /// Every top-level key other than `name` and `age`
    pub additional_info: Value,
}

impl PersistedUser {
    pub fn from_record(record: &Record) -> Result<Self, RecordError> {
        let name = record.branch(NAME_KEY).ok_or(RecordError::MissingName)?;
        let first_name = name
            .leaf(FIRST_NAME_KEY)
            .ok_or(RecordError::MissingNamePart(FIRST_NAME_KEY))?;
        let last_name = name
            .leaf(LAST_NAME_KEY)
            .ok_or(RecordError::MissingNamePart(LAST_NAME_KEY))?;

        let age = match record.get(AGE_KEY) {
            None => None,
            Some(node) => Some(node.as_leaf().ok_or(RecordError::NestedAge)?.to_string()),
        };

        let additional_info: Map<String, Value> = record
            .iter()
            .filter(|(key, _)| *key != NAME_KEY && *key != AGE_KEY)
            .map(|(key, node)| (key.to_string(), node.to_json()))
            .collect();

        Ok(Self {
            name: format!("{} {}", first_name, last_name),
            age,
            address: record.get(ADDRESS_KEY).map(|node| node.to_json()),
            additional_info: Value::Object(additional_info),
        })
    }
}
