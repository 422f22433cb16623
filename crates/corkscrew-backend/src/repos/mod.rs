pub mod application;
pub mod job;
pub mod message;
pub mod profile;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::BackendResult;

pub(crate) fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> BackendResult<Vec<T>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(Into::into))
        .collect()
}

pub(crate) fn decode_first<T: DeserializeOwned>(rows: Vec<Value>) -> BackendResult<Option<T>> {
    match rows.into_iter().next() {
        Some(row) => Ok(Some(serde_json::from_value(row)?)),
        None => Ok(None),
    }
}
