//! Shape validators for untyped interactive items
//!
//! Callers often hand over button and list definitions as loose JSON. These
//! validators decide whether such a value has the structure the Cloud API
//! expects before it goes into an interactive payload. They never panic.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::message::{ButtonReply, ListRow, ListSection};

/// Why a value does not have the expected shape
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// Value is not a JSON object
    #[error("expected an object")]
    NotAnObject,

    /// Required string field is absent or not a string
    #[error("missing string field `{0}`")]
    MissingString(&'static str),

    /// `rows` is absent or not an array
    #[error("`rows` must be an array")]
    RowsNotArray,

    /// A list row is malformed
    #[error("row {index}: {source}")]
    Row {
        /// Position of the row in `rows`
        index: usize,
        /// What is wrong with it
        #[source]
        source: Box<ShapeError>,
    },

    /// `description` is present but not a string
    #[error("`description` must be a string")]
    DescriptionNotString,
}

fn as_object(value: &Value) -> Result<&Map<String, Value>, ShapeError> {
    value.as_object().ok_or(ShapeError::NotAnObject)
}

fn string_field(obj: &Map<String, Value>, key: &'static str) -> Result<String, ShapeError> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or(ShapeError::MissingString(key))
}

/// Validate a button reply: an object with string `id` and `title`
///
/// Extra fields are ignored.
pub fn validate_button_reply(value: &Value) -> Result<ButtonReply, ShapeError> {
    let obj = as_object(value)?;
    Ok(ButtonReply {
        id: string_field(obj, "id")?,
        title: string_field(obj, "title")?,
    })
}

fn validate_row(value: &Value) -> Result<ListRow, ShapeError> {
    let obj = as_object(value)?;
    let id = string_field(obj, "id")?;
    let title = string_field(obj, "title")?;
    // `null` is not "absent": only a missing key or a string passes.
    let description = match obj.get("description") {
        None => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => return Err(ShapeError::DescriptionNotString),
    };
    Ok(ListRow {
        id,
        title,
        description,
    })
}

/// Validate a list section: string `title` and an array of well-formed `rows`
pub fn validate_list_reply(value: &Value) -> Result<ListSection, ShapeError> {
    let obj = as_object(value)?;
    let title = string_field(obj, "title")?;
    let rows = obj
        .get("rows")
        .and_then(Value::as_array)
        .ok_or(ShapeError::RowsNotArray)?
        .iter()
        .enumerate()
        .map(|(index, row)| {
            validate_row(row).map_err(|e| ShapeError::Row {
                index,
                source: Box::new(e),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ListSection { title, rows })
}

/// Whether `value` has the button reply shape
pub fn is_button_reply(value: &Value) -> bool {
    validate_button_reply(value).is_ok()
}

/// Whether `value` has the list section shape
pub fn is_list_reply(value: &Value) -> bool {
    validate_list_reply(value).is_ok()
}
