//! Tag file parsing and the default tag policy.

use crate::error::{Result, StackError};
use crate::types::TagEntry;
use serde_json::Value;

/// Parse a flat JSON object into tags, in document order.
///
/// String values are taken verbatim; numbers and booleans use their JSON text.
///
/// # Errors
///
/// Returns `MalformedTagFile` if the content is not a JSON object or a value is
/// `null`, an array or an object.
pub fn parse_tag_file(content: &str) -> Result<Vec<TagEntry>> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| StackError::MalformedTagFile { reason: e.to_string() })?;

    let Value::Object(map) = value else {
        return Err(StackError::MalformedTagFile {
            reason: "expected a JSON object of tag names to values".to_string(),
        });
    };

    map.into_iter()
        .map(|(key, value)| match value {
            Value::String(s) => Ok(TagEntry::new(key, s)),
            Value::Number(_) | Value::Bool(_) => Ok(TagEntry::new(key, value.to_string())),
            _ => Err(StackError::MalformedTagFile {
                reason: format!("tag '{}' must have a string value", key),
            }),
        })
        .collect()
}

/// Append the default tag set according to the overlay policy.
///
/// A new stack always receives the defaults. An existing stack receives them
/// only together with caller-supplied tags, so an update without a tag file
/// leaves the stack's tags untouched.
pub fn add_default_tags(is_new: bool, tags: Vec<TagEntry>, defaults: &[TagEntry]) -> Vec<TagEntry> {
    if !is_new && tags.is_empty() {
        return tags;
    }

    let mut tags = tags;
    tags.extend(defaults.iter().cloned());
    tags
}
