//! Canonical JSON serialization helpers.
//!
//! Object keys are sorted recursively and formatting is fixed, so a model
//! always serializes to the same bytes and its hash is reproducible.

use serde::{ser::Error as _, Serialize};
use serde_json::{map::Map, ser::PrettyFormatter, Serializer, Value};
use std::io::Write;

/// Recursively sort JSON object keys to obtain a canonical representation.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));

            let mut sorted = Map::with_capacity(entries.len());
            for (key, val) in entries {
                sorted.insert(key, canonicalize(val));
            }
            Value::Object(sorted)
        }
        Value::Array(elements) => Value::Array(elements.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Serialize a value into canonical JSON and write it to the provided writer.
pub fn write_canonical_json<T, W>(mut writer: W, value: &T) -> Result<(), serde_json::Error>
where
    T: Serialize,
    W: Write,
{
    let canonical_value = canonicalize(serde_json::to_value(value)?);
    let formatter = PrettyFormatter::with_indent(b"  ");
    let mut serializer = Serializer::with_formatter(&mut writer, formatter);
    canonical_value.serialize(&mut serializer)
}

/// Serialize a value into canonical JSON and return it as a String.
pub fn canonical_json_string<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let mut buffer = Vec::new();
    write_canonical_json(&mut buffer, value)?;
    String::from_utf8(buffer).map_err(|err| serde_json::Error::custom(err.to_string()))
}

/// blake3 digest of a string, hex encoded
pub fn hash_hex(content: &str) -> String {
    hex::encode(blake3::hash(content.as_bytes()).as_bytes())
}
