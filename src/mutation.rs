//! Deep-path mutation of JSON configuration documents
//!
//! A mutation path is a dotted string such as `model.layers.0.width`. Segments made only of
//! ASCII digits address sequence elements; every other segment addresses a mapping key.
//! Mutation always works on a deep copy: the base document is never touched.

use crate::error::MutationError;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// One step of a mutation path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Mapping key
    Key(String),
    /// Sequence index
    Index(usize),
}

impl PathSegment {
    fn parse(raw: &str) -> Self {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            // Digit strings too long for usize stay keys
            match raw.parse::<usize>() {
                Ok(index) => PathSegment::Index(index),
                Err(_) => PathSegment::Key(raw.to_string()),
            }
        } else {
            PathSegment::Key(raw.to_string())
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => f.write_str(key),
            PathSegment::Index(index) => write!(f, "{}", index),
        }
    }
}

/// Parsed dotted path into a configuration document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MutationPath {
    raw: String,
    segments: Vec<PathSegment>,
}

impl MutationPath {
    /// Parse a dotted path. Fails only on the empty string.
    pub fn parse(raw: &str) -> Result<Self, MutationError> {
        if raw.is_empty() {
            return Err(MutationError::EmptyPath);
        }
        let segments = raw.split('.').map(PathSegment::parse).collect();
        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The path as written
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Read the value at this path, if every segment resolves.
    pub fn get<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        let mut cursor = document;
        for segment in &self.segments {
            cursor = match (segment, cursor) {
                (PathSegment::Key(key), Value::Object(map)) => map.get(key)?,
                (PathSegment::Index(index), Value::Array(items)) => items.get(*index)?,
                (PathSegment::Index(index), Value::Object(map)) => map.get(&index.to_string())?,
                _ => return None,
            };
        }
        Some(cursor)
    }

    fn wrong_container(&self, position: usize, expected: &'static str, found: &Value) -> MutationError {
        MutationError::WrongContainer {
            path: self.raw.clone(),
            position,
            expected,
            found: kind_name(found),
        }
    }
}

impl FromStr for MutationPath {
    type Err = MutationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MutationPath::parse(s)
    }
}

impl fmt::Display for MutationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Produce a copy of `base` with the value at `path` replaced by `value`.
///
/// Every segment but the last must resolve to an existing container. The last segment may
/// create a new mapping entry or overwrite an existing sequence element; growing a sequence
/// is rejected. A numeric final segment on a mapping stores under the decimal key.
pub fn apply(base: &Value, path: &MutationPath, value: Value) -> Result<Value, MutationError> {
    let mut document = base.clone();
    let (last, intermediate) = path
        .segments
        .split_last()
        .ok_or(MutationError::EmptyPath)?;

    let mut cursor = &mut document;
    for (position, segment) in intermediate.iter().enumerate() {
        cursor = descend(path, position, segment, cursor)?;
    }

    let position = intermediate.len();
    match (last, cursor) {
        (PathSegment::Key(key), Value::Object(map)) => {
            map.insert(key.clone(), value);
        }
        (PathSegment::Index(index), Value::Object(map)) => {
            map.insert(index.to_string(), value);
        }
        (PathSegment::Index(index), Value::Array(items)) => {
            let len = items.len();
            let slot = items
                .get_mut(*index)
                .ok_or_else(|| MutationError::IndexOutOfRange {
                    path: path.raw.clone(),
                    position,
                    index: *index,
                    len,
                })?;
            *slot = value;
        }
        (PathSegment::Key(_), other) => {
            return Err(path.wrong_container(position, "a mapping", other));
        }
        (PathSegment::Index(_), other) => {
            return Err(path.wrong_container(position, "a sequence", other));
        }
    }

    Ok(document)
}

fn descend<'a>(
    path: &MutationPath,
    position: usize,
    segment: &PathSegment,
    cursor: &'a mut Value,
) -> Result<&'a mut Value, MutationError> {
    match (segment, cursor) {
        (PathSegment::Key(key), Value::Object(map)) => {
            map.get_mut(key).ok_or_else(|| MutationError::MissingKey {
                path: path.raw.clone(),
                position,
                key: key.clone(),
            })
        }
        (PathSegment::Index(index), Value::Array(items)) => {
            let len = items.len();
            items
                .get_mut(*index)
                .ok_or_else(|| MutationError::IndexOutOfRange {
                    path: path.raw.clone(),
                    position,
                    index: *index,
                    len,
                })
        }
        (PathSegment::Index(index), Value::Object(map)) => {
            let key = index.to_string();
            match map.get_mut(&key) {
                Some(child) => Ok(child),
                None => Err(MutationError::MissingKey {
                    path: path.raw.clone(),
                    position,
                    key,
                }),
            }
        }
        (PathSegment::Key(_), other) => Err(path.wrong_container(position, "a mapping", other)),
        (PathSegment::Index(_), other) => Err(path.wrong_container(position, "a sequence", other)),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
