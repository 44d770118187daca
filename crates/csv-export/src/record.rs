//! Input rows and header configuration.

use std::borrow::Cow;
use std::fmt;

use serde_json::Value;

/// A single scalar cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Field {
    /// Text written to CSV for this value.
    ///
    /// `Null` renders as an empty field.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Null => Cow::Borrowed(""),
            Self::Bool(value) => Cow::Borrowed(if *value { "true" } else { "false" }),
            Self::Int(value) => Cow::Owned(value.to_string()),
            Self::Float(value) => Cow::Owned(value.to_string()),
            Self::Text(value) => Cow::Borrowed(value.as_str()),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Field {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for Field {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Field {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Field {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for Field {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Field {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl<T: Into<Field>> From<Option<T>> for Field {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<Value> for Field {
    /// Nested arrays and objects are kept as compact JSON text.
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => n
                    .as_f64()
                    .map_or_else(|| Self::Text(n.to_string()), Self::Float),
            },
            Value::String(s) => Self::Text(s),
            nested @ (Value::Array(_) | Value::Object(_)) => Self::Text(nested.to_string()),
        }
    }
}

/// One entry of a dataset.
///
/// Only `Keyed` and `Indexed` records are rows. A `Scalar` entry is kept so
/// heterogeneous input can be passed through unchanged, and is skipped when
/// rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// Named fields in their natural order.
    Keyed(Vec<(String, Field)>),
    /// Positional fields.
    Indexed(Vec<Field>),
    /// A bare value that is not a row.
    Scalar(Field),
}

impl Record {
    /// Build a record of named fields, keeping the iteration order.
    pub fn keyed<K, V, I>(fields: I) -> Self
    where
        K: Into<String>,
        V: Into<Field>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Keyed(
            fields
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    /// Build a record of positional fields.
    pub fn indexed<V, I>(fields: I) -> Self
    where
        V: Into<Field>,
        I: IntoIterator<Item = V>,
    {
        Self::Indexed(fields.into_iter().map(Into::into).collect())
    }

    /// Returns true if this record can be written as a CSV row.
    pub fn is_row(&self) -> bool {
        !matches!(self, Self::Scalar(_))
    }

    /// Number of fields, or `None` for a non-row entry.
    pub fn width(&self) -> Option<usize> {
        match self {
            Self::Keyed(fields) => Some(fields.len()),
            Self::Indexed(fields) => Some(fields.len()),
            Self::Scalar(_) => None,
        }
    }

    /// Field names: the keys of a keyed record, or positions `0..n`.
    pub fn keys(&self) -> Option<Vec<String>> {
        match self {
            Self::Keyed(fields) => Some(fields.iter().map(|(key, _)| key.clone()).collect()),
            Self::Indexed(fields) => Some((0..fields.len()).map(|i| i.to_string()).collect()),
            Self::Scalar(_) => None,
        }
    }

    /// Field values in order, or `None` for a non-row entry.
    pub fn values(&self) -> Option<Vec<&Field>> {
        match self {
            Self::Keyed(fields) => Some(fields.iter().map(|(_, value)| value).collect()),
            Self::Indexed(fields) => Some(fields.iter().collect()),
            Self::Scalar(_) => None,
        }
    }
}

impl From<Value> for Record {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Keyed(
                map.into_iter()
                    .map(|(key, value)| (key, Field::from(value)))
                    .collect(),
            ),
            Value::Array(items) => Self::Indexed(items.into_iter().map(Field::from).collect()),
            scalar => Self::Scalar(Field::from(scalar)),
        }
    }
}

/// Header row configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HeaderSet {
    /// Use the keys of the first record.
    #[default]
    Derived,
    /// Use these names.
    Explicit(Vec<String>),
    /// Write no header row.
    Omitted,
}

impl HeaderSet {
    /// Header names for `data`. Empty means no header row is written.
    pub fn resolve(&self, data: &[Record]) -> Vec<String> {
        match self {
            Self::Explicit(names) => names.clone(),
            Self::Omitted => Vec::new(),
            Self::Derived => data.first().and_then(Record::keys).unwrap_or_default(),
        }
    }
}

impl<S: Into<String>> From<Vec<S>> for HeaderSet {
    /// An empty list falls back to deriving the header from the data.
    fn from(names: Vec<S>) -> Self {
        if names.is_empty() {
            Self::Derived
        } else {
            Self::Explicit(names.into_iter().map(Into::into).collect())
        }
    }
}

impl<S: Into<String> + Clone> From<&[S]> for HeaderSet {
    fn from(names: &[S]) -> Self {
        Self::from(names.to_vec())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for HeaderSet {
    fn from(names: [S; N]) -> Self {
        Self::from(Vec::from(names))
    }
}
