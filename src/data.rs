use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DiscoveryError;

/// Separator used in the canonical `table__column` rendering of a key.
pub const KEY_SEPARATOR: &str = "__";

/// A normalized scalar cell value.
///
/// Integers and floats collapse into a single numeric variant so that `"1"`
/// and `"1.0"` rank identically in the global order, matching the corpus-wide
/// numeric sort the rank index is built from. Non-finite parses are kept as
/// text. Numbers order before text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    /// Parses a raw CSV cell. Empty cells yield `None`; the ingestion layer
    /// decides how to fill them.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.parse::<f64>() {
            Ok(number) if number.is_finite() => {
                // Collapse -0.0 so Eq and Hash agree with the total order.
                let number = if number == 0.0 { 0.0 } else { number };
                Some(Value::Number(number))
            }
            _ => Some(Value::Text(trimmed.to_string())),
        }
    }

    pub fn as_display(&self) -> String {
        match self {
            Value::Number(n) => {
                // The cast saturates outside i64 range, so only take the
                // integer form when it is exact.
                if n.fract() == 0.0 && *n >= i64::MIN as f64 && *n < i64::MAX as f64 {
                    (*n as i64).to_string()
                } else {
                    n.to_string()
                }
            }
            Value::Text(s) => s.clone(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Number(n) => {
                0u8.hash(state);
                n.to_bits().hash(state);
            }
            Value::Text(s) => {
                1u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.total_cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Number(_), Value::Text(_)) => Ordering::Less,
            (Value::Text(_), Value::Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

/// Inferred type tag for a column: numeric when every non-empty cell parses
/// as a finite number, text otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Numeric,
    Text,
}

pub fn infer_data_type(values: &[Value]) -> DataType {
    if values.iter().all(|v| matches!(v, Value::Number(_))) {
        DataType::Numeric
    } else {
        DataType::Text
    }
}

/// Strongly-typed column identity. Constructed exactly once at ingestion;
/// every later stage carries the value instead of re-parsing composite
/// strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ColumnKey {
    table: String,
    column: String,
}

impl ColumnKey {
    /// Builds a key, rejecting names that would make the canonical
    /// `table__column` rendering ambiguous.
    pub fn new(table: &str, column: &str) -> Result<Self, DiscoveryError> {
        if table.is_empty()
            || column.is_empty()
            || table.contains(KEY_SEPARATOR)
            || column.contains(KEY_SEPARATOR)
        {
            return Err(DiscoveryError::MalformedColumnKey(format!(
                "{table}{KEY_SEPARATOR}{column}"
            )));
        }
        Ok(Self {
            table: table.to_string(),
            column: column.to_string(),
        })
    }

    /// Key for internally generated columns (e.g. intersection supports)
    /// that never surface in output.
    pub(crate) fn synthetic(table: &str, column: &str) -> Self {
        Self {
            table: table.to_string(),
            column: column.to_string(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn column(&self) -> &str {
        &self.column
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{KEY_SEPARATOR}{}", self.table, self.column)
    }
}

impl FromStr for ColumnKey {
    type Err = DiscoveryError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (table, column) = raw
            .split_once(KEY_SEPARATOR)
            .ok_or_else(|| DiscoveryError::MalformedColumnKey(raw.to_string()))?;
        ColumnKey::new(table, column)
    }
}
