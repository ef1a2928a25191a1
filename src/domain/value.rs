use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::{fmt, str::FromStr};

/// Data type tag carried by columns and filter criteria
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    String,
    Number,
    Boolean,
    Date,
    Other,
}

impl DataType {
    /// Whether values of this type have a natural ordering usable by range operators
    pub fn is_comparable(&self) -> bool {
        matches!(self, DataType::Number | DataType::Date)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Number => write!(f, "number"),
            Self::Boolean => write!(f, "boolean"),
            Self::Date => write!(f, "date"),
            Self::Other => write!(f, "other"),
        }
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "string" | "text" => Ok(DataType::String),
            "number" | "numeric" => Ok(DataType::Number),
            "boolean" | "bool" => Ok(DataType::Boolean),
            "date" | "datetime" => Ok(DataType::Date),
            "other" => Ok(DataType::Other),
            _ => Err(format!(
                "Invalid data type '{}'. Valid types: string, number, boolean, date, other",
                s
            )),
        }
    }
}

/// A single resolved cell value
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum CellValue {
    #[default]
    Null,
    Boolean(bool),
    Number(f64),
    Text(String),
    Date(DateTime<Utc>),
    List(Vec<CellValue>),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Null, a blank string and an empty list all count as empty
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::List(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Returns the value as a number, parsing text that is fully numeric
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => parse_number(s),
            _ => None,
        }
    }

    /// Normalizes a value for ordering: fully numeric text becomes a number
    pub fn sort_normalized(self) -> Self {
        match self {
            CellValue::Text(s) => match parse_number(&s) {
                Some(n) => CellValue::Number(n),
                None => CellValue::Text(s),
            },
            other => other,
        }
    }

    /// Converts the value towards `data_type` where a lossless reading exists
    ///
    /// Values that cannot be read as the target type are returned unchanged.
    pub fn coerce_to(&self, data_type: DataType) -> CellValue {
        match (data_type, self) {
            (DataType::Number, CellValue::Text(s)) => parse_number(s)
                .map(CellValue::Number)
                .unwrap_or_else(|| self.clone()),
            (DataType::Boolean, CellValue::Text(s)) => match s.trim().to_lowercase().as_str() {
                "true" | "yes" | "1" => CellValue::Boolean(true),
                "false" | "no" | "0" => CellValue::Boolean(false),
                _ => self.clone(),
            },
            (DataType::Date, CellValue::Text(s)) => parse_date(s)
                .map(CellValue::Date)
                .unwrap_or_else(|| self.clone()),
            (DataType::String, CellValue::Number(_) | CellValue::Boolean(_)) => {
                CellValue::Text(self.to_string())
            }
            _ => self.clone(),
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            CellValue::Null => 0,
            CellValue::Boolean(_) => 1,
            CellValue::Number(_) => 2,
            CellValue::Text(_) => 3,
            CellValue::Date(_) => 4,
            CellValue::List(_) => 5,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Boolean(b) => write!(f, "{}", b),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Date(d) => write!(f, "{}", d.to_rfc3339()),
            CellValue::List(items) => {
                let parts: Vec<String> = items.iter().map(|i| i.to_string()).collect();
                write!(f, "{}", parts.join(", "))
            }
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Number(f64::from(value))
    }
}

impl From<u32> for CellValue {
    fn from(value: u32) -> Self {
        CellValue::Number(f64::from(value))
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<DateTime<Utc>> for CellValue {
    fn from(value: DateTime<Utc>) -> Self {
        CellValue::Date(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

impl<T: Into<CellValue>> From<Vec<T>> for CellValue {
    fn from(value: Vec<T>) -> Self {
        CellValue::List(value.into_iter().map(Into::into).collect())
    }
}

/// Parses text that is entirely a finite number (surrounding whitespace allowed)
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parses RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC)
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let trimmed = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Natural comparison of two values of the same kind
///
/// Returns `None` when the values are not directly comparable (different
/// kinds, lists, or a NaN).
pub fn natural_cmp(a: &CellValue, b: &CellValue) -> Option<Ordering> {
    match (a, b) {
        (CellValue::Null, CellValue::Null) => Some(Ordering::Equal),
        (CellValue::Boolean(a), CellValue::Boolean(b)) => Some(a.cmp(b)),
        (CellValue::Number(a), CellValue::Number(b)) => a.partial_cmp(b),
        (CellValue::Text(a), CellValue::Text(b)) => Some(compare_text(a, b)),
        (CellValue::Date(a), CellValue::Date(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Total ordering used by the sort engine
///
/// Null sorts lowest. Values of different kinds order by kind:
/// Null < Boolean < Number < Text < Date < List.
pub fn total_cmp(a: &CellValue, b: &CellValue) -> Ordering {
    match (a, b) {
        (CellValue::Number(x), CellValue::Number(y)) => x.total_cmp(y),
        (CellValue::List(x), CellValue::List(y)) => x.len().cmp(&y.len()),
        _ => natural_cmp(a, b).unwrap_or_else(|| a.type_rank().cmp(&b.type_rank())),
    }
}

/// Case-insensitive first, ordinal as the tie-break so the order stays total
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
