//! Property lookup over caller-owned records.
//!
//! Engines never inspect records directly. They ask a [`PropertyResolver`]
//! for the value of a named property; `None` means the property could not be
//! resolved for that record.

use crate::domain::value::CellValue;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Resolves a named property against a record
pub trait PropertyResolver<R: ?Sized> {
    fn resolve(&self, record: &R, property: &str) -> Option<CellValue>;
}

type Accessor<R> = Box<dyn Fn(&R) -> CellValue + Send + Sync>;

/// Explicit `property name -> accessor` table for a record shape
///
/// Built once at setup time.
///
/// # Examples
/// ```
/// use gridview_core::domain::record::{AccessorMap, PropertyResolver};
/// use gridview_core::domain::value::CellValue;
///
/// struct Part { id: String, qty: i64 }
///
/// let accessors = AccessorMap::new()
///     .with("id", |p: &Part| CellValue::from(p.id.as_str()))
///     .with("qty", |p: &Part| CellValue::from(p.qty));
///
/// let part = Part { id: "P-1".to_string(), qty: 4 };
/// assert_eq!(accessors.resolve(&part, "qty"), Some(CellValue::Number(4.0)));
/// assert_eq!(accessors.resolve(&part, "missing"), None);
/// ```
pub struct AccessorMap<R> {
    accessors: HashMap<String, Accessor<R>>,
}

impl<R> AccessorMap<R> {
    pub fn new() -> Self {
        Self {
            accessors: HashMap::new(),
        }
    }

    /// Registers an accessor, replacing any previous one for the same name
    pub fn with<F>(mut self, property: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&R) -> CellValue + Send + Sync + 'static,
    {
        self.insert(property, accessor);
        self
    }

    pub fn insert<F>(&mut self, property: impl Into<String>, accessor: F)
    where
        F: Fn(&R) -> CellValue + Send + Sync + 'static,
    {
        self.accessors.insert(property.into(), Box::new(accessor));
    }

    pub fn has_property(&self, property: &str) -> bool {
        self.accessors.contains_key(property)
    }

    pub fn properties(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.accessors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<R> Default for AccessorMap<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for AccessorMap<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorMap")
            .field("properties", &self.properties())
            .finish()
    }
}

impl<R> PropertyResolver<R> for AccessorMap<R> {
    fn resolve(&self, record: &R, property: &str) -> Option<CellValue> {
        self.accessors.get(property).map(|accessor| accessor(record))
    }
}

/// A schemaless record keyed by property name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row(BTreeMap<String, CellValue>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, property: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.set(property, value);
        self
    }

    pub fn set(&mut self, property: impl Into<String>, value: impl Into<CellValue>) {
        self.0.insert(property.into(), value.into());
    }

    pub fn get(&self, property: &str) -> Option<&CellValue> {
        self.0.get(property)
    }

    pub fn properties(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Resolver for [`Row`] records
#[derive(Debug, Clone, Copy, Default)]
pub struct RowResolver;

impl PropertyResolver<Row> for RowResolver {
    fn resolve(&self, record: &Row, property: &str) -> Option<CellValue> {
        record.get(property).cloned()
    }
}
