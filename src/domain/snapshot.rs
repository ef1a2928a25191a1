//! Named, versioned captures of a column layout.

use crate::domain::column::{ColumnChange, ColumnModel, ColumnWidth};
use crate::domain::value::DataType;
use crate::error::{GridError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};
use uuid::Uuid;

/// Unique identifier for a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotId(String);

impl SnapshotId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SnapshotId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SnapshotId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SnapshotId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Saved display attributes for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSettings {
    pub property_name: String,
    pub display_name: String,
    pub is_visible: bool,
    pub width: ColumnWidth,
    pub order: i64,
    pub can_resize: bool,
    pub can_sort: bool,
    pub can_filter: bool,
    pub data_type: DataType,
    #[serde(default)]
    pub string_format: Option<String>,
}

impl ColumnSettings {
    pub fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.property_name.trim().is_empty() {
            errors.push("PropertyName is required".to_string());
        }
        if self.display_name.trim().is_empty() {
            errors.push(format!("DisplayName is required for '{}'", self.property_name));
        }
        if let ColumnWidth::Fixed(w) = self.width {
            if !(w > 0.0) {
                errors.push(format!("Width ({}) must be positive", w));
            }
        }
        if self.order < 0 {
            errors.push(format!("Order ({}) cannot be negative", self.order));
        }
        errors
    }
}

/// What [`ConfigurationSnapshot::apply_to`] did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Columns overwritten from the snapshot, in snapshot order
    pub applied: Vec<String>,
    /// Settings naming columns the model does not have
    pub ignored: Vec<String>,
    /// Live columns the snapshot does not mention
    pub retained: Vec<String>,
}

/// A saved column layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationSnapshot {
    pub id: SnapshotId,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    pub column_settings: Vec<ColumnSettings>,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default = "default_version")]
    pub version: u32,
}

fn default_version() -> u32 {
    1
}

fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .ok()
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

impl ConfigurationSnapshot {
    pub const DEFAULT_DESCRIPTION: &'static str = "Configuration created from current column layout";

    /// Captures every column of the model in display order
    pub fn from_columns(model: &ColumnModel, display_name: impl Into<String>) -> Self {
        let now = Utc::now();
        let column_settings = model
            .columns()
            .iter()
            .map(|c| ColumnSettings {
                property_name: c.property_name.clone(),
                display_name: c.display_name.clone(),
                is_visible: c.is_visible,
                width: c.width,
                order: c.display_order as i64,
                can_resize: c.can_resize,
                can_sort: c.can_sort,
                can_filter: c.can_filter,
                data_type: c.data_type,
                string_format: c.string_format.clone(),
            })
            .collect();

        Self {
            id: SnapshotId::new(),
            display_name: display_name.into(),
            description: Self::DEFAULT_DESCRIPTION.to_string(),
            column_settings,
            created_at: now,
            last_modified: now,
            created_by: current_user(),
            is_default: false,
            version: default_version(),
        }
    }

    /// Overwrites matching columns and re-orders the model to the snapshot
    ///
    /// Unknown settings are skipped; live columns missing from the snapshot
    /// keep their attributes and follow the snapshot-ordered ones. Widths are
    /// restored as captured, even outside the live column's bounds.
    pub fn apply_to(&self, model: &mut ColumnModel) -> ApplyReport {
        let mut settings: Vec<&ColumnSettings> = self.column_settings.iter().collect();
        settings.sort_by_key(|s| s.order);

        let mut report = ApplyReport::default();
        for setting in settings {
            let Some(column) = model.column_mut(&setting.property_name) else {
                debug!(
                    "Snapshot '{}': no column '{}', skipping",
                    self.display_name, setting.property_name
                );
                report.ignored.push(setting.property_name.clone());
                continue;
            };

            column.display_name = setting.display_name.clone();
            column.is_visible = setting.is_visible;
            column.can_resize = setting.can_resize;
            column.can_sort = setting.can_sort;
            column.can_filter = setting.can_filter;
            column.string_format = setting.string_format.clone();

            if let Err(e) = model.set_width(&setting.property_name, setting.width, false) {
                warn!("Snapshot '{}': width not applied: {}", self.display_name, e);
            }
            model.record(ColumnChange::AttributesChanged {
                property_name: setting.property_name.clone(),
            });
            report.applied.push(setting.property_name.clone());
        }

        report.retained = model
            .property_names()
            .into_iter()
            .filter(|name| !report.applied.iter().any(|a| a.as_str() == *name))
            .map(String::from)
            .collect();

        model.reorder(&report.applied);
        debug!(
            "Applied snapshot '{}': {} applied, {} ignored, {} retained",
            self.display_name,
            report.applied.len(),
            report.ignored.len(),
            report.retained.len()
        );
        report
    }

    /// First reason the snapshot cannot be saved or applied
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Err(GridError::InvalidSnapshot(reason));

        if self.id.as_str().trim().is_empty() {
            return invalid("id is required".to_string());
        }
        if self.display_name.trim().is_empty() {
            return invalid("display name is required".to_string());
        }
        if self.column_settings.is_empty() {
            return invalid("at least one column setting is required".to_string());
        }

        let mut seen = HashSet::new();
        for (i, setting) in self.column_settings.iter().enumerate() {
            if let Some(error) = setting.validation_errors().into_iter().next() {
                return invalid(format!("column {}: {}", i + 1, error));
            }
            if !seen.insert(setting.property_name.as_str()) {
                return invalid(format!(
                    "duplicate column '{}'",
                    setting.property_name
                ));
            }
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Deep copy under a fresh id, never the default
    pub fn duplicate(&self) -> Self {
        let now = Utc::now();
        Self {
            id: SnapshotId::new(),
            display_name: format!("{} (Copy)", self.display_name),
            is_default: false,
            created_at: now,
            last_modified: now,
            ..self.clone()
        }
    }

    pub fn touch(&mut self) {
        self.last_modified = Utc::now();
    }

    pub fn setting(&self, property_name: &str) -> Option<&ColumnSettings> {
        self.column_settings
            .iter()
            .find(|s| s.property_name == property_name)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
