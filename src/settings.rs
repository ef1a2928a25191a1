use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables shared by the column model, sort manager and gesture controllers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridSettings {
    /// Maximum number of simultaneous sort criteria
    pub max_sort_columns: usize,
    /// When false, multi-column sort requests behave as single-column sorts
    pub multi_column_sort: bool,
    /// Vertical pointer travel beyond which a drag shows a "no-drop" state
    pub drag_vertical_tolerance: f64,
    /// Concrete width used where a column is sized "auto"
    pub auto_width: f64,
    pub default_min_width: f64,
    /// `None` leaves columns unbounded
    pub default_max_width: Option<f64>,
}

impl GridSettings {
    pub const MAX_SORT_COLUMNS: usize = 3;
    pub const DRAG_VERTICAL_TOLERANCE: f64 = 50.0;
    pub const AUTO_WIDTH: f64 = 100.0;
    pub const MIN_WIDTH: f64 = 20.0;

    /// Parses settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let settings: GridSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads settings from a JSON file supplied by the host application
    pub fn load_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read grid settings from {}", path.display()))?;
        let settings = Self::from_json(&contents)
            .with_context(|| format!("Invalid grid settings in {}", path.display()))?;
        Ok(settings)
    }

    /// Upper width bound for new columns
    pub fn max_width(&self) -> f64 {
        self.default_max_width.unwrap_or(f64::INFINITY)
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.max_sort_columns == 0 {
            return Err(crate::GridError::ConfigError(
                "maxSortColumns must be at least 1".to_string(),
            ));
        }
        if !(self.drag_vertical_tolerance >= 0.0) {
            return Err(crate::GridError::ConfigError(
                "dragVerticalTolerance must be non-negative".to_string(),
            ));
        }
        if !(self.default_min_width >= 0.0) || self.default_min_width > self.max_width() {
            return Err(crate::GridError::ConfigError(format!(
                "defaultMinWidth {} must lie in [0, {}]",
                self.default_min_width,
                self.max_width()
            )));
        }
        if !(self.auto_width > 0.0) {
            return Err(crate::GridError::ConfigError(
                "autoWidth must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            max_sort_columns: Self::MAX_SORT_COLUMNS,
            multi_column_sort: true,
            drag_vertical_tolerance: Self::DRAG_VERTICAL_TOLERANCE,
            auto_width: Self::AUTO_WIDTH,
            default_min_width: Self::MIN_WIDTH,
            default_max_width: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = GridSettings::default();
        assert_eq!(settings.max_sort_columns, 3);
        assert_eq!(settings.drag_vertical_tolerance, 50.0);
        assert!(settings.max_width().is_infinite());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = GridSettings::from_json(r#"{ "maxSortColumns": 2 }"#).unwrap();
        assert_eq!(settings.max_sort_columns, 2);
        assert!(settings.multi_column_sort);
        assert_eq!(settings.auto_width, 100.0);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        assert!(GridSettings::from_json(r#"{ "maxSortColumns": 0 }"#).is_err());
        assert!(GridSettings::from_json(
            r#"{ "defaultMinWidth": 300, "defaultMaxWidth": 200 }"#
        )
        .is_err());
    }

    #[test]
    fn test_load_json_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("grid.json");
        std::fs::write(&path, r#"{ "dragVerticalTolerance": 25.0 }"#).unwrap();

        let settings = GridSettings::load_json_file(&path).unwrap();
        assert_eq!(settings.drag_vertical_tolerance, 25.0);

        let missing = GridSettings::load_json_file(temp_dir.path().join("nope.json"));
        assert!(missing.is_err());
    }
}
