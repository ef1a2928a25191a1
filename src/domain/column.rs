use crate::domain::value::DataType;
use crate::error::{GridError, Result};
use crate::settings::GridSettings;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use tracing::debug;

/// Column width: a concrete number of units or "auto"
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ColumnWidth {
    #[default]
    Auto,
    Fixed(f64),
}

impl ColumnWidth {
    pub fn is_auto(&self) -> bool {
        matches!(self, ColumnWidth::Auto)
    }

    pub fn fixed(&self) -> Option<f64> {
        match self {
            ColumnWidth::Fixed(w) => Some(*w),
            ColumnWidth::Auto => None,
        }
    }
}

impl fmt::Display for ColumnWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnWidth::Auto => write!(f, "auto"),
            ColumnWidth::Fixed(w) => write!(f, "{}", w),
        }
    }
}

impl From<f64> for ColumnWidth {
    fn from(value: f64) -> Self {
        ColumnWidth::Fixed(value)
    }
}

impl Serialize for ColumnWidth {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ColumnWidth::Auto => serializer.serialize_str("auto"),
            ColumnWidth::Fixed(w) => serializer.serialize_f64(*w),
        }
    }
}

impl<'de> Deserialize<'de> for ColumnWidth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(w) => Ok(ColumnWidth::Fixed(w)),
            Repr::Text(s) if s.eq_ignore_ascii_case("auto") => Ok(ColumnWidth::Auto),
            Repr::Text(s) => Err(serde::de::Error::custom(format!(
                "invalid column width '{}', expected a number or \"auto\"",
                s
            ))),
        }
    }
}

/// A named, typed, positionable, resizable unit of tabular display
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub property_name: String,
    pub display_name: String,
    pub data_type: DataType,
    pub is_visible: bool,
    pub width: ColumnWidth,
    pub min_width: f64,
    pub max_width: f64,
    pub display_order: usize,
    pub can_sort: bool,
    pub can_filter: bool,
    pub can_resize: bool,
    pub string_format: Option<String>,
}

impl Column {
    pub const DEFAULT_MIN_WIDTH: f64 = GridSettings::MIN_WIDTH;

    pub fn new(property_name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            property_name: property_name.into(),
            display_name: display_name.into(),
            data_type: DataType::String,
            is_visible: true,
            width: ColumnWidth::Auto,
            min_width: Self::DEFAULT_MIN_WIDTH,
            max_width: f64::INFINITY,
            display_order: 0,
            can_sort: true,
            can_filter: true,
            can_resize: true,
            string_format: None,
        }
    }

    pub fn text(property_name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::new(property_name, display_name).with_width(100.0)
    }

    pub fn numeric(property_name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::new(property_name, display_name)
            .with_data_type(DataType::Number)
            .with_width(100.0)
            .with_format("N0")
    }

    pub fn date(property_name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::new(property_name, display_name)
            .with_data_type(DataType::Date)
            .with_width(120.0)
            .with_format("MM/dd/yyyy")
    }

    /// Boolean columns render as checkboxes and are not filterable by default
    pub fn boolean(property_name: impl Into<String>, display_name: impl Into<String>) -> Self {
        let mut column = Self::new(property_name, display_name)
            .with_data_type(DataType::Boolean)
            .with_width(80.0);
        column.can_filter = false;
        column
    }

    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    pub fn with_width(mut self, width: impl Into<ColumnWidth>) -> Self {
        self.width = width.into();
        self
    }

    pub fn with_bounds(mut self, min_width: f64, max_width: f64) -> Self {
        self.min_width = min_width.max(0.0);
        self.max_width = max_width.max(self.min_width);
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.string_format = Some(format.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.is_visible = false;
        self
    }

    pub fn with_capabilities(mut self, can_sort: bool, can_filter: bool, can_resize: bool) -> Self {
        self.can_sort = can_sort;
        self.can_filter = can_filter;
        self.can_resize = can_resize;
        self
    }

    /// Clamps a proposed width into `[min_width, max_width]`
    pub fn clamp_width(&self, width: f64) -> f64 {
        width.max(self.min_width).min(self.max_width)
    }

    /// Concrete rendered width; "auto" resolves to `auto_width` within bounds
    pub fn effective_width(&self, auto_width: f64) -> f64 {
        match self.width {
            ColumnWidth::Auto => self.clamp_width(auto_width),
            ColumnWidth::Fixed(w) => self.clamp_width(w),
        }
    }

    pub fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.property_name.trim().is_empty() && self.can_sort {
            errors.push("PropertyName is required for sortable columns".to_string());
        }

        if self.min_width > self.max_width {
            errors.push("MinWidth cannot be greater than MaxWidth".to_string());
        }

        if let ColumnWidth::Fixed(w) = self.width {
            if !(w > 0.0) {
                errors.push(format!("Width ({}) must be positive", w));
            }
            if w < self.min_width {
                errors.push(format!(
                    "Width ({}) cannot be less than MinWidth ({})",
                    w, self.min_width
                ));
            }
            if w > self.max_width {
                errors.push(format!(
                    "Width ({}) cannot be greater than MaxWidth ({})",
                    w, self.max_width
                ));
            }
        }

        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validation_errors().is_empty()
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.property_name)
    }
}

/// A single layout mutation, queued for the host's `columnsModified` refresh
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnChange {
    Added {
        property_name: String,
        order: usize,
    },
    Removed {
        property_name: String,
        order: usize,
    },
    Moved {
        property_name: String,
        from: usize,
        to: usize,
    },
    VisibilityChanged {
        property_name: String,
        is_visible: bool,
    },
    WidthChanged {
        property_name: String,
        from: ColumnWidth,
        to: ColumnWidth,
    },
    BoundsChanged {
        property_name: String,
        min_width: f64,
        max_width: f64,
    },
    AttributesChanged {
        property_name: String,
    },
    Reordered {
        order: Vec<String>,
    },
}

impl ColumnChange {
    pub fn property_name(&self) -> Option<&str> {
        match self {
            ColumnChange::Added { property_name, .. }
            | ColumnChange::Removed { property_name, .. }
            | ColumnChange::Moved { property_name, .. }
            | ColumnChange::VisibilityChanged { property_name, .. }
            | ColumnChange::WidthChanged { property_name, .. }
            | ColumnChange::BoundsChanged { property_name, .. }
            | ColumnChange::AttributesChanged { property_name } => Some(property_name),
            ColumnChange::Reordered { .. } => None,
        }
    }
}

/// Ordered set of column definitions
///
/// Columns are held in display order, so `columns[i].display_order == i`
/// after every mutation.
#[derive(Debug, Clone, Default)]
pub struct ColumnModel {
    columns: Vec<Column>,
    pending: Vec<ColumnChange>,
}

impl ColumnModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a model from columns in the order given
    pub fn from_columns(columns: impl IntoIterator<Item = Column>) -> Result<Self> {
        let mut model = Self::new();
        for column in columns {
            model.add_column(column)?;
        }
        model.pending.clear();
        Ok(model)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// All columns in display order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn visible_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_visible)
    }

    pub fn column(&self, property_name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.property_name == property_name)
    }

    pub fn property_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.property_name.as_str()).collect()
    }

    pub fn order_of(&self, property_name: &str) -> Option<usize> {
        self.position(property_name)
    }

    /// Drains the changes queued since the last call
    pub fn take_changes(&mut self) -> Vec<ColumnChange> {
        std::mem::take(&mut self.pending)
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Appends a column at the end of the display order
    ///
    /// A fixed width outside the column's bounds is clamped.
    pub fn add_column(&mut self, mut column: Column) -> Result<ColumnChange> {
        if self.position(&column.property_name).is_some() {
            return Err(GridError::DuplicateColumn(column.property_name));
        }

        if column.min_width > column.max_width {
            column.max_width = column.min_width;
        }
        if let ColumnWidth::Fixed(w) = column.width {
            column.width = ColumnWidth::Fixed(column.clamp_width(w));
        }

        column.display_order = self.columns.len();
        debug!(
            "Adding column {} at order {}",
            column.property_name, column.display_order
        );

        let change = ColumnChange::Added {
            property_name: column.property_name.clone(),
            order: column.display_order,
        };
        self.columns.push(column);
        Ok(self.record(change))
    }

    pub fn remove_column(&mut self, property_name: &str) -> Result<Column> {
        let index = self.require(property_name)?;
        let column = self.columns.remove(index);
        self.renumber();
        debug!("Removed column {} from order {}", property_name, index);

        self.record(ColumnChange::Removed {
            property_name: property_name.to_string(),
            order: index,
        });
        Ok(column)
    }

    /// Moves a column to `new_order`, clamped to the last slot
    pub fn move_column(&mut self, property_name: &str, new_order: usize) -> Result<ColumnChange> {
        let from = self.require(property_name)?;
        let to = new_order.min(self.columns.len().saturating_sub(1));

        if from != to {
            let column = self.columns.remove(from);
            self.columns.insert(to, column);
            self.renumber();
            debug!("Moved column {} from {} to {}", property_name, from, to);
        }

        Ok(self.record(ColumnChange::Moved {
            property_name: property_name.to_string(),
            from,
            to,
        }))
    }

    pub fn set_visible(&mut self, property_name: &str, is_visible: bool) -> Result<ColumnChange> {
        let index = self.require(property_name)?;
        self.columns[index].is_visible = is_visible;
        Ok(self.record(ColumnChange::VisibilityChanged {
            property_name: property_name.to_string(),
            is_visible,
        }))
    }

    /// Sets a column width and returns the width actually applied
    ///
    /// With `respect_constraints`, fixed widths are clamped to the column's
    /// bounds. Non-finite or negative widths are rejected.
    pub fn set_width(
        &mut self,
        property_name: &str,
        width: ColumnWidth,
        respect_constraints: bool,
    ) -> Result<ColumnWidth> {
        let index = self.require(property_name)?;

        let applied = match width {
            ColumnWidth::Auto => ColumnWidth::Auto,
            ColumnWidth::Fixed(w) if !w.is_finite() || w < 0.0 => {
                return Err(GridError::InvalidWidth {
                    column: property_name.to_string(),
                    width: w,
                });
            }
            ColumnWidth::Fixed(w) if respect_constraints => {
                ColumnWidth::Fixed(self.columns[index].clamp_width(w))
            }
            fixed => fixed,
        };

        let previous = self.columns[index].width;
        self.columns[index].width = applied;

        if previous != applied {
            self.record(ColumnChange::WidthChanged {
                property_name: property_name.to_string(),
                from: previous,
                to: applied,
            });
        }
        Ok(applied)
    }

    /// Sets the minimum width, clamping the current width to the new bounds
    pub fn set_min_width(&mut self, property_name: &str, min_width: f64) -> Result<ColumnChange> {
        let index = self.require(property_name)?;
        let column = &mut self.columns[index];
        column.min_width = min_width.max(0.0);
        if column.max_width < column.min_width {
            column.max_width = column.min_width;
        }
        Ok(self.reclamp(index))
    }

    /// Sets the maximum width, clamping the current width to the new bounds
    pub fn set_max_width(&mut self, property_name: &str, max_width: f64) -> Result<ColumnChange> {
        let index = self.require(property_name)?;
        let column = &mut self.columns[index];
        column.max_width = max_width.max(0.0);
        if column.min_width > column.max_width {
            column.min_width = column.max_width;
        }
        Ok(self.reclamp(index))
    }

    /// Display slot under a horizontal offset measured from the left edge
    ///
    /// Only visible columns take up space. Offsets past the right edge map to
    /// the last visible column; `None` when nothing is visible.
    pub fn order_at_offset(&self, offset_x: f64, auto_width: f64) -> Option<usize> {
        let mut right_edge = 0.0;
        let mut last_visible = None;

        for column in self.visible_columns() {
            right_edge += column.effective_width(auto_width);
            last_visible = Some(column.display_order);
            if offset_x < right_edge {
                return last_visible;
            }
        }

        last_visible
    }

    /// Mutable access for attribute updates that do not affect ordering
    pub(crate) fn column_mut(&mut self, property_name: &str) -> Option<&mut Column> {
        self.columns
            .iter_mut()
            .find(|c| c.property_name == property_name)
    }

    /// Re-orders columns: the listed names first (unknown names skipped),
    /// every other column after them in its current relative order
    pub(crate) fn reorder(&mut self, order: &[String]) {
        let mut remaining = std::mem::take(&mut self.columns);
        let mut ordered = Vec::with_capacity(remaining.len());

        for name in order {
            if let Some(pos) = remaining.iter().position(|c| &c.property_name == name) {
                ordered.push(remaining.remove(pos));
            }
        }
        ordered.extend(remaining);

        self.columns = ordered;
        self.renumber();
        let order = self.columns.iter().map(|c| c.property_name.clone()).collect();
        self.record(ColumnChange::Reordered { order });
    }

    pub(crate) fn record(&mut self, change: ColumnChange) -> ColumnChange {
        self.pending.push(change.clone());
        change
    }

    fn reclamp(&mut self, index: usize) -> ColumnChange {
        let column = &mut self.columns[index];
        if let ColumnWidth::Fixed(w) = column.width {
            column.width = ColumnWidth::Fixed(column.clamp_width(w));
        }
        let change = ColumnChange::BoundsChanged {
            property_name: column.property_name.clone(),
            min_width: column.min_width,
            max_width: column.max_width,
        };
        self.record(change)
    }

    fn position(&self, property_name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.property_name == property_name)
    }

    fn require(&self, property_name: &str) -> Result<usize> {
        self.position(property_name)
            .ok_or_else(|| GridError::ColumnNotFound(property_name.to_string()))
    }

    fn renumber(&mut self) {
        for (order, column) in self.columns.iter_mut().enumerate() {
            column.display_order = order;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_model() -> ColumnModel {
        ColumnModel::from_columns(vec![
            Column::new("A", "Alpha").with_width(100.0),
            Column::new("B", "Bravo"),
            Column::new("C", "Charlie").with_width(50.0),
        ])
        .unwrap()
    }

    fn orders(model: &ColumnModel) -> Vec<(&str, usize)> {
        model
            .columns()
            .iter()
            .map(|c| (c.property_name.as_str(), c.display_order))
            .collect()
    }

    #[test]
    fn test_add_assigns_contiguous_orders() {
        let model = sample_model();
        assert_eq!(orders(&model), vec![("A", 0), ("B", 1), ("C", 2)]);
        assert!(!model.has_pending_changes());
    }

    #[test]
    fn test_add_duplicate_fails() {
        let mut model = sample_model();
        let result = model.add_column(Column::new("B", "Another"));
        assert!(matches!(result, Err(GridError::DuplicateColumn(name)) if name == "B"));
        assert_eq!(model.len(), 3);
    }

    #[test]
    fn test_add_clamps_width_to_bounds() {
        let mut model = ColumnModel::new();
        model
            .add_column(Column::new("X", "X").with_width(10.0).with_bounds(30.0, 200.0))
            .unwrap();
        assert_eq!(model.column("X").unwrap().width, ColumnWidth::Fixed(30.0));
    }

    #[test]
    fn test_remove_renumbers() {
        let mut model = sample_model();
        let removed = model.remove_column("A").unwrap();
        assert_eq!(removed.property_name, "A");
        assert_eq!(orders(&model), vec![("B", 0), ("C", 1)]);
        assert!(model.remove_column("A").is_err());
    }

    #[test]
    fn test_move_column() {
        let mut model = sample_model();
        model.move_column("C", 0).unwrap();
        assert_eq!(orders(&model), vec![("C", 0), ("A", 1), ("B", 2)]);

        model.move_column("C", 99).unwrap();
        assert_eq!(orders(&model), vec![("A", 0), ("B", 1), ("C", 2)]);
    }

    #[test]
    fn test_set_width_respects_constraints() {
        let mut model = sample_model();
        model.set_min_width("A", 40.0).unwrap();
        model.set_max_width("A", 150.0).unwrap();

        let applied = model.set_width("A", ColumnWidth::Fixed(10.0), true).unwrap();
        assert_eq!(applied, ColumnWidth::Fixed(40.0));

        let applied = model.set_width("A", ColumnWidth::Fixed(500.0), true).unwrap();
        assert_eq!(applied, ColumnWidth::Fixed(150.0));

        let applied = model.set_width("A", ColumnWidth::Fixed(500.0), false).unwrap();
        assert_eq!(applied, ColumnWidth::Fixed(500.0));

        assert!(model.set_width("A", ColumnWidth::Fixed(f64::NAN), true).is_err());
    }

    #[test]
    fn test_changing_bounds_clamps_current_width() {
        let mut model = sample_model();
        model.set_max_width("A", 80.0).unwrap();
        assert_eq!(model.column("A").unwrap().width, ColumnWidth::Fixed(80.0));

        model.set_min_width("C", 75.0).unwrap();
        assert_eq!(model.column("C").unwrap().width, ColumnWidth::Fixed(75.0));

        // Auto widths are left alone
        model.set_min_width("B", 75.0).unwrap();
        assert_eq!(model.column("B").unwrap().width, ColumnWidth::Auto);
    }

    #[test]
    fn test_min_above_max_raises_max() {
        let mut model = sample_model();
        model.set_max_width("A", 100.0).unwrap();
        model.set_min_width("A", 120.0).unwrap();
        let column = model.column("A").unwrap();
        assert_eq!(column.min_width, 120.0);
        assert_eq!(column.max_width, 120.0);
    }

    #[test]
    fn test_changes_are_queued() {
        let mut model = sample_model();
        model.set_visible("B", false).unwrap();
        model.move_column("A", 2).unwrap();

        let changes = model.take_changes();
        assert_eq!(changes.len(), 2);
        assert_eq!(
            changes[0],
            ColumnChange::VisibilityChanged {
                property_name: "B".to_string(),
                is_visible: false
            }
        );
        assert!(model.take_changes().is_empty());
    }

    #[test]
    fn test_effective_width_resolves_auto() {
        let column = Column::new("B", "Bravo").with_bounds(20.0, 80.0);
        assert_eq!(column.effective_width(100.0), 80.0);
        assert_eq!(Column::new("B", "Bravo").effective_width(100.0), 100.0);
    }

    #[test]
    fn test_order_at_offset_skips_hidden_columns() {
        let mut model = sample_model();
        // A: [0,100), B: [100,200) with auto width, C: [200,250)
        assert_eq!(model.order_at_offset(50.0, 100.0), Some(0));
        assert_eq!(model.order_at_offset(150.0, 100.0), Some(1));
        assert_eq!(model.order_at_offset(999.0, 100.0), Some(2));

        model.set_visible("B", false).unwrap();
        assert_eq!(model.order_at_offset(120.0, 100.0), Some(2));
    }

    #[test]
    fn test_column_validation() {
        assert!(Column::numeric("qty", "Quantity").is_valid());

        let mut column = Column::new("w", "Width").with_bounds(50.0, 100.0);
        column.width = ColumnWidth::Fixed(10.0);
        let errors = column.validation_errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("MinWidth"));
    }

    #[test]
    fn test_typed_constructors() {
        let date = Column::date("created", "Created");
        assert_eq!(date.data_type, DataType::Date);
        assert_eq!(date.string_format.as_deref(), Some("MM/dd/yyyy"));

        let flag = Column::boolean("active", "Active");
        assert!(!flag.can_filter);
        assert_eq!(flag.width, ColumnWidth::Fixed(80.0));
    }

    #[test]
    fn test_column_width_serde() {
        assert_eq!(serde_json::to_string(&ColumnWidth::Auto).unwrap(), "\"auto\"");
        assert_eq!(serde_json::to_string(&ColumnWidth::Fixed(120.0)).unwrap(), "120.0");
        assert_eq!(
            serde_json::from_str::<ColumnWidth>("\"auto\"").unwrap(),
            ColumnWidth::Auto
        );
        assert_eq!(
            serde_json::from_str::<ColumnWidth>("75").unwrap(),
            ColumnWidth::Fixed(75.0)
        );
        assert!(serde_json::from_str::<ColumnWidth>("\"wide\"").is_err());
    }
}
