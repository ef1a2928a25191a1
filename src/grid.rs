//! The grid controller: one column layout plus its sort, filter and gesture
//! state, with every layout change announced on the event bus.

use crate::domain::column::{Column, ColumnChange, ColumnModel};
use crate::domain::events::{EventBus, GridEvent};
use crate::domain::filter::{FilterConfiguration, FilterCriterion, FilterStatistics};
use crate::domain::interaction::{DragController, DragUpdate, Point, ResizeController, ResizeOutcome};
use crate::domain::record::PropertyResolver;
use crate::domain::snapshot::{ApplyReport, ConfigurationSnapshot, SnapshotId};
use crate::domain::sorting::{sort_refs, SortConfiguration, SortDirection};
use crate::error::{GridError, Result};
use crate::settings::GridSettings;
use crate::storage::SnapshotStore;
use tracing::debug;

/// Owns a grid's column model and everything derived from it
///
/// # Examples
/// ```
/// use gridview_core::domain::column::Column;
/// use gridview_core::domain::record::{Row, RowResolver};
/// use gridview_core::{GridController, GridSettings};
///
/// let mut grid = GridController::with_columns(
///     GridSettings::default(),
///     vec![Column::text("part", "Part"), Column::numeric("qty", "Qty")],
/// )
/// .unwrap();
///
/// grid.request_sort("qty", false).unwrap();
///
/// let rows = vec![
///     Row::new().with("part", "nut").with("qty", 12),
///     Row::new().with("part", "bolt").with("qty", 3),
/// ];
/// let view = grid.view(&rows, &RowResolver);
/// assert_eq!(view[0].get("part").unwrap().to_string(), "bolt");
/// ```
#[derive(Debug)]
pub struct GridController {
    settings: GridSettings,
    columns: ColumnModel,
    sort: SortConfiguration,
    filter: FilterConfiguration,
    drag: DragController,
    resize: ResizeController,
    events: EventBus,
}

impl GridController {
    pub fn new(settings: GridSettings) -> Self {
        Self {
            sort: SortConfiguration::with_settings(&settings),
            filter: FilterConfiguration::default(),
            drag: DragController::with_settings(&settings),
            resize: ResizeController::with_settings(&settings),
            columns: ColumnModel::new(),
            events: EventBus::new(),
            settings,
        }
    }

    pub fn with_columns(
        settings: GridSettings,
        columns: impl IntoIterator<Item = Column>,
    ) -> Result<Self> {
        let mut grid = Self::new(settings);
        grid.columns = ColumnModel::from_columns(columns)?;
        grid.filter.initialize_from_columns(&grid.columns);
        Ok(grid)
    }

    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    pub fn columns(&self) -> &ColumnModel {
        &self.columns
    }

    pub fn sort_configuration(&self) -> &SortConfiguration {
        &self.sort
    }

    pub fn filter_configuration(&self) -> &FilterConfiguration {
        &self.filter
    }

    pub fn filter_configuration_mut(&mut self) -> &mut FilterConfiguration {
        &mut self.filter
    }

    pub fn events(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// Runs a batch of column mutations, then announces what changed
    pub fn update_columns<T, F>(&mut self, update: F) -> Result<T>
    where
        F: FnOnce(&mut ColumnModel) -> Result<T>,
    {
        let result = update(&mut self.columns);
        self.flush();
        result
    }

    /// Adds a column, applying the configured default bounds
    pub fn add_column(&mut self, mut column: Column) -> Result<()> {
        if column.min_width == Column::DEFAULT_MIN_WIDTH {
            column.min_width = self.settings.default_min_width;
        }
        if column.max_width.is_infinite() {
            column.max_width = self.settings.max_width();
        }
        self.update_columns(|model| model.add_column(column).map(|_| ()))
    }

    /// Cycles a header's sort direction (none, ascending, descending)
    ///
    /// Returns the direction now applied to the column.
    pub fn request_sort(&mut self, column_id: &str, is_multi_column: bool) -> Result<SortDirection> {
        let column = self
            .columns
            .column(column_id)
            .ok_or_else(|| GridError::ColumnNotFound(column_id.to_string()))?;
        if !column.can_sort {
            debug!("Sort ignored: {} is not sortable", column_id);
            return Ok(self.sort.direction_of(column_id));
        }

        let direction = self.sort.direction_of(column_id).next();
        if is_multi_column {
            self.sort.apply_multi_column_sort(column_id, direction);
        } else {
            self.sort.apply_single_column_sort(column_id, direction);
        }

        self.events.emit(GridEvent::SortRequested {
            column_id: column_id.to_string(),
            is_multi_column,
        });
        Ok(direction)
    }

    pub fn clear_sort(&mut self) {
        self.sort.clear();
    }

    pub fn set_filter(&mut self, criterion: FilterCriterion) {
        self.filter.set_criterion(criterion);
    }

    pub fn set_global_search(&mut self, text: impl Into<String>) {
        self.filter.set_global_search(text);
    }

    /// Filters then sorts the records
    pub fn view<'a, R, P>(&self, records: &'a [R], resolver: &P) -> Vec<&'a R>
    where
        P: PropertyResolver<R> + ?Sized,
    {
        let mut visible = self.filter.apply(records, resolver);
        sort_refs(&mut visible, &self.sort.active_criteria(), resolver);
        visible
    }

    pub fn statistics<R, P>(&self, records: &[R], resolver: &P) -> FilterStatistics
    where
        P: PropertyResolver<R> + ?Sized,
    {
        let filtered = self.filter.apply(records, resolver).len();
        self.filter.statistics(records.len(), filtered)
    }

    pub fn start_drag(&mut self, column: &str, pointer: Point) -> Result<()> {
        self.drag.start_drag(&self.columns, column, pointer)
    }

    /// Tracks the pointer and moves the column to the slot under it
    ///
    /// Nothing moves while the pointer is outside the vertical tolerance.
    pub fn update_drag(&mut self, column: &str, pointer: Point) -> Result<DragUpdate> {
        let update = self.drag.update_drag(column, pointer)?;
        let target = self
            .drag
            .drop_target(&self.columns, column, pointer, self.settings.auto_width);
        if let Some(slot) = target {
            if self.columns.order_of(column) != Some(slot) {
                self.columns.move_column(column, slot)?;
            }
        }
        Ok(update)
    }

    pub fn complete_drag(&mut self, column: &str, commit: bool) -> Result<ColumnChange> {
        let change = self.drag.complete_drag(&mut self.columns, column, commit);
        self.flush();
        change
    }

    pub fn start_resize(&mut self, column: &str) -> Result<f64> {
        self.resize.start_resize(&self.columns, column)
    }

    pub fn update_resize(&mut self, column: &str, delta: f64) -> Result<ResizeOutcome> {
        let outcome = self.resize.update_resize(&mut self.columns, column, delta);
        self.flush();
        outcome
    }

    pub fn complete_resize(&mut self, column: &str) -> Result<f64> {
        self.resize.complete_resize(column)
    }

    /// Captures the current layout and raises `ConfigurationSaveRequested`
    pub fn request_save(&mut self, display_name: impl Into<String>) -> ConfigurationSnapshot {
        let snapshot = ConfigurationSnapshot::from_columns(&self.columns, display_name);
        self.events
            .emit(GridEvent::ConfigurationSaveRequested(snapshot.clone()));
        snapshot
    }

    /// Applies a snapshot to the layout after raising `ConfigurationLoadRequested`
    pub fn load(&mut self, snapshot: &ConfigurationSnapshot) -> Result<ApplyReport> {
        snapshot.validate()?;
        self.events
            .emit(GridEvent::ConfigurationLoadRequested(snapshot.clone()));
        let report = snapshot.apply_to(&mut self.columns);
        self.flush();
        Ok(report)
    }

    pub async fn save_to(
        &mut self,
        store: &dyn SnapshotStore,
        display_name: impl Into<String>,
    ) -> Result<SnapshotId> {
        let snapshot = self.request_save(display_name);
        store.save(&snapshot).await
    }

    pub async fn load_from(&mut self, store: &dyn SnapshotStore, id: &SnapshotId) -> Result<ApplyReport> {
        let snapshot = store.load(id).await?;
        self.load(&snapshot)
    }

    /// Drains queued column changes into a `ColumnsModified` event and keeps
    /// sort and filter state in step with added or removed columns
    fn flush(&mut self) {
        let changes = self.columns.take_changes();
        if changes.is_empty() {
            return;
        }

        for change in &changes {
            match change {
                ColumnChange::Removed { property_name, .. } => {
                    self.sort.remove_sort(property_name);
                    self.filter
                        .criteria
                        .retain(|c| &c.property_name != property_name);
                }
                ColumnChange::Added { property_name, .. } => {
                    if let Some(column) = self.columns.column(property_name) {
                        if column.can_filter && self.filter.criterion(property_name).is_none() {
                            self.filter.criteria.push(FilterCriterion::for_column(
                                property_name.clone(),
                                column.data_type,
                            ));
                        }
                    }
                }
                _ => {}
            }
        }

        debug!("Columns modified: {} changes", changes.len());
        self.events.emit(GridEvent::ColumnsModified(changes));
    }
}

impl Default for GridController {
    fn default() -> Self {
        Self::new(GridSettings::default())
    }
}
