//! # Gridview Core
//!
//! Column, sort, filter and interaction engine for configurable data grids.
//!
//! This crate owns the column layout of a grid, orders and filters caller
//! records through explicit property accessors, turns pointer gestures into
//! reorder and resize operations, and captures layouts as named snapshots,
//! without any dependency on a rendering surface or storage backend.

pub mod domain;
pub mod error;
pub mod grid;
pub mod settings;
pub mod storage;

// Re-export commonly used types
pub use domain::{
    column::{Column, ColumnModel, ColumnWidth},
    filter::{FilterConfiguration, FilterCriterion, FilterOperator},
    record::{AccessorMap, PropertyResolver, Row, RowResolver},
    snapshot::{ConfigurationSnapshot, SnapshotId},
    sorting::{SortConfiguration, SortCriterion, SortDirection},
    value::{CellValue, DataType},
};
pub use error::{GridError, Result};
pub use grid::GridController;
pub use settings::GridSettings;
pub use storage::{InMemorySnapshotStore, SnapshotStore};
