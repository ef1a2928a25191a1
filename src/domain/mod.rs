pub mod column;
pub mod events;
pub mod filter;
pub mod interaction;
pub mod record;
pub mod selection;
pub mod snapshot;
pub mod sorting;
pub mod value;

pub use column::{Column, ColumnChange, ColumnModel, ColumnWidth};
pub use events::{EventBus, EventKind, GridEvent, SubscriptionId};
pub use filter::{
    Combinator, FilterConfiguration, FilterCriterion, FilterOperator, FilterStatistics,
};
pub use interaction::{
    DragController, DragState, DragUpdate, Point, ResizeController, ResizeOutcome, ResizeState,
};
pub use record::{AccessorMap, PropertyResolver, Row, RowResolver};
pub use selection::{Selectable, SelectableResolver, Selection};
pub use snapshot::{ApplyReport, ColumnSettings, ConfigurationSnapshot, SnapshotId};
pub use sorting::{sort_records, SortConfiguration, SortCriterion, SortDirection};
pub use value::{CellValue, DataType};
