//! Pointer-gesture state machines that mutate a [`ColumnModel`].
//!
//! Gesture state lives in per-column sessions owned by the controllers, never
//! on the [`Column`] itself.
//!
//! [`ColumnModel`]: crate::domain::column::ColumnModel
//! [`Column`]: crate::domain::column::Column

pub mod drag;
pub mod resize;

pub use drag::{DragController, DragState, DragUpdate};
pub use resize::{ResizeController, ResizeOutcome, ResizeState};

use serde::{Deserialize, Serialize};

/// Pointer position in grid coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}
