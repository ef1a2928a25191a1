use super::Point;
use crate::domain::column::{ColumnChange, ColumnModel};
use crate::error::{GridError, Result};
use crate::settings::GridSettings;
use std::collections::HashMap;
use tracing::debug;

/// Phase of a column's drag gesture
///
/// `state()` only ever reports `Idle` or `Dragging`. `Committing` and
/// `Cancelling` last for the duration of `complete_drag` and show up in its
/// debug log; once it returns the column is `Idle` again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging,
    /// Transient, inside `complete_drag` with `commit = true`
    Committing,
    /// Transient, inside `complete_drag` with `commit = false`
    Cancelling,
}

/// Feedback for one pointer move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragUpdate {
    /// Horizontal travel since the gesture started
    pub offset_x: f64,
    /// False while the pointer has strayed too far vertically
    pub is_valid: bool,
}

#[derive(Debug, Clone)]
struct DragSession {
    state: DragState,
    start: Point,
    original_order: usize,
    original_layout: Vec<String>,
    offset_x: f64,
    is_valid: bool,
}

/// Drives `Idle -> Dragging -> {Committing, Cancelling} -> Idle` per column
#[derive(Debug, Clone)]
pub struct DragController {
    sessions: HashMap<String, DragSession>,
    vertical_tolerance: f64,
}

impl DragController {
    pub fn new() -> Self {
        Self::with_settings(&GridSettings::default())
    }

    pub fn with_settings(settings: &GridSettings) -> Self {
        Self {
            sessions: HashMap::new(),
            vertical_tolerance: settings.drag_vertical_tolerance,
        }
    }

    /// `Dragging` between `start_drag` and `complete_drag`, `Idle` otherwise
    pub fn state(&self, column: &str) -> DragState {
        self.sessions
            .get(column)
            .map(|s| s.state)
            .unwrap_or(DragState::Idle)
    }

    pub fn is_dragging(&self, column: &str) -> bool {
        self.state(column) == DragState::Dragging
    }

    /// Order the column held when its drag started
    pub fn original_order(&self, column: &str) -> Option<usize> {
        self.sessions.get(column).map(|s| s.original_order)
    }

    /// Begins a drag, remembering the current layout for a later cancel
    pub fn start_drag(&mut self, model: &ColumnModel, column: &str, pointer: Point) -> Result<()> {
        if self.sessions.contains_key(column) {
            return Err(GridError::DragInProgress(column.to_string()));
        }
        let original_order = model
            .order_of(column)
            .ok_or_else(|| GridError::ColumnNotFound(column.to_string()))?;

        debug!(
            "Drag start: {} at order {} ({}, {})",
            column, original_order, pointer.x, pointer.y
        );
        self.sessions.insert(
            column.to_string(),
            DragSession {
                state: DragState::Dragging,
                start: pointer,
                original_order,
                original_layout: model.property_names().into_iter().map(String::from).collect(),
                offset_x: 0.0,
                is_valid: true,
            },
        );
        Ok(())
    }

    /// Tracks pointer movement; straying vertically invalidates without aborting
    pub fn update_drag(&mut self, column: &str, pointer: Point) -> Result<DragUpdate> {
        let tolerance = self.vertical_tolerance;
        let session = self
            .sessions
            .get_mut(column)
            .ok_or_else(|| GridError::NoActiveDrag(column.to_string()))?;

        session.offset_x = pointer.x - session.start.x;
        let is_valid = (pointer.y - session.start.y).abs() <= tolerance;
        if is_valid != session.is_valid {
            debug!("Drag {}: drop {}", column, if is_valid { "allowed" } else { "blocked" });
        }
        session.is_valid = is_valid;

        Ok(DragUpdate {
            offset_x: session.offset_x,
            is_valid,
        })
    }

    /// Slot the dragged column would land in for the given pointer position
    ///
    /// The pointer is measured from the grid's left edge.
    pub fn drop_target(&self, model: &ColumnModel, column: &str, pointer: Point, auto_width: f64) -> Option<usize> {
        let session = self.sessions.get(column)?;
        if !session.is_valid {
            return None;
        }
        model.order_at_offset(pointer.x, auto_width)
    }

    /// Ends the gesture
    ///
    /// On commit the column keeps whatever order it has now. On cancel the
    /// whole layout returns to its pre-drag order.
    pub fn complete_drag(
        &mut self,
        model: &mut ColumnModel,
        column: &str,
        commit: bool,
    ) -> Result<ColumnChange> {
        let mut session = self
            .sessions
            .remove(column)
            .ok_or_else(|| GridError::NoActiveDrag(column.to_string()))?;

        if commit {
            session.state = DragState::Committing;
            let to = model
                .order_of(column)
                .ok_or_else(|| GridError::ColumnNotFound(column.to_string()))?;
            debug!(
                "Drag {:?}: {} from {} to {}",
                session.state, column, session.original_order, to
            );
            Ok(model.record(ColumnChange::Moved {
                property_name: column.to_string(),
                from: session.original_order,
                to,
            }))
        } else {
            session.state = DragState::Cancelling;
            debug!(
                "Drag {:?}: {} back to {}",
                session.state, column, session.original_order
            );
            model.reorder(&session.original_layout);
            Ok(ColumnChange::Moved {
                property_name: column.to_string(),
                from: session.original_order,
                to: session.original_order,
            })
        }
    }
}

impl Default for DragController {
    fn default() -> Self {
        Self::new()
    }
}
