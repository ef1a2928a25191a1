use crate::domain::column::{ColumnModel, ColumnWidth};
use crate::error::{GridError, Result};
use crate::settings::GridSettings;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeState {
    #[default]
    Idle,
    Resizing,
}

/// Width applied by a resize step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeOutcome {
    /// The full request was honored
    Applied(f64),
    /// A bound was hit; carries the clamped width
    Constrained(f64),
}

impl ResizeOutcome {
    pub fn width(&self) -> f64 {
        match *self {
            ResizeOutcome::Applied(w) | ResizeOutcome::Constrained(w) => w,
        }
    }

    pub fn is_constrained(&self) -> bool {
        matches!(self, ResizeOutcome::Constrained(_))
    }
}

#[derive(Debug, Clone, Copy)]
struct ResizeSession {
    baseline: f64,
    last_width: f64,
}

/// Drives `Idle -> Resizing -> Idle` per column
///
/// There is no cancel: completing keeps the last applied width.
#[derive(Debug, Clone)]
pub struct ResizeController {
    sessions: HashMap<String, ResizeSession>,
    auto_width: f64,
}

impl ResizeController {
    pub fn new() -> Self {
        Self::with_settings(&GridSettings::default())
    }

    pub fn with_settings(settings: &GridSettings) -> Self {
        Self {
            sessions: HashMap::new(),
            auto_width: settings.auto_width,
        }
    }

    pub fn state(&self, column: &str) -> ResizeState {
        if self.sessions.contains_key(column) {
            ResizeState::Resizing
        } else {
            ResizeState::Idle
        }
    }

    /// Captures the column's effective width as the baseline and returns it
    pub fn start_resize(&mut self, model: &ColumnModel, column: &str) -> Result<f64> {
        if self.sessions.contains_key(column) {
            return Err(GridError::ResizeInProgress(column.to_string()));
        }
        let target = model
            .column(column)
            .ok_or_else(|| GridError::ColumnNotFound(column.to_string()))?;
        if !target.can_resize {
            return Err(GridError::ColumnNotResizable(column.to_string()));
        }

        let baseline = target.effective_width(self.auto_width);
        debug!("Resize start: {} from {}", column, baseline);
        self.sessions.insert(
            column.to_string(),
            ResizeSession {
                baseline,
                last_width: baseline,
            },
        );
        Ok(baseline)
    }

    /// Applies `baseline + delta`, clamped to the column's bounds
    pub fn update_resize(
        &mut self,
        model: &mut ColumnModel,
        column: &str,
        delta: f64,
    ) -> Result<ResizeOutcome> {
        let session = self
            .sessions
            .get_mut(column)
            .ok_or_else(|| GridError::NoActiveResize(column.to_string()))?;

        let proposed = (session.baseline + delta).max(0.0);
        let applied = match model.set_width(column, ColumnWidth::Fixed(proposed), true)? {
            ColumnWidth::Fixed(w) => w,
            ColumnWidth::Auto => proposed,
        };
        session.last_width = applied;

        if applied == session.baseline + delta {
            Ok(ResizeOutcome::Applied(applied))
        } else {
            debug!(
                "Resize {}: requested {} constrained to {}",
                column,
                session.baseline + delta,
                applied
            );
            Ok(ResizeOutcome::Constrained(applied))
        }
    }

    /// Ends the gesture and returns the width left in place
    pub fn complete_resize(&mut self, column: &str) -> Result<f64> {
        let session = self
            .sessions
            .remove(column)
            .ok_or_else(|| GridError::NoActiveResize(column.to_string()))?;
        debug!("Resize complete: {} at {}", column, session.last_width);
        Ok(session.last_width)
    }
}

impl Default for ResizeController {
    fn default() -> Self {
        Self::new()
    }
}
