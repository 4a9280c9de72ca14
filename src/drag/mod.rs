//! Track drag and drop: payload format, header tie-break geometry and the
//! gesture controller.

pub mod controller;
pub mod geometry;
pub mod payload;

pub use controller::{DragController, DragEffect, DragError, DragPhase, DropOutcome};
pub use geometry::{DragPosition, HeaderGeometry};
