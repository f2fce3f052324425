//! Graphical array editor
//!
//! [`GraphicalArray`] mirrors an engine array and turns pointer drags into
//! edits. [`array_view`] draws it on a canvas and reports gestures as
//! [`ArrayMessage`]s.

mod canvas;
mod state;

pub use canvas::{array_view, ArrayCanvas, ArrayInteraction};
pub use state::GraphicalArray;

/// Pointer gesture on an array, in coordinates normalised to the widget (0..1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArrayMessage {
    Pressed { x: f32, y: f32 },
    Dragged { x: f32, y: f32 },
    Released,
}
