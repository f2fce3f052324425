//! Patchwork Widgets - iced views for dataflow objects
//!
//! ## Architecture (iced 0.14 patterns)
//!
//! - **State structs**: plain data mirroring engine objects (`GuiObject`,
//!   `GraphicalArray`, dialog states)
//! - **Handlers**: `handle(message, engine)` applies a user interaction and
//!   pushes the result to the [`Engine`](patchwork_core::engine::Engine)
//! - **View functions**: take state, return `Element<ModuleMessage>` for the
//!   host to `.map()` into its own message type
//! - **Canvas Programs**: pointer gestures that need drag tracking outside
//!   the widget bounds (arrays, number boxes, mouse pads)
//!
//! Engine-driven changes arrive through [`engine_subscription`] and are fed
//! back with `GuiObject::receive_event`.

pub mod array;
pub mod dialogs;
pub mod menu;
pub mod modal;
pub mod objects;
pub mod subscription;
pub mod theme;

pub use array::{ArrayMessage, GraphicalArray};
pub use dialogs::{
    ArrayDialogError, ArrayDialogMessage, ArrayDialogResult, ArrayDialogState, DialogAction,
    DialogHost, DialogMessage, SaveChoice, SettingsMessage, SettingsPanel, SettingsState,
};
pub use menu::{ObjectMenuItem, ObjectMenuMessage, ObjectMenuState};
pub use modal::{build_backdrop, with_modal_overlay};
pub use objects::{
    canvas_view, GuiComponent, GuiObject, ObjectEvent, ObjectMessage, ObjectOutcome,
};
pub use subscription::engine_subscription;
