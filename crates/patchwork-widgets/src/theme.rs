//! Shared colours and metrics for the patch canvas

use iced::widget::container;
use iced::{Background, Border, Color};

/// Canvas background
pub const CANVAS_BG: Color = Color::from_rgb(0.14, 0.14, 0.15);

/// Object body
pub const OBJECT_BG: Color = Color::from_rgb(0.21, 0.21, 0.23);

/// Object outline
pub const OBJECT_BORDER: Color = Color::from_rgb(0.45, 0.45, 0.5);

/// Highlight for active state (bang flash, toggle on, slider fill)
pub const ACTIVE: Color = Color::from_rgb(0.3, 0.6, 0.9);

pub const TEXT_PRIMARY: Color = Color::from_rgb(0.9, 0.9, 0.9);
pub const TEXT_SECONDARY: Color = Color::from_rgb(0.6, 0.6, 0.6);

/// Invalid-field outline and array error state
pub const ERROR: Color = Color::from_rgb(0.9, 0.25, 0.25);

/// Backdrop behind modal dialogs (60% black)
pub const BACKDROP: Color = Color::from_rgba(0.0, 0.0, 0.0, 0.6);

/// Dialog body
pub const DIALOG_BG: Color = Color::from_rgb(0.17, 0.17, 0.19);

/// Object label text size
pub const OBJECT_TEXT_SIZE: f32 = 12.0;

/// Approximate advance of one glyph at [`OBJECT_TEXT_SIZE`]
pub const GLYPH_WIDTH: i32 = 7;

/// Bordered box used by most objects
pub fn object_box_style(active: bool) -> container::Style {
    container::Style {
        background: Some(Background::Color(if active { ACTIVE } else { OBJECT_BG })),
        border: Border {
            color: OBJECT_BORDER,
            width: 1.0,
            radius: 2.0.into(),
        },
        text_color: Some(TEXT_PRIMARY),
        ..Default::default()
    }
}

pub fn dialog_style(_theme: &iced::Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(DIALOG_BG)),
        border: Border {
            color: ACTIVE,
            width: 2.0,
            radius: 8.0.into(),
        },
        text_color: Some(TEXT_PRIMARY),
        ..Default::default()
    }
}

/// Width in pixels of the longest line of `text`
pub fn text_width(text: &str) -> i32 {
    let longest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    longest as i32 * GLYPH_WIDTH
}
