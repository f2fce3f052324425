//! "Save changes?" dialog shown before closing a modified patch

use iced::widget::{button, column, container, row, text, Space};
use iced::{Alignment, Element, Length};

use crate::theme::{dialog_style, TEXT_SECONDARY};

/// Answer to the save prompt
///
/// The numeric codes are what external hosts receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveChoice {
    Cancel,
    DontSave,
    Save,
}

impl SaveChoice {
    pub fn code(&self) -> i32 {
        match self {
            Self::Cancel => 0,
            Self::DontSave => 1,
            Self::Save => 2,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Cancel),
            1 => Some(Self::DontSave),
            2 => Some(Self::Save),
            _ => None,
        }
    }
}

pub(super) fn view(patch_name: &str) -> Element<'_, SaveChoice> {
    let title = text("Save Changes?").size(20);
    let description = text(format!(
        "Do you want to save the changes you made to \"{}\"?",
        patch_name
    ))
    .size(14);
    let hint = text("Your changes will be lost if you don't save them.")
        .size(12)
        .color(TEXT_SECONDARY);

    let actions = row![
        button(text("Cancel"))
            .on_press(SaveChoice::Cancel)
            .style(button::secondary),
        Space::new().width(Length::Fill),
        button(text("Don't Save"))
            .on_press(SaveChoice::DontSave)
            .style(button::danger),
        button(text("Save"))
            .on_press(SaveChoice::Save)
            .style(button::primary),
    ]
    .spacing(10)
    .align_y(Alignment::Center)
    .width(Length::Fill);

    container(
        column![title, description, hint, actions]
            .spacing(15)
            .width(Length::Fixed(400.0)),
    )
    .padding(24)
    .style(dialog_style)
    .into()
}
