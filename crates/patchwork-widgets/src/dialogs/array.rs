//! New-array dialog: name and size with inline validation

use iced::widget::{button, column, container, row, text, text_input, Space};
use iced::{Alignment, Border, Element, Length};
use thiserror::Error;

use crate::theme::{dialog_style, ERROR, TEXT_SECONDARY};

/// Longest accepted size input
pub const MAX_SIZE_DIGITS: usize = 10;

const DEFAULT_NAME: &str = "array1";
const DEFAULT_SIZE: &str = "100";

/// Why the dialog refused to confirm
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArrayDialogError {
    #[error("array name is empty")]
    EmptyName,

    #[error("invalid array size '{0}'")]
    InvalidSize(String),

    #[error("array name is empty and size '{0}' is invalid")]
    EmptyNameAndInvalidSize(String),
}

impl ArrayDialogError {
    pub fn name_invalid(&self) -> bool {
        matches!(self, Self::EmptyName | Self::EmptyNameAndInvalidSize(_))
    }

    pub fn size_invalid(&self) -> bool {
        matches!(self, Self::InvalidSize(_) | Self::EmptyNameAndInvalidSize(_))
    }
}

/// What the dialog reports when it closes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayDialogResult {
    Confirmed { name: String, size: usize },
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrayDialogMessage {
    NameChanged(String),
    SizeChanged(String),
    Confirm,
    Cancel,
}

/// Field contents and validation flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayDialogState {
    pub name: String,
    pub size: String,
    name_invalid: bool,
    size_invalid: bool,
}

impl Default for ArrayDialogState {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            size: DEFAULT_SIZE.to_string(),
            name_invalid: false,
            size_invalid: false,
        }
    }
}

impl ArrayDialogState {
    pub fn set_name(&mut self, name: String) {
        self.name = name;
        self.name_invalid = false;
    }

    /// Replace the size input, keeping digits only, at most [`MAX_SIZE_DIGITS`]
    pub fn set_size(&mut self, input: &str) {
        self.size = input
            .chars()
            .filter(|c| c.is_ascii_digit())
            .take(MAX_SIZE_DIGITS)
            .collect();
        self.size_invalid = false;
    }

    pub fn name_invalid(&self) -> bool {
        self.name_invalid
    }

    pub fn size_invalid(&self) -> bool {
        self.size_invalid
    }

    /// Check both fields without touching the highlight flags
    pub fn validate(&self) -> Result<(String, usize), ArrayDialogError> {
        let size = self.size.parse::<usize>().ok();
        match (self.name.is_empty(), size) {
            (false, Some(size)) => Ok((self.name.clone(), size)),
            (true, Some(_)) => Err(ArrayDialogError::EmptyName),
            (false, None) => Err(ArrayDialogError::InvalidSize(self.size.clone())),
            (true, None) => Err(ArrayDialogError::EmptyNameAndInvalidSize(self.size.clone())),
        }
    }

    /// Validate and flag every invalid field
    pub fn confirm(&mut self) -> Result<ArrayDialogResult, ArrayDialogError> {
        match self.validate() {
            Ok((name, size)) => Ok(ArrayDialogResult::Confirmed { name, size }),
            Err(e) => {
                self.name_invalid = e.name_invalid();
                self.size_invalid = e.size_invalid();
                log::debug!("Array dialog: {}", e);
                Err(e)
            }
        }
    }
}

fn field<'a>(
    label: &'static str,
    value: &'a str,
    invalid: bool,
    on_input: fn(String) -> ArrayDialogMessage,
) -> Element<'a, ArrayDialogMessage> {
    let input = text_input("", value)
        .on_input(on_input)
        .on_submit(ArrayDialogMessage::Confirm)
        .padding(6)
        .size(14)
        .style(move |theme: &iced::Theme, status| {
            let mut style = text_input::default(theme, status);
            if invalid {
                style.border = Border {
                    color: ERROR,
                    width: 2.0,
                    radius: style.border.radius,
                };
            }
            style
        });

    row![
        text(label).size(14).color(TEXT_SECONDARY).width(Length::Fixed(60.0)),
        input
    ]
    .spacing(10)
    .align_y(Alignment::Center)
    .into()
}

pub(super) fn view(state: &ArrayDialogState) -> Element<'_, ArrayDialogMessage> {
    let actions = row![
        Space::new().width(Length::Fill),
        button(text("Cancel"))
            .on_press(ArrayDialogMessage::Cancel)
            .style(button::secondary),
        button(text("OK"))
            .on_press(ArrayDialogMessage::Confirm)
            .style(button::primary),
    ]
    .spacing(10)
    .width(Length::Fill);

    container(
        column![
            text("Array Properties").size(20),
            field("Name:", &state.name, state.name_invalid, ArrayDialogMessage::NameChanged),
            field("Size:", &state.size, state.size_invalid, ArrayDialogMessage::SizeChanged),
            actions,
        ]
        .spacing(15)
        .width(Length::Fixed(320.0)),
    )
    .padding(24)
    .style(dialog_style)
    .into()
}
