//! Settings dialog: audio latency and abstraction search paths
//!
//! Edits a working copy of [`EditorSettings`]; the copy is reported back
//! when the dialog closes and the host decides whether to persist it.

use iced::widget::{button, column, container, row, scrollable, slider, text, text_input, Space};
use iced::{Alignment, Background, Element, Length};
use patchwork_core::config::{EditorSettings, MAX_LATENCY_SAMPLES};

use crate::theme::{dialog_style, ACTIVE, TEXT_SECONDARY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingsPanel {
    #[default]
    Audio,
    SearchPaths,
}

impl SettingsPanel {
    pub const ALL: [SettingsPanel; 2] = [Self::Audio, Self::SearchPaths];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Audio => "Audio",
            Self::SearchPaths => "Search Paths",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettingsMessage {
    SelectPanel(SettingsPanel),
    LatencyChanged(u32),
    PathInputChanged(String),
    AddPath,
    SelectPath(usize),
    RemoveSelected,
    ResetPaths,
    Close,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SettingsState {
    pub panel: SettingsPanel,
    pub settings: EditorSettings,
    pub selected_path: Option<usize>,
    pub path_input: String,
}

impl SettingsState {
    pub fn new(settings: EditorSettings) -> Self {
        Self {
            panel: SettingsPanel::default(),
            settings,
            selected_path: None,
            path_input: String::new(),
        }
    }

    /// Apply a message; returns true if the dialog asked to close
    pub fn update(&mut self, message: SettingsMessage) -> bool {
        match message {
            SettingsMessage::SelectPanel(panel) => self.panel = panel,
            SettingsMessage::LatencyChanged(samples) => {
                self.settings.set_latency(samples);
            }
            SettingsMessage::PathInputChanged(input) => self.path_input = input,
            SettingsMessage::AddPath => {
                let path = self.path_input.trim();
                if self.settings.add_search_path(path) {
                    log::info!("Added search path {}", path);
                    self.path_input.clear();
                }
            }
            SettingsMessage::SelectPath(index) => {
                if index < self.settings.search_paths.len() {
                    self.selected_path = Some(index);
                }
            }
            SettingsMessage::RemoveSelected => {
                if let Some(index) = self.selected_path.take() {
                    if let Some(path) = self.settings.remove_search_path(index) {
                        log::info!("Removed search path {}", path.display());
                    }
                }
            }
            SettingsMessage::ResetPaths => {
                self.settings.reset_search_paths();
                self.selected_path = None;
            }
            SettingsMessage::Close => return true,
        }
        false
    }
}

pub(super) fn view(state: &SettingsState) -> Element<'_, SettingsMessage> {
    let close_btn = button(text("×").size(20))
        .on_press(SettingsMessage::Close)
        .style(button::secondary);

    let header = row![text("Settings").size(24), Space::new().width(Length::Fill), close_btn]
        .align_y(Alignment::Center)
        .width(Length::Fill);

    let toolbar = row(SettingsPanel::ALL.iter().map(|panel| {
        let style = if *panel == state.panel {
            button::primary
        } else {
            button::secondary
        };
        button(text(panel.label()).size(14))
            .on_press(SettingsMessage::SelectPanel(*panel))
            .style(style)
            .into()
    }))
    .spacing(6);

    let panel = match state.panel {
        SettingsPanel::Audio => view_audio_panel(state),
        SettingsPanel::SearchPaths => view_search_paths_panel(state),
    };

    container(
        column![header, toolbar, panel]
            .spacing(15)
            .width(Length::Fixed(480.0)),
    )
    .padding(30)
    .style(dialog_style)
    .into()
}

fn view_audio_panel(state: &SettingsState) -> Element<'_, SettingsMessage> {
    let latency = state.settings.latency_samples;

    column![
        text("Latency").size(16),
        row![
            slider(0..=MAX_LATENCY_SAMPLES, latency, SettingsMessage::LatencyChanged)
                .step(1u32)
                .width(Length::Fill),
            text(format!("{} samples", latency))
                .size(14)
                .width(Length::Fixed(110.0)),
        ]
        .spacing(10)
        .align_y(Alignment::Center),
        text("Buffer between the engine and the audio device.")
            .size(12)
            .color(TEXT_SECONDARY),
    ]
    .spacing(8)
    .into()
}

fn view_search_paths_panel(state: &SettingsState) -> Element<'_, SettingsMessage> {
    let paths = column(state.settings.search_paths.iter().enumerate().map(|(index, path)| {
        let selected = state.selected_path == Some(index);
        button(text(path.display().to_string()).size(13))
            .on_press(SettingsMessage::SelectPath(index))
            .width(Length::Fill)
            .style(move |theme: &iced::Theme, status| {
                let mut style = button::text(theme, status);
                if selected {
                    style.background = Some(Background::Color(ACTIVE));
                }
                style
            })
            .into()
    }))
    .spacing(2);

    let remove_btn = button(text("Remove").size(13)).style(button::secondary);
    let remove_btn = if state.selected_path.is_some() {
        remove_btn.on_press(SettingsMessage::RemoveSelected)
    } else {
        remove_btn
    };

    column![
        text("Library search paths").size(16),
        scrollable(paths).height(Length::Fixed(200.0)),
        row![
            text_input("/path/to/abstractions", &state.path_input)
                .on_input(SettingsMessage::PathInputChanged)
                .on_submit(SettingsMessage::AddPath)
                .padding(6)
                .size(13),
            button(text("Add").size(13))
                .on_press(SettingsMessage::AddPath)
                .style(button::primary),
        ]
        .spacing(6)
        .align_y(Alignment::Center),
        row![
            remove_btn,
            Space::new().width(Length::Fill),
            button(text("Reset to Default").size(13))
                .on_press(SettingsMessage::ResetPaths)
                .style(button::secondary),
        ]
        .spacing(6),
    ]
    .spacing(8)
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use patchwork_core::config::default_abstractions_path;
    use std::path::PathBuf;

    #[test]
    fn test_latency_clamped() {
        let mut state = SettingsState::new(EditorSettings::default());
        state.update(SettingsMessage::LatencyChanged(1_000_000));
        assert_eq!(state.settings.latency_samples, MAX_LATENCY_SAMPLES);
    }

    #[test]
    fn test_add_select_remove_reset() {
        let mut state = SettingsState::new(EditorSettings::default());
        state.update(SettingsMessage::PathInputChanged(" /opt/pd/extra ".to_string()));
        state.update(SettingsMessage::AddPath);
        assert!(state.path_input.is_empty());
        assert_eq!(state.settings.search_paths.last(), Some(&PathBuf::from("/opt/pd/extra")));

        // Nothing selected, nothing removed
        state.update(SettingsMessage::RemoveSelected);
        assert_eq!(state.settings.search_paths.len(), 2);

        state.update(SettingsMessage::SelectPath(1));
        state.update(SettingsMessage::RemoveSelected);
        assert_eq!(state.settings.search_paths, vec![default_abstractions_path()]);
        assert_eq!(state.selected_path, None);

        state.settings.search_paths.clear();
        state.update(SettingsMessage::ResetPaths);
        assert_eq!(state.settings.search_paths, vec![default_abstractions_path()]);
    }

    #[test]
    fn test_close_requested() {
        let mut state = SettingsState::new(EditorSettings::default());
        assert!(!state.update(SettingsMessage::SelectPanel(SettingsPanel::SearchPaths)));
        assert_eq!(state.panel, SettingsPanel::SearchPaths);
        assert!(state.update(SettingsMessage::Close));
    }
}
