//! Modal dialogs and their lifecycle
//!
//! A [`DialogHost`] owns at most one open dialog together with the completion
//! callback supplied when it was opened. Closing is two-phase:
//!
//! 1. A button or backdrop click records the outcome (`request_close`) and
//!    asks the host to schedule [`DialogMessage::Finish`].
//! 2. On the next update cycle `finish` drops the dialog and runs the
//!    completion callback, producing the host's own message.
//!
//! The callback is consumed on first use, so every dialog reports exactly
//! once no matter how many close requests race in before teardown. A dialog
//! that is still open when another one opens, or when the host goes away, is
//! settled through [`DialogHost::dismiss`] and still reports.

mod array;
mod save;
mod settings;

pub use array::{
    ArrayDialogError, ArrayDialogMessage, ArrayDialogResult, ArrayDialogState, MAX_SIZE_DIGITS,
};
pub use save::SaveChoice;
pub use settings::{SettingsMessage, SettingsPanel, SettingsState};

use iced::Element;
use patchwork_core::config::EditorSettings;

use crate::modal::with_modal_overlay;

/// Messages routed to the open dialog
#[derive(Debug, Clone, PartialEq)]
pub enum DialogMessage {
    Save(SaveChoice),
    Array(ArrayDialogMessage),
    Settings(SettingsMessage),
    /// Click on the dimmed area around the dialog
    Backdrop,
    /// Deferred teardown after a close request
    Finish,
}

/// What the host must do after [`DialogHost::update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    None,
    /// Dispatch [`DialogMessage::Finish`] on the next update cycle
    ScheduleFinish,
}

type Completion<T, M> = Box<dyn FnOnce(T) -> M>;

enum OpenDialog<M> {
    Save {
        patch_name: String,
        on_close: Completion<SaveChoice, M>,
    },
    Array {
        state: ArrayDialogState,
        on_close: Completion<ArrayDialogResult, M>,
    },
    Settings {
        state: SettingsState,
        on_close: Completion<EditorSettings, M>,
    },
}

/// Outcome recorded by a close request, delivered by `finish`
#[derive(Debug, Clone, PartialEq)]
enum Outcome {
    Save(SaveChoice),
    Array(ArrayDialogResult),
    Settings(EditorSettings),
}

/// Owner of the currently open dialog
pub struct DialogHost<M> {
    open: Option<OpenDialog<M>>,
    outcome: Option<Outcome>,
}

impl<M> Default for DialogHost<M> {
    fn default() -> Self {
        Self {
            open: None,
            outcome: None,
        }
    }
}

impl<M> std::fmt::Debug for DialogHost<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let open = match &self.open {
            None => "none",
            Some(OpenDialog::Save { .. }) => "save",
            Some(OpenDialog::Array { .. }) => "array",
            Some(OpenDialog::Settings { .. }) => "settings",
        };
        f.debug_struct("DialogHost")
            .field("open", &open)
            .field("closing", &self.outcome.is_some())
            .finish()
    }
}

impl<M> DialogHost<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// True between a close request and `finish`
    pub fn is_closing(&self) -> bool {
        self.outcome.is_some()
    }

    /// Working state of the array dialog, if it is the open one
    pub fn array_state(&self) -> Option<&ArrayDialogState> {
        match &self.open {
            Some(OpenDialog::Array { state, .. }) => Some(state),
            _ => None,
        }
    }

    pub fn settings_state(&self) -> Option<&SettingsState> {
        match &self.open {
            Some(OpenDialog::Settings { state, .. }) => Some(state),
            _ => None,
        }
    }

    /// Show the save prompt
    ///
    /// Like every `open_*`, returns the completion message of the dialog it
    /// displaced, if one was still open.
    #[must_use = "a displaced dialog reports through the returned message"]
    pub fn open_save(
        &mut self,
        patch_name: impl Into<String>,
        on_close: impl FnOnce(SaveChoice) -> M + 'static,
    ) -> Option<M> {
        self.replace(OpenDialog::Save {
            patch_name: patch_name.into(),
            on_close: Box::new(on_close),
        })
    }

    #[must_use = "a displaced dialog reports through the returned message"]
    pub fn open_array(
        &mut self,
        on_close: impl FnOnce(ArrayDialogResult) -> M + 'static,
    ) -> Option<M> {
        self.replace(OpenDialog::Array {
            state: ArrayDialogState::default(),
            on_close: Box::new(on_close),
        })
    }

    #[must_use = "a displaced dialog reports through the returned message"]
    pub fn open_settings(
        &mut self,
        settings: EditorSettings,
        on_close: impl FnOnce(EditorSettings) -> M + 'static,
    ) -> Option<M> {
        self.replace(OpenDialog::Settings {
            state: SettingsState::new(settings),
            on_close: Box::new(on_close),
        })
    }

    fn replace(&mut self, dialog: OpenDialog<M>) -> Option<M> {
        let displaced = self.dismiss();
        if displaced.is_some() {
            log::debug!("Dialog replaced while open, reporting its result");
        }
        self.open = Some(dialog);
        self.outcome = None;
        displaced
    }

    /// Settle the open dialog now and run its completion callback
    ///
    /// A close that was already requested keeps its outcome. Otherwise the
    /// dialog ends as if cancelled: Save reports `Cancel`, Array reports
    /// `Cancelled` and Settings reports its edits.
    pub fn dismiss(&mut self) -> Option<M> {
        let open = self.open.as_ref()?;
        if self.outcome.is_none() {
            self.outcome = Some(match open {
                OpenDialog::Save { .. } => Outcome::Save(SaveChoice::Cancel),
                OpenDialog::Array { .. } => Outcome::Array(ArrayDialogResult::Cancelled),
                OpenDialog::Settings { state, .. } => Outcome::Settings(state.settings.clone()),
            });
        }
        self.finish()
    }

    /// Record how the dialog ended; later requests before `finish` are ignored
    fn request_close(&mut self, outcome: Outcome) -> DialogAction {
        if self.open.is_none() || self.outcome.is_some() {
            return DialogAction::None;
        }
        self.outcome = Some(outcome);
        DialogAction::ScheduleFinish
    }

    /// Apply a dialog message. [`DialogMessage::Finish`] is handled by [`Self::finish`].
    pub fn update(&mut self, message: DialogMessage) -> DialogAction {
        if self.is_closing() {
            return DialogAction::None;
        }

        let outcome = match (&mut self.open, message) {
            (Some(OpenDialog::Save { .. }), DialogMessage::Save(choice)) => Outcome::Save(choice),
            (Some(OpenDialog::Array { state, .. }), DialogMessage::Array(message)) => match message {
                ArrayDialogMessage::NameChanged(name) => {
                    state.set_name(name);
                    return DialogAction::None;
                }
                ArrayDialogMessage::SizeChanged(size) => {
                    state.set_size(&size);
                    return DialogAction::None;
                }
                ArrayDialogMessage::Confirm => match state.confirm() {
                    Ok(result) => Outcome::Array(result),
                    Err(_) => return DialogAction::None,
                },
                ArrayDialogMessage::Cancel => Outcome::Array(ArrayDialogResult::Cancelled),
            },
            (Some(OpenDialog::Array { .. }), DialogMessage::Backdrop) => {
                Outcome::Array(ArrayDialogResult::Cancelled)
            }
            (Some(OpenDialog::Settings { state, .. }), DialogMessage::Settings(message)) => {
                if !state.update(message) {
                    return DialogAction::None;
                }
                Outcome::Settings(state.settings.clone())
            }
            (Some(OpenDialog::Settings { state, .. }), DialogMessage::Backdrop) => {
                Outcome::Settings(state.settings.clone())
            }
            (_, DialogMessage::Finish) => {
                log::debug!("Finish routed through update, ignoring");
                return DialogAction::None;
            }
            (_, message) => {
                log::debug!("Ignoring dialog message {:?}", message);
                return DialogAction::None;
            }
        };

        self.request_close(outcome)
    }

    /// Tear the dialog down and run its completion callback
    pub fn finish(&mut self) -> Option<M> {
        let outcome = self.outcome.take()?;
        let open = self.open.take()?;

        let message = match (open, outcome) {
            (OpenDialog::Save { on_close, .. }, Outcome::Save(choice)) => on_close(choice),
            (OpenDialog::Array { on_close, .. }, Outcome::Array(result)) => on_close(result),
            (OpenDialog::Settings { on_close, .. }, Outcome::Settings(settings)) => {
                on_close(settings)
            }
            (_, outcome) => {
                log::error!("Dialog outcome {:?} does not match the open dialog", outcome);
                return None;
            }
        };
        Some(message)
    }

    /// Layer the open dialog over `base`
    ///
    /// `lift` wraps dialog messages into the host's message type.
    pub fn view<'a>(&'a self, base: Element<'a, M>, lift: fn(DialogMessage) -> M) -> Element<'a, M>
    where
        M: Clone + 'a,
    {
        let Some(open) = &self.open else {
            return base;
        };

        let (content, backdrop): (Element<'a, DialogMessage>, Option<DialogMessage>) = match open {
            OpenDialog::Save { patch_name, .. } => (save::view(patch_name).map(DialogMessage::Save), None),
            OpenDialog::Array { state, .. } => (
                array::view(state).map(DialogMessage::Array),
                Some(DialogMessage::Backdrop),
            ),
            OpenDialog::Settings { state, .. } => (
                settings::view(state).map(DialogMessage::Settings),
                Some(DialogMessage::Backdrop),
            ),
        };

        with_modal_overlay(base, content.map(lift), backdrop.map(lift))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum HostMessage {
        Saved(i32),
        Array(ArrayDialogResult),
        Settings(u32),
    }

    #[test]
    fn test_save_codes_delivered_once() {
        for (choice, code) in [(SaveChoice::Cancel, 0), (SaveChoice::DontSave, 1), (SaveChoice::Save, 2)] {
            let mut host = DialogHost::new();
            assert_eq!(host.open_save("patch.pd", |c: SaveChoice| HostMessage::Saved(c.code())), None);

            assert_eq!(host.update(DialogMessage::Save(choice)), DialogAction::ScheduleFinish);
            // A second click before teardown is ignored
            assert_eq!(host.update(DialogMessage::Save(SaveChoice::Cancel)), DialogAction::None);

            assert_eq!(host.finish(), Some(HostMessage::Saved(code)));
            assert!(!host.is_open());
            assert_eq!(host.finish(), None);
        }
    }

    #[test]
    fn test_save_backdrop_disabled() {
        let mut host = DialogHost::new();
        assert_eq!(host.open_save("patch.pd", |c: SaveChoice| HostMessage::Saved(c.code())), None);
        assert_eq!(host.update(DialogMessage::Backdrop), DialogAction::None);
        assert!(host.is_open());
        assert!(!host.is_closing());
    }

    #[test]
    fn test_array_confirm_reports_pair() {
        let mut host = DialogHost::new();
        assert_eq!(host.open_array(HostMessage::Array), None);
        host.update(DialogMessage::Array(ArrayDialogMessage::NameChanged("table".into())));
        host.update(DialogMessage::Array(ArrayDialogMessage::SizeChanged("512".into())));

        assert_eq!(
            host.update(DialogMessage::Array(ArrayDialogMessage::Confirm)),
            DialogAction::ScheduleFinish
        );
        assert_eq!(
            host.finish(),
            Some(HostMessage::Array(ArrayDialogResult::Confirmed {
                name: "table".into(),
                size: 512
            }))
        );
    }

    #[test]
    fn test_array_invalid_stays_open_without_callback() {
        let mut host = DialogHost::new();
        assert_eq!(host.open_array(HostMessage::Array), None);
        host.update(DialogMessage::Array(ArrayDialogMessage::NameChanged(String::new())));

        assert_eq!(
            host.update(DialogMessage::Array(ArrayDialogMessage::Confirm)),
            DialogAction::None
        );
        assert_eq!(host.finish(), None);
        assert!(host.is_open());
        assert!(host.array_state().is_some_and(|s| s.name_invalid()));
    }

    #[test]
    fn test_array_backdrop_cancels() {
        let mut host = DialogHost::new();
        assert_eq!(host.open_array(HostMessage::Array), None);
        assert_eq!(host.update(DialogMessage::Backdrop), DialogAction::ScheduleFinish);
        assert_eq!(host.finish(), Some(HostMessage::Array(ArrayDialogResult::Cancelled)));
    }

    #[test]
    fn test_settings_reported_on_close() {
        let mut host = DialogHost::new();
        let displaced = host.open_settings(EditorSettings::default(), |s: EditorSettings| {
            HostMessage::Settings(s.latency_samples)
        });
        assert_eq!(displaced, None);
        host.update(DialogMessage::Settings(SettingsMessage::LatencyChanged(512)));
        assert!(!host.is_closing());

        assert_eq!(host.update(DialogMessage::Backdrop), DialogAction::ScheduleFinish);
        assert_eq!(host.finish(), Some(HostMessage::Settings(512)));
    }

    #[test]
    fn test_replacing_open_dialog_reports_it_cancelled() {
        let mut host = DialogHost::new();
        assert_eq!(host.open_array(HostMessage::Array), None);
        host.update(DialogMessage::Array(ArrayDialogMessage::NameChanged("kept".into())));

        let displaced = host.open_save("patch.pd", |c: SaveChoice| HostMessage::Saved(c.code()));
        assert_eq!(displaced, Some(HostMessage::Array(ArrayDialogResult::Cancelled)));
        assert!(host.array_state().is_none());

        // The new dialog works normally and the old callback never fires again
        assert_eq!(host.update(DialogMessage::Save(SaveChoice::Save)), DialogAction::ScheduleFinish);
        assert_eq!(host.finish(), Some(HostMessage::Saved(2)));
        assert_eq!(host.finish(), None);
    }

    #[test]
    fn test_replacing_closing_dialog_keeps_its_outcome() {
        let mut host = DialogHost::new();
        assert_eq!(host.open_save("patch.pd", |c: SaveChoice| HostMessage::Saved(c.code())), None);
        host.update(DialogMessage::Save(SaveChoice::DontSave));

        let displaced = host.open_array(HostMessage::Array);
        assert_eq!(displaced, Some(HostMessage::Saved(1)));
        assert!(!host.is_closing());
        // The Finish scheduled for the save dialog finds nothing to finish
        assert_eq!(host.finish(), None);
        assert!(host.array_state().is_some());
    }

    #[test]
    fn test_dismiss_settles_each_kind() {
        let mut host = DialogHost::new();
        assert_eq!(host.dismiss(), None);

        assert_eq!(host.open_save("patch.pd", |c: SaveChoice| HostMessage::Saved(c.code())), None);
        assert_eq!(host.dismiss(), Some(HostMessage::Saved(0)));

        let displaced = host.open_settings(EditorSettings::default(), |s: EditorSettings| {
            HostMessage::Settings(s.latency_samples)
        });
        assert_eq!(displaced, None);
        host.update(DialogMessage::Settings(SettingsMessage::LatencyChanged(1024)));
        assert_eq!(host.dismiss(), Some(HostMessage::Settings(1024)));
        assert!(!host.is_open());
    }
}
