//! `[msg]`: click to send, right-click to edit its content

use iced::widget::{container, mouse_area, row, text, text_input, Space};
use iced::{Alignment, Background, Element, Length};
use patchwork_core::engine::{Engine, EngineResult};
use patchwork_core::{Bounds, GuiKind, ObjectId, SizeLimits};

use super::binding::{log_failure, Binding};
use super::{body, GuiComponent, ObjectMessage};
use crate::theme::{text_width, OBJECT_BORDER, OBJECT_TEXT_SIZE};

/// Width reserved for the send button next to the text
const BUTTON_OFFSET: i32 = 60;

const LINE_HEIGHT: i32 = 25;

#[derive(Debug, Clone)]
pub struct MessageBox {
    binding: Binding,
    text: String,
    /// Content being typed, `None` when not editing
    draft: Option<String>,
}

impl MessageBox {
    pub(super) fn new(binding: Binding, engine: &dyn Engine) -> EngineResult<Self> {
        let text = engine.text(binding.id)?;
        Ok(Self {
            binding,
            text,
            draft: None,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_editing_text(&self) -> bool {
        self.draft.is_some()
    }

    pub(super) fn handle(&mut self, message: ObjectMessage, engine: &dyn Engine) {
        match message {
            ObjectMessage::MessageClicked => {
                log_failure(engine.send_bang(self.binding.id), "send message");
            }
            ObjectMessage::StartTextEdit => self.draft = Some(self.text.clone()),
            ObjectMessage::TextChanged(draft) => {
                if self.draft.is_some() {
                    self.draft = Some(draft);
                }
            }
            ObjectMessage::TextSubmitted => {
                if let Some(draft) = self.draft.take() {
                    let draft = draft.trim().to_string();
                    if log_failure(engine.set_text(self.binding.id, &draft), "set text").is_some() {
                        self.text = draft;
                    }
                }
            }
            ObjectMessage::TextCancelled => self.draft = None,
            _ => {}
        }
    }

    pub(super) fn view(&self) -> Element<'_, ObjectMessage> {
        let bounds = self.binding.bounds;

        if let Some(draft) = &self.draft {
            return container(
                text_input("message", draft)
                    .on_input(ObjectMessage::TextChanged)
                    .on_submit(ObjectMessage::TextSubmitted)
                    .size(OBJECT_TEXT_SIZE)
                    .padding(2),
            )
            .width(Length::Fixed(bounds.w.max(60) as f32))
            .into();
        }

        // Flag-shaped marker on the right edge, as drawn by Pd
        let flag = container(Space::new())
            .width(Length::Fixed(4.0))
            .height(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(Background::Color(OBJECT_BORDER)),
                ..Default::default()
            });

        let content = row![
            text(&self.text).size(OBJECT_TEXT_SIZE).width(Length::Fill),
            flag,
        ]
        .height(Length::Fill)
        .align_y(Alignment::Center)
        .spacing(4);

        mouse_area(body(content, bounds, false).padding([0, 4]))
            .on_press(ObjectMessage::MessageClicked)
            .on_right_press(ObjectMessage::StartTextEdit)
            .into()
    }
}

impl GuiComponent for MessageBox {
    fn id(&self) -> ObjectId {
        self.binding.id
    }

    fn kind(&self) -> GuiKind {
        GuiKind::Message
    }

    fn bounds(&self) -> Bounds {
        self.binding.bounds
    }

    fn best_size(&self) -> (i32, i32) {
        let lines = self.text.lines().count().max(1) as i32;
        (text_width(&self.text) + BUTTON_OFFSET, lines * LINE_HEIGHT)
    }

    fn size_limits(&self) -> SizeLimits {
        SizeLimits::new(100, 50, 500, 600)
    }

    fn update(&mut self, engine: &dyn Engine) {
        self.binding.refresh(engine);
        if self.draft.is_none() {
            if let Some(text) = log_failure(engine.text(self.binding.id), "text") {
                self.text = text;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patchwork_core::engine::{MemoryEngine, SentMessage};
    use crate::theme::GLYPH_WIDTH;

    fn message(text: &str) -> (MemoryEngine, MessageBox) {
        let engine = MemoryEngine::new();
        let id = engine.add_text_object(None, GuiKind::Message, Bounds::new(0, 0, 60, 22), text);
        let binding = Binding::new(id, &engine).unwrap();
        let message = MessageBox::new(binding, &engine).unwrap();
        (engine, message)
    }

    #[test]
    fn test_best_size_follows_text() {
        let (_, message) = message("440 100\nstop");
        assert_eq!(message.best_size(), (7 * GLYPH_WIDTH + 60, 50));
    }

    #[test]
    fn test_click_sends() {
        let (engine, mut message) = message("bang");
        message.handle(ObjectMessage::MessageClicked, &engine);
        assert_eq!(engine.take_sent(), vec![SentMessage::Bang(message.id())]);
    }

    #[test]
    fn test_text_edit_updates_engine() {
        let (engine, mut message) = message("1 2 3");
        message.handle(ObjectMessage::StartTextEdit, &engine);
        message.handle(ObjectMessage::TextChanged("  set 4 5 ".to_string()), &engine);
        assert!(message.is_editing_text());

        message.handle(ObjectMessage::TextSubmitted, &engine);
        assert_eq!(message.text(), "set 4 5");
        assert_eq!(engine.text(message.id()).unwrap(), "set 4 5");
    }

    #[test]
    fn test_cancelled_edit_keeps_text() {
        let (engine, mut message) = message("hello");
        message.handle(ObjectMessage::StartTextEdit, &engine);
        message.handle(ObjectMessage::TextChanged("bye".to_string()), &engine);
        message.handle(ObjectMessage::TextCancelled, &engine);
        assert_eq!(message.text(), "hello");
        assert!(!message.is_editing_text());
    }
}
