//! `[comment]`: static text on the canvas

use iced::widget::text;
use iced::{Element, Length};
use patchwork_core::engine::{Engine, EngineResult};
use patchwork_core::{Bounds, GuiKind, ObjectId, SizeLimits};

use super::binding::{log_failure, Binding};
use super::{GuiComponent, ObjectMessage};
use crate::theme::{OBJECT_TEXT_SIZE, TEXT_SECONDARY};

#[derive(Debug, Clone)]
pub struct Comment {
    binding: Binding,
    text: String,
}

impl Comment {
    pub(super) fn new(binding: Binding, engine: &dyn Engine) -> EngineResult<Self> {
        let text = engine.text(binding.id)?;
        Ok(Self { binding, text })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub(super) fn view(&self) -> Element<'_, ObjectMessage> {
        text(&self.text)
            .size(OBJECT_TEXT_SIZE)
            .color(TEXT_SECONDARY)
            .width(Length::Fixed(self.binding.bounds.w.max(1) as f32))
            .into()
    }
}

impl GuiComponent for Comment {
    fn id(&self) -> ObjectId {
        self.binding.id
    }

    fn kind(&self) -> GuiKind {
        GuiKind::Comment
    }

    fn bounds(&self) -> Bounds {
        self.binding.bounds
    }

    fn best_size(&self) -> (i32, i32) {
        (120, 4)
    }

    fn size_limits(&self) -> SizeLimits {
        SizeLimits::new(40, 32, 100, 32)
    }

    fn update(&mut self, engine: &dyn Engine) {
        self.binding.refresh(engine);
        if let Some(text) = log_failure(engine.text(self.binding.id), "comment text") {
            self.text = text;
        }
    }
}
