//! Plain object box: no GUI of its own, drawn as its creation text

use iced::widget::text;
use iced::Element;
use patchwork_core::engine::{Engine, EngineResult};
use patchwork_core::{Bounds, GuiKind, ObjectId, SizeLimits};

use super::binding::{log_failure, Binding};
use super::{body, GuiComponent, ObjectMessage};
use crate::theme::{text_width, OBJECT_TEXT_SIZE};

#[derive(Debug, Clone)]
pub struct ObjectBox {
    binding: Binding,
    text: String,
}

impl ObjectBox {
    pub(super) fn new(binding: Binding, engine: &dyn Engine) -> EngineResult<Self> {
        let text = engine.text(binding.id)?;
        Ok(Self { binding, text })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub(super) fn view(&self) -> Element<'_, ObjectMessage> {
        body(text(&self.text).size(OBJECT_TEXT_SIZE), self.binding.bounds, false)
            .padding([2, 6])
            .into()
    }
}

impl GuiComponent for ObjectBox {
    fn id(&self) -> ObjectId {
        self.binding.id
    }

    fn kind(&self) -> GuiKind {
        GuiKind::Object
    }

    fn bounds(&self) -> Bounds {
        self.binding.bounds
    }

    fn best_size(&self) -> (i32, i32) {
        (text_width(&self.text) + 12, 22)
    }

    fn size_limits(&self) -> SizeLimits {
        SizeLimits::new(40, 22, 400, 22)
    }

    fn update(&mut self, engine: &dyn Engine) {
        self.binding.refresh(engine);
        if let Some(text) = log_failure(engine.text(self.binding.id), "object text") {
            self.text = text;
        }
    }
}
