//! `[tgl]`: click flips between 0 and 1

use iced::widget::{container, mouse_area, Space};
use iced::{Background, Element, Length};
use patchwork_core::engine::Engine;
use patchwork_core::sync::EngineUpdate;
use patchwork_core::{Bounds, GuiKind, ObjectId, SizeLimits};

use super::binding::Binding;
use super::{body, GuiComponent, ObjectMessage};
use crate::theme::ACTIVE;

#[derive(Debug, Clone)]
pub struct Toggle {
    binding: Binding,
}

impl Toggle {
    pub(super) fn new(binding: Binding) -> Self {
        Self { binding }
    }

    pub fn is_on(&self) -> bool {
        self.binding.sync.value_original() != 0.0
    }

    /// A click is a complete gesture: start, commit, stop
    pub fn click(&mut self, engine: &dyn Engine) {
        let next = if self.is_on() { 0.0 } else { 1.0 };
        self.binding.start_edition(engine);
        self.binding.commit_original(engine, next);
        self.binding.stop_edition(engine);
    }

    pub(super) fn view(&self) -> Element<'_, ObjectMessage> {
        let bounds = self.binding.bounds;
        let inset = (bounds.w.min(bounds.h) as f32 * 0.6).max(2.0);
        let on = self.is_on();

        let mark = container(Space::new())
            .width(Length::Fixed(inset))
            .height(Length::Fixed(inset))
            .style(move |_theme| container::Style {
                background: on.then_some(Background::Color(ACTIVE)),
                ..Default::default()
            });

        mouse_area(
            body(mark, bounds, false)
                .center_x(Length::Fixed(bounds.w as f32))
                .center_y(Length::Fixed(bounds.h as f32)),
        )
        .on_press(ObjectMessage::Toggle)
        .into()
    }
}

impl GuiComponent for Toggle {
    fn id(&self) -> ObjectId {
        self.binding.id
    }

    fn kind(&self) -> GuiKind {
        GuiKind::Toggle
    }

    fn bounds(&self) -> Bounds {
        self.binding.bounds
    }

    fn best_size(&self) -> (i32, i32) {
        let Bounds { w, h, .. } = self.binding.bounds;
        let mult = if w.min(h) > 20 { 1 } else { 2 };
        (w * mult, h * mult)
    }

    fn size_limits(&self) -> SizeLimits {
        SizeLimits::new(40, 60, 200, 200)
    }

    fn update(&mut self, engine: &dyn Engine) {
        self.binding.refresh(engine);
    }

    fn update_value(&mut self, engine: &dyn Engine) -> bool {
        self.binding.pull(engine)
    }

    fn receive_value(&mut self, value: f32) -> bool {
        self.binding.sync.receive(value) == EngineUpdate::Applied
    }

    fn is_edited(&self) -> bool {
        self.binding.sync.is_edited()
    }
}
