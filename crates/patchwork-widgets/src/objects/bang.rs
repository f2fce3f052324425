//! `[bng]`: click to send a bang, flashes on every bang in either direction

use std::time::Duration;

use iced::widget::{container, mouse_area, Space};
use iced::{Background, Border, Element, Length};
use patchwork_core::engine::Engine;
use patchwork_core::{Bounds, GuiKind, ObjectId, SizeLimits};

use super::binding::{log_failure, Binding};
use super::{body, GuiComponent, ObjectMessage};
use crate::theme::{ACTIVE, OBJECT_BORDER};

/// How long the bang indicator stays lit
pub const FLASH_DURATION: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct Bang {
    binding: Binding,
    flashing: bool,
    /// Incremented per flash so a stale timer cannot end a newer flash
    generation: u64,
}

impl Bang {
    pub(super) fn new(binding: Binding) -> Self {
        Self {
            binding,
            flashing: false,
            generation: 0,
        }
    }

    pub fn is_flashing(&self) -> bool {
        self.flashing
    }

    /// Send a bang and light up, returning the flash generation
    pub fn click(&mut self, engine: &dyn Engine) -> u64 {
        log_failure(engine.send_bang(self.binding.id), "send bang");
        self.flash()
    }

    pub fn flash(&mut self) -> u64 {
        self.generation += 1;
        self.flashing = true;
        self.generation
    }

    pub fn end_flash(&mut self, generation: u64) {
        if generation == self.generation {
            self.flashing = false;
        }
    }

    pub(super) fn view(&self) -> Element<'_, ObjectMessage> {
        let bounds = self.binding.bounds;
        let diameter = (bounds.w.min(bounds.h) - 4).max(4) as f32;
        let flashing = self.flashing;

        let circle = container(Space::new())
            .width(Length::Fixed(diameter))
            .height(Length::Fixed(diameter))
            .style(move |_theme| container::Style {
                background: flashing.then_some(Background::Color(ACTIVE)),
                border: Border {
                    color: OBJECT_BORDER,
                    width: 1.0,
                    radius: (diameter / 2.0).into(),
                },
                ..Default::default()
            });

        mouse_area(
            body(circle, bounds, false)
                .center_x(Length::Fixed(bounds.w as f32))
                .center_y(Length::Fixed(bounds.h as f32)),
        )
        .on_press(ObjectMessage::Bang)
        .into()
    }
}

impl GuiComponent for Bang {
    fn id(&self) -> ObjectId {
        self.binding.id
    }

    fn kind(&self) -> GuiKind {
        GuiKind::Bang
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use patchwork_core::engine::{MemoryEngine, SentMessage};
    use patchwork_core::ValueRange;

    fn bang(w: i32, h: i32) -> (MemoryEngine, Bang) {
        let engine = MemoryEngine::new();
        let id = engine.add_object(None, GuiKind::Bang, Bounds::new(0, 0, w, h), ValueRange::UNIT);
        let binding = Binding::new(id, &engine).unwrap();
        (engine, Bang::new(binding))
    }

    #[test]
    fn test_small_bang_doubles_best_size() {
        assert_eq!(bang(15, 15).1.best_size(), (30, 30));
        assert_eq!(bang(25, 30).1.best_size(), (25, 30));
    }

    #[test]
    fn test_click_sends_and_flashes() {
        let (engine, mut bang) = bang(25, 25);
        let generation = bang.click(&engine);
        assert!(bang.is_flashing());
        assert_eq!(engine.take_sent(), vec![SentMessage::Bang(bang.id())]);

        bang.end_flash(generation);
        assert!(!bang.is_flashing());
    }

    #[test]
    fn test_stale_flash_timer_is_ignored() {
        let (_, mut bang) = bang(25, 25);
        let first = bang.flash();
        let _second = bang.flash();
        bang.end_flash(first);
        assert!(bang.is_flashing());
    }
}
