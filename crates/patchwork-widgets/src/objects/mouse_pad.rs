//! `[pad]`: reports pointer clicks and positions to the patch
//!
//! A press sends `click 1` followed by the position as an `x y` list and a
//! release sends `click 0`. Motion sends the position both when hovering over
//! the pad and when dragging (a drag keeps reporting outside the pad).
//! Coordinates are relative to the pad's top-left corner.

use iced::widget::canvas::{self, Event, Frame, Geometry, Path, Program, Stroke};
use iced::widget::Canvas;
use iced::{mouse, Element, Length, Point, Rectangle, Theme};
use patchwork_core::engine::Engine;
use patchwork_core::{Bounds, GuiKind, ObjectId, SizeLimits};

use super::binding::{log_failure, Binding};
use super::{GuiComponent, ObjectMessage};
use crate::theme::{ACTIVE, OBJECT_BG, OBJECT_BORDER};

/// Pointer interaction on a pad, in pad-local coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PadMessage {
    Pressed { x: f32, y: f32 },
    Moved { x: f32, y: f32 },
    Released,
}

#[derive(Debug, Clone)]
pub struct MousePad {
    binding: Binding,
    pressed: bool,
}

impl MousePad {
    pub(super) fn new(binding: Binding) -> Self {
        Self {
            binding,
            pressed: false,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn handle(&mut self, message: PadMessage, engine: &dyn Engine) {
        let id = self.binding.id;
        match message {
            PadMessage::Pressed { x, y } => {
                self.pressed = true;
                log_failure(engine.send_message(id, "click", &[1.0]), "pad click");
                log_failure(engine.send_list(id, &[x, y]), "pad position");
            }
            PadMessage::Moved { x, y } => {
                log_failure(engine.send_list(id, &[x, y]), "pad position");
            }
            PadMessage::Released => {
                if std::mem::take(&mut self.pressed) {
                    log_failure(engine.send_message(id, "click", &[0.0]), "pad click");
                }
            }
        }
    }

    pub(super) fn view(&self) -> Element<'_, ObjectMessage> {
        let Bounds { w, h, .. } = self.binding.bounds;
        Canvas::new(PadCanvas {
            pressed: self.pressed,
        })
        .width(Length::Fixed(w.max(1) as f32))
        .height(Length::Fixed(h.max(1) as f32))
        .into()
    }
}

impl GuiComponent for MousePad {
    fn id(&self) -> ObjectId {
        self.binding.id
    }

    fn kind(&self) -> GuiKind {
        GuiKind::MousePad
    }

    fn bounds(&self) -> Bounds {
        self.binding.bounds
    }

    fn best_size(&self) -> (i32, i32) {
        (self.binding.bounds.w, self.binding.bounds.h)
    }

    fn size_limits(&self) -> SizeLimits {
        SizeLimits::new(40, 32, 100, 32)
    }

    fn update(&mut self, engine: &dyn Engine) {
        self.binding.refresh(engine);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PadInteraction {
    is_pressed: bool,
}

struct PadCanvas {
    pressed: bool,
}

impl Program<ObjectMessage> for PadCanvas {
    type State = PadInteraction;

    fn update(
        &self,
        interaction: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<ObjectMessage>> {
        match event {
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let position = cursor.position_in(bounds)?;
                interaction.is_pressed = true;
                let message = PadMessage::Pressed {
                    x: position.x,
                    y: position.y,
                };
                Some(canvas::Action::publish(ObjectMessage::Pad(message)).and_capture())
            }
            Event::Mouse(mouse::Event::CursorMoved { position })
                if interaction.is_pressed || bounds.contains(*position) =>
            {
                let message = PadMessage::Moved {
                    x: position.x - bounds.x,
                    y: position.y - bounds.y,
                };
                Some(canvas::Action::publish(ObjectMessage::Pad(message)))
            }
            Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left))
                if interaction.is_pressed =>
            {
                interaction.is_pressed = false;
                Some(canvas::Action::publish(ObjectMessage::Pad(PadMessage::Released)))
            }
            _ => None,
        }
    }

    fn mouse_interaction(
        &self,
        _interaction: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if cursor.is_over(bounds) {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::default()
        }
    }

    fn draw(
        &self,
        _interaction: &Self::State,
        renderer: &iced::Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), OBJECT_BG);

        let outline = Path::rectangle(Point::ORIGIN, bounds.size());
        let color = if self.pressed { ACTIVE } else { OBJECT_BORDER };
        frame.stroke(&outline, Stroke::default().with_color(color).with_width(1.0));

        vec![frame.into_geometry()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patchwork_core::engine::{MemoryEngine, SentMessage};
    use patchwork_core::ValueRange;

    #[test]
    fn test_press_move_release_sequence() {
        let engine = MemoryEngine::new();
        let id = engine.add_object(None, GuiKind::MousePad, Bounds::new(20, 20, 127, 127), ValueRange::UNBOUNDED);
        let mut pad = MousePad::new(Binding::new(id, &engine).unwrap());

        pad.handle(PadMessage::Pressed { x: 10.0, y: 20.0 }, &engine);
        pad.handle(PadMessage::Moved { x: 12.0, y: 25.0 }, &engine);
        pad.handle(PadMessage::Released, &engine);
        pad.handle(PadMessage::Released, &engine);

        assert_eq!(
            engine.take_sent(),
            vec![
                SentMessage::Message(id, "click".to_string(), vec![1.0]),
                SentMessage::List(id, vec![10.0, 20.0]),
                SentMessage::List(id, vec![12.0, 25.0]),
                SentMessage::Message(id, "click".to_string(), vec![0.0]),
            ]
        );
        assert!(!pad.is_pressed());
        assert_eq!(pad.best_size(), (127, 127));
    }

    #[test]
    fn test_hover_reports_position_without_click() {
        let engine = MemoryEngine::new();
        let id = engine.add_object(None, GuiKind::MousePad, Bounds::new(0, 0, 127, 127), ValueRange::UNBOUNDED);
        let mut pad = MousePad::new(Binding::new(id, &engine).unwrap());

        pad.handle(PadMessage::Moved { x: 1.0, y: 2.0 }, &engine);
        pad.handle(PadMessage::Released, &engine);

        // Released without a press sends no click
        assert_eq!(engine.take_sent(), vec![SentMessage::List(id, vec![1.0, 2.0])]);
        assert!(!pad.is_pressed());
    }
}
