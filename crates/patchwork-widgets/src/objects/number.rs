//! `[nbx]` / `[floatatom]`: vertical drag or typed entry
//!
//! Dragging changes the value by `-dy / 100` from where the gesture started,
//! once the pointer has moved more than two pixels. Right-click opens a text
//! field for exact entry.

use iced::widget::canvas::{self, Event, Frame, Geometry, Path, Program, Stroke, Text};
use iced::widget::{container, text_input, Canvas};
use iced::{alignment, mouse, Element, Length, Point, Rectangle, Theme};
use patchwork_core::engine::Engine;
use patchwork_core::sync::EngineUpdate;
use patchwork_core::{Bounds, GuiKind, ObjectId, SizeLimits};

use super::binding::Binding;
use super::{GuiComponent, ObjectMessage};
use crate::theme::{ACTIVE, OBJECT_BG, OBJECT_BORDER, OBJECT_TEXT_SIZE, TEXT_PRIMARY};

/// Movement below this many pixels does not change the value
const DRAG_THRESHOLD: f32 = 2.0;

/// Pixels of vertical movement per unit of value
const PIXELS_PER_UNIT: f32 = 100.0;

/// Drag gesture on a number box, `y` in window coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberGesture {
    Pressed { y: f32 },
    Dragged { y: f32 },
    Released,
}

/// Format a value the way Pd atoms show it: integers bare, otherwise up to 4 decimals
pub fn format_value(value: f32) -> String {
    if value.fract() == 0.0 && value.abs() < 1e9 {
        return format!("{}", value as i64);
    }
    let formatted = format!("{:.4}", value);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

#[derive(Debug, Clone)]
pub struct NumberBox {
    binding: Binding,
    /// Pointer y and value at gesture start
    drag_origin: Option<(f32, f32)>,
    draft: Option<String>,
}

impl NumberBox {
    pub(super) fn new(binding: Binding) -> Self {
        Self {
            binding,
            drag_origin: None,
            draft: None,
        }
    }

    pub fn value(&self) -> f32 {
        self.binding.sync.value_scaled()
    }

    pub(super) fn handle(&mut self, message: ObjectMessage, engine: &dyn Engine) {
        match message {
            ObjectMessage::Number(NumberGesture::Pressed { y }) => {
                self.drag_origin = Some((y, self.value()));
            }
            ObjectMessage::Number(NumberGesture::Dragged { y }) => {
                let Some((start_y, start_value)) = self.drag_origin else {
                    return;
                };
                let distance = start_y - y;
                if distance.abs() > DRAG_THRESHOLD {
                    self.binding.start_edition(engine);
                    self.binding
                        .commit_scaled(engine, start_value + distance / PIXELS_PER_UNIT);
                }
            }
            ObjectMessage::Number(NumberGesture::Released) => {
                self.drag_origin = None;
                self.binding.stop_edition(engine);
            }
            ObjectMessage::StartTextEdit => self.draft = Some(format_value(self.value())),
            ObjectMessage::TextChanged(draft) => {
                if self.draft.is_some() {
                    self.draft = Some(draft);
                }
            }
            ObjectMessage::TextSubmitted => {
                let Some(draft) = self.draft.take() else {
                    return;
                };
                match draft.trim().parse::<f32>() {
                    Ok(value) if value.is_finite() => {
                        self.binding.start_edition(engine);
                        self.binding.commit_scaled(engine, value);
                        self.binding.stop_edition(engine);
                    }
                    _ => log::debug!("Number box {}: ignoring entry {:?}", self.binding.id, draft),
                }
            }
            ObjectMessage::TextCancelled => self.draft = None,
            _ => {}
        }
    }

    pub(super) fn view(&self) -> Element<'_, ObjectMessage> {
        let Bounds { w, h, .. } = self.binding.bounds;

        if let Some(draft) = &self.draft {
            return container(
                text_input("0", draft)
                    .on_input(ObjectMessage::TextChanged)
                    .on_submit(ObjectMessage::TextSubmitted)
                    .size(OBJECT_TEXT_SIZE)
                    .padding(2),
            )
            .width(Length::Fixed(w.max(50) as f32))
            .into();
        }

        Canvas::new(NumberCanvas {
            value: self.value(),
            edited: self.binding.sync.is_edited(),
        })
        .width(Length::Fixed(w.max(1) as f32))
        .height(Length::Fixed(h.max(1) as f32))
        .into()
    }
}

impl GuiComponent for NumberBox {
    fn id(&self) -> ObjectId {
        self.binding.id
    }

    fn kind(&self) -> GuiKind {
        GuiKind::Number
    }

    fn bounds(&self) -> Bounds {
        self.binding.bounds
    }

    fn best_size(&self) -> (i32, i32) {
        (50, 26)
    }

    fn size_limits(&self) -> SizeLimits {
        SizeLimits::new(100, 50, 500, 600)
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

#[derive(Debug, Clone, Copy, Default)]
pub struct NumberInteraction {
    is_dragging: bool,
}

struct NumberCanvas {
    value: f32,
    edited: bool,
}

impl Program<ObjectMessage> for NumberCanvas {
    type State = NumberInteraction;

    fn update(
        &self,
        interaction: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<ObjectMessage>> {
        match event {
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let position = cursor.position_over(bounds)?;
                interaction.is_dragging = true;
                let message = ObjectMessage::Number(NumberGesture::Pressed { y: position.y });
                Some(canvas::Action::publish(message).and_capture())
            }
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Right)) => {
                cursor.position_over(bounds)?;
                Some(canvas::Action::publish(ObjectMessage::StartTextEdit).and_capture())
            }
            Event::Mouse(mouse::Event::CursorMoved { position }) if interaction.is_dragging => {
                let message = ObjectMessage::Number(NumberGesture::Dragged { y: position.y });
                Some(canvas::Action::publish(message))
            }
            Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left))
                if interaction.is_dragging =>
            {
                interaction.is_dragging = false;
                Some(canvas::Action::publish(ObjectMessage::Number(
                    NumberGesture::Released,
                )))
            }
            _ => None,
        }
    }

    fn mouse_interaction(
        &self,
        interaction: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if interaction.is_dragging || cursor.is_over(bounds) {
            mouse::Interaction::ResizingVertically
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
        let (width, height) = (bounds.width, bounds.height);

        frame.fill_rectangle(Point::ORIGIN, bounds.size(), OBJECT_BG);

        // Number boxes have a clipped top-right corner
        let notch = (height / 3.0).min(6.0);
        let outline = Path::new(|builder| {
            builder.move_to(Point::ORIGIN);
            builder.line_to(Point::new(width - notch, 0.0));
            builder.line_to(Point::new(width, notch));
            builder.line_to(Point::new(width, height));
            builder.line_to(Point::new(0.0, height));
            builder.close();
        });
        let color = if self.edited { ACTIVE } else { OBJECT_BORDER };
        frame.stroke(&outline, Stroke::default().with_color(color).with_width(1.0));

        frame.fill_text(Text {
            content: format_value(self.value),
            position: Point::new(4.0, height / 2.0),
            color: TEXT_PRIMARY,
            size: OBJECT_TEXT_SIZE.into(),
            align_y: alignment::Vertical::Center.into(),
            max_width: (width - 6.0).max(0.0),
            ..Text::default()
        });

        vec![frame.into_geometry()]
    }
}
