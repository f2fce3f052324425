//! Canvas program drawing an array and tracking drag gestures

use iced::widget::canvas::{self, Event, Frame, Geometry, Path, Program, Stroke, Text};
use iced::widget::Canvas;
use iced::{mouse, Color, Element, Length, Point, Rectangle, Size, Theme};

use super::state::GraphicalArray;
use super::ArrayMessage;
use crate::theme::{ACTIVE, CANVAS_BG, ERROR, OBJECT_BORDER, TEXT_SECONDARY};

#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayInteraction {
    pub is_dragging: bool,
}

pub struct ArrayCanvas<'a> {
    pub state: &'a GraphicalArray,
}

/// Pointer position relative to `bounds`, normalised and clamped to 0..1
fn normalised(position: Point, bounds: Rectangle) -> (f32, f32) {
    let x = ((position.x - bounds.x) / bounds.width.max(1.0)).clamp(0.0, 1.0);
    let y = ((position.y - bounds.y) / bounds.height.max(1.0)).clamp(0.0, 1.0);
    (x, y)
}

impl<'a> Program<ArrayMessage> for ArrayCanvas<'a> {
    type State = ArrayInteraction;

    fn update(
        &self,
        interaction: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<ArrayMessage>> {
        match event {
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let position = cursor.position_over(bounds)?;
                interaction.is_dragging = true;
                let (x, y) = normalised(position, bounds);
                Some(canvas::Action::publish(ArrayMessage::Pressed { x, y }).and_capture())
            }
            // Dragging continues outside the widget, positions are clamped to the edges
            Event::Mouse(mouse::Event::CursorMoved { position }) if interaction.is_dragging => {
                let (x, y) = normalised(*position, bounds);
                Some(canvas::Action::publish(ArrayMessage::Dragged { x, y }))
            }
            Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left))
                if interaction.is_dragging =>
            {
                interaction.is_dragging = false;
                Some(canvas::Action::publish(ArrayMessage::Released))
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
        if interaction.is_dragging {
            mouse::Interaction::Crosshair
        } else if cursor.is_over(bounds) {
            mouse::Interaction::Pointer
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

        frame.fill_rectangle(Point::ORIGIN, bounds.size(), CANVAS_BG);

        let outline = if self.state.has_error() { ERROR } else { OBJECT_BORDER };
        frame.stroke(
            &Path::rectangle(Point::ORIGIN, Size::new(width, height)),
            Stroke::default().with_color(outline).with_width(1.0),
        );

        if self.state.has_error() {
            // Crossed-out box marks an array that could not be read
            let cross = Path::new(|builder| {
                builder.move_to(Point::ORIGIN);
                builder.line_to(Point::new(width, height));
                builder.move_to(Point::new(width, 0.0));
                builder.line_to(Point::new(0.0, height));
            });
            frame.stroke(&cross, Stroke::default().with_color(ERROR).with_width(1.0));
        } else {
            draw_values(&mut frame, self.state, width, height);
        }

        frame.fill_text(Text {
            content: self.state.name().to_string(),
            position: Point::new(4.0, 2.0),
            color: TEXT_SECONDARY,
            size: 11.0.into(),
            ..Text::default()
        });

        vec![frame.into_geometry()]
    }
}

/// One horizontal segment per element, joined into a single stroke
fn draw_values(frame: &mut Frame, state: &GraphicalArray, width: f32, height: f32) {
    let values = state.values();
    if values.is_empty() {
        return;
    }

    let range = state.range();
    let span = range.max - range.min;
    let to_y = |value: f32| {
        if span == 0.0 {
            height / 2.0
        } else {
            ((range.max - value) / span).clamp(0.0, 1.0) * height
        }
    };
    let step = width / values.len() as f32;

    let path = Path::new(|builder| {
        for (i, &value) in values.iter().enumerate() {
            let x = i as f32 * step;
            let y = to_y(value);
            if i == 0 {
                builder.move_to(Point::new(x, y));
            } else {
                builder.line_to(Point::new(x, y));
            }
            builder.line_to(Point::new(x + step, y));
        }
    });

    let color = if state.is_edited() {
        ACTIVE
    } else {
        Color::from_rgb(0.8, 0.8, 0.85)
    };
    frame.stroke(&path, Stroke::default().with_color(color).with_width(1.5));
}

/// Array editor element of a fixed pixel size
pub fn array_view(state: &GraphicalArray, width: f32, height: f32) -> Element<'_, ArrayMessage> {
    Canvas::new(ArrayCanvas { state })
        .width(Length::Fixed(width))
        .height(Length::Fixed(height))
        .into()
}
