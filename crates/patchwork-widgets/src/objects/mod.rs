//! GUI objects: one widget per engine object
//!
//! Every kind implements [`GuiComponent`]; [`GuiObject`] wraps them in an
//! enum so the canvas can hold a flat, cloneable list and dispatch without
//! trait objects.
//!
//! Data flow for one object:
//!
//! ```text
//! user gesture ──▶ ObjectMessage ──▶ GuiObject::handle ──▶ Engine::set_value / send_*
//! EngineEvent  ──▶ GuiObject::receive_event ──▶ ValueSync::receive (buffered while edited)
//! ```

mod bang;
mod binding;
mod comment;
mod graph;
mod message;
mod mouse_pad;
mod number;
mod object_box;
mod radio;
mod slider;
mod toggle;

pub use bang::{Bang, FLASH_DURATION};
pub use comment::Comment;
pub use graph::{GraphOnParent, Subpatch};
pub use message::MessageBox;
pub use mouse_pad::{MousePad, PadMessage};
pub use number::{format_value, NumberBox, NumberGesture};
pub use object_box::ObjectBox;
pub use radio::Radio;
pub use slider::Slider;
pub use toggle::Toggle;

use iced::widget::{container, Stack};
use iced::{Element, Length, Padding};
use patchwork_core::engine::{Engine, EngineEvent, EngineResult};
use patchwork_core::{Bounds, GuiKind, ObjectId, SizeLimits};

use crate::array::{array_view, ArrayMessage, GraphicalArray};
use binding::{log_failure, Binding};

/// Capabilities shared by every on-canvas object
pub trait GuiComponent {
    fn id(&self) -> ObjectId;

    fn kind(&self) -> GuiKind;

    fn bounds(&self) -> Bounds;

    /// Preferred size when the object is first placed
    fn best_size(&self) -> (i32, i32);

    fn size_limits(&self) -> SizeLimits;

    /// Refresh geometry and non-value state from the engine
    fn update(&mut self, engine: &dyn Engine);

    /// Pull the engine value; true if the widget must repaint
    fn update_value(&mut self, _engine: &dyn Engine) -> bool {
        false
    }

    /// Engine pushed a value; true if the widget must repaint
    fn receive_value(&mut self, _value: f32) -> bool {
        false
    }

    /// True while a user gesture owns the displayed value
    fn is_edited(&self) -> bool {
        false
    }
}

/// User interaction on a single object
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectMessage {
    Bang,
    Toggle,
    MessageClicked,
    /// Begin typing into a message or number box
    StartTextEdit,
    TextChanged(String),
    TextSubmitted,
    TextCancelled,
    Number(NumberGesture),
    /// Slider moved, normalised 0..1
    SliderChanged(f32),
    SliderReleased,
    RadioSelected(usize),
    Array(ArrayMessage),
    Pad(PadMessage),
    OpenSubpatch,
}

/// An [`ObjectMessage`] addressed to an object
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectEvent {
    pub id: ObjectId,
    pub message: ObjectMessage,
}

/// What the host must do after an object handled a message or event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectOutcome {
    None,
    /// Schedule `end_flash(id, generation)` after [`FLASH_DURATION`]
    Flash { id: ObjectId, generation: u64 },
    /// Navigate into a subpatch canvas
    OpenSubpatch(ObjectId),
}

/// Array or graph object hosting a [`GraphicalArray`]
#[derive(Debug, Clone)]
pub struct ArrayObject {
    binding: Binding,
    array: GraphicalArray,
}

impl ArrayObject {
    fn new(binding: Binding, engine: &dyn Engine) -> EngineResult<Self> {
        let name = engine.array_name(binding.id)?;
        let array = GraphicalArray::new(name, engine);
        Ok(Self { binding, array })
    }

    pub fn array(&self) -> &GraphicalArray {
        &self.array
    }

    fn handle(&mut self, message: ArrayMessage, engine: &dyn Engine) {
        match message {
            ArrayMessage::Pressed { x, y } => self.array.press(x, y),
            ArrayMessage::Dragged { x, y } => self.array.drag(x, y),
            ArrayMessage::Released => {
                log_failure(self.array.release(engine), "array write");
            }
        }
    }

    fn view(&self) -> Element<'_, ObjectMessage> {
        let Bounds { w, h, .. } = self.binding.bounds;
        array_view(&self.array, w as f32, h as f32).map(ObjectMessage::Array)
    }
}

impl GuiComponent for ArrayObject {
    fn id(&self) -> ObjectId {
        self.binding.id
    }

    fn kind(&self) -> GuiKind {
        GuiKind::Array
    }

    fn bounds(&self) -> Bounds {
        self.binding.bounds
    }

    fn best_size(&self) -> (i32, i32) {
        (200, 140)
    }

    fn size_limits(&self) -> SizeLimits {
        SizeLimits::new(100, 40, 500, 600)
    }

    fn update(&mut self, engine: &dyn Engine) {
        self.binding.refresh(engine);
        self.array.refresh(engine);
    }

    fn is_edited(&self) -> bool {
        self.array.is_edited()
    }
}

/// Any on-canvas object
#[derive(Debug, Clone)]
pub enum GuiObject {
    Bang(Bang),
    Toggle(Toggle),
    Message(MessageBox),
    Number(NumberBox),
    Slider(Slider),
    Radio(Radio),
    Array(ArrayObject),
    Graph(GraphOnParent),
    Subpatch(Subpatch),
    Comment(Comment),
    MousePad(MousePad),
    Object(ObjectBox),
}

impl GuiObject {
    /// Build the widget for an engine object
    pub fn create(id: ObjectId, engine: &dyn Engine) -> EngineResult<Self> {
        let kind = engine.kind(id)?;
        let binding = Binding::new(id, engine)?;

        let object = match kind {
            GuiKind::Bang => Self::Bang(Bang::new(binding)),
            GuiKind::Toggle => Self::Toggle(Toggle::new(binding)),
            GuiKind::Message => Self::Message(MessageBox::new(binding, engine)?),
            GuiKind::Number => Self::Number(NumberBox::new(binding)),
            GuiKind::HorizontalSlider => Self::Slider(Slider::new(binding, false)),
            GuiKind::VerticalSlider => Self::Slider(Slider::new(binding, true)),
            GuiKind::HorizontalRadio => Self::Radio(Radio::new(binding, false)),
            GuiKind::VerticalRadio => Self::Radio(Radio::new(binding, true)),
            GuiKind::Array => Self::Array(ArrayObject::new(binding, engine)?),
            GuiKind::GraphOnParent => Self::Graph(GraphOnParent::new(binding, engine)),
            GuiKind::Subpatch => Self::Subpatch(Subpatch::new(binding, engine)?),
            GuiKind::Comment => Self::Comment(Comment::new(binding, engine)?),
            GuiKind::MousePad => Self::MousePad(MousePad::new(binding)),
            GuiKind::Object => Self::Object(ObjectBox::new(binding, engine)?),
        };
        Ok(object)
    }

    pub fn component(&self) -> &dyn GuiComponent {
        match self {
            Self::Bang(o) => o,
            Self::Toggle(o) => o,
            Self::Message(o) => o,
            Self::Number(o) => o,
            Self::Slider(o) => o,
            Self::Radio(o) => o,
            Self::Array(o) => o,
            Self::Graph(o) => o,
            Self::Subpatch(o) => o,
            Self::Comment(o) => o,
            Self::MousePad(o) => o,
            Self::Object(o) => o,
        }
    }

    pub fn component_mut(&mut self) -> &mut dyn GuiComponent {
        match self {
            Self::Bang(o) => o,
            Self::Toggle(o) => o,
            Self::Message(o) => o,
            Self::Number(o) => o,
            Self::Slider(o) => o,
            Self::Radio(o) => o,
            Self::Array(o) => o,
            Self::Graph(o) => o,
            Self::Subpatch(o) => o,
            Self::Comment(o) => o,
            Self::MousePad(o) => o,
            Self::Object(o) => o,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.component().id()
    }

    pub fn kind(&self) -> GuiKind {
        self.component().kind()
    }

    pub fn bounds(&self) -> Bounds {
        self.component().bounds()
    }

    /// Find an object by id, searching graph children
    pub fn find_mut(&mut self, id: ObjectId) -> Option<&mut GuiObject> {
        if self.id() == id {
            return Some(self);
        }
        match self {
            Self::Graph(graph) => graph.children_mut().iter_mut().find_map(|c| c.find_mut(id)),
            _ => None,
        }
    }

    /// Apply a user interaction
    pub fn handle(&mut self, message: ObjectMessage, engine: &dyn Engine) -> ObjectOutcome {
        let id = self.id();
        match (self, message) {
            (Self::Bang(bang), ObjectMessage::Bang) => ObjectOutcome::Flash {
                id,
                generation: bang.click(engine),
            },
            (Self::Toggle(toggle), ObjectMessage::Toggle) => {
                toggle.click(engine);
                ObjectOutcome::None
            }
            (Self::Message(message_box), message) => {
                message_box.handle(message, engine);
                ObjectOutcome::None
            }
            (Self::Number(number), message) => {
                number.handle(message, engine);
                ObjectOutcome::None
            }
            (Self::Slider(slider), ObjectMessage::SliderChanged(value)) => {
                slider.drag(value, engine);
                ObjectOutcome::None
            }
            (Self::Slider(slider), ObjectMessage::SliderReleased) => {
                slider.release(engine);
                ObjectOutcome::None
            }
            (Self::Radio(radio), ObjectMessage::RadioSelected(index)) => {
                radio.select(index, engine);
                ObjectOutcome::None
            }
            (Self::Array(array), ObjectMessage::Array(message)) => {
                array.handle(message, engine);
                ObjectOutcome::None
            }
            (Self::MousePad(pad), ObjectMessage::Pad(message)) => {
                pad.handle(message, engine);
                ObjectOutcome::None
            }
            (Self::Subpatch(_), ObjectMessage::OpenSubpatch) => ObjectOutcome::OpenSubpatch(id),
            (object, message) => {
                log::debug!(
                    "Ignoring {:?} for {:?} object {}",
                    message,
                    object.kind(),
                    id
                );
                ObjectOutcome::None
            }
        }
    }

    /// Apply an engine-driven change addressed to this object or its children
    pub fn receive_event(&mut self, event: &EngineEvent, engine: &dyn Engine) -> ObjectOutcome {
        if let Self::Graph(graph) = self {
            for child in graph.children_mut() {
                let outcome = child.receive_event(event, engine);
                if outcome != ObjectOutcome::None {
                    return outcome;
                }
            }
        }

        match event {
            EngineEvent::ValueChanged { id, value } if *id == self.id() => {
                self.component_mut().receive_value(*value);
                ObjectOutcome::None
            }
            EngineEvent::Bang { id } if *id == self.id() => match self {
                Self::Bang(bang) => ObjectOutcome::Flash {
                    id: *id,
                    generation: bang.flash(),
                },
                _ => ObjectOutcome::None,
            },
            EngineEvent::ArrayChanged { name } => {
                if let Self::Array(array) = self {
                    if array.array.name() == name {
                        array.array.refresh(engine);
                    }
                }
                ObjectOutcome::None
            }
            _ => ObjectOutcome::None,
        }
    }

    /// Clear a bang flash started with `generation`
    pub fn end_flash(&mut self, generation: u64) {
        if let Self::Bang(bang) = self {
            bang.end_flash(generation);
        }
    }

    /// Periodic refresh from the engine
    ///
    /// Arrays are re-read. Idle objects pull their value, which also repairs
    /// any value whose event was dropped by a full queue.
    pub fn tick(&mut self, engine: &dyn Engine) {
        match self {
            Self::Array(array) => {
                array.array.refresh(engine);
            }
            Self::Graph(graph) => graph.children_mut().iter_mut().for_each(|c| c.tick(engine)),
            object => {
                let component = object.component_mut();
                if !component.is_edited() {
                    component.update_value(engine);
                }
            }
        }
    }

    pub fn view(&self) -> Element<'_, ObjectEvent> {
        let id = self.id();
        let element = match self {
            Self::Graph(graph) => return graph.view(),
            Self::Bang(o) => o.view(),
            Self::Toggle(o) => o.view(),
            Self::Message(o) => o.view(),
            Self::Number(o) => o.view(),
            Self::Slider(o) => o.view(),
            Self::Radio(o) => o.view(),
            Self::Array(o) => o.view(),
            Self::Subpatch(o) => o.view(),
            Self::Comment(o) => o.view(),
            Self::MousePad(o) => o.view(),
            Self::Object(o) => o.view(),
        };
        element.map(move |message| ObjectEvent { id, message })
    }
}

/// Bring a canvas's object list in line with the engine
///
/// Objects still present keep their local state, removed ones are dropped
/// and new ones are created. Order follows `Engine::objects`.
pub fn synchronise(objects: &mut Vec<GuiObject>, parent: Option<ObjectId>, engine: &dyn Engine) {
    let mut previous: Vec<GuiObject> = std::mem::take(objects);

    for id in engine.objects(parent) {
        let existing = previous
            .iter()
            .position(|o| o.id() == id)
            .map(|index| previous.swap_remove(index));

        let object = match existing {
            Some(mut object) => {
                object.component_mut().update(engine);
                if let GuiObject::Graph(graph) = &mut object {
                    synchronise(graph.children_mut(), Some(id), engine);
                }
                Some(object)
            }
            None => log_failure(GuiObject::create(id, engine), "create object"),
        };
        objects.extend(object);
    }
}

/// Pad `content` so it sits at `bounds` inside a full-size layer
fn place(bounds: Bounds, content: Element<'_, ObjectEvent>) -> Element<'_, ObjectEvent> {
    container(content)
        .padding(Padding {
            top: bounds.y.max(0) as f32,
            right: 0.0,
            bottom: 0.0,
            left: bounds.x.max(0) as f32,
        })
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

/// Lay out objects at their canvas coordinates, one stack layer each
pub fn canvas_view(objects: &[GuiObject]) -> Element<'_, ObjectEvent> {
    Stack::with_children(objects.iter().map(|o| place(o.bounds(), o.view())))
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

/// Fixed-size frame for an object's body
pub(crate) fn body<'a, Message: 'a>(
    content: impl Into<Element<'a, Message>>,
    bounds: Bounds,
    active: bool,
) -> container::Container<'a, Message> {
    container(content)
        .width(Length::Fixed(bounds.w.max(1) as f32))
        .height(Length::Fixed(bounds.h.max(1) as f32))
        .style(move |_theme| crate::theme::object_box_style(active))
}

#[cfg(test)]
mod tests {
    use super::*;
    use patchwork_core::engine::{event_channel, MemoryEngine};
    use patchwork_core::ValueRange;

    fn demo_engine() -> (MemoryEngine, ObjectId, ObjectId) {
        let engine = MemoryEngine::new();
        let toggle = engine.add_object(
            None,
            GuiKind::Toggle,
            Bounds::new(10, 10, 25, 25),
            ValueRange::UNIT,
        );
        let slider = engine.add_object(
            None,
            GuiKind::HorizontalSlider,
            Bounds::new(10, 50, 130, 18),
            ValueRange::new(0.0, 127.0),
        );
        (engine, toggle, slider)
    }

    #[test]
    fn test_create_dispatches_on_kind() {
        let (engine, toggle, slider) = demo_engine();
        let object = GuiObject::create(toggle, &engine).unwrap();
        assert!(matches!(object, GuiObject::Toggle(_)));
        assert_eq!(object.component().size_limits(), SizeLimits::new(40, 60, 200, 200));

        let object = GuiObject::create(slider, &engine).unwrap();
        assert_eq!(object.kind(), GuiKind::HorizontalSlider);
        assert_eq!(object.component().best_size(), (130, 35));
    }

    #[test]
    fn test_synchronise_keeps_state_and_drops_removed() {
        let (engine, toggle, slider) = demo_engine();
        let mut objects = Vec::new();
        synchronise(&mut objects, None, &engine);
        assert_eq!(objects.len(), 2);

        objects[1].handle(ObjectMessage::SliderChanged(0.5), &engine);
        engine.remove_object(toggle).unwrap();
        synchronise(&mut objects, None, &engine);

        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].id(), slider);
        assert!(objects[0].component().is_edited());
    }

    #[test]
    fn test_engine_value_deferred_during_slider_drag() {
        let (engine, _, slider) = demo_engine();
        let mut object = GuiObject::create(slider, &engine).unwrap();

        object.handle(ObjectMessage::SliderChanged(0.25), &engine);
        object.receive_event(&EngineEvent::ValueChanged { id: slider, value: 0.9 }, &engine);

        let GuiObject::Slider(s) = &object else {
            panic!("expected slider");
        };
        assert_eq!(s.value_original(), 0.25);

        object.handle(ObjectMessage::SliderReleased, &engine);
        let GuiObject::Slider(s) = &object else {
            panic!("expected slider");
        };
        assert_eq!(s.value_original(), 0.9);
    }

    #[test]
    fn test_tick_recovers_values_lost_to_full_queue() {
        let (engine, toggle, slider) = demo_engine();
        let (notifier, events) = event_channel(1);
        engine.subscribe(notifier);
        let mut objects = Vec::new();
        synchronise(&mut objects, None, &engine);

        engine.push_value(slider, 0.2).unwrap();
        engine.push_value(slider, 0.7).unwrap();
        engine.push_value(toggle, 1.0).unwrap();
        assert_eq!(events.dropped_count(), 2);

        for event in events.drain() {
            for object in &mut objects {
                object.receive_event(&event, &engine);
            }
        }
        let GuiObject::Slider(s) = &objects[1] else {
            panic!("expected slider");
        };
        assert_eq!(s.value_original(), 0.2);

        objects.iter_mut().for_each(|o| o.tick(&engine));
        let (GuiObject::Toggle(t), GuiObject::Slider(s)) = (&objects[0], &objects[1]) else {
            panic!("expected toggle and slider");
        };
        assert!(t.is_on());
        assert_eq!(s.value_original(), 0.7);
    }

    #[test]
    fn test_tick_leaves_edited_object_alone() {
        let (engine, _, slider) = demo_engine();
        let mut object = GuiObject::create(slider, &engine).unwrap();

        object.handle(ObjectMessage::SliderChanged(0.25), &engine);
        engine.push_value(slider, 0.9).unwrap();
        object.tick(&engine);

        let GuiObject::Slider(s) = &object else {
            panic!("expected slider");
        };
        assert_eq!(s.value_original(), 0.25);
    }

    #[test]
    fn test_engine_bang_flashes() {
        let engine = MemoryEngine::new();
        let id = engine.add_object(None, GuiKind::Bang, Bounds::new(0, 0, 25, 25), ValueRange::UNIT);
        let mut object = GuiObject::create(id, &engine).unwrap();

        let outcome = object.receive_event(&EngineEvent::Bang { id }, &engine);
        let ObjectOutcome::Flash { generation, .. } = outcome else {
            panic!("expected flash, got {:?}", outcome);
        };
        object.end_flash(generation);
        let GuiObject::Bang(bang) = &object else {
            panic!("expected bang");
        };
        assert!(!bang.is_flashing());
    }

    #[test]
    fn test_mismatched_message_is_ignored() {
        let (engine, toggle, _) = demo_engine();
        let mut object = GuiObject::create(toggle, &engine).unwrap();
        assert_eq!(object.handle(ObjectMessage::Bang, &engine), ObjectOutcome::None);
        assert!(engine.take_sent().is_empty());
    }
}
