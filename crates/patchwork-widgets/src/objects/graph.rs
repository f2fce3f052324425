//! Container objects: graph-on-parent canvases and closed subpatches

use iced::widget::{container, mouse_area, text};
use iced::{Border, Element, Length};
use patchwork_core::engine::{Engine, EngineResult};
use patchwork_core::{Bounds, GuiKind, ObjectId, SizeLimits};

use super::binding::{log_failure, Binding};
use super::{body, canvas_view, synchronise, GuiComponent, GuiObject, ObjectEvent, ObjectMessage};
use crate::theme::{OBJECT_BORDER, OBJECT_TEXT_SIZE};

/// Subpatch whose GUI children are drawn inside its box on the parent canvas
#[derive(Debug, Clone)]
pub struct GraphOnParent {
    binding: Binding,
    children: Vec<GuiObject>,
}

impl GraphOnParent {
    pub(super) fn new(binding: Binding, engine: &dyn Engine) -> Self {
        let mut children = Vec::new();
        synchronise(&mut children, Some(binding.id), engine);
        Self { binding, children }
    }

    pub fn children(&self) -> &[GuiObject] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<GuiObject> {
        &mut self.children
    }

    /// Children are laid out relative to the graph's top-left corner
    pub(super) fn view(&self) -> Element<'_, ObjectEvent> {
        let Bounds { w, h, .. } = self.binding.bounds;
        container(canvas_view(&self.children))
            .width(Length::Fixed(w.max(1) as f32))
            .height(Length::Fixed(h.max(1) as f32))
            .clip(true)
            .style(|_theme| container::Style {
                border: Border {
                    color: OBJECT_BORDER,
                    width: 1.0,
                    radius: 0.0.into(),
                },
                ..Default::default()
            })
            .into()
    }
}

impl GuiComponent for GraphOnParent {
    fn id(&self) -> ObjectId {
        self.binding.id
    }

    fn kind(&self) -> GuiKind {
        GuiKind::GraphOnParent
    }

    fn bounds(&self) -> Bounds {
        self.binding.bounds
    }

    fn best_size(&self) -> (i32, i32) {
        (self.binding.bounds.w, self.binding.bounds.h)
    }

    fn size_limits(&self) -> SizeLimits {
        SizeLimits::new(30, 30, 500, 600)
    }

    fn update(&mut self, engine: &dyn Engine) {
        self.binding.refresh(engine);
    }

    fn is_edited(&self) -> bool {
        self.children.iter().any(|c| c.component().is_edited())
    }
}

/// Closed subpatch box, clicking it opens the subpatch canvas
#[derive(Debug, Clone)]
pub struct Subpatch {
    binding: Binding,
    name: String,
}

impl Subpatch {
    pub(super) fn new(binding: Binding, engine: &dyn Engine) -> EngineResult<Self> {
        let name = engine.text(binding.id)?;
        Ok(Self { binding, name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(super) fn view(&self) -> Element<'_, ObjectMessage> {
        let label = text(&self.name).size(OBJECT_TEXT_SIZE);
        mouse_area(body(label, self.binding.bounds, false).padding([2, 6]))
            .on_press(ObjectMessage::OpenSubpatch)
            .interaction(iced::mouse::Interaction::Pointer)
            .into()
    }
}

impl GuiComponent for Subpatch {
    fn id(&self) -> ObjectId {
        self.binding.id
    }

    fn kind(&self) -> GuiKind {
        GuiKind::Subpatch
    }

    fn bounds(&self) -> Bounds {
        self.binding.bounds
    }

    fn best_size(&self) -> (i32, i32) {
        (0, 3)
    }

    fn size_limits(&self) -> SizeLimits {
        SizeLimits::new(40, 32, 100, 32)
    }

    fn update(&mut self, engine: &dyn Engine) {
        self.binding.refresh(engine);
        if let Some(name) = log_failure(engine.text(self.binding.id), "subpatch name") {
            self.name = name;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::ObjectOutcome;
    use patchwork_core::engine::{EngineEvent, MemoryEngine};
    use patchwork_core::ValueRange;

    #[test]
    fn test_graph_builds_and_routes_to_children() {
        let engine = MemoryEngine::new();
        let graph = engine.add_object(None, GuiKind::GraphOnParent, Bounds::new(0, 0, 200, 140), ValueRange::UNIT);
        let toggle = engine.add_object(Some(graph), GuiKind::Toggle, Bounds::new(5, 5, 25, 25), ValueRange::UNIT);

        let mut object = GuiObject::create(graph, &engine).unwrap();
        let GuiObject::Graph(g) = &object else {
            panic!("expected graph");
        };
        assert_eq!(g.children().len(), 1);

        assert!(object.find_mut(toggle).is_some());
        object.receive_event(&EngineEvent::ValueChanged { id: toggle, value: 1.0 }, &engine);
        let Some(GuiObject::Toggle(t)) = object.find_mut(toggle) else {
            panic!("expected toggle child");
        };
        assert!(t.is_on());
    }

    #[test]
    fn test_subpatch_click_requests_navigation() {
        let engine = MemoryEngine::new();
        let id = engine.add_text_object(None, GuiKind::Subpatch, Bounds::new(0, 0, 60, 22), "pd synth");
        let mut object = GuiObject::create(id, &engine).unwrap();
        assert_eq!(
            object.handle(ObjectMessage::OpenSubpatch, &engine),
            ObjectOutcome::OpenSubpatch(id)
        );
    }
}
