//! `[hsl]` / `[vsl]`: continuous value in the object's range
//!
//! The iced slider runs on the normalised 0..1 value so inverted ranges
//! (`min > max`) need no special casing.

use iced::widget::{container, slider, vertical_slider};
use iced::{Element, Length};
use patchwork_core::engine::Engine;
use patchwork_core::sync::EngineUpdate;
use patchwork_core::{Bounds, GuiKind, ObjectId, SizeLimits};

use super::binding::Binding;
use super::{GuiComponent, ObjectMessage};

const STEP: f32 = 0.001;

#[derive(Debug, Clone)]
pub struct Slider {
    binding: Binding,
    vertical: bool,
}

impl Slider {
    pub(super) fn new(binding: Binding, vertical: bool) -> Self {
        Self { binding, vertical }
    }

    pub fn is_vertical(&self) -> bool {
        self.vertical
    }

    pub fn value_original(&self) -> f32 {
        self.binding.sync.value_original()
    }

    pub fn value_scaled(&self) -> f32 {
        self.binding.sync.value_scaled()
    }

    /// Move to a normalised position, opening the gesture on first movement
    pub fn drag(&mut self, normalised: f32, engine: &dyn Engine) {
        self.binding.start_edition(engine);
        self.binding.commit_original(engine, normalised.clamp(0.0, 1.0));
    }

    pub fn release(&mut self, engine: &dyn Engine) {
        self.binding.stop_edition(engine);
    }

    pub(super) fn view(&self) -> Element<'_, ObjectMessage> {
        let Bounds { w, h, .. } = self.binding.bounds;
        let value = self.value_original();

        let control: Element<'_, ObjectMessage> = if self.vertical {
            vertical_slider(0.0..=1.0, value, ObjectMessage::SliderChanged)
                .on_release(ObjectMessage::SliderReleased)
                .step(STEP)
                .height(Length::Fill)
                .into()
        } else {
            slider(0.0..=1.0, value, ObjectMessage::SliderChanged)
                .on_release(ObjectMessage::SliderReleased)
                .step(STEP)
                .width(Length::Fill)
                .into()
        };

        container(control)
            .center_x(Length::Fixed(w.max(1) as f32))
            .center_y(Length::Fixed(h.max(1) as f32))
            .into()
    }
}

impl GuiComponent for Slider {
    fn id(&self) -> ObjectId {
        self.binding.id
    }

    fn kind(&self) -> GuiKind {
        if self.vertical {
            GuiKind::VerticalSlider
        } else {
            GuiKind::HorizontalSlider
        }
    }

    fn bounds(&self) -> Bounds {
        self.binding.bounds
    }

    fn best_size(&self) -> (i32, i32) {
        if self.vertical {
            (35, 130)
        } else {
            (130, 35)
        }
    }

    fn size_limits(&self) -> SizeLimits {
        SizeLimits::new(100, 60, 500, 600)
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

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use patchwork_core::engine::MemoryEngine;
    use patchwork_core::ValueRange;

    fn slider(range: ValueRange) -> (MemoryEngine, Slider) {
        let engine = MemoryEngine::new();
        let id = engine.add_object(None, GuiKind::VerticalSlider, Bounds::new(0, 0, 18, 130), range);
        let binding = Binding::new(id, &engine).unwrap();
        (engine, Slider::new(binding, true))
    }

    #[test]
    fn test_drag_is_one_gesture() {
        let (engine, mut slider) = slider(ValueRange::new(0.0, 127.0));
        slider.drag(0.25, &engine);
        assert!(engine.gesture_active(slider.id()));
        slider.drag(0.5, &engine);
        assert_abs_diff_eq!(slider.value_scaled(), 63.5);
        assert_abs_diff_eq!(engine.value(slider.id()).unwrap(), 0.5);

        slider.release(&engine);
        assert!(!engine.gesture_active(slider.id()));
        assert!(!slider.is_edited());
    }

    #[test]
    fn test_inverted_range() {
        let (engine, mut slider) = slider(ValueRange::new(10.0, -10.0));
        slider.drag(0.75, &engine);
        slider.release(&engine);
        assert_abs_diff_eq!(slider.value_scaled(), -5.0);
    }

    #[test]
    fn test_engine_update_repaints_when_idle() {
        let (_, mut slider) = slider(ValueRange::UNIT);
        assert!(slider.receive_value(0.3));
        assert!(!slider.receive_value(0.3));
        assert_eq!(slider.best_size(), (35, 130));
        assert_eq!(slider.kind(), GuiKind::VerticalSlider);
    }
}
