//! `[hradio]` / `[vradio]`: row or column of exclusive cells

use iced::widget::{column, container, mouse_area, row, Space};
use iced::{Background, Border, Element, Length};
use patchwork_core::engine::Engine;
use patchwork_core::sync::EngineUpdate;
use patchwork_core::{Bounds, GuiKind, ObjectId, SizeLimits};

use super::binding::Binding;
use super::{GuiComponent, ObjectMessage};
use crate::theme::{ACTIVE, OBJECT_BG, OBJECT_BORDER};

/// Cell limit of Pd's radio objects
pub const MAX_CELLS: usize = 128;

#[derive(Debug, Clone)]
pub struct Radio {
    binding: Binding,
    vertical: bool,
}

impl Radio {
    pub(super) fn new(binding: Binding, vertical: bool) -> Self {
        Self { binding, vertical }
    }

    /// Number of cells, one per integer step of the range, at most [`MAX_CELLS`]
    pub fn count(&self) -> usize {
        let span = (self.binding.sync.max() - self.binding.sync.min()).abs();
        // Float to int casts saturate; NaN becomes 0
        (span.round() as usize).saturating_add(1).min(MAX_CELLS)
    }

    pub fn selected(&self) -> usize {
        let index = (self.binding.sync.value_scaled() - self.binding.sync.min()).abs();
        (index.round() as usize).min(self.count() - 1)
    }

    pub fn select(&mut self, index: usize, engine: &dyn Engine) {
        let index = index.min(self.count() - 1) as f32;
        let (min, max) = (self.binding.sync.min(), self.binding.sync.max());
        let value = if max >= min { min + index } else { min - index };

        self.binding.start_edition(engine);
        self.binding.commit_scaled(engine, value);
        self.binding.stop_edition(engine);
    }

    pub(super) fn view(&self) -> Element<'_, ObjectMessage> {
        let Bounds { w, h, .. } = self.binding.bounds;
        let count = self.count();
        let cell = if self.vertical {
            h as f32 / count as f32
        } else {
            w as f32 / count as f32
        }
        .max(2.0);
        let selected = self.selected();

        let cells = (0..count).map(|index| {
            let active = index == selected;
            let mark = container(Space::new())
                .width(Length::Fixed(cell * 0.5))
                .height(Length::Fixed(cell * 0.5))
                .style(move |_theme| container::Style {
                    background: active.then_some(Background::Color(ACTIVE)),
                    ..Default::default()
                });
            let frame = container(mark)
                .center_x(Length::Fixed(cell))
                .center_y(Length::Fixed(cell))
                .style(|_theme| container::Style {
                    background: Some(Background::Color(OBJECT_BG)),
                    border: Border {
                        color: OBJECT_BORDER,
                        width: 1.0,
                        radius: 0.0.into(),
                    },
                    ..Default::default()
                });
            mouse_area(frame)
                .on_press(ObjectMessage::RadioSelected(index))
                .into()
        });

        if self.vertical {
            column(cells).into()
        } else {
            row(cells).into()
        }
    }
}

impl GuiComponent for Radio {
    fn id(&self) -> ObjectId {
        self.binding.id
    }

    fn kind(&self) -> GuiKind {
        if self.vertical {
            GuiKind::VerticalRadio
        } else {
            GuiKind::HorizontalRadio
        }
    }

    fn bounds(&self) -> Bounds {
        self.binding.bounds
    }

    fn best_size(&self) -> (i32, i32) {
        if self.vertical {
            (24, 163)
        } else {
            (161, 23)
        }
    }

    fn size_limits(&self) -> SizeLimits {
        SizeLimits::new(100, 40, 500, 600)
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

    fn radio(range: ValueRange) -> (MemoryEngine, Radio) {
        let engine = MemoryEngine::new();
        let id = engine.add_object(None, GuiKind::HorizontalRadio, Bounds::new(0, 0, 144, 18), range);
        let binding = Binding::new(id, &engine).unwrap();
        (engine, Radio::new(binding, false))
    }

    #[test]
    fn test_cell_count_follows_range() {
        assert_eq!(radio(ValueRange::new(0.0, 7.0)).1.count(), 8);
        assert_eq!(radio(ValueRange::new(0.0, 1.0)).1.count(), 2);
    }

    #[test]
    fn test_cell_count_capped_for_huge_ranges() {
        assert_eq!(radio(ValueRange::new(0.0, 1.0e9)).1.count(), MAX_CELLS);
        assert_eq!(radio(ValueRange::new(-f32::MAX, f32::MAX)).1.count(), MAX_CELLS);

        let (engine, mut radio) = radio(ValueRange::new(0.0, 1.0e9));
        radio.select(usize::MAX, &engine);
        assert_eq!(radio.selected(), MAX_CELLS - 1);
    }

    #[test]
    fn test_select_commits_index() {
        let (engine, mut radio) = radio(ValueRange::new(0.0, 7.0));
        radio.select(3, &engine);
        assert_eq!(radio.selected(), 3);
        assert_abs_diff_eq!(engine.value(radio.id()).unwrap(), 3.0 / 7.0);
        assert!(!radio.is_edited());

        radio.select(42, &engine);
        assert_eq!(radio.selected(), 7);
    }

    #[test]
    fn test_engine_value_moves_selection() {
        let (_, mut radio) = radio(ValueRange::new(0.0, 7.0));
        assert!(radio.receive_value(5.0 / 7.0));
        assert_eq!(radio.selected(), 5);
    }
}
