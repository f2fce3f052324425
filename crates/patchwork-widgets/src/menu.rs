//! Object-creation popup menu
//!
//! Opened by right-clicking empty canvas space. Picking an item hands the
//! object's class name to the host, which creates it at the click position.
//! "Array" is the exception: the host opens the array dialog first.

use iced::widget::{button, column, container, rule, text};
use iced::{Background, Border, Element, Length, Point};

/// Entries of the object menu, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectMenuItem {
    Empty,
    Number,
    Message,
    Bang,
    Toggle,
    VerticalSlider,
    HorizontalSlider,
    VerticalRadio,
    HorizontalRadio,
    FloatAtom,
    SymbolAtom,
    ListAtom,
    Array,
    GraphOnParent,
    Comment,
    Canvas,
    Keyboard,
}

impl ObjectMenuItem {
    /// Menu sections, separated by rules when drawn
    pub const SECTIONS: &'static [&'static [ObjectMenuItem]] = &[
        &[Self::Empty],
        &[
            Self::Number,
            Self::Message,
            Self::Bang,
            Self::Toggle,
            Self::VerticalSlider,
            Self::HorizontalSlider,
            Self::VerticalRadio,
            Self::HorizontalRadio,
        ],
        &[Self::FloatAtom, Self::SymbolAtom, Self::ListAtom],
        &[Self::Array, Self::GraphOnParent, Self::Comment, Self::Canvas],
        &[Self::Keyboard],
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Empty => "Empty Object",
            Self::Number => "Number",
            Self::Message => "Message",
            Self::Bang => "Bang",
            Self::Toggle => "Toggle",
            Self::VerticalSlider => "Vertical Slider",
            Self::HorizontalSlider => "Horizontal Slider",
            Self::VerticalRadio => "Vertical Radio",
            Self::HorizontalRadio => "Horizontal Radio",
            Self::FloatAtom => "Float Atom",
            Self::SymbolAtom => "Symbol Atom",
            Self::ListAtom => "List Atom",
            Self::Array => "Array",
            Self::GraphOnParent => "GraphOnParent",
            Self::Comment => "Comment",
            Self::Canvas => "Canvas",
            Self::Keyboard => "Keyboard",
        }
    }

    /// Class name handed to the host (empty for a blank object box)
    pub fn object_name(&self) -> &'static str {
        match self {
            Self::Empty => "",
            Self::Number => "nbx",
            Self::Message => "msg",
            Self::Bang => "bng",
            Self::Toggle => "tgl",
            Self::VerticalSlider => "vsl",
            Self::HorizontalSlider => "hsl",
            Self::VerticalRadio => "vradio",
            Self::HorizontalRadio => "hradio",
            Self::FloatAtom => "floatatom",
            Self::SymbolAtom => "symbolatom",
            Self::ListAtom => "listbox",
            Self::Array => "array",
            Self::GraphOnParent => "graph",
            Self::Comment => "comment",
            Self::Canvas => "cnv",
            Self::Keyboard => "keyboard",
        }
    }

    /// Decode a numeric menu id as used by saved keymaps and older hosts
    ///
    /// Ids below 1 mean the menu was dismissed; unknown ids are treated the same.
    pub fn from_legacy_id(id: i32) -> Option<Self> {
        let item = match id {
            5 => Self::HorizontalSlider,
            7 => Self::HorizontalRadio,
            8 => Self::VerticalRadio,
            10 => Self::SymbolAtom,
            11 => Self::Array,
            12 => Self::GraphOnParent,
            14 => Self::Canvas,
            15 => Self::Keyboard,
            16 => Self::ListAtom,
            _ => return None,
        };
        Some(item)
    }

    /// True if picking this item opens a dialog before anything is created
    pub fn needs_dialog(&self) -> bool {
        matches!(self, Self::Array)
    }
}

/// Outcome of the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectMenuMessage {
    Picked(ObjectMenuItem),
    Dismissed,
}

/// State for the object menu
#[derive(Debug, Clone, Default)]
pub struct ObjectMenuState {
    pub is_open: bool,
    /// Where the menu is drawn (window coordinates)
    pub position: Point,
    /// Canvas position new objects are created at
    pub target: (i32, i32),
}

impl ObjectMenuState {
    pub fn show(&mut self, position: Point, target: (i32, i32)) {
        self.position = position;
        self.target = target;
        self.is_open = true;
    }

    pub fn close(&mut self) {
        self.is_open = false;
    }
}

/// Render the menu, or nothing when closed
pub fn view(state: &ObjectMenuState) -> Option<Element<'static, ObjectMenuMessage>> {
    if !state.is_open {
        return None;
    }

    let mut items: Vec<Element<'static, ObjectMenuMessage>> = Vec::new();
    for (index, section) in ObjectMenuItem::SECTIONS.iter().enumerate() {
        if index > 0 {
            items.push(menu_separator());
        }
        items.extend(section.iter().map(|item| menu_item(*item)));
    }

    let menu = container(column(items).spacing(2).padding(4))
        .style(|theme: &iced::Theme| {
            let palette = theme.extended_palette();
            container::Style {
                background: Some(Background::Color(palette.background.strong.color)),
                border: Border {
                    color: palette.background.weak.color,
                    width: 1.0,
                    radius: 4.0.into(),
                },
                ..Default::default()
            }
        })
        .width(Length::Fixed(180.0));

    Some(menu.into())
}

fn menu_separator() -> Element<'static, ObjectMenuMessage> {
    container(rule::horizontal(1))
        .padding([4, 8])
        .width(Length::Fill)
        .into()
}

fn menu_item(item: ObjectMenuItem) -> Element<'static, ObjectMenuMessage> {
    button(text(item.label()).size(13))
        .on_press(ObjectMenuMessage::Picked(item))
        .width(Length::Fill)
        .padding([4, 12])
        .style(|theme: &iced::Theme, status| {
            let palette = theme.extended_palette();
            let bg = match status {
                button::Status::Hovered => palette.primary.weak.color,
                _ => iced::Color::TRANSPARENT,
            };
            button::Style {
                background: Some(Background::Color(bg)),
                text_color: palette.background.base.text,
                border: Border::default(),
                ..Default::default()
            }
        })
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_item_listed_once() {
        let all: Vec<_> = ObjectMenuItem::SECTIONS.iter().flat_map(|s| s.iter()).collect();
        assert_eq!(all.len(), 17);
        assert_eq!(*all[0], ObjectMenuItem::Empty);
        assert_eq!(all[0].object_name(), "");
    }

    #[test]
    fn test_legacy_ids() {
        assert_eq!(
            ObjectMenuItem::from_legacy_id(5).map(|i| i.object_name()),
            Some("hsl")
        );
        assert_eq!(
            ObjectMenuItem::from_legacy_id(16).map(|i| i.object_name()),
            Some("listbox")
        );
        assert_eq!(
            ObjectMenuItem::from_legacy_id(14).map(|i| i.object_name()),
            Some("cnv")
        );
        assert_eq!(ObjectMenuItem::from_legacy_id(0), None);
        assert_eq!(ObjectMenuItem::from_legacy_id(-3), None);
        assert_eq!(ObjectMenuItem::from_legacy_id(9), None);
    }

    #[test]
    fn test_only_array_needs_dialog() {
        let dialog_items: Vec<_> = ObjectMenuItem::SECTIONS
            .iter()
            .flat_map(|s| s.iter())
            .filter(|i| i.needs_dialog())
            .collect();
        assert_eq!(dialog_items, vec![&ObjectMenuItem::Array]);
    }

    #[test]
    fn test_open_close() {
        let mut state = ObjectMenuState::default();
        assert!(view(&state).is_none());
        state.show(Point::new(10.0, 20.0), (10, 20));
        assert!(state.is_open);
        assert_eq!(state.target, (10, 20));
        state.close();
        assert!(!state.is_open);
    }
}
