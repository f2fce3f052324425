//! Modal overlay: dimming backdrop plus centred dialog content

use iced::widget::{center, container, mouse_area, opaque, stack, Space};
use iced::{Element, Length};

use crate::theme::BACKDROP;

/// Full-bounds translucent blocker
///
/// Always swallows pointer input. `on_press` is sent for clicks when the
/// dialog allows closing from the backdrop.
pub fn build_backdrop<'a, Message: Clone + 'a>(on_press: Option<Message>) -> Element<'a, Message> {
    let dim = container(Space::new())
        .width(Length::Fill)
        .height(Length::Fill)
        .style(|_theme| container::Style {
            background: Some(BACKDROP.into()),
            ..Default::default()
        });

    let area = mouse_area(dim);
    let area = match on_press {
        Some(message) => area.on_press(message),
        None => area,
    };

    opaque(area)
}

/// Stack `modal_content` centred above a backdrop over `base`
pub fn with_modal_overlay<'a, Message: Clone + 'a>(
    base: Element<'a, Message>,
    modal_content: Element<'a, Message>,
    on_backdrop: Option<Message>,
) -> Element<'a, Message> {
    let backdrop = build_backdrop(on_backdrop);

    let modal = center(opaque(modal_content))
        .width(Length::Fill)
        .height(Length::Fill);

    stack![base, backdrop, modal].into()
}
