//! Bridge from the engine event channel to an iced subscription
//!
//! ```ignore
//! fn subscription(&self) -> Subscription<Message> {
//!     engine_subscription(self.events.clone()).map(Message::Engine)
//! }
//! ```

use std::any::TypeId;
use std::hash::Hash;

use iced::advanced::subscription::{self, EventStream, Hasher, Recipe};
use iced::futures::stream::BoxStream;
use iced::futures::StreamExt;
use iced::Subscription;
use patchwork_core::engine::{EngineEvent, EngineEvents};

struct EngineRecipe {
    events: EngineEvents,
}

impl Recipe for EngineRecipe {
    type Output = EngineEvent;

    fn hash(&self, state: &mut Hasher) {
        TypeId::of::<Self>().hash(state);
        self.events.id().hash(state);
    }

    fn stream(self: Box<Self>, _input: EventStream) -> BoxStream<'static, Self::Output> {
        // Awaits the channel instead of polling; ends when every notifier is gone
        self.events.receiver().clone().into_stream().boxed()
    }
}

/// Deliver engine events on the UI thread
///
/// Subscriptions are keyed by the channel id, so re-creating this every
/// frame with the same `EngineEvents` keeps one running stream.
pub fn engine_subscription(events: EngineEvents) -> Subscription<EngineEvent> {
    subscription::from_recipe(EngineRecipe { events })
}
