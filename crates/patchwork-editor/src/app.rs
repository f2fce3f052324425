//! Main application state and iced implementation

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use iced::widget::{button, column, container, mouse_area, row, text, Space, Stack};
use iced::{window, Alignment, Element, Length, Padding, Point, Size, Subscription, Task, Theme};
use patchwork_core::config::{save_config, EditorSettings};
use patchwork_core::engine::{Engine, EngineEvent, EngineEvents};
use patchwork_core::ObjectId;
use patchwork_widgets::menu;
use patchwork_widgets::objects::{self, FLASH_DURATION};
use patchwork_widgets::theme::CANVAS_BG;
use patchwork_widgets::{
    canvas_view, engine_subscription, ArrayDialogResult, DialogAction, DialogHost, DialogMessage,
    GuiObject, ObjectEvent, ObjectMenuMessage, ObjectMenuState, ObjectMessage,
    ObjectOutcome, SaveChoice,
};

/// Period of the refresh tick (arrays, and values whose events were dropped)
const TICK_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub enum Message {
    Object(ObjectEvent),
    Engine(EngineEvent),
    Tick,
    EndFlash { id: ObjectId, generation: u64 },

    // Canvas
    CursorMoved(Point),
    CanvasRightClick,
    NavigateBack,

    // Object menu
    Menu(ObjectMenuMessage),

    // Dialogs
    Dialog(DialogMessage),
    OpenSettings,
    SettingsClosed(EditorSettings),
    ArrayDialogClosed {
        result: ArrayDialogResult,
        parent: Option<ObjectId>,
        position: (i32, i32),
    },
    SaveDialogClosed(SaveChoice),

    // Window
    WindowResized(Size),
    CloseRequested(window::Id),
}

/// One open canvas: the root patch or a subpatch opened from it
#[derive(Debug)]
struct CanvasLevel {
    parent: Option<ObjectId>,
    title: String,
    objects: Vec<GuiObject>,
}

impl CanvasLevel {
    fn new(parent: Option<ObjectId>, title: String, engine: &dyn Engine) -> Self {
        let mut objects = Vec::new();
        objects::synchronise(&mut objects, parent, engine);
        Self {
            parent,
            title,
            objects,
        }
    }

    fn find_mut(&mut self, id: ObjectId) -> Option<&mut GuiObject> {
        self.objects.iter_mut().find_map(|o| o.find_mut(id))
    }
}

pub struct PatchEditor {
    engine: Arc<dyn Engine>,
    events: EngineEvents,
    patch_name: String,
    settings: EditorSettings,
    config_path: PathBuf,
    /// Root canvas first, innermost open subpatch last (never empty)
    canvases: Vec<CanvasLevel>,
    cursor: Point,
    menu: ObjectMenuState,
    dialogs: DialogHost<Message>,
    /// Patch changed since it was opened or saved
    dirty: bool,
    /// Window waiting on the save prompt
    closing_window: Option<window::Id>,
    /// Engine events dropped by the bridge as of the last tick
    dropped_events: u64,
}

impl PatchEditor {
    pub fn new(
        engine: Arc<dyn Engine>,
        events: EngineEvents,
        patch_name: String,
        settings: EditorSettings,
        config_path: PathBuf,
    ) -> Self {
        let root = CanvasLevel::new(None, patch_name.clone(), &*engine);
        log::info!("Opened {} with {} objects", patch_name, root.objects.len());

        Self {
            engine,
            events,
            patch_name,
            settings,
            config_path,
            canvases: vec![root],
            cursor: Point::ORIGIN,
            menu: ObjectMenuState::default(),
            dialogs: DialogHost::new(),
            dirty: false,
            closing_window: None,
            dropped_events: 0,
        }
    }

    pub fn title(&self) -> String {
        let marker = if self.dirty { "*" } else { "" };
        format!("{}{} - Patchwork", self.patch_name, marker)
    }

    pub fn theme(&self) -> Theme {
        Theme::Dark
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn current(&self) -> &CanvasLevel {
        // `canvases` always holds the root
        &self.canvases[self.canvases.len() - 1]
    }

    fn current_mut(&mut self) -> &mut CanvasLevel {
        let last = self.canvases.len() - 1;
        &mut self.canvases[last]
    }

    fn outcome_task(outcome: ObjectOutcome) -> Task<Message> {
        match outcome {
            ObjectOutcome::Flash { id, generation } => Task::perform(
                tokio::time::sleep(FLASH_DURATION),
                move |_| Message::EndFlash { id, generation },
            ),
            ObjectOutcome::OpenSubpatch(id) => Task::done(Message::Object(ObjectEvent {
                id,
                message: ObjectMessage::OpenSubpatch,
            })),
            ObjectOutcome::None => Task::none(),
        }
    }

    fn resynchronise(&mut self) {
        let engine = &*self.engine;
        for level in &mut self.canvases {
            objects::synchronise(&mut level.objects, level.parent, engine);
        }
    }

    fn open_subpatch(&mut self, id: ObjectId) {
        let title = match self.current_mut().find_mut(id) {
            Some(GuiObject::Subpatch(subpatch)) => subpatch.name().to_string(),
            _ => format!("subpatch {}", id),
        };
        log::info!("Opening {}", title);
        let level = CanvasLevel::new(Some(id), title, &*self.engine);
        self.canvases.push(level);
    }

    fn create_object(&mut self, name: &str, parent: Option<ObjectId>, position: (i32, i32)) {
        match self.engine.create_object(parent, name, position) {
            Ok(id) => {
                log::info!("Created '{}' (id={}) at {:?}", name, id, position);
                self.dirty = true;
                self.resynchronise();
            }
            Err(e) => log::error!("Failed to create '{}': {}", name, e),
        }
    }

    /// Deliver the completion message of a dialog that was settled early
    fn settle(&mut self, completion: Option<Message>) -> Task<Message> {
        match completion {
            Some(message) => self.update(message),
            None => Task::none(),
        }
    }

    fn dialog_task(action: DialogAction) -> Task<Message> {
        match action {
            DialogAction::ScheduleFinish => Task::done(Message::Dialog(DialogMessage::Finish)),
            DialogAction::None => Task::none(),
        }
    }

    fn close_window(&mut self) -> Task<Message> {
        self.persist_settings();
        match self.closing_window.take() {
            Some(id) => window::close(id),
            None => iced::exit(),
        }
    }

    fn persist_settings(&self) {
        if let Err(e) = save_config(&self.settings, &self.config_path) {
            log::error!("Failed to save settings: {:#}", e);
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Object(ObjectEvent { id, message }) => {
                if message == ObjectMessage::OpenSubpatch {
                    self.open_subpatch(id);
                    return Task::none();
                }
                if message == ObjectMessage::TextSubmitted {
                    self.dirty = true;
                }

                let engine = self.engine.clone();
                let Some(object) = self.current_mut().find_mut(id) else {
                    log::debug!("Message for unknown object {}", id);
                    return Task::none();
                };
                let outcome = object.handle(message, &*engine);
                Self::outcome_task(outcome)
            }

            Message::Engine(EngineEvent::Synchronise) => {
                self.resynchronise();
                Task::none()
            }
            Message::Engine(event) => {
                let engine = self.engine.clone();
                let mut tasks = Vec::new();
                for level in &mut self.canvases {
                    for object in &mut level.objects {
                        let outcome = object.receive_event(&event, &*engine);
                        if outcome != ObjectOutcome::None {
                            tasks.push(Self::outcome_task(outcome));
                        }
                    }
                }
                Task::batch(tasks)
            }
            Message::Tick => {
                let dropped = self.events.dropped_count();
                if dropped > self.dropped_events {
                    log::warn!(
                        "{} engine events dropped (queue full), refreshing from the engine",
                        dropped - self.dropped_events
                    );
                    self.dropped_events = dropped;
                }

                let engine = self.engine.clone();
                for object in &mut self.current_mut().objects {
                    object.tick(&*engine);
                }
                Task::none()
            }
            Message::EndFlash { id, generation } => {
                for level in &mut self.canvases {
                    if let Some(object) = level.find_mut(id) {
                        object.end_flash(generation);
                    }
                }
                Task::none()
            }

            Message::CursorMoved(position) => {
                self.cursor = position;
                Task::none()
            }
            Message::CanvasRightClick => {
                let target = (self.cursor.x as i32, self.cursor.y as i32);
                self.menu.show(self.cursor, target);
                Task::none()
            }
            Message::NavigateBack => {
                if self.canvases.len() > 1 {
                    if let Some(level) = self.canvases.pop() {
                        log::info!("Closing {}", level.title);
                    }
                }
                Task::none()
            }

            Message::Menu(ObjectMenuMessage::Dismissed) => {
                self.menu.close();
                Task::none()
            }
            Message::Menu(ObjectMenuMessage::Picked(item)) => {
                self.menu.close();
                let parent = self.current().parent;
                let position = self.menu.target;

                if item.needs_dialog() {
                    let displaced = self.dialogs.open_array(move |result| Message::ArrayDialogClosed {
                        result,
                        parent,
                        position,
                    });
                    self.settle(displaced)
                } else {
                    self.create_object(item.object_name(), parent, position);
                    Task::none()
                }
            }

            Message::Dialog(DialogMessage::Finish) => {
                let completion = self.dialogs.finish();
                self.settle(completion)
            }
            Message::Dialog(message) => Self::dialog_task(self.dialogs.update(message)),
            Message::OpenSettings => {
                let displaced = self
                    .dialogs
                    .open_settings(self.settings.clone(), Message::SettingsClosed);
                self.settle(displaced)
            }
            Message::SettingsClosed(settings) => {
                if settings != self.settings {
                    if settings.search_paths != self.settings.search_paths {
                        log::info!("Search paths changed, they apply to the next patch opened");
                    }
                    self.settings = settings;
                    self.persist_settings();
                }
                Task::none()
            }
            Message::ArrayDialogClosed {
                result,
                parent,
                position,
            } => {
                if let ArrayDialogResult::Confirmed { name, size } = result {
                    match self.engine.create_array(parent, &name, size, position) {
                        Ok(id) => {
                            log::info!("Created array '{}' of size {} (id={})", name, size, id);
                            self.dirty = true;
                            self.resynchronise();
                        }
                        Err(e) => log::error!("Failed to create array '{}': {}", name, e),
                    }
                }
                Task::none()
            }
            Message::SaveDialogClosed(choice) => match choice {
                SaveChoice::Cancel => {
                    self.closing_window = None;
                    Task::none()
                }
                SaveChoice::DontSave => self.close_window(),
                SaveChoice::Save => match self.engine.save_patch() {
                    Ok(()) => {
                        self.dirty = false;
                        self.close_window()
                    }
                    Err(e) => {
                        log::error!("Failed to save {}: {}", self.patch_name, e);
                        self.closing_window = None;
                        Task::none()
                    }
                },
            },

            Message::WindowResized(size) => {
                self.settings.window_width = size.width;
                self.settings.window_height = size.height;
                Task::none()
            }
            Message::CloseRequested(id) => {
                if self.closing_window.is_some() && self.dialogs.is_open() {
                    // Save prompt already showing
                    return Task::none();
                }

                // Whatever dialog is open reports before the window goes
                let completion = self.dialogs.dismiss();
                let settled = self.settle(completion);

                self.closing_window = Some(id);
                if self.dirty {
                    let displaced = self
                        .dialogs
                        .open_save(self.patch_name.clone(), Message::SaveDialogClosed);
                    let prompt = self.settle(displaced);
                    Task::batch([settled, prompt])
                } else {
                    Task::batch([settled, self.close_window()])
                }
            }
        }
    }

    pub fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            engine_subscription(self.events.clone()).map(Message::Engine),
            iced::time::every(TICK_INTERVAL).map(|_| Message::Tick),
            window::resize_events().map(|(_id, size)| Message::WindowResized(size)),
            window::close_requests().map(Message::CloseRequested),
        ])
    }

    pub fn view(&self) -> Element<'_, Message> {
        let level = self.current();

        let canvas = mouse_area(
            container(canvas_view(&level.objects).map(Message::Object))
                .width(Length::Fill)
                .height(Length::Fill)
                .style(|_theme: &Theme| container::Style {
                    background: Some(CANVAS_BG.into()),
                    ..Default::default()
                }),
        )
        .on_move(Message::CursorMoved)
        .on_right_press(Message::CanvasRightClick);

        let mut layers: Vec<Element<'_, Message>> = vec![canvas.into()];
        if let Some(menu) = menu::view(&self.menu) {
            let dismiss = mouse_area(Space::new().width(Length::Fill).height(Length::Fill))
                .on_press(Message::Menu(ObjectMenuMessage::Dismissed))
                .on_right_press(Message::Menu(ObjectMenuMessage::Dismissed));
            let placed = container(menu.map(Message::Menu)).padding(Padding {
                top: self.menu.position.y,
                left: self.menu.position.x,
                right: 0.0,
                bottom: 0.0,
            });
            layers.push(dismiss.into());
            layers.push(placed.into());
        }

        let base: Element<'_, Message> = column![
            self.view_header(),
            Stack::with_children(layers)
                .width(Length::Fill)
                .height(Length::Fill),
        ]
        .into();

        self.dialogs.view(base, Message::Dialog)
    }

    fn view_header(&self) -> Element<'_, Message> {
        let back: Element<'_, Message> = if self.canvases.len() > 1 {
            button(text("◀ Back").size(14))
                .on_press(Message::NavigateBack)
                .style(button::secondary)
                .into()
        } else {
            Space::new().into()
        };

        let path = self
            .canvases
            .iter()
            .map(|l| l.title.as_str())
            .collect::<Vec<_>>()
            .join(" › ");

        // Settings gear icon (⚙ U+2699)
        let settings_btn = button(text("⚙").size(18))
            .on_press(Message::OpenSettings)
            .style(button::secondary);

        container(
            row![
                back,
                text(path).size(16),
                Space::new().width(Length::Fill),
                settings_btn,
            ]
            .spacing(10)
            .align_y(Alignment::Center),
        )
        .padding([6, 12])
        .width(Length::Fill)
        .into()
    }
}

impl std::fmt::Debug for PatchEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatchEditor")
            .field("patch_name", &self.patch_name)
            .field("canvases", &self.canvases.len())
            .field("dirty", &self.dirty)
            .field("dialogs", &self.dialogs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patchwork_core::engine::{event_channel, MemoryEngine};
    use patchwork_core::{Bounds, GuiKind, ValueRange};
    use patchwork_core::config::load_config;
    use patchwork_widgets::{ArrayDialogMessage, ObjectMenuItem, SettingsMessage};

    fn editor(engine: Arc<MemoryEngine>) -> (PatchEditor, tempfile::TempDir) {
        let (notifier, events) = event_channel(64);
        engine.subscribe(notifier);
        let dir = tempfile::tempdir().unwrap();
        let editor = PatchEditor::new(
            engine,
            events,
            "test.pd".to_string(),
            EditorSettings::default(),
            dir.path().join("settings.yaml"),
        );
        (editor, dir)
    }

    #[test]
    fn test_menu_pick_creates_object_at_click() {
        let engine = Arc::new(MemoryEngine::new());
        let (mut editor, _dir) = editor(engine.clone());

        let _ = editor.update(Message::CursorMoved(Point::new(40.0, 60.0)));
        let _ = editor.update(Message::CanvasRightClick);
        assert!(editor.menu.is_open);

        let _ = editor.update(Message::Menu(ObjectMenuMessage::Picked(ObjectMenuItem::Toggle)));
        assert!(!editor.menu.is_open);
        assert!(editor.is_dirty());

        let objects = &editor.current().objects;
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].kind(), GuiKind::Toggle);
        assert_eq!((objects[0].bounds().x, objects[0].bounds().y), (40, 60));
    }

    #[test]
    fn test_array_item_goes_through_dialog() {
        let engine = Arc::new(MemoryEngine::new());
        let (mut editor, _dir) = editor(engine.clone());

        let _ = editor.update(Message::Menu(ObjectMenuMessage::Picked(ObjectMenuItem::Array)));
        assert!(editor.dialogs.is_open());
        assert!(editor.current().objects.is_empty());

        let _ = editor.update(Message::Dialog(DialogMessage::Array(ArrayDialogMessage::SizeChanged(
            "16".to_string(),
        ))));
        let _ = editor.update(Message::Dialog(DialogMessage::Array(ArrayDialogMessage::Confirm)));
        // Teardown is deferred to the next cycle
        assert!(editor.current().objects.is_empty());
        let _ = editor.update(Message::Dialog(DialogMessage::Finish));

        assert!(!editor.dialogs.is_open());
        assert_eq!(engine.read_array("array1").unwrap().len(), 16);
        assert_eq!(editor.current().objects[0].kind(), GuiKind::Array);
    }

    #[test]
    fn test_subpatch_navigation() {
        let engine = Arc::new(MemoryEngine::new());
        let subpatch = engine.add_text_object(None, GuiKind::Subpatch, Bounds::new(0, 0, 60, 22), "pd inner");
        engine.add_object(Some(subpatch), GuiKind::Bang, Bounds::new(0, 0, 25, 25), ValueRange::UNIT);
        let (mut editor, _dir) = editor(engine);

        let _ = editor.update(Message::Object(ObjectEvent {
            id: subpatch,
            message: ObjectMessage::OpenSubpatch,
        }));
        assert_eq!(editor.canvases.len(), 2);
        assert_eq!(editor.current().title, "pd inner");
        assert_eq!(editor.current().objects[0].kind(), GuiKind::Bang);

        let _ = editor.update(Message::NavigateBack);
        let _ = editor.update(Message::NavigateBack);
        assert_eq!(editor.canvases.len(), 1);
    }

    #[test]
    fn test_engine_events_reach_objects() {
        let engine = Arc::new(MemoryEngine::new());
        let toggle = engine.add_object(None, GuiKind::Toggle, Bounds::new(0, 0, 25, 25), ValueRange::UNIT);
        let (mut editor, _dir) = editor(engine.clone());

        engine.push_value(toggle, 1.0).unwrap();
        for event in editor.events.drain() {
            let _ = editor.update(Message::Engine(event));
        }

        let Some(GuiObject::Toggle(t)) = editor.current_mut().find_mut(toggle) else {
            panic!("expected toggle");
        };
        assert!(t.is_on());
    }

    #[test]
    fn test_close_with_changes_prompts_and_saves() {
        let engine = Arc::new(MemoryEngine::new());
        let (mut editor, _dir) = editor(engine.clone());
        let _ = editor.update(Message::Menu(ObjectMenuMessage::Picked(ObjectMenuItem::Bang)));
        assert!(editor.is_dirty());

        let _ = editor.update(Message::CloseRequested(window::Id::unique()));
        assert!(editor.dialogs.is_open());

        // Cancel keeps the editor open and dirty
        let _ = editor.update(Message::Dialog(DialogMessage::Save(SaveChoice::Cancel)));
        let _ = editor.update(Message::Dialog(DialogMessage::Finish));
        assert!(editor.is_dirty());
        assert!(editor.closing_window.is_none());

        let _ = editor.update(Message::CloseRequested(window::Id::unique()));
        let _ = editor.update(Message::Dialog(DialogMessage::Save(SaveChoice::Save)));
        let _ = editor.update(Message::Dialog(DialogMessage::Finish));
        assert_eq!(engine.save_count(), 1);
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_tick_repairs_values_after_queue_overflow() {
        let engine = Arc::new(MemoryEngine::new());
        let slider = engine.add_object(
            None,
            GuiKind::HorizontalSlider,
            Bounds::new(0, 0, 130, 18),
            ValueRange::new(0.0, 127.0),
        );
        let (mut editor, _dir) = editor(engine.clone());

        // More pushes than the queue holds; the last ones are dropped
        for step in 0..=100 {
            engine.push_value(slider, step as f32 / 100.0).unwrap();
        }
        for event in editor.events.drain() {
            let _ = editor.update(Message::Engine(event));
        }
        assert!(editor.events.dropped_count() > 0);

        let _ = editor.update(Message::Tick);
        assert_eq!(editor.dropped_events, editor.events.dropped_count());
        let Some(GuiObject::Slider(s)) = editor.current_mut().find_mut(slider) else {
            panic!("expected slider");
        };
        assert_eq!(s.value_original(), 1.0);
    }

    #[test]
    fn test_opening_dialog_settles_the_open_one() {
        let engine = Arc::new(MemoryEngine::new());
        let (mut editor, _dir) = editor(engine.clone());

        let _ = editor.update(Message::Menu(ObjectMenuMessage::Picked(ObjectMenuItem::Array)));
        let _ = editor.update(Message::OpenSettings);

        assert!(editor.dialogs.settings_state().is_some());
        assert!(editor.dialogs.array_state().is_none());
        // Array dialog ended as cancelled: nothing was created
        assert!(engine.objects(None).is_empty());
    }

    #[test]
    fn test_close_with_settings_open_persists_them() {
        let engine = Arc::new(MemoryEngine::new());
        let (mut editor, dir) = editor(engine);

        let _ = editor.update(Message::OpenSettings);
        let _ = editor.update(Message::Dialog(DialogMessage::Settings(
            SettingsMessage::LatencyChanged(512),
        )));
        let _ = editor.update(Message::CloseRequested(window::Id::unique()));

        assert!(!editor.dialogs.is_open());
        assert_eq!(editor.settings.latency_samples, 512);
        let saved: EditorSettings = load_config(&dir.path().join("settings.yaml"));
        assert_eq!(saved.latency_samples, 512);
    }

    #[test]
    fn test_duplicate_array_name_leaves_first_array_intact() {
        let engine = Arc::new(MemoryEngine::new());
        let (mut editor, _dir) = editor(engine.clone());

        for _ in 0..2 {
            let _ = editor.update(Message::Menu(ObjectMenuMessage::Picked(ObjectMenuItem::Array)));
            let _ = editor.update(Message::Dialog(DialogMessage::Array(ArrayDialogMessage::Confirm)));
            let _ = editor.update(Message::Dialog(DialogMessage::Finish));
            engine.write_array("array1", 0, &[0.5]).ok();
        }

        assert_eq!(editor.current().objects.len(), 1);
        let values = engine.read_array("array1").unwrap();
        assert_eq!(values.len(), 100);
        assert_eq!(values[0], 0.5);
    }
}
