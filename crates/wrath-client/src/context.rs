//! Everything the game and its listeners reach the runtime through.

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use wrath_core::{GameConfig, ListenerId, Result};
use wrath_render::{DrawRequest, ImageFormat, RenderBatcher, ResourceKey, ResourceTable};
use wrath_runtime::{
    InputBindings, InputEvent, InputKind, InputTrigger, KeyAction, LifecycleEvent, LifecycleKind,
    Refresher, Release, Reload, RootHandlers, TrashCollector,
};

/// Cloneable request to end the session after the current iteration.
///
/// Lets listeners and input callbacks, which cannot borrow the context,
/// stop the loop.
#[derive(Clone, Default)]
pub struct StopHandle(Rc<Cell<bool>>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.set(true);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.get()
    }

    fn reset(&self) {
        self.0.set(false);
    }
}

/// Screenshot queued for the end of the current frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ScreenshotRequest {
    pub name: String,
    pub format: ImageFormat,
}

/// Session state shared between the scheduler and the game: configuration,
/// root event handlers, input bindings, lifecycle registries, and the render
/// batch for the current frame. `R` is the backend's resource type.
pub struct GameContext<R> {
    pub(crate) config: GameConfig,
    pub(crate) config_path: Option<PathBuf>,
    pub(crate) handlers: RootHandlers,
    pub(crate) input: InputBindings,
    pub(crate) refresher: Rc<Refresher>,
    pub(crate) trash: Rc<TrashCollector>,
    pub(crate) batcher: RenderBatcher,
    pub(crate) resources: ResourceTable<R>,
    pub(crate) screenshots: Vec<ScreenshotRequest>,
    pub(crate) fps: u32,
    stop: StopHandle,
}

impl<R> GameContext<R> {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            config_path: None,
            handlers: RootHandlers::new(),
            input: InputBindings::new(),
            refresher: Rc::new(Refresher::new()),
            trash: Rc::new(TrashCollector::new()),
            batcher: RenderBatcher::new(),
            resources: ResourceTable::new(),
            screenshots: Vec::new(),
            fps: 0,
            stop: StopHandle::default(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut GameConfig {
        &mut self.config
    }

    /// Where the config is written back on teardown; `None` disables saving
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn set_config_path(&mut self, path: Option<PathBuf>) {
        self.config_path = path;
    }

    // ===== Listeners =====

    /// Called once per simulation tick with the tick number
    pub fn register_tick_listener<F>(&mut self, mut listener: F) -> ListenerId
    where
        F: FnMut(u64) -> Result<()> + 'static,
    {
        self.handlers
            .lifecycle
            .register(LifecycleKind::Tick, move |event| match event {
                LifecycleEvent::Tick { tick } => listener(*tick),
                _ => Ok(()),
            })
    }

    pub fn register_lifecycle_listener<F>(&mut self, kind: LifecycleKind, listener: F) -> ListenerId
    where
        F: FnMut(&LifecycleEvent) -> Result<()> + 'static,
    {
        self.handlers.lifecycle.register(kind, listener)
    }

    pub fn register_input_listener<F>(&mut self, kind: InputKind, listener: F) -> ListenerId
    where
        F: FnMut(&InputEvent) -> Result<()> + 'static,
    {
        self.handlers.input.register(kind, listener)
    }

    /// Remove a lifecycle or input listener
    pub fn unregister_listener(&mut self, id: ListenerId) -> bool {
        self.handlers.lifecycle.unregister(id) || self.handlers.input.unregister(id)
    }

    pub fn handlers_mut(&mut self) -> &mut RootHandlers {
        &mut self.handlers
    }

    // ===== Input =====

    pub fn bind_input<F>(&mut self, trigger: InputTrigger, action: KeyAction, callback: F)
    where
        F: FnMut() + 'static,
    {
        self.input.bind(trigger, action, callback);
    }

    pub fn unbind_input(&mut self, trigger: InputTrigger) -> bool {
        self.input.unbind(trigger)
    }

    pub fn input(&self) -> &InputBindings {
        &self.input
    }

    // ===== Lifecycle registries =====

    pub fn register_for_refresh<T: Reload + 'static>(&self, obj: &Rc<RefCell<T>>) {
        self.refresher.register(obj);
    }

    pub fn unregister_refresh<T: Reload + 'static>(&self, obj: &Rc<RefCell<T>>) -> usize {
        self.refresher.unregister(obj)
    }

    pub fn register_for_cleanup<T: Release + 'static>(&self, obj: &Rc<RefCell<T>>) {
        self.trash.register(obj);
    }

    pub fn unregister_cleanup<T: Release + 'static>(&self, obj: &Rc<RefCell<T>>) -> usize {
        self.trash.unregister(obj)
    }

    /// Shared handle to the cleanup registry, for objects that unregister themselves
    pub fn trash_collector(&self) -> Rc<TrashCollector> {
        self.trash.clone()
    }

    pub fn refresher(&self) -> Rc<Refresher> {
        self.refresher.clone()
    }

    // ===== Rendering =====

    /// Queue one instance for this iteration's flush
    pub fn submit_drawable(&mut self, key: ResourceKey, request: impl Into<DrawRequest>) {
        self.batcher.submit(key, request);
    }

    pub fn resources(&self) -> &ResourceTable<R> {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut ResourceTable<R> {
        &mut self.resources
    }

    /// Capture the frame being presented and write it to the screenshot directory
    pub fn request_screenshot(&mut self, name: &str, format: ImageFormat) {
        self.screenshots.push(ScreenshotRequest {
            name: name.to_string(),
            format,
        });
    }

    /// Frames rendered during the last whole second of ticks
    pub fn fps(&self) -> u32 {
        self.fps
    }

    // ===== Session =====

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// End the session after the current iteration
    pub fn request_stop(&self) {
        self.stop.stop();
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.is_stopped()
    }

    pub(crate) fn clear_stop(&self) {
        self.stop.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wrath_core::WrathError;

    #[test]
    fn test_tick_listener_receives_tick_numbers() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut ctx = GameContext::<()>::new(GameConfig::default());
        ctx.register_tick_listener(move |tick| {
            sink.borrow_mut().push(tick);
            Ok(())
        });

        for tick in 1..=3 {
            ctx.handlers.lifecycle.dispatch(&LifecycleEvent::Tick { tick }).unwrap();
        }
        ctx.handlers.lifecycle.dispatch(&LifecycleEvent::Opened).unwrap();
        assert_eq!(*seen.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn test_unregister_listener_covers_both_categories() {
        let mut ctx = GameContext::<()>::new(GameConfig::default());
        let lifecycle = ctx.register_lifecycle_listener(LifecycleKind::Closing, |_| Ok(()));
        let input = ctx.register_input_listener(InputKind::Key, |_| {
            Err(WrathError::Listener("unused".into()))
        });

        assert!(ctx.unregister_listener(input));
        assert!(ctx.unregister_listener(lifecycle));
        assert!(!ctx.unregister_listener(lifecycle));
    }

    #[test]
    fn test_stop_handle_is_shared() {
        let ctx = GameContext::<()>::new(GameConfig::default());
        let handle = ctx.stop_handle();
        assert!(!ctx.stop_requested());
        handle.stop();
        assert!(ctx.stop_requested());
        ctx.clear_stop();
        assert!(!handle.is_stopped());
    }

    #[test]
    fn test_submitted_drawables_wait_for_flush() {
        let mut ctx = GameContext::new(GameConfig::default());
        let key = ctx.resources_mut().load("crate", 7u32);
        ctx.submit_drawable(key, wrath_core::Transform::IDENTITY);
        ctx.submit_drawable(key, wrath_core::Transform::IDENTITY);
        assert_eq!(ctx.batcher.pending(), 2);
        assert_eq!(ctx.resources().get(key), Some(&7));
    }
}
