//! Fixed-timestep frame scheduler
//!
//! Each iteration polls the surface, converts elapsed time into owed ticks
//! and runs them, then renders one frame if the frame cap permits it. Ticks
//! run before the frame that shows their effects, so drawables submitted
//! while ticking are drawn by the same iteration's flush.

use crate::context::GameContext;
use crate::hooks::Game;
use crate::surface::{Surface, SurfaceEvent};
use std::path::PathBuf;
use std::thread::JoinHandle;
use wrath_core::{GameConfig, Result, WindowSettings, WrathError};
use wrath_render::{save_screenshot, BatchStats, RenderBackend};
use wrath_runtime::{
    FpsCounter, FrameLimiter, InputCadence, LifecycleEvent, TickClock, TimeSource,
};

const DEFAULT_TITLE: &str = "Wrath";

/// Scheduler lifecycle: `Stopped -> Running -> Stopping -> Stopped`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running,
    Stopping,
}

/// Drives a `Game` at a fixed tick rate and renders frames as fast as the
/// frame cap allows.
pub struct FrameScheduler<R> {
    ctx: GameContext<R>,
    game: Box<dyn Game<R>>,
    backend: Box<dyn RenderBackend<R>>,
    time: Box<dyn TimeSource>,
    surface: Option<Box<dyn Surface>>,
    title: String,

    clock: TickClock,
    cadence: InputCadence,
    limiter: FrameLimiter,
    fps: FpsCounter,

    state: SchedulerState,
    frames: u64,
    last_batch: BatchStats,
    screenshot_writers: Vec<JoinHandle<Result<PathBuf>>>,
}

impl<R: 'static> FrameScheduler<R> {
    pub fn new<G, B, T>(config: GameConfig, game: G, backend: B, time: T) -> Self
    where
        G: Game<R> + 'static,
        B: RenderBackend<R> + 'static,
        T: TimeSource + 'static,
    {
        let config = config.sanitized();
        let now = time.now();
        Self {
            clock: TickClock::new(config.tick_rate, now),
            cadence: InputCadence::new(config.tick_rate, config.persistent_input_cadence_hz),
            limiter: FrameLimiter::new(config.max_frames_per_second),
            fps: FpsCounter::new(config.tick_rate),
            ctx: GameContext::new(config),
            game: Box::new(game),
            backend: Box::new(backend),
            time: Box::new(time),
            surface: None,
            title: DEFAULT_TITLE.to_string(),
            state: SchedulerState::Stopped,
            frames: 0,
            last_batch: BatchStats::default(),
            screenshot_writers: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    /// Save the config to `path` on teardown
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ctx.set_config_path(Some(path.into()));
        self
    }

    pub fn context(&self) -> &GameContext<R> {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut GameContext<R> {
        &mut self.ctx
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Frames rendered since the session started
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Ticks run since the session started
    pub fn ticks(&self) -> u64 {
        self.clock.total_ticks()
    }

    pub fn fps(&self) -> u32 {
        self.fps.fps()
    }

    /// Counts from the most recent batch flush
    pub fn last_batch(&self) -> BatchStats {
        self.last_batch
    }

    /// Run a whole session: open the surface, loop until it closes or a stop
    /// is requested, then stop and tear down.
    ///
    /// A surface that fails to open, or fails while running, ends the session
    /// with an error after a best-effort teardown.
    pub fn run<S, F>(&mut self, opener: F) -> Result<()>
    where
        S: Surface + 'static,
        F: FnOnce(&WindowSettings) -> Result<S>,
    {
        if self.state != SchedulerState::Stopped {
            return Err(WrathError::Surface("scheduler is already running".into()));
        }

        let settings = self.ctx.config.window_settings(&self.title);
        let surface = match opener(&settings) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to open surface: {e}");
                self.teardown();
                return Err(e);
            }
        };

        let outcome = self.start(surface).and_then(|()| {
            while self.keep_running() && self.step()? {}
            Ok(())
        });
        if let Err(e) = &outcome {
            log::error!("Session failed: {e}");
        }

        let finished = self.finish();
        outcome.and(finished)
    }

    /// Take ownership of an open surface and begin a session.
    ///
    /// Resets timing from the current config and fires the open event. Use
    /// with `step` and `finish` to drive the loop externally.
    pub fn start(&mut self, surface: impl Surface + 'static) -> Result<()> {
        if self.state != SchedulerState::Stopped {
            return Err(WrathError::Surface("scheduler is already running".into()));
        }

        let config = self.ctx.config.clone().sanitized();
        let now = self.time.now();
        self.clock = TickClock::new(config.tick_rate, now);
        self.cadence = InputCadence::new(config.tick_rate, config.persistent_input_cadence_hz);
        self.limiter = FrameLimiter::new(config.max_frames_per_second);
        self.fps = FpsCounter::new(config.tick_rate);
        self.ctx.config = config;
        self.ctx.fps = 0;
        self.ctx.clear_stop();
        self.frames = 0;
        self.surface = Some(Box::new(surface));
        self.state = SchedulerState::Running;

        log::info!(
            "Starting '{}': {} ticks/s, input cadence {} Hz, frame cap {}",
            self.title,
            self.clock.tick_rate(),
            self.ctx.config.persistent_input_cadence_hz,
            match self.ctx.config.max_frames_per_second {
                0 => "off".to_string(),
                fps => format!("{fps} fps"),
            }
        );

        self.ctx.handlers.lifecycle.dispatch(&LifecycleEvent::Opened)?;
        self.game.on_open(&mut self.ctx)
    }

    /// Run one loop iteration. Returns false once the loop should end.
    pub fn step(&mut self) -> Result<bool> {
        if self.state != SchedulerState::Running {
            return Ok(false);
        }

        self.poll_surface()?;
        if !self.keep_running() {
            return Ok(false);
        }

        let now = self.time.now();
        self.clock.advance(now);
        while self.clock.consume_tick() {
            let tick = self.clock.total_ticks();
            self.run_tick(tick)?;
        }

        if self.limiter.permit(now) {
            self.render_frame()?;
        } else {
            // draws submitted for a frame that never happens are not carried over
            let dropped = self.ctx.batcher.pending();
            if dropped > 0 {
                log::debug!("Frame skipped, dropping {dropped} draw(s)");
                self.ctx.batcher.clear();
            }
            let wait = self
                .limiter
                .time_until_deadline(now)
                .min(self.clock.time_until_next_tick());
            if !wait.is_zero() {
                self.time.sleep(wait);
            }
        }

        Ok(self.keep_running())
    }

    /// Move to `Stopping` and fire the close event. No-op unless running.
    pub fn stop(&mut self) -> Result<()> {
        if self.state != SchedulerState::Running {
            return Ok(());
        }
        self.state = SchedulerState::Stopping;
        log::info!("Stopping after {} tick(s)", self.clock.total_ticks());

        self.game.on_close(&mut self.ctx);
        self.ctx.handlers.lifecycle.dispatch(&LifecycleEvent::Closing)
    }

    /// Stop (if running) and tear down (if not already stopped).
    pub fn finish(&mut self) -> Result<()> {
        let closed = self.stop();
        if self.state == SchedulerState::Stopping {
            self.teardown();
        }
        closed
    }

    fn keep_running(&self) -> bool {
        if self.ctx.stop_requested() {
            return false;
        }
        self.surface.as_ref().is_some_and(|surface| !surface.should_close())
    }

    fn poll_surface(&mut self) -> Result<()> {
        let Some(surface) = self.surface.as_mut() else {
            return Err(WrathError::Surface("no surface is open".into()));
        };
        for event in surface.poll_events()? {
            match event {
                SurfaceEvent::Input(input) => {
                    self.ctx.input.handle(&input);
                    self.ctx.handlers.input.dispatch(&input)?;
                }
                SurfaceEvent::Resized { width, height } => self.resize(width, height)?,
                SurfaceEvent::Reopened => {
                    log::info!("Surface recreated, reloading resources");
                    self.ctx.refresher.run();
                    self.ctx
                        .handlers
                        .lifecycle
                        .dispatch(&LifecycleEvent::Reopened)?;
                }
                SurfaceEvent::CloseRequested => log::info!("Close requested"),
            }
        }
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            log::debug!("Ignoring resize to {width}x{height}");
            return Ok(());
        }
        let config = &mut self.ctx.config;
        config.window_width = width;
        config.window_height = height;
        if config.resolution_is_window_size {
            config.resolution_width = width;
            config.resolution_height = height;
        }
        self.ctx
            .handlers
            .lifecycle
            .dispatch(&LifecycleEvent::Resized { width, height })
    }

    fn run_tick(&mut self, tick: u64) -> Result<()> {
        self.ctx
            .handlers
            .lifecycle
            .dispatch(&LifecycleEvent::Tick { tick })?;
        self.game.on_tick(&mut self.ctx, tick)?;
        if self.cadence.on_tick() {
            self.ctx.input.run_persistent();
        }
        self.fps.on_tick();
        self.ctx.fps = self.fps.fps();
        Ok(())
    }

    fn render_frame(&mut self) -> Result<()> {
        self.last_batch = self
            .ctx
            .batcher
            .flush(&self.ctx.resources, self.backend.as_mut())?;
        self.game
            .render(&mut self.ctx, self.clock.interpolation_alpha())?;

        let Some(surface) = self.surface.as_mut() else {
            return Err(WrathError::Surface("no surface is open".into()));
        };
        surface.present()?;
        self.frames += 1;
        self.fps.on_frame();

        self.write_screenshots();
        Ok(())
    }

    fn write_screenshots(&mut self) {
        if self.ctx.screenshots.is_empty() {
            return;
        }
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        self.screenshot_writers.retain(|writer| !writer.is_finished());
        for request in self.ctx.screenshots.drain(..) {
            match surface.capture() {
                Ok(capture) => self.screenshot_writers.push(save_screenshot(
                    capture,
                    &self.ctx.config.screenshot_dir,
                    &request.name,
                    request.format,
                )),
                Err(e) => log::error!("Failed to capture frame for '{}': {e}", request.name),
            }
        }
    }

    /// Release everything, persist the config, and return to `Stopped`.
    fn teardown(&mut self) {
        let released = self.ctx.trash.run();
        log::debug!("Teardown released {released} object(s)");
        self.ctx.batcher.clear();
        self.surface = None;

        for writer in self.screenshot_writers.drain(..) {
            if writer.join().is_err() {
                log::error!("Screenshot writer panicked");
            }
        }

        if let Some(path) = self.ctx.config_path.as_deref() {
            match self.ctx.config.save(path) {
                Ok(()) => log::debug!("Saved config to {}", path.display()),
                Err(e) => log::error!("Failed to save config to {}: {e}", path.display()),
            }
        }

        self.state = SchedulerState::Stopped;
        log::info!(
            "Stopped: {} tick(s), {} frame(s)",
            self.clock.total_ticks(),
            self.frames
        );
        log::logger().flush();
    }
}
