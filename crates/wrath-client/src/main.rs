//! Wrath Client - headless demo session
//!
//! Runs a small demo game against an off-screen surface for a fixed number
//! of frames, then reports the measured frame rate.
//!
//! Usage:
//!   wrath-client [--config <path>] [--frames <n>] [--tick-rate <hz>] [--max-fps <n>] [key=value ...]

use anyhow::{Context, Result};
use clap::Parser;
use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;
use wrath_client::{FrameScheduler, Game, GameContext, HeadlessSurface, SurfaceEvent};
use wrath_core::{GameConfig, Transform, Vec3};
use wrath_render::{DrawRequest, ImageFormat, RenderBackend, ResourceKey};
use wrath_runtime::{
    ElementState, InputEvent, InputTrigger, KeyAction, KeyCode, LifecycleKind, Release,
    SystemTimeSource,
};

#[derive(Parser)]
#[command(name = "wrath-client")]
#[command(about = "Wrath client - run the demo session on a headless surface")]
struct Args {
    /// Path to the config file (written back on exit)
    #[arg(long, default_value = "game.toml")]
    config: PathBuf,

    /// Stop after this many rendered frames
    #[arg(long, default_value_t = 300)]
    frames: u64,

    /// Override the simulation tick rate
    #[arg(long)]
    tick_rate: Option<f64>,

    /// Override the frame cap (0 = uncapped)
    #[arg(long)]
    max_fps: Option<u32>,

    /// Save the final frame as a screenshot with this name
    #[arg(long)]
    screenshot: Option<String>,

    /// Config overrides, e.g. `vsync=false persistent_input_cadence_hz=10`
    overrides: Vec<String>,
}

/// Stand-in for an uploaded mesh
struct DemoMesh {
    vertices: u32,
}

/// Backend that only logs and counts what it is asked to do
#[derive(Default)]
struct LoggingBackend {
    binds: u64,
    draws: u64,
}

impl RenderBackend<DemoMesh> for LoggingBackend {
    fn bind(&mut self, key: ResourceKey, mesh: &DemoMesh) -> wrath_core::Result<()> {
        self.binds += 1;
        log::trace!("bind {key} ({} vertices)", mesh.vertices);
        Ok(())
    }

    fn draw(&mut self, key: ResourceKey, transform: &Transform) -> wrath_core::Result<()> {
        self.draws += 1;
        log::trace!("draw {key} at {:?}", transform.position);
        Ok(())
    }

    fn unbind(&mut self, key: ResourceKey) -> wrath_core::Result<()> {
        log::trace!("unbind {key}");
        Ok(())
    }
}

impl Drop for LoggingBackend {
    fn drop(&mut self) {
        log::debug!("Backend saw {} bind(s), {} draw(s)", self.binds, self.draws);
    }
}

/// Something holding resources that must go when the session closes
struct SoundBank {
    loaded: bool,
}

impl Release for SoundBank {
    fn release(&mut self) {
        if self.loaded {
            log::info!("Released sound bank");
            self.loaded = false;
        }
    }
}

struct DemoGame {
    frames: u64,
    rendered: u64,
    screenshot: Option<String>,
    crates: Option<ResourceKey>,
    barrel: Option<ResourceKey>,
    spin: f32,
    shots: Rc<Cell<u32>>,
    sounds: Rc<RefCell<SoundBank>>,
}

impl DemoGame {
    fn new(frames: u64, screenshot: Option<String>) -> Self {
        Self {
            frames,
            rendered: 0,
            screenshot,
            crates: None,
            barrel: None,
            spin: 0.0,
            shots: Rc::new(Cell::new(0)),
            sounds: Rc::new(RefCell::new(SoundBank { loaded: false })),
        }
    }
}

impl Game<DemoMesh> for DemoGame {
    fn on_open(&mut self, ctx: &mut GameContext<DemoMesh>) -> wrath_core::Result<()> {
        self.crates = Some(ctx.resources_mut().load("crate", DemoMesh { vertices: 24 }));
        self.barrel = Some(ctx.resources_mut().load("barrel", DemoMesh { vertices: 96 }));

        self.sounds.borrow_mut().loaded = true;
        ctx.register_for_cleanup(&self.sounds);

        let shots = self.shots.clone();
        ctx.bind_input(InputTrigger::Key(KeyCode::Space), KeyAction::HoldDown, move || {
            shots.set(shots.get() + 1);
        });

        let tick_rate = ctx.config().tick_rate.round().max(1.0) as u64;
        ctx.register_tick_listener(move |tick| {
            if tick % tick_rate == 0 {
                log::info!("{} second(s) simulated", tick / tick_rate);
            }
            Ok(())
        });
        ctx.register_lifecycle_listener(LifecycleKind::Closing, |_| {
            log::info!("Demo closing");
            Ok(())
        });
        Ok(())
    }

    fn on_tick(&mut self, ctx: &mut GameContext<DemoMesh>, _tick: u64) -> wrath_core::Result<()> {
        let (Some(crates), Some(barrel)) = (self.crates, self.barrel) else {
            return Ok(());
        };
        self.spin = (self.spin + 6.0) % 360.0;
        for i in 0..4 {
            let position = Vec3::new(i as f32 * 2.0, 0.0, 0.0);
            let spin = self.spin;
            ctx.submit_drawable(
                crates,
                DrawRequest::new(Transform::from_position(position))
                    .with_update(move |t| t.rotation.y = spin),
            );
        }
        ctx.submit_drawable(
            barrel,
            Transform::from_position(Vec3::new(0.0, 0.0, 4.0)).with_scale(Vec3::new(1.0, 1.5, 1.0)),
        );
        Ok(())
    }

    fn render(&mut self, ctx: &mut GameContext<DemoMesh>, _alpha: f64) -> wrath_core::Result<()> {
        self.rendered += 1;
        if self.rendered == self.frames {
            if let Some(name) = self.screenshot.take() {
                ctx.request_screenshot(&name, ImageFormat::Png);
            }
        }
        Ok(())
    }

    fn on_close(&mut self, ctx: &mut GameContext<DemoMesh>) {
        log::info!(
            "Rendered {} frame(s) at {} fps, {} shot(s) fired",
            self.rendered,
            ctx.fps(),
            self.shots.get()
        );
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = GameConfig::load_or_default(&args.config);
    if let Some(rate) = args.tick_rate {
        config.tick_rate = rate;
    }
    if let Some(fps) = args.max_fps {
        config.max_frames_per_second = fps;
    }
    config
        .apply_overrides(&args.overrides)
        .context("Failed to apply config overrides")?;

    let game = DemoGame::new(args.frames, args.screenshot);
    let mut scheduler =
        FrameScheduler::new(config, game, LoggingBackend::default(), SystemTimeSource::new())
            .with_title("Wrath Demo")
            .with_config_path(&args.config);

    let frames = args.frames;
    scheduler
        .run(|settings| {
            log::info!(
                "Opening {}x{} headless surface '{}'",
                settings.width,
                settings.height,
                settings.title
            );
            let surface = HeadlessSurface::from_settings(settings).with_frame_limit(frames);
            // hold the fire key for the whole session
            surface.push_event(SurfaceEvent::Input(InputEvent::Key {
                key: KeyCode::Space,
                state: ElementState::Pressed,
            }));
            Ok(surface)
        })
        .context("Session failed")?;

    println!(
        "{} frame(s), {} tick(s), {} fps",
        scheduler.frames(),
        scheduler.ticks(),
        scheduler.fps()
    );
    Ok(())
}
