//! Wrath Client - frame scheduler and session plumbing
//!
//! This crate assembles the runtime pieces into a running session:
//! `FrameScheduler` drives a `Game` against a `Surface` and a render
//! backend, and `GameContext` is what the game registers listeners,
//! bindings, drawables, and lifecycle objects through.

mod context;
mod hooks;
mod scheduler;
mod surface;

pub use context::{GameContext, StopHandle};
pub use hooks::Game;
pub use scheduler::{FrameScheduler, SchedulerState};
pub use surface::{HeadlessSurface, Surface, SurfaceEvent};
