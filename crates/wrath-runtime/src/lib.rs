//! Wrath Runtime - Frame scheduling building blocks
//!
//! Provides the pieces the client's frame scheduler is assembled from:
//! - `TickClock` - fixed-timestep accumulator converting elapsed time into ticks
//! - `InputCadence` - divides the tick rate down to the held-input repeat rate
//! - `FrameLimiter` - drift-free frame deadlines for an optional fps cap
//! - `FpsCounter` - frames per second sampled in tick space
//! - `EventFanout` / `RootHandlers` - per-kind listener dispatch for lifecycle and input events
//! - `Refresher` / `TrashCollector` - weak registries run on surface reopen and close
//! - `InputBindings` - key and mouse bindings with held-down repeat
//! - `TimeSource` - monotonic clock seam, with a manual source for tests

mod cadence;
mod clock;
mod event;
mod fanout;
mod fps;
mod input;
mod lifecycle;
mod limiter;
mod time;

pub use cadence::InputCadence;
pub use clock::TickClock;
pub use event::{FanoutEvent, InputEvent, InputKind, LifecycleEvent, LifecycleKind};
pub use fanout::{EventFanout, FailurePolicy, RootHandlers};
pub use fps::FpsCounter;
pub use input::{InputBindings, InputTrigger, KeyAction};
pub use lifecycle::{Refresher, Release, Reload, TrashCollector};
pub use limiter::FrameLimiter;
pub use time::{ManualTimeSource, SystemTimeSource, TimeSource};

// Re-exported so callers can build input events without naming winit directly
pub use winit::event::{ElementState, MouseButton};
pub use winit::keyboard::KeyCode;
