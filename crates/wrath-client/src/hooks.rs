//! Game hooks called by the frame scheduler

use crate::context::GameContext;
use wrath_core::Result;

/// The game driven by a `FrameScheduler`.
///
/// Every hook has a no-op default. Errors returned from `on_open`, `on_tick`
/// or `render` end the session: the scheduler stops, tears down, and
/// returns the error from `run`.
pub trait Game<R> {
    /// Called once after the surface opens, before the first tick
    fn on_open(&mut self, _ctx: &mut GameContext<R>) -> Result<()> {
        Ok(())
    }

    /// Called at the fixed tick rate, after the tick listeners
    fn on_tick(&mut self, _ctx: &mut GameContext<R>, _tick: u64) -> Result<()> {
        Ok(())
    }

    /// Called once per rendered frame after the batch flush and before present.
    /// `alpha` is the fraction of the next tick already elapsed. Drawables
    /// submitted here are drawn by the next frame's flush.
    fn render(&mut self, _ctx: &mut GameContext<R>, _alpha: f64) -> Result<()> {
        Ok(())
    }

    /// Called once when the session stops, before the close event
    fn on_close(&mut self, _ctx: &mut GameContext<R>) {}
}
