//! Presentation surface seam and the headless surface used off-screen

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use wrath_core::{Result, WindowSettings, WrathError};
use wrath_render::FrameCapture;
use wrath_runtime::InputEvent;

/// What the windowing side reports between frames
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Input(InputEvent),
    /// The drawable area changed size
    Resized { width: u32, height: u32 },
    /// The surface and its GPU context were recreated
    Reopened,
    CloseRequested,
}

/// A window (or stand-in) the scheduler presents frames to.
///
/// Errors returned from any method are fatal to the running session.
pub trait Surface {
    /// Drain events reported since the last poll
    fn poll_events(&mut self) -> Result<Vec<SurfaceEvent>>;

    /// True once the user or platform has asked the surface to close
    fn should_close(&self) -> bool;

    /// Swap buffers / present the finished frame
    fn present(&mut self) -> Result<()>;

    /// Read back the last presented frame
    fn capture(&mut self) -> Result<FrameCapture>;
}

struct HeadlessState {
    width: u32,
    height: u32,
    clear_color: [u8; 4],
    pending: VecDeque<SurfaceEvent>,
    close_requested: bool,
    presented: u64,
    frame_limit: Option<u64>,
    fail_next_present: Option<String>,
}

/// Off-screen surface. Clones share state, so a test (or the embedding code)
/// can keep a handle to inject events after the scheduler has taken the
/// surface.
#[derive(Clone)]
pub struct HeadlessSurface {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            state: Rc::new(RefCell::new(HeadlessState {
                width,
                height,
                clear_color: [0, 0, 0, 255],
                pending: VecDeque::new(),
                close_requested: false,
                presented: 0,
                frame_limit: None,
                fail_next_present: None,
            })),
        }
    }

    pub fn from_settings(settings: &WindowSettings) -> Self {
        Self::new(settings.width, settings.height)
    }

    /// Ask to close once `frames` frames have been presented
    pub fn with_frame_limit(self, frames: u64) -> Self {
        self.state.borrow_mut().frame_limit = Some(frames);
        self
    }

    pub fn set_clear_color(&self, color: [u8; 4]) {
        self.state.borrow_mut().clear_color = color;
    }

    /// Queue an event for the next poll. Resizes take effect immediately.
    pub fn push_event(&self, event: SurfaceEvent) {
        let mut state = self.state.borrow_mut();
        if let SurfaceEvent::Resized { width, height } = event {
            state.width = width;
            state.height = height;
        }
        state.pending.push_back(event);
    }

    pub fn request_close(&self) {
        self.push_event(SurfaceEvent::CloseRequested);
    }

    /// Make the next `present` fail, as a lost device would
    pub fn fail_next_present(&self, reason: &str) {
        self.state.borrow_mut().fail_next_present = Some(reason.to_string());
    }

    pub fn presented(&self) -> u64 {
        self.state.borrow().presented
    }

    pub fn size(&self) -> (u32, u32) {
        let state = self.state.borrow();
        (state.width, state.height)
    }
}

impl Surface for HeadlessSurface {
    fn poll_events(&mut self) -> Result<Vec<SurfaceEvent>> {
        let mut state = self.state.borrow_mut();
        let events: Vec<SurfaceEvent> = state.pending.drain(..).collect();
        if events.contains(&SurfaceEvent::CloseRequested) {
            state.close_requested = true;
        }
        Ok(events)
    }

    fn should_close(&self) -> bool {
        let state = self.state.borrow();
        state.close_requested || state.frame_limit.is_some_and(|limit| state.presented >= limit)
    }

    fn present(&mut self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if let Some(reason) = state.fail_next_present.take() {
            return Err(WrathError::Surface(reason));
        }
        state.presented += 1;
        Ok(())
    }

    fn capture(&mut self) -> Result<FrameCapture> {
        let state = self.state.borrow();
        let pixel_count = state.width as usize * state.height as usize;
        let pixels = state.clear_color.repeat(pixel_count);
        FrameCapture::new(state.width, state.height, pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_limit_requests_close() {
        let mut surface = HeadlessSurface::new(4, 4).with_frame_limit(2);
        assert!(!surface.should_close());
        surface.present().unwrap();
        surface.present().unwrap();
        assert!(surface.should_close());
        assert_eq!(surface.presented(), 2);
    }

    #[test]
    fn test_events_are_drained_in_order() {
        let handle = HeadlessSurface::new(4, 4);
        let mut surface = handle.clone();
        handle.push_event(SurfaceEvent::Resized {
            width: 8,
            height: 2,
        });
        handle.request_close();

        let events = surface.poll_events().unwrap();
        assert_eq!(events.len(), 2);
        assert!(surface.should_close());
        assert_eq!(handle.size(), (8, 2));
        assert!(surface.poll_events().unwrap().is_empty());
    }

    #[test]
    fn test_present_failure_is_reported_once() {
        let mut surface = HeadlessSurface::new(1, 1);
        surface.fail_next_present("device lost");
        assert!(matches!(surface.present(), Err(WrathError::Surface(_))));
        assert!(surface.present().is_ok());
    }

    #[test]
    fn test_capture_matches_surface_size() {
        let mut surface = HeadlessSurface::new(3, 2);
        surface.set_clear_color([10, 20, 30, 255]);
        let capture = surface.capture().unwrap();
        assert_eq!((capture.width(), capture.height()), (3, 2));
        assert_eq!(&capture.pixels()[..4], &[10, 20, 30, 255]);
    }
}
