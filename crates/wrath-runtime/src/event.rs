//! Lifecycle and input events routed through the root handlers

use std::fmt::Debug;
use std::hash::Hash;
use winit::event::{ElementState, MouseButton};
use winit::keyboard::KeyCode;

/// An event that can be fanned out to listeners registered per kind.
pub trait FanoutEvent {
    type Kind: Copy + Eq + Hash + Debug;

    fn kind(&self) -> Self::Kind;
}

/// Window/session transitions and the simulation tick
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    /// The surface opened and the loop is about to start
    Opened,
    /// One simulation tick; `tick` counts from 1
    Tick { tick: u64 },
    /// The rendering resolution changed
    Resized { width: u32, height: u32 },
    /// The surface was recreated; GPU-side state has been reloaded
    Reopened,
    /// The client is shutting down
    Closing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleKind {
    Opened,
    Tick,
    Resized,
    Reopened,
    Closing,
}

impl FanoutEvent for LifecycleEvent {
    type Kind = LifecycleKind;

    fn kind(&self) -> LifecycleKind {
        match self {
            LifecycleEvent::Opened => LifecycleKind::Opened,
            LifecycleEvent::Tick { .. } => LifecycleKind::Tick,
            LifecycleEvent::Resized { .. } => LifecycleKind::Resized,
            LifecycleEvent::Reopened => LifecycleKind::Reopened,
            LifecycleEvent::Closing => LifecycleKind::Closing,
        }
    }
}

/// Raw input reported by the windowing collaborator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Key { key: KeyCode, state: ElementState },
    MouseButton { button: MouseButton, state: ElementState },
    CursorMoved { x: f64, y: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    Key,
    MouseButton,
    CursorMoved,
}

impl FanoutEvent for InputEvent {
    type Kind = InputKind;

    fn kind(&self) -> InputKind {
        match self {
            InputEvent::Key { .. } => InputKind::Key,
            InputEvent::MouseButton { .. } => InputKind::MouseButton,
            InputEvent::CursorMoved { .. } => InputKind::CursorMoved,
        }
    }
}
