//! Wrath Render - Draw batching over an abstract GPU backend
//!
//! This crate groups each frame's drawables by the resource they share so
//! every resource is bound once per frame. Resources live in a
//! `ResourceTable` arena and are addressed by `ResourceKey`; the actual GPU
//! work goes through the `RenderBackend` trait. Frame captures are encoded
//! to disk off the frame thread.

mod batcher;
mod capture;
mod resource;

pub use batcher::{BatchStats, DrawRequest, RenderBackend, RenderBatcher};
pub use capture::{save_screenshot, FrameCapture, ImageFormat};
pub use resource::{ResourceKey, ResourceTable};
