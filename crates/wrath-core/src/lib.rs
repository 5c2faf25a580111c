//! Wrath Core - Foundational types for the Wrath client runtime
//!
//! This crate provides the types every other Wrath crate depends on:
//! - `GameConfig` / `WindowSettings` - TOML-backed client configuration
//! - `ListenerId` - Handles returned by registration calls
//! - `Transform`, `Vec3` - Per-instance spatial data carried by draw requests
//! - Error types and Result alias

mod config;
mod error;
mod id;
mod types;

pub use config::{GameConfig, WindowSettings, WindowState};
pub use error::{Result, WrathError};
pub use id::ListenerId;
pub use types::{Transform, Vec3};
