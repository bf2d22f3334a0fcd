//! # Core Engine Module
//!
//! Shared configuration used by every subsystem.
//!
//! ## Organization
//!
//! - **Config**: the [`EngineConfig`] tree and its per-subsystem sections

pub mod config;

pub use config::{
    CameraConfig,
    Config,
    ConfigError,
    EngineConfig,
    KeyboardConfig,
    PointerConfig,
    RenderConfig,
};
