//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and operations
//! - Packed buffers and interning collections
//! - Frame timing
//! - Profiling
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod time;
pub mod profiler;
pub mod logging;
