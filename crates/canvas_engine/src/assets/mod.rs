//! Asset management system
//!
//! Only images are loaded by the engine. Each image is addressed by a
//! small [`ImageId`] handed out when the name is first requested, before
//! the pixels exist.

pub mod image_loader;

pub use image_loader::{FileImageLoader, ImageData, ImageLoadResult, ImageLoader, MemoryImageLoader};

use thiserror::Error;

/// Small integer handle to a (possibly not yet loaded) image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub u32);

/// Asset errors
///
/// Every variant carries the name of the asset it concerns.
#[derive(Error, Debug)]
pub enum AssetError {
    /// Source could not be read
    #[error("Failed to load '{name}': {reason}")]
    LoadFailed {
        /// Asset name
        name: String,
        /// What went wrong
        reason: String,
    },

    /// Bytes were read but could not be decoded
    #[error("Failed to decode '{name}': {source}")]
    Decode {
        /// Asset name
        name: String,
        /// Decoder error
        #[source]
        source: image::ImageError,
    },

    /// No source is registered for this name
    #[error("No source registered for '{0}'")]
    UnknownSource(String),
}

impl AssetError {
    /// Name of the asset this error concerns
    pub fn asset_name(&self) -> &str {
        match self {
            Self::LoadFailed { name, .. } | Self::Decode { name, .. } => name,
            Self::UnknownSource(name) => name,
        }
    }
}
