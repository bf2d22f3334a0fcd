//! Image decoding and loaders
//!
//! Loaders run asynchronously from the engine's point of view: `load`
//! returns at once and the result arrives later over a channel, tagged with
//! the image name so failures stay attributable.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use crate::assets::AssetError;

/// Completed load: image name plus the decoded image or the reason it failed
pub type ImageLoadResult = (String, Result<ImageData, AssetError>);

/// Decoded RGBA image
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    /// Name the image was requested under
    pub name: String,
    /// Raw RGBA pixel data
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl ImageData {
    /// Decode an image file
    pub fn from_file(name: &str, path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        log::debug!("Loading image '{}' from {:?}", name, path);

        let bytes = std::fs::read(path).map_err(|e| AssetError::LoadFailed {
            name: name.to_string(),
            reason: format!("{}: {e}", path.display()),
        })?;
        Self::from_bytes(name, &bytes)
    }

    /// Decode an in-memory encoded image
    pub fn from_bytes(name: &str, bytes: &[u8]) -> Result<Self, AssetError> {
        let decoded = image::load_from_memory(bytes).map_err(|source| AssetError::Decode {
            name: name.to_string(),
            source,
        })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        log::debug!("Decoded image '{}' ({}x{})", name, width, height);

        Ok(Self { name: name.to_string(), data: rgba.into_raw(), width, height })
    }

    /// Solid color image, handy for placeholders and tests
    pub fn solid_color(name: &str, width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = (width * height) as usize;
        Self {
            name: name.to_string(),
            data: color.repeat(pixel_count),
            width,
            height,
        }
    }

    /// Size of the pixel data in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

/// Source of images for the image system
pub trait ImageLoader {
    /// Start loading `source` under `name`; the result goes to `completion`
    fn load(&self, name: &str, source: &str, completion: Sender<ImageLoadResult>);
}

/// Loads image files on a background thread, resolving sources against a base directory
#[derive(Debug, Clone, Default)]
pub struct FileImageLoader {
    base_dir: PathBuf,
}

impl FileImageLoader {
    /// Loader resolving relative sources against `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }
}

impl ImageLoader for FileImageLoader {
    fn load(&self, name: &str, source: &str, completion: Sender<ImageLoadResult>) {
        let name = name.to_string();
        let path = self.base_dir.join(source);
        std::thread::spawn(move || {
            let result = ImageData::from_file(&name, &path);
            if completion.send((name, result)).is_err() {
                log::debug!("Image system gone before {:?} finished loading", path);
            }
        });
    }
}

/// Serves pre-decoded images keyed by source; completes immediately
#[derive(Debug, Clone, Default)]
pub struct MemoryImageLoader {
    images: HashMap<String, ImageData>,
}

impl MemoryImageLoader {
    /// Empty loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an image under a source key
    pub fn with_image(mut self, source: impl Into<String>, image: ImageData) -> Self {
        self.images.insert(source.into(), image);
        self
    }
}

impl ImageLoader for MemoryImageLoader {
    fn load(&self, name: &str, source: &str, completion: Sender<ImageLoadResult>) {
        let result = self
            .images
            .get(source)
            .map(|image| ImageData { name: name.to_string(), ..image.clone() })
            .ok_or_else(|| AssetError::UnknownSource(name.to_string()));
        let _ = completion.send((name.to_string(), result));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn test_solid_color_image() {
        let img = ImageData::solid_color("red", 4, 4, [255, 0, 0, 255]);
        assert_eq!(img.width, 4);
        assert_eq!(img.size_bytes(), 4 * 4 * 4);
        assert_eq!(&img.data[0..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_decode_error_names_asset() {
        let err = ImageData::from_bytes("broken", b"not a png").unwrap_err();
        assert_eq!(err.asset_name(), "broken");
        assert!(matches!(err, AssetError::Decode { .. }));
    }

    #[test]
    fn test_file_loader_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tile.png");
        image::RgbaImage::from_pixel(2, 3, image::Rgba([1, 2, 3, 255]))
            .save(&path)
            .unwrap();

        let loader = FileImageLoader::new(dir.path());
        let (sender, receiver) = mpsc::channel();
        loader.load("tile", "tile.png", sender.clone());
        loader.load("missing", "missing.png", sender);

        let mut results: Vec<_> = (0..2)
            .map(|_| receiver.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        results.sort_by(|a, b| a.0.cmp(&b.0));

        let (name, missing) = &results[0];
        assert_eq!(name, "missing");
        assert!(matches!(missing, Err(AssetError::LoadFailed { .. })));

        let (name, tile) = &results[1];
        assert_eq!(name, "tile");
        let tile = tile.as_ref().unwrap();
        assert_eq!((tile.width, tile.height), (2, 3));
        assert_eq!(&tile.data[0..4], &[1, 2, 3, 255]);
    }

    #[test]
    fn test_memory_loader_unknown_source() {
        let loader = MemoryImageLoader::new()
            .with_image("a.png", ImageData::solid_color("a", 1, 1, [0; 4]));
        let (sender, receiver) = mpsc::channel();
        loader.load("grass", "a.png", sender.clone());
        loader.load("stone", "b.png", sender);

        let (name, result) = receiver.recv().unwrap();
        assert_eq!(name, "grass");
        assert_eq!(result.unwrap().name, "grass");
        let (name, result) = receiver.recv().unwrap();
        assert_eq!(name, "stone");
        assert!(matches!(result, Err(AssetError::UnknownSource(_))));
    }
}
