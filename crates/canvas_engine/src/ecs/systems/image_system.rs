//! Image system
//!
//! Hands out [`ImageId`]s on request and loads images in the background
//! through an [`ImageLoader`]. Completed loads arrive over a channel and are
//! drained once per frame; a name is loaded at most once. Failures are
//! logged with the image name and stay failed: there is no retry.

use std::collections::{HashMap, HashSet};
use std::sync::mpsc::{self, Receiver, Sender};

use crate::assets::{AssetError, ImageData, ImageId, ImageLoadResult, ImageLoader};
use crate::foundation::collections::ItemCache;

/// Image requests, loads and lookups
pub struct ImageSystem {
    cache: ItemCache<ImageData>,
    sources: HashMap<String, String>,
    loader: Box<dyn ImageLoader>,
    sender: Sender<ImageLoadResult>,
    receiver: Receiver<ImageLoadResult>,
    in_flight: HashSet<String>,
    just_loaded: bool,
}

impl std::fmt::Debug for ImageSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageSystem")
            .field("images", &self.cache.len())
            .field("in_flight", &self.in_flight.len())
            .field("just_loaded", &self.just_loaded)
            .finish()
    }
}

impl ImageSystem {
    /// Create with a name -> source map and a loader
    pub fn new(sources: HashMap<String, String>, loader: Box<dyn ImageLoader>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            cache: ItemCache::new(),
            sources,
            loader,
            sender,
            receiver,
            in_flight: HashSet::new(),
            just_loaded: false,
        }
    }

    /// Register or replace the source of an image name
    ///
    /// Takes effect for names that have not been requested yet.
    pub fn add_source(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.sources.insert(name.into(), source.into());
    }

    /// Id for an image, starting its load on the first request
    pub fn request(&mut self, name: &str) -> ImageId {
        let known = self.cache.id_of(name).is_some();
        let id = ImageId(self.cache.reserve(name));
        if known {
            return id;
        }

        match self.sources.get(name) {
            Some(source) => {
                log::debug!("Requesting image '{}' from {}", name, source);
                self.in_flight.insert(name.to_string());
                self.loader.load(name, source, self.sender.clone());
            }
            None => {
                log::error!("{}", AssetError::UnknownSource(name.to_string()));
                self.cache.mark_failed(name);
            }
        }
        id
    }

    /// Drain completed loads; returns true if any image became available
    pub fn update(&mut self) -> bool {
        let mut loaded = false;
        while let Ok((name, result)) = self.receiver.try_recv() {
            self.in_flight.remove(&name);
            match result {
                Ok(image) => {
                    log::info!("Loaded image '{}' ({}x{})", name, image.width, image.height);
                    loaded |= self.cache.insert(&name, image);
                }
                Err(error) => {
                    log::error!("Image '{}' failed to load: {}", error.asset_name(), error);
                    self.cache.mark_failed(&name);
                }
            }
        }
        self.just_loaded = loaded;
        loaded
    }

    /// True for the frame in which at least one image finished loading
    pub fn just_loaded(&self) -> bool {
        self.just_loaded
    }

    /// Loaded image by id
    pub fn get(&self, id: ImageId) -> Option<&ImageData> {
        self.cache.get(id.0)
    }

    /// Whether `id` was handed out since the last clear
    pub fn is_known(&self, id: ImageId) -> bool {
        self.cache.contains_id(id.0)
    }

    /// Id previously handed out for a name
    pub fn id_of(&self, name: &str) -> Option<ImageId> {
        self.cache.id_of(name).map(ImageId)
    }

    /// Whether the image has loaded
    pub fn is_loaded(&self, name: &str) -> bool {
        self.cache.is_loaded(name)
    }

    /// Whether the image failed for good
    pub fn is_failed(&self, name: &str) -> bool {
        self.cache.is_failed(name)
    }

    /// Loads still outstanding
    pub fn pending_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Forget all images; loads still in flight are dropped on arrival
    pub fn clear(&mut self) {
        self.cache.clear();
        self.in_flight.clear();
        let (sender, receiver) = mpsc::channel();
        self.sender = sender;
        self.receiver = receiver;
        self.just_loaded = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryImageLoader;

    fn system() -> ImageSystem {
        let loader = MemoryImageLoader::new()
            .with_image("tiles/grass.png", ImageData::solid_color("grass", 2, 2, [0, 255, 0, 255]));
        let sources = HashMap::from([
            ("grass".to_string(), "tiles/grass.png".to_string()),
            ("stone".to_string(), "tiles/stone.png".to_string()),
        ]);
        ImageSystem::new(sources, Box::new(loader))
    }

    #[test]
    fn test_request_is_stable_and_loads_once() {
        let mut images = system();
        let id = images.request("grass");
        assert_eq!(images.request("grass"), id);
        assert!(images.get(id).is_none());

        assert!(images.update());
        assert!(images.just_loaded());
        assert_eq!(images.get(id).map(|image| image.width), Some(2));

        assert!(!images.update());
        assert!(!images.just_loaded());
    }

    #[test]
    fn test_failures_stay_failed() {
        let mut images = system();
        let stone = images.request("stone");
        assert!(!images.update());
        assert!(images.is_failed("stone"));
        assert!(images.get(stone).is_none());

        // unknown name fails immediately, without a load
        images.request("lava");
        assert!(images.is_failed("lava"));
        assert_eq!(images.pending_count(), 0);
    }
}
