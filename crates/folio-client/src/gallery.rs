//! A page of lazily loaded images driven by scroll position.
//!
//! Each image gets its own [`LazyLoader`] over a polling watch. Scrolling
//! samples every loader against the current viewport; activated images are
//! fetched concurrently and marked loaded when the bytes arrive. A failed
//! fetch is only traced: the image keeps its placeholder.

use std::path::Path;

use folio_core::{
    BoundingBoxWatch, LazyLoader, LoaderState, Rect, ResourceRequest, WatchOptions,
};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fetcher::ResourceFetcher;

/// Layout box used when a manifest entry gives no dimensions.
pub const DEFAULT_BOX_WIDTH: u32 = 400;
pub const DEFAULT_BOX_HEIGHT: u32 = 300;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GalleryManifest {
    #[serde(default, rename = "image")]
    pub images: Vec<ManifestImage>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestImage {
    pub src: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Document offset of the image's top edge, in px.
    pub top: f64,
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub priority: bool,
}

impl ManifestImage {
    fn bounds(&self) -> Rect {
        Rect::new(
            self.left,
            self.top,
            f64::from(self.width.unwrap_or(DEFAULT_BOX_WIDTH)),
            f64::from(self.height.unwrap_or(DEFAULT_BOX_HEIGHT)),
        )
    }

    fn request(&self) -> ResourceRequest {
        ResourceRequest {
            src: self.src.clone(),
            width: self.width,
            height: self.height,
        }
    }
}

impl GalleryManifest {
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ImageStatus {
    pub src: String,
    pub title: Option<String>,
    #[serde(flatten)]
    pub state: LoaderState,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub loaded: usize,
    pub failed: usize,
    pub bytes: u64,
}

struct GalleryItem {
    title: Option<String>,
    loader: LazyLoader<BoundingBoxWatch>,
}

pub struct Gallery {
    items: Vec<GalleryItem>,
    viewport_width: f64,
    viewport_height: f64,
    scroll_y: f64,
}

impl Gallery {
    /// Mount every image in the manifest. Priority images activate at once.
    pub fn mount(
        manifest: &GalleryManifest,
        viewport_width: f64,
        viewport_height: f64,
        options: WatchOptions,
    ) -> Self {
        let items = manifest
            .images
            .iter()
            .map(|image| GalleryItem {
                title: image.title.clone(),
                loader: LazyLoader::create(
                    image.request(),
                    image.bounds(),
                    image.priority,
                    options,
                    BoundingBoxWatch::new(),
                ),
            })
            .collect();
        let mut gallery = Self {
            items,
            viewport_width,
            viewport_height,
            scroll_y: 0.0,
        };
        gallery.scroll_to(0.0);
        gallery
    }

    pub fn viewport(&self) -> Rect {
        Rect::new(0.0, self.scroll_y, self.viewport_width, self.viewport_height)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Move the viewport and sample every watch. Returns the indices of
    /// images activated by this scroll.
    pub fn scroll_to(&mut self, scroll_y: f64) -> Vec<usize> {
        self.scroll_y = scroll_y;
        let viewport = self.viewport();
        let activated: Vec<usize> = self
            .items
            .iter_mut()
            .enumerate()
            .filter_map(|(i, item)| item.loader.poll(&viewport).then_some(i))
            .collect();
        if !activated.is_empty() {
            tracing::debug!(scroll_y, count = activated.len(), "lazy images activated");
        }
        activated
    }

    /// Fetch everything that is activated but not yet requested.
    pub async fn load_pending<F: ResourceFetcher>(&mut self, fetcher: &F) -> LoadReport {
        let tickets: Vec<(usize, ResourceRequest)> = self
            .items
            .iter_mut()
            .enumerate()
            .filter_map(|(i, item)| item.loader.take_fetch().cloned().map(|r| (i, r)))
            .collect();
        if tickets.is_empty() {
            return LoadReport::default();
        }

        let results = join_all(tickets.iter().map(|(_, request)| fetcher.fetch(request))).await;

        let mut report = LoadReport::default();
        for ((index, request), result) in tickets.iter().zip(results) {
            match result {
                Ok(bytes) => {
                    self.items[*index].loader.mark_loaded();
                    report.loaded += 1;
                    report.bytes += bytes;
                }
                Err(e) => {
                    tracing::warn!("image {} failed to load, keeping placeholder: {e}", request.src);
                    report.failed += 1;
                }
            }
        }
        report
    }

    pub fn statuses(&self) -> Vec<ImageStatus> {
        self.items
            .iter()
            .map(|item| ImageStatus {
                src: item.loader.request().src.clone(),
                title: item.title.clone(),
                state: item.loader.state(),
            })
            .collect()
    }

    /// Unmount every image, releasing watches that never fired.
    pub fn dispose(&mut self) {
        for item in &mut self.items {
            item.loader.dispose();
        }
    }
}
