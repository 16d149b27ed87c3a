//! Viewport-gated deferred resource loading.
//!
//! A [`LazyLoader`] owns one element's proximity watch. Non-priority loaders
//! stay dormant until the first qualifying intersection, then tear the watch
//! down and hand out a single fetch ticket. Priority loaders skip the watch
//! entirely. Until the host reports the resource as loaded, the render plan
//! keeps a placeholder on screen; a load that never completes simply leaves
//! the placeholder there.

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::watch::{BoundingBoxWatch, IntersectionEntry, ProximityWatch, WatchOptions};

/// The resource a lazy element will eventually fetch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequest {
    pub src: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl ResourceRequest {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            width: None,
            height: None,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// `width / height`, reserved before load so the layout does not shift.
    pub fn aspect_ratio(&self) -> Option<f64> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some(w as f64 / h as f64),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderState {
    pub observed: bool,
    pub activated: bool,
    pub loaded: bool,
    pub priority: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadingHint {
    Eager,
    Lazy,
}

/// What the container should draw for this element right now.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderPlan<'a> {
    pub placeholder: bool,
    /// Only present once the loader is activated.
    pub src: Option<&'a str>,
    pub loading: LoadingHint,
    /// Resource opacity; the cross-fade goes 0.0 -> 1.0 on load.
    pub opacity: f64,
    pub aspect_ratio: Option<f64>,
}

#[derive(Debug)]
pub struct LazyLoader<W: ProximityWatch> {
    request: ResourceRequest,
    threshold: f64,
    state: LoaderState,
    fetch_issued: bool,
    disposed: bool,
    watch: W,
}

impl<W: ProximityWatch> LazyLoader<W> {
    /// Mount a loader for the element occupying `target`.
    pub fn create(
        request: ResourceRequest,
        target: Rect,
        priority: bool,
        options: WatchOptions,
        mut watch: W,
    ) -> Self {
        let mut state = LoaderState {
            priority,
            activated: priority,
            ..LoaderState::default()
        };
        if !priority {
            watch.observe(target, options);
            state.observed = true;
        }
        Self {
            request,
            threshold: options.threshold,
            state,
            fetch_issued: false,
            disposed: false,
            watch,
        }
    }

    pub fn state(&self) -> LoaderState {
        self.state
    }

    pub fn request(&self) -> &ResourceRequest {
        &self.request
    }

    pub fn watch(&self) -> &W {
        &self.watch
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Feed one observation. Returns true only for the event that activated
    /// the loader; anything after the watch is torn down is ignored.
    pub fn on_intersection(&mut self, entry: &IntersectionEntry) -> bool {
        if !self.state.observed || !entry.qualifies(self.threshold) {
            return false;
        }
        self.state.activated = true;
        self.release_watch();
        true
    }

    /// Hand out the fetch exactly once, after activation.
    pub fn take_fetch(&mut self) -> Option<&ResourceRequest> {
        if !self.state.activated || self.fetch_issued || self.disposed {
            return None;
        }
        self.fetch_issued = true;
        Some(&self.request)
    }

    /// The resource finished loading. No effect before activation or after disposal.
    pub fn mark_loaded(&mut self) -> bool {
        if !self.state.activated || self.state.loaded || self.disposed {
            return false;
        }
        self.state.loaded = true;
        true
    }

    /// Unmount: release the watch if it is still live. Idempotent.
    pub fn dispose(&mut self) {
        self.release_watch();
        self.disposed = true;
    }

    pub fn render(&self) -> RenderPlan<'_> {
        RenderPlan {
            placeholder: !self.state.loaded,
            src: self.state.activated.then_some(self.request.src.as_str()),
            loading: if self.state.priority {
                LoadingHint::Eager
            } else {
                LoadingHint::Lazy
            },
            opacity: if self.state.loaded { 1.0 } else { 0.0 },
            aspect_ratio: self.request.aspect_ratio(),
        }
    }

    fn release_watch(&mut self) {
        if self.state.observed {
            self.watch.disconnect();
            self.state.observed = false;
        }
    }
}

impl LazyLoader<BoundingBoxWatch> {
    /// Sample the polling watch against `viewport`. Returns true on activation.
    pub fn poll(&mut self, viewport: &Rect) -> bool {
        match self.watch.sample(viewport) {
            Some(entry) => self.on_intersection(&entry),
            None => false,
        }
    }

    /// The element moved; keep watching at its new bounds.
    pub fn relayout(&mut self, target: Rect) {
        self.watch.retarget(target);
    }
}

impl<W: ProximityWatch> Drop for LazyLoader<W> {
    fn drop(&mut self) {
        self.release_watch();
    }
}
