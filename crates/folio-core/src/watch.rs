//! Proximity watching: when does an element come near the viewport?

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_ROOT_MARGIN_PX, DEFAULT_THRESHOLD, EPSILON};
use crate::error::{FolioError, Result};
use crate::geometry::{Rect, RootMargin, intersection_ratio};

/// Margin around the viewport plus the minimum visible fraction that counts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WatchOptions {
    pub root_margin: RootMargin,
    pub threshold: f64,
}

impl WatchOptions {
    pub fn new(root_margin: RootMargin, threshold: f64) -> Result<Self> {
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(FolioError::InvalidThreshold(threshold));
        }
        Ok(Self {
            root_margin,
            threshold,
        })
    }

    /// Build from the CSS shorthand, e.g. `WatchOptions::parse("200px", 0.01)`.
    pub fn parse(root_margin: &str, threshold: f64) -> Result<Self> {
        Self::new(root_margin.parse()?, threshold)
    }
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            root_margin: RootMargin::uniform(DEFAULT_ROOT_MARGIN_PX),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// One observation of a target against the margined viewport.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntersectionEntry {
    pub target: Rect,
    /// The viewport after the root margin was applied.
    pub root: Rect,
    pub ratio: f64,
    pub is_intersecting: bool,
}

impl IntersectionEntry {
    pub fn compute(target: Rect, viewport: &Rect, options: &WatchOptions) -> Self {
        let root = viewport.expand(&options.root_margin);
        Self {
            target,
            root,
            ratio: intersection_ratio(&target, &root),
            is_intersecting: target.intersection(&root).is_some(),
        }
    }

    /// True when this entry should activate a watcher with `threshold`.
    pub fn qualifies(&self, threshold: f64) -> bool {
        self.is_intersecting && self.ratio + EPSILON >= threshold
    }
}

/// Host-provided element-visibility observer.
///
/// Implementations deliver [`IntersectionEntry`] values to whoever owns the
/// watch; after `disconnect` they must not deliver anything further.
pub trait ProximityWatch {
    fn observe(&mut self, target: Rect, options: WatchOptions);
    fn disconnect(&mut self);
    fn is_observing(&self) -> bool;
}

/// Polling fallback: compares the watched bounding box against a viewport
/// rectangle each time the host samples it.
#[derive(Clone, Debug, Default)]
pub struct BoundingBoxWatch {
    watched: Option<(Rect, WatchOptions)>,
}

impl BoundingBoxWatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry for the current viewport, or `None` once disconnected.
    pub fn sample(&self, viewport: &Rect) -> Option<IntersectionEntry> {
        self.watched
            .as_ref()
            .map(|(target, options)| IntersectionEntry::compute(*target, viewport, options))
    }

    /// Layout moved the element; keep watching at its new position.
    pub fn retarget(&mut self, target: Rect) {
        if let Some((watched, _)) = self.watched.as_mut() {
            *watched = target;
        }
    }
}

impl ProximityWatch for BoundingBoxWatch {
    fn observe(&mut self, target: Rect, options: WatchOptions) {
        self.watched = Some((target, options));
    }

    fn disconnect(&mut self) {
        self.watched = None;
    }

    fn is_observing(&self) -> bool {
        self.watched.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Rect {
        Rect::new(0.0, 0.0, 1000.0, 800.0)
    }

    #[test]
    fn test_default_options() {
        let options = WatchOptions::default();
        assert_eq!(options.root_margin, RootMargin::uniform(200.0));
        assert_eq!(options.threshold, 0.01);
        assert_eq!(WatchOptions::parse("200px", 0.01).unwrap(), options);
    }

    #[test]
    fn test_threshold_validation() {
        assert!(WatchOptions::new(RootMargin::default(), 1.5).is_err());
        assert!(WatchOptions::new(RootMargin::default(), -0.1).is_err());
        assert!(WatchOptions::new(RootMargin::default(), f64::NAN).is_err());
        assert!(WatchOptions::new(RootMargin::default(), 0.0).is_ok());
        assert!(WatchOptions::new(RootMargin::default(), 1.0).is_ok());
    }

    #[test]
    fn test_margin_pulls_element_in_early() {
        // 100px below the fold: outside the raw viewport, inside the 200px margin.
        let target = Rect::new(0.0, 900.0, 300.0, 200.0);
        let bare = IntersectionEntry::compute(target, &viewport(), &WatchOptions::parse("0", 0.01).unwrap());
        assert!(!bare.qualifies(0.01));

        let margined = IntersectionEntry::compute(target, &viewport(), &WatchOptions::default());
        assert!(margined.is_intersecting);
        assert!((margined.ratio - 0.5).abs() < 1e-12);
        assert!(margined.qualifies(0.01));
    }

    #[test]
    fn test_sliver_below_threshold_does_not_qualify() {
        // 1px of a 1000px tall element inside the margined root.
        let target = Rect::new(0.0, 999.0, 100.0, 1000.0);
        let entry = IntersectionEntry::compute(target, &viewport(), &WatchOptions::default());
        assert!(entry.is_intersecting);
        assert!(!entry.qualifies(0.01));
    }

    #[test]
    fn test_zero_threshold_accepts_edge_touch() {
        let target = Rect::new(0.0, 800.0, 100.0, 100.0);
        let options = WatchOptions::parse("0", 0.0).unwrap();
        let entry = IntersectionEntry::compute(target, &viewport(), &options);
        assert!(entry.qualifies(0.0));
    }

    #[test]
    fn test_bounding_box_watch_lifecycle() {
        let mut watch = BoundingBoxWatch::new();
        assert!(!watch.is_observing());
        assert!(watch.sample(&viewport()).is_none());

        watch.observe(Rect::new(0.0, 2000.0, 100.0, 100.0), WatchOptions::default());
        assert!(watch.is_observing());
        assert!(!watch.sample(&viewport()).unwrap().qualifies(0.01));

        watch.retarget(Rect::new(0.0, 100.0, 100.0, 100.0));
        assert!(watch.sample(&viewport()).unwrap().qualifies(0.01));

        watch.disconnect();
        assert!(watch.sample(&viewport()).is_none());
        watch.disconnect();
        assert!(!watch.is_observing());
    }
}
