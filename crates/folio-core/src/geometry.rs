use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::EPSILON;
use crate::error::{FolioError, Result};

/// Axis-aligned rectangle in document pixels. `y` grows downwards.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Overlapping region of two rectangles.
    ///
    /// Edge-adjacent rectangles intersect with a zero-area result, matching
    /// how browsers report a target that just touches the root.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }

    /// Grow (or shrink, for negative values) by a four-sided margin.
    pub fn expand(&self, margin: &RootMargin) -> Rect {
        Rect::new(
            self.x - margin.left,
            self.y - margin.top,
            self.width + margin.left + margin.right,
            self.height + margin.top + margin.bottom,
        )
    }

    /// Same rectangle moved vertically, used when a viewport scrolls.
    pub fn offset_y(&self, dy: f64) -> Rect {
        Rect { y: self.y + dy, ..*self }
    }
}

/// Fraction of `target` visible inside `root`, in `[0, 1]`.
/// A zero-area target counts as fully visible once it touches the root.
pub fn intersection_ratio(target: &Rect, root: &Rect) -> f64 {
    match target.intersection(root) {
        None => 0.0,
        Some(_) if target.area() <= EPSILON => 1.0,
        Some(overlap) => (overlap.area() / target.area()).clamp(0.0, 1.0),
    }
}

/// Distance added to each side of the viewport, CSS `rootMargin` order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RootMargin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl RootMargin {
    pub fn uniform(px: f64) -> Self {
        Self {
            top: px,
            right: px,
            bottom: px,
            left: px,
        }
    }
}

fn parse_length(token: &str) -> Option<f64> {
    let number = match token.strip_suffix("px") {
        Some(n) => n,
        None if token == "0" => token,
        None => return None,
    };
    number.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses the 1-4 value shorthand: `"200px"`, `"10px 20px"`,
/// `"1px 2px 3px"`, `"1px 2px 3px 4px"`. Only pixel lengths are accepted.
impl FromStr for RootMargin {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || FolioError::InvalidMargin(s.to_string());
        let values = s
            .split_whitespace()
            .map(parse_length)
            .collect::<Option<Vec<f64>>>()
            .ok_or_else(invalid)?;

        let (top, right, bottom, left) = match values.as_slice() {
            [all] => (*all, *all, *all, *all),
            [v, h] => (*v, *h, *v, *h),
            [t, h, b] => (*t, *h, *b, *h),
            [t, r, b, l] => (*t, *r, *b, *l),
            _ => return Err(invalid()),
        };
        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }
}
