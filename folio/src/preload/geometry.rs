//! Viewport geometry for intersection observation.
//!
//! Mirrors how a browser computes intersection entries: the root box (the
//! viewport) is grown or shrunk by a root margin, intersected with the
//! target's box, and the ratio of the intersected area to the target's area
//! is reported.

use std::fmt;
use std::str::FromStr;

use super::PreloadError;

/// Axis-aligned rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
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
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Overlap of two rectangles.
    ///
    /// Edge-adjacent rectangles intersect with zero area, as in the browser.
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
}

/// One side of a root margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarginValue {
    Px(f64),
    /// Percentage of the root's width (left/right) or height (top/bottom).
    Percent(f64),
}

impl MarginValue {
    fn resolve(&self, extent: f64) -> f64 {
        match self {
            MarginValue::Px(px) => *px,
            MarginValue::Percent(pct) => extent * pct / 100.0,
        }
    }
}

impl FromStr for MarginValue {
    type Err = PreloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PreloadError::InvalidRootMargin(s.to_string());

        if let Some(px) = s.strip_suffix("px") {
            px.parse().map(MarginValue::Px).map_err(|_| invalid())
        } else if let Some(pct) = s.strip_suffix('%') {
            pct.parse().map(MarginValue::Percent).map_err(|_| invalid())
        } else if s == "0" {
            Ok(MarginValue::Px(0.0))
        } else {
            Err(invalid())
        }
    }
}

impl fmt::Display for MarginValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarginValue::Px(px) => write!(f, "{}px", px),
            MarginValue::Percent(pct) => write!(f, "{}%", pct),
        }
    }
}

/// Expansion (positive) or contraction (negative) of the root box.
///
/// Parsed from CSS margin shorthand: `"10px"`, `"10px 0px"`,
/// `"10px 0px 20px"`, or `"10px 5% 20px 0px"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootMargin {
    pub top: MarginValue,
    pub right: MarginValue,
    pub bottom: MarginValue,
    pub left: MarginValue,
}

impl Default for RootMargin {
    fn default() -> Self {
        Self::uniform(MarginValue::Px(0.0))
    }
}

impl RootMargin {
    pub fn uniform(value: MarginValue) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Apply the margin to `root`.
    pub fn apply(&self, root: &Rect) -> Rect {
        let top = self.top.resolve(root.height);
        let right = self.right.resolve(root.width);
        let bottom = self.bottom.resolve(root.height);
        let left = self.left.resolve(root.width);

        Rect::new(
            root.x - left,
            root.y - top,
            root.width + left + right,
            root.height + top + bottom,
        )
    }
}

impl FromStr for RootMargin {
    type Err = PreloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<Vec<MarginValue>, _>>()?;

        match values.as_slice() {
            [all] => Ok(Self::uniform(*all)),
            [vertical, horizontal] => Ok(Self {
                top: *vertical,
                right: *horizontal,
                bottom: *vertical,
                left: *horizontal,
            }),
            [top, horizontal, bottom] => Ok(Self {
                top: *top,
                right: *horizontal,
                bottom: *bottom,
                left: *horizontal,
            }),
            [top, right, bottom, left] => Ok(Self {
                top: *top,
                right: *right,
                bottom: *bottom,
                left: *left,
            }),
            _ => Err(PreloadError::InvalidRootMargin(s.to_string())),
        }
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

/// Snapshot of a target's visibility within the (margin-adjusted) root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub is_intersecting: bool,
    /// Fraction of the target's area inside the root, `0.0..=1.0`.
    pub intersection_ratio: f64,
}

impl IntersectionEntry {
    /// An entry for a target entirely outside the root.
    pub fn outside() -> Self {
        Self {
            is_intersecting: false,
            intersection_ratio: 0.0,
        }
    }

    /// An entry for a target partially or fully visible.
    pub fn visible(ratio: f64) -> Self {
        Self {
            is_intersecting: true,
            intersection_ratio: ratio.clamp(0.0, 1.0),
        }
    }

    /// Compute the entry for `target` against `root` grown by `margin`.
    pub fn compute(target: &Rect, root: &Rect, margin: &RootMargin) -> Self {
        let root = margin.apply(root);
        match target.intersection(&root) {
            None => Self::outside(),
            Some(overlap) => {
                let target_area = target.area();
                let ratio = if target_area > 0.0 {
                    overlap.area() / target_area
                } else {
                    1.0
                };
                Self::visible(ratio)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Rect {
        Rect::new(0.0, 0.0, 1000.0, 800.0)
    }

    #[test]
    fn test_parse_margin_shorthand() {
        let m: RootMargin = "100px".parse().unwrap();
        assert_eq!(m, RootMargin::uniform(MarginValue::Px(100.0)));

        let m: RootMargin = "10px 5%".parse().unwrap();
        assert_eq!(m.top, MarginValue::Px(10.0));
        assert_eq!(m.left, MarginValue::Percent(5.0));

        let m: RootMargin = "1px 2px 3px 4px".parse().unwrap();
        assert_eq!(m.left, MarginValue::Px(4.0));

        let m: RootMargin = "0".parse().unwrap();
        assert_eq!(m, RootMargin::default());
    }

    #[test]
    fn test_parse_margin_rejects_garbage() {
        assert!("".parse::<RootMargin>().is_err());
        assert!("10em".parse::<RootMargin>().is_err());
        assert!("1px 2px 3px 4px 5px".parse::<RootMargin>().is_err());
    }

    #[test]
    fn test_target_fully_inside() {
        let target = Rect::new(100.0, 100.0, 200.0, 100.0);
        let entry = IntersectionEntry::compute(&target, &viewport(), &RootMargin::default());
        assert!(entry.is_intersecting);
        assert_eq!(entry.intersection_ratio, 1.0);
    }

    #[test]
    fn test_target_half_visible() {
        let target = Rect::new(0.0, 700.0, 100.0, 200.0);
        let entry = IntersectionEntry::compute(&target, &viewport(), &RootMargin::default());
        assert!(entry.is_intersecting);
        assert!((entry.intersection_ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_target_below_fold() {
        let target = Rect::new(0.0, 900.0, 100.0, 50.0);
        let entry = IntersectionEntry::compute(&target, &viewport(), &RootMargin::default());
        assert!(!entry.is_intersecting);
    }

    #[test]
    fn test_root_margin_expands_viewport() {
        let target = Rect::new(0.0, 900.0, 100.0, 50.0);
        let margin: RootMargin = "200px 0px".parse().unwrap();
        let entry = IntersectionEntry::compute(&target, &viewport(), &margin);
        assert!(entry.is_intersecting);
        assert_eq!(entry.intersection_ratio, 1.0);
    }

    #[test]
    fn test_percent_margin_uses_root_height() {
        // 25% of 800px = 200px below the fold
        let target = Rect::new(0.0, 950.0, 100.0, 100.0);
        let margin: RootMargin = "25%".parse().unwrap();
        let entry = IntersectionEntry::compute(&target, &viewport(), &margin);
        assert!(entry.is_intersecting);
        assert!((entry.intersection_ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_edge_adjacent_intersects_with_zero_ratio() {
        let target = Rect::new(0.0, 800.0, 100.0, 100.0);
        let entry = IntersectionEntry::compute(&target, &viewport(), &RootMargin::default());
        assert!(entry.is_intersecting);
        assert_eq!(entry.intersection_ratio, 0.0);
    }
}
