//! Coordinate transforms: screen pixels ↔ logical percentage canvas ↔ view.
//!
//! Task positions are stored as percentages of a logical canvas, two
//! independent axes in `[0, 100]`. The canvas is shown inside a viewport
//! element under a zoom/pan [`ViewTransform`]. Everything here is pure so
//! it can be tested with fabricated rectangles.

use crate::model::Point;
use serde::{Deserialize, Serialize};

/// Lower bound of a percentage coordinate.
pub const PERCENT_MIN: f32 = 0.0;
/// Upper bound of a percentage coordinate.
pub const PERCENT_MAX: f32 = 100.0;
/// Grid step used when snapping is requested.
pub const SNAP_STEP: f32 = 5.0;

/// Clamp a single percentage coordinate. NaN collapses to the canvas center.
pub fn clamp_percent(v: f32) -> f32 {
    if v.is_nan() {
        return 50.0;
    }
    v.clamp(PERCENT_MIN, PERCENT_MAX)
}

/// Round to the nearest multiple of `step`.
pub fn snap_to_step(v: f32, step: f32) -> f32 {
    if step <= 0.0 {
        return v;
    }
    (v / step).round() * step
}

/// A position in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: ScreenPoint) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// An on-screen rectangle (e.g. an element's bounding client rect).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Zero-area or non-finite rectangles cannot be interpolated against.
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }

    pub fn origin(&self) -> ScreenPoint {
        ScreenPoint::new(self.left, self.top)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn contains(&self, p: ScreenPoint) -> bool {
        p.x >= self.left
            && p.x <= self.left + self.width
            && p.y >= self.top
            && p.y <= self.top + self.height
    }
}

/// Map a pointer position to a clamped percentage position on `rect`.
///
/// Returns `None` for a degenerate rectangle (unmounted or collapsed canvas).
pub fn screen_to_percent(pointer: ScreenPoint, rect: ScreenRect) -> Option<Point> {
    if rect.is_degenerate() {
        return None;
    }
    Some(
        Point::new(
            (pointer.x - rect.left) / rect.width * 100.0,
            (pointer.y - rect.top) / rect.height * 100.0,
        )
        .clamped(),
    )
}

/// Map a pixel displacement to a percentage displacement on `rect`. Not clamped.
pub fn delta_to_percent(dx: f32, dy: f32, rect: ScreenRect) -> Option<(f32, f32)> {
    if rect.is_degenerate() {
        return None;
    }
    Some((dx / rect.width * 100.0, dy / rect.height * 100.0))
}

/// Inverse of [`screen_to_percent`]: where a percentage position lands on screen.
pub fn percent_to_screen(p: Point, rect: ScreenRect) -> ScreenPoint {
    let p = p.clamped();
    ScreenPoint::new(
        rect.left + p.x / 100.0 * rect.width,
        rect.top + p.y / 100.0 * rect.height,
    )
}

// ─── View transform ──────────────────────────────────────────────────────

/// Zoom/pan applied to the logical canvas inside the viewport element.
///
/// `screen = viewport_origin + pan + canvas_px * zoom`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub zoom: f32,
    pub pan_x: f32,
    pub pan_y: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform {
        zoom: 1.0,
        pan_x: 0.0,
        pan_y: 0.0,
    };

    /// Canvas pixel → offset from the viewport origin.
    pub fn apply(&self, canvas: ScreenPoint) -> ScreenPoint {
        ScreenPoint::new(
            canvas.x * self.zoom + self.pan_x,
            canvas.y * self.zoom + self.pan_y,
        )
    }

    /// Offset from the viewport origin → canvas pixel.
    pub fn invert(&self, screen: ScreenPoint) -> ScreenPoint {
        let zoom = if self.zoom > 0.0 { self.zoom } else { 1.0 };
        ScreenPoint::new((screen.x - self.pan_x) / zoom, (screen.y - self.pan_y) / zoom)
    }

    /// Same transform with a new pan offset.
    pub fn with_pan(self, pan_x: f32, pan_y: f32) -> Self {
        Self {
            pan_x,
            pan_y,
            ..self
        }
    }

    /// Zoom by `factor` around `anchor` (offset from the viewport origin),
    /// keeping the canvas point under the anchor fixed.
    ///
    /// Bounds may arrive in either order; a non-finite or non-positive bound
    /// leaves that side open.
    pub fn zoom_at(self, anchor: ScreenPoint, factor: f32, min_zoom: f32, max_zoom: f32) -> Self {
        if !factor.is_finite() || factor <= 0.0 {
            return self;
        }
        let (lo, hi) = zoom_bounds(min_zoom, max_zoom);
        let current = if self.zoom.is_finite() && self.zoom > 0.0 {
            self.zoom
        } else {
            1.0
        };
        let zoom = (current * factor).max(lo).min(hi);
        let ratio = zoom / current;
        Self {
            zoom,
            pan_x: anchor.x - (anchor.x - self.pan_x) * ratio,
            pan_y: anchor.y - (anchor.y - self.pan_y) * ratio,
        }
    }

    /// On-screen rectangle of a logical canvas of `canvas_size` shown inside
    /// a viewport whose top-left is at `viewport_origin`.
    pub fn canvas_rect(&self, viewport_origin: ScreenPoint, canvas_size: Size) -> ScreenRect {
        ScreenRect::new(
            viewport_origin.x + self.pan_x,
            viewport_origin.y + self.pan_y,
            canvas_size.width * self.zoom,
            canvas_size.height * self.zoom,
        )
    }
}

fn zoom_bounds(min_zoom: f32, max_zoom: f32) -> (f32, f32) {
    let valid = |z: f32| z.is_finite() && z > 0.0;
    let lo = if valid(min_zoom) { min_zoom } else { f32::MIN_POSITIVE };
    let hi = if valid(max_zoom) { max_zoom } else { f32::MAX };
    if lo <= hi { (lo, hi) } else { (hi, lo) }
}
