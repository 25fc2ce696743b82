//! Pixel <-> normalized coordinate mapping.
//!
//! The rendering layer hands the mapper the rect the image currently
//! occupies inside its container (after aspect-preserving scaling and
//! letterboxing). Regions are converted through that rect every time it
//! changes, which makes stored coordinates layout-invariant.

use crate::error::{CoreError, CoreResult};
use crate::model::NormalizedRect;

/// A point in container pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rect in container pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Build a rect from two arbitrary corners.
    pub fn from_corners(a: PixelPoint, b: PixelPoint) -> Self {
        Self::new(
            a.x.min(b.x),
            a.y.min(b.y),
            (a.x - b.x).abs(),
            (a.y - b.y).abs(),
        )
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Zero, negative or non-finite extent.
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }

    /// Overlap of two rects, `None` when they do not overlap with positive area.
    pub fn intersect(&self, other: &PixelRect) -> Option<PixelRect> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right > left && bottom > top {
            Some(PixelRect::new(left, top, right - left, bottom - top))
        } else {
            None
        }
    }
}

/// Bidirectional transform between one displayed image rect and normalized space.
///
/// Construction fails for degenerate rects, so every conversion is total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    image_rect: PixelRect,
}

impl CoordinateMapper {
    /// Create a mapper for the image's current on-screen rect.
    pub fn new(image_rect: PixelRect) -> CoreResult<Self> {
        if image_rect.is_degenerate() {
            return Err(CoreError::DegenerateViewport {
                width: image_rect.width,
                height: image_rect.height,
            });
        }
        Ok(Self { image_rect })
    }

    pub fn image_rect(&self) -> PixelRect {
        self.image_rect
    }

    /// Pixel point to normalized coordinates. Not clamped.
    pub fn to_normalized(&self, point: PixelPoint) -> (f64, f64) {
        (
            (point.x - self.image_rect.left) / self.image_rect.width,
            (point.y - self.image_rect.top) / self.image_rect.height,
        )
    }

    /// Normalized rect to its current pixel rect.
    pub fn to_pixels(&self, rect: &NormalizedRect) -> PixelRect {
        PixelRect::new(
            self.image_rect.left + rect.relative_x * self.image_rect.width,
            self.image_rect.top + rect.relative_y * self.image_rect.height,
            rect.relative_width * self.image_rect.width,
            rect.relative_height * self.image_rect.height,
        )
    }

    /// Pixel rect to normalized rect, corner by corner.
    pub fn rect_to_normalized(&self, rect: &PixelRect) -> NormalizedRect {
        let (x1, y1) = self.to_normalized(PixelPoint::new(rect.left, rect.top));
        let (x2, y2) = self.to_normalized(PixelPoint::new(rect.right(), rect.bottom()));
        NormalizedRect::from_corners(x1, y1, x2, y2)
    }

    /// The on-screen rect clipped to the displayed image, then normalized.
    ///
    /// This is what gets stored on every region save. Fails when nothing of
    /// the rect lies over the image.
    pub fn clip_to_normalized(&self, rect: &PixelRect) -> CoreResult<NormalizedRect> {
        let clipped = rect.intersect(&self.image_rect).ok_or_else(|| {
            CoreError::invalid_geometry(format!(
                "region at ({:.1}, {:.1}) {:.1}x{:.1} lies outside the displayed image",
                rect.left, rect.top, rect.width, rect.height
            ))
        })?;
        Ok(self.rect_to_normalized(&clipped))
    }
}

/// Rect an image of `natural` size occupies when scaled to fit `container`
/// with its aspect ratio preserved, centred with letterbox bars.
pub fn fit_contain(container: PixelRect, natural: (u32, u32)) -> CoreResult<PixelRect> {
    let (natural_w, natural_h) = (f64::from(natural.0), f64::from(natural.1));
    if container.is_degenerate() || natural_w <= 0.0 || natural_h <= 0.0 {
        return Err(CoreError::DegenerateViewport {
            width: container.width,
            height: container.height,
        });
    }

    let image_aspect = natural_w / natural_h;
    let view_aspect = container.width / container.height;

    let (width, height) = if image_aspect > view_aspect {
        // Wider than the container: bars above and below
        (container.width, container.width / image_aspect)
    } else {
        // Taller than the container: bars left and right
        (container.height * image_aspect, container.height)
    };

    Ok(PixelRect::new(
        container.left + (container.width - width) / 2.0,
        container.top + (container.height - height) / 2.0,
        width,
        height,
    ))
}
