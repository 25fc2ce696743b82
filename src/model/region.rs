//! Region data model.
//!
//! Regions are stored in normalized coordinates relative to the displayed
//! bounds of their image, so they survive any viewport or letterbox change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::RegionId;

/// An axis-aligned rectangle in normalized `[0, 1] x [0, 1]` image space.
///
/// Values are not clamped: a region dragged partly off the image keeps
/// whatever the mapper derived at save time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRect {
    /// Left edge as a fraction of the displayed image width
    pub relative_x: f64,
    /// Top edge as a fraction of the displayed image height
    pub relative_y: f64,
    /// Width as a fraction of the displayed image width
    pub relative_width: f64,
    /// Height as a fraction of the displayed image height
    pub relative_height: f64,
}

impl NormalizedRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            relative_x: x,
            relative_y: y,
            relative_width: width,
            relative_height: height,
        }
    }

    /// The whole image.
    pub fn full() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }

    /// Build a rect from two arbitrary corners.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(x1.min(x2), y1.min(y2), (x2 - x1).abs(), (y2 - y1).abs())
    }

    /// Whether the rect satisfies the stored-region invariant (positive, finite size).
    pub fn is_valid(&self) -> bool {
        let finite = self.relative_x.is_finite()
            && self.relative_y.is_finite()
            && self.relative_width.is_finite()
            && self.relative_height.is_finite();
        finite && self.relative_width > 0.0 && self.relative_height > 0.0
    }

    /// Component-wise comparison within `epsilon`.
    pub fn approx_eq(&self, other: &NormalizedRect, epsilon: f64) -> bool {
        (self.relative_x - other.relative_x).abs() < epsilon
            && (self.relative_y - other.relative_y).abs() < epsilon
            && (self.relative_width - other.relative_width).abs() < epsilon
            && (self.relative_height - other.relative_height).abs() < epsilon
    }
}

/// A named rectangular region of interest owned by one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    /// Unique within the owning image.
    pub id: RegionId,
    /// Geometry in normalized image space.
    #[serde(flatten)]
    pub rect: NormalizedRect,
    /// Display name.
    pub name: String,
    /// Stamped on first insert only.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Stamped on every save.
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// Input to a region upsert: everything the caller controls.
///
/// A draft without an id is assigned a fresh `roi_<uuid>` id by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionDraft {
    pub id: Option<RegionId>,
    pub rect: NormalizedRect,
    pub name: String,
}

impl RegionDraft {
    /// Draft for a brand-new region.
    pub fn new(name: impl Into<String>, rect: NormalizedRect) -> Self {
        Self {
            id: None,
            rect,
            name: name.into(),
        }
    }

    /// Draft that targets a specific region id (insert or replace).
    pub fn with_id(mut self, id: impl Into<RegionId>) -> Self {
        self.id = Some(id.into());
        self
    }
}

impl From<&Region> for RegionDraft {
    fn from(region: &Region) -> Self {
        Self {
            id: Some(region.id.clone()),
            rect: region.rect,
            name: region.name.clone(),
        }
    }
}
