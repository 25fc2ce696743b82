//! Link data model: directed edges from a region anchor to an image.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{ImageId, LinkId, RegionId};

/// A link endpoint on a specific region of a specific image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Anchor {
    pub image_id: ImageId,
    pub region_id: RegionId,
}

impl Anchor {
    pub fn new(image_id: impl Into<ImageId>, region_id: impl Into<RegionId>) -> Self {
        Self {
            image_id: image_id.into(),
            region_id: region_id.into(),
        }
    }
}

/// Where a link leads: a whole image, or one region on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkTarget {
    pub image_id: ImageId,
    pub region_id: Option<RegionId>,
}

impl LinkTarget {
    /// Target the whole image, no highlight.
    pub fn image(image_id: impl Into<ImageId>) -> Self {
        Self {
            image_id: image_id.into(),
            region_id: None,
        }
    }

    /// Target a region on the image, highlighted on arrival.
    pub fn region(image_id: impl Into<ImageId>, region_id: impl Into<RegionId>) -> Self {
        Self {
            image_id: image_id.into(),
            region_id: Some(region_id.into()),
        }
    }
}

/// A directed edge in the slideshow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: LinkId,
    pub source_image_id: ImageId,
    pub source_region_id: RegionId,
    pub target_image_id: ImageId,
    #[serde(default)]
    pub target_region_id: Option<RegionId>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Link {
    /// Build a link between two endpoints.
    pub fn new(id: impl Into<LinkId>, source: Anchor, target: LinkTarget) -> Self {
        Self {
            id: id.into(),
            source_image_id: source.image_id,
            source_region_id: source.region_id,
            target_image_id: target.image_id,
            target_region_id: target.region_id,
            created_at: Utc::now(),
        }
    }

    pub fn source(&self) -> Anchor {
        Anchor::new(self.source_image_id.clone(), self.source_region_id.clone())
    }

    pub fn target(&self) -> LinkTarget {
        LinkTarget {
            image_id: self.target_image_id.clone(),
            region_id: self.target_region_id.clone(),
        }
    }

    /// Whether this link starts at the given anchor.
    pub fn starts_at(&self, image_id: &str, region_id: &str) -> bool {
        self.source_image_id == image_id && self.source_region_id == region_id
    }

    /// Whether the anchor is this link's source or its (region) target.
    pub fn references_anchor(&self, image_id: &str, region_id: &str) -> bool {
        self.starts_at(image_id, region_id)
            || (self.target_image_id == image_id
                && self.target_region_id.as_deref() == Some(region_id))
    }

    /// Whether the image is either endpoint.
    pub fn touches_image(&self, image_id: &str) -> bool {
        self.source_image_id == image_id || self.target_image_id == image_id
    }
}
