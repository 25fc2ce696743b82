//! Data models for images, regions and links.

mod image;
mod link;
mod region;

pub use image::{AudioTrack, Image};
pub use link::{Anchor, Link, LinkTarget};
pub use region::{NormalizedRect, Region, RegionDraft};

/// Identifier of an image in the library.
pub type ImageId = String;

/// Identifier of a region, unique within its image.
pub type RegionId = String;

/// Identifier of a link.
pub type LinkId = String;
