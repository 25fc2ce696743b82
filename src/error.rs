//! Error types for the region/link core.

use thiserror::Error;

use crate::model::{ImageId, LinkId, RegionId};

/// Broad failure classes callers can branch on without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An image, region or link referenced by the call does not exist.
    NotFound,
    /// Geometry could not be converted or is too small to commit.
    InvalidGeometry,
    /// A mutation would break a model invariant and was rejected.
    ConstraintViolation,
}

/// Errors raised by the in-memory region/link model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Image id unknown to the session
    #[error("Image not found: {id}")]
    ImageNotFound {
        /// The missing image id
        id: ImageId,
    },

    /// Region id unknown on the given image
    #[error("Region '{region_id}' not found on image '{image_id}'")]
    RegionNotFound {
        /// Image that was searched
        image_id: ImageId,
        /// The missing region id
        region_id: RegionId,
    },

    /// Link id unknown to the graph
    #[error("Link not found: {id}")]
    LinkNotFound {
        /// The missing link id
        id: LinkId,
    },

    /// The displayed image rect has zero (or negative) width or height
    #[error("Degenerate viewport: {width}x{height}")]
    DegenerateViewport {
        /// Width of the offending rect
        width: f64,
        /// Height of the offending rect
        height: f64,
    },

    /// Geometry that cannot be committed (empty intersection, zero size, ...)
    #[error("Invalid geometry: {message}")]
    InvalidGeometry {
        /// Description of the geometry problem
        message: String,
    },

    /// A mutation was rejected before any state was written
    #[error("Constraint violation: {message}")]
    ConstraintViolation {
        /// Description of the violated constraint
        message: String,
    },
}

impl CoreError {
    /// Create an image-not-found error.
    pub fn image_not_found(id: impl Into<ImageId>) -> Self {
        Self::ImageNotFound { id: id.into() }
    }

    /// Create a region-not-found error.
    pub fn region_not_found(image_id: impl Into<ImageId>, region_id: impl Into<RegionId>) -> Self {
        Self::RegionNotFound {
            image_id: image_id.into(),
            region_id: region_id.into(),
        }
    }

    /// Create a link-not-found error.
    pub fn link_not_found(id: impl Into<LinkId>) -> Self {
        Self::LinkNotFound { id: id.into() }
    }

    /// Create an invalid geometry error with a message.
    pub fn invalid_geometry(message: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            message: message.into(),
        }
    }

    /// Create a constraint violation error with a message.
    pub fn constraint_violation(message: impl Into<String>) -> Self {
        Self::ConstraintViolation {
            message: message.into(),
        }
    }

    /// Which class of failure this is.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::ImageNotFound { .. }
            | CoreError::RegionNotFound { .. }
            | CoreError::LinkNotFound { .. } => ErrorKind::NotFound,
            CoreError::DegenerateViewport { .. } | CoreError::InvalidGeometry { .. } => {
                ErrorKind::InvalidGeometry
            }
            CoreError::ConstraintViolation { .. } => ErrorKind::ConstraintViolation,
        }
    }
}

/// Result alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
