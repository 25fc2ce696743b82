//! Events the session emits for the rendering/UI layer.
//!
//! The session queues events as it works; the host drains them after each
//! call and redraws accordingly.

use std::time::Duration;

use crate::coords::PixelRect;
use crate::model::{AudioTrack, ImageId, LinkId, RegionId};
use crate::navigation::Disambiguation;

/// Non-fatal conditions the UI should surface.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Warning {
    /// The activated region has no outgoing link.
    #[error("This region has no links. Use \"Add Link\" to create one.")]
    NoLink { region_id: RegionId },
    /// The storage collaborator failed; in-memory state was kept.
    #[error("Could not save ({operation}): {message}")]
    Persistence { operation: String, message: String },
    /// The displayed image rect has no area; geometry was not converted.
    #[error("Image is not displayed ({width}x{height})")]
    DegenerateViewport { width: f64, height: f64 },
    /// An image load failed and the previous view was restored.
    #[error("Could not load image {image_id}: {message}")]
    LoadFailed { image_id: ImageId, message: String },
}

/// Something the UI should react to.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// All region elements of the previous image must be removed.
    ViewCleared,
    /// A region should be drawn (or redrawn) at this pixel rect.
    RegionGeometry {
        region_id: RegionId,
        name: String,
        rect: PixelRect,
    },
    /// A region element should be removed.
    RegionRemoved { region_id: RegionId },
    /// Whether a region has an outgoing link (link badge on/off).
    LinkIndicator {
        region_id: RegionId,
        has_outgoing_link: bool,
    },
    /// A link was removed from the graph.
    LinkRemoved { link_id: LinkId },
    /// An image is now displayed.
    Navigated {
        image_id: ImageId,
        highlight: Option<RegionId>,
    },
    /// Briefly emphasise a region after navigating to it.
    Highlight {
        region_id: RegionId,
        duration: Duration,
    },
    /// Ask the user which of several links to follow.
    ChoiceRequested(Disambiguation),
    /// Start, switch or stop the background music.
    Soundtrack { track: Option<AudioTrack> },
    /// The displayed image was deleted; show the empty state.
    ImageClosed { image_id: ImageId },
    /// A non-fatal warning.
    Warning(Warning),
}
