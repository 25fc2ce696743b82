//! Global constants for the hyperslide core

use std::time::Duration;

/// Minimum width and height (in screen pixels) a drawn region must exceed
/// at release to be committed.
pub const MIN_REGION_SIZE: f64 = 20.0;

/// Quiet period after the last viewport resize before regions are repositioned.
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(100);

/// How long a navigation highlight stays on the target region.
pub const HIGHLIGHT_DURATION: Duration = Duration::from_millis(3000);

/// Name given to freshly drawn regions until the user renames them.
pub const DEFAULT_REGION_NAME: &str = "New Region";

/// Prefix for generated region ids.
pub const REGION_ID_PREFIX: &str = "roi_";

/// Prefix for generated link ids.
pub const LINK_ID_PREFIX: &str = "link_";

/// Divisor applied to legacy absolute region fields when no relative
/// coordinates are stored.
pub const LEGACY_COORDINATE_SCALE: f64 = 1000.0;

/// Tolerance used when comparing normalized coordinates.
pub const NORMALIZED_EPSILON: f64 = 1e-6;
