//! Hyperslide - interactive image slideshows built from linked regions
//!
//! Images carry rectangular regions of interest stored in normalized
//! coordinates, so they survive any viewport size or letterboxing. Regions
//! link to other images (or regions on them), and activating a region
//! navigates the slideshow along that link.
//!
//! The [`Session`] owns the whole model and is driven by the host: pointer
//! events, viewport changes and region activations go in, and
//! [`SessionEvent`]s come out for the renderer.

pub mod config;
pub mod constants;
pub mod coords;
pub mod debounce;
pub mod error;
pub mod events;
pub mod interaction;
pub mod link_graph;
pub mod model;
pub mod navigation;
pub mod region_store;
pub mod session;
pub mod storage;

pub use config::{AppConfig, SessionSettings};
pub use coords::{CoordinateMapper, PixelPoint, PixelRect};
pub use error::{CoreError, CoreResult, ErrorKind};
pub use events::{SessionEvent, Warning};
pub use interaction::DirectManipulation;
pub use navigation::{Activation, LoadCompletion, NavState};
pub use session::{ImageSummary, Session};
pub use storage::{JsonFileStorage, MemoryStorage, Storage, StorageError};
