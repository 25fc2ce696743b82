//! Storage collaborators.
//!
//! The session keeps the authoritative model in memory and mirrors every
//! mutation to a [`Storage`] backend without waiting on it. Backends are
//! swappable: an in-process [`MemoryStorage`] for tests and embedding, and
//! [`JsonFileStorage`] for the single-file `database.json` layout.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hyperslide::storage::{JsonFileStorage, Storage};
//!
//! let storage = JsonFileStorage::open("data/database.json")?;
//! for image in storage.list_images()? {
//!     println!("{} ({} regions)", image.display_name(), image.regions.len());
//! }
//! ```

mod database;
mod error;
mod json_file;
mod legacy;
mod memory;

pub use error::StorageError;
pub use database::Database;
pub use json_file::{JsonFileStorage, image_record_for_file};
pub use legacy::upgrade_database;
pub use memory::MemoryStorage;

use crate::model::{AudioTrack, Image, Link, Region};

/// Backend the session mirrors its model into.
///
/// Write calls are fire-and-forget from the session's point of view: a
/// failure is reported as a warning and never rolls back in-memory state.
pub trait Storage {
    /// Fetch one image with its regions.
    fn get_image(&self, id: &str) -> Result<Image, StorageError>;

    /// All images in upload order.
    fn list_images(&self) -> Result<Vec<Image>, StorageError>;

    /// All links in insertion order.
    fn list_links(&self) -> Result<Vec<Link>, StorageError>;

    /// Insert or replace an image record.
    fn persist_image(&mut self, image: &Image) -> Result<(), StorageError>;

    /// Insert or replace a region on an image.
    fn persist_region(&mut self, image_id: &str, region: &Region) -> Result<(), StorageError>;

    /// Store a link, replacing any link that leaves the same anchor.
    fn persist_link(&mut self, link: &Link) -> Result<(), StorageError>;

    /// Remove a region and the links referencing it.
    fn delete_region(&mut self, image_id: &str, region_id: &str) -> Result<(), StorageError>;

    /// Remove a link.
    fn delete_link(&mut self, link_id: &str) -> Result<(), StorageError>;

    /// Remove an image, its regions and every link touching it.
    fn delete_image(&mut self, image_id: &str) -> Result<(), StorageError>;

    /// Replace or clear an image's soundtrack.
    fn set_audio(&mut self, image_id: &str, audio: Option<&AudioTrack>)
    -> Result<(), StorageError>;
}
