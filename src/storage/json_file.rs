//! Single-file JSON storage backend.
//!
//! The whole database lives in one pretty-printed JSON document that is
//! rewritten after every mutation. Older documents are upgraded in memory on
//! open and written back in the current layout on the first save.

use std::path::{Path, PathBuf};

use crate::model::{AudioTrack, Image, Link, Region};
use crate::region_store::new_image_id;
use crate::storage::{Database, Storage, StorageError, upgrade_database};

/// Storage backed by a `database.json` file.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    database: Database,
}

impl JsonFileStorage {
    /// Open the database at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        if path.as_os_str().is_empty() || path.is_dir() {
            return Err(StorageError::InvalidPath { path });
        }

        let database = if path.exists() {
            log::info!("Loading database from {:?}", path);
            let json = std::fs::read_to_string(&path)?;
            let raw: serde_json::Value = serde_json::from_str(&json)?;
            let database: Database = serde_json::from_value(upgrade_database(raw))?;

            if !Database::is_version_readable(&database.version) {
                return Err(StorageError::VersionMismatch {
                    expected: Database::CURRENT_VERSION.to_string(),
                    found: database.version,
                });
            }

            log::info!(
                "Loaded {} images and {} links",
                database.images.len(),
                database.links.len()
            );
            database
        } else {
            log::info!("No database at {:?}, starting empty", path);
            Database::new()
        };

        Ok(Self { path, database })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Write the database to disk.
    pub fn save(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.database)?;
        std::fs::write(&self.path, json)?;
        log::debug!("Saved database to {:?}", self.path);
        Ok(())
    }

    /// Apply a mutation and save. The in-memory copy keeps the change even
    /// if the write fails.
    fn mutate<T>(
        &mut self,
        op: impl FnOnce(&mut Database) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let value = op(&mut self.database)?;
        self.save()?;
        Ok(value)
    }
}

/// Build an image record for a file on disk.
///
/// The natural size is probed from the file header; files the decoder does
/// not understand are still accepted without dimensions.
pub fn image_record_for_file(
    path: impl AsRef<Path>,
    description: impl Into<String>,
) -> Result<Image, StorageError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(StorageError::InvalidPath {
            path: path.to_path_buf(),
        });
    }

    let original_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut image = Image::new(new_image_id(), original_name).with_path(path.to_string_lossy());
    image.description = description.into();

    match image::image_dimensions(path) {
        Ok((width, height)) => image = image.with_dimensions(width, height),
        Err(e) => log::warn!("Could not read dimensions of {:?}: {}", path, e),
    }
    Ok(image)
}

impl Storage for JsonFileStorage {
    fn get_image(&self, id: &str) -> Result<Image, StorageError> {
        self.database.image(id).cloned()
    }

    fn list_images(&self) -> Result<Vec<Image>, StorageError> {
        Ok(self.database.images.clone())
    }

    fn list_links(&self) -> Result<Vec<Link>, StorageError> {
        Ok(self.database.links.clone())
    }

    fn persist_image(&mut self, image: &Image) -> Result<(), StorageError> {
        self.mutate(|db| {
            db.insert_image(image.clone());
            Ok(())
        })
    }

    fn persist_region(&mut self, image_id: &str, region: &Region) -> Result<(), StorageError> {
        self.mutate(|db| db.upsert_region(image_id, region))
    }

    fn persist_link(&mut self, link: &Link) -> Result<(), StorageError> {
        self.mutate(|db| db.upsert_link(link))
    }

    fn delete_region(&mut self, image_id: &str, region_id: &str) -> Result<(), StorageError> {
        self.mutate(|db| db.delete_region(image_id, region_id))
    }

    fn delete_link(&mut self, link_id: &str) -> Result<(), StorageError> {
        self.mutate(|db| db.delete_link(link_id))
    }

    fn delete_image(&mut self, image_id: &str) -> Result<(), StorageError> {
        self.mutate(|db| db.delete_image(image_id).map(|_| ()))
    }

    fn set_audio(
        &mut self,
        image_id: &str,
        audio: Option<&AudioTrack>,
    ) -> Result<(), StorageError> {
        self.mutate(|db| db.set_audio(image_id, audio))
    }
}
