//! In-process storage backend.

use crate::model::{AudioTrack, Image, Link, Region};
use crate::storage::{Database, Storage, StorageError};

/// Keeps the database in memory.
///
/// Writes can be switched off with [`MemoryStorage::set_available`] to
/// exercise the session's failure path.
#[derive(Debug)]
pub struct MemoryStorage {
    database: Database,
    available: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::from_database(Database::new())
    }

    pub fn from_database(database: Database) -> Self {
        Self {
            database,
            available: true,
        }
    }

    /// Seed with images, in order.
    pub fn with_images(images: impl IntoIterator<Item = Image>) -> Self {
        let mut storage = Self::new();
        for image in images {
            storage.database.insert_image(image);
        }
        storage
    }

    /// Make every later call succeed or fail with [`StorageError::Unavailable`].
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.available {
            Ok(())
        } else {
            Err(StorageError::Unavailable("memory backend offline".to_string()))
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemoryStorage {
    fn get_image(&self, id: &str) -> Result<Image, StorageError> {
        self.check()?;
        self.database.image(id).cloned()
    }

    fn list_images(&self) -> Result<Vec<Image>, StorageError> {
        self.check()?;
        Ok(self.database.images.clone())
    }

    fn list_links(&self) -> Result<Vec<Link>, StorageError> {
        self.check()?;
        Ok(self.database.links.clone())
    }

    fn persist_image(&mut self, image: &Image) -> Result<(), StorageError> {
        self.check()?;
        self.database.insert_image(image.clone());
        Ok(())
    }

    fn persist_region(&mut self, image_id: &str, region: &Region) -> Result<(), StorageError> {
        self.check()?;
        self.database.upsert_region(image_id, region)
    }

    fn persist_link(&mut self, link: &Link) -> Result<(), StorageError> {
        self.check()?;
        self.database.upsert_link(link)
    }

    fn delete_region(&mut self, image_id: &str, region_id: &str) -> Result<(), StorageError> {
        self.check()?;
        self.database.delete_region(image_id, region_id)
    }

    fn delete_link(&mut self, link_id: &str) -> Result<(), StorageError> {
        self.check()?;
        self.database.delete_link(link_id)
    }

    fn delete_image(&mut self, image_id: &str) -> Result<(), StorageError> {
        self.check()?;
        self.database.delete_image(image_id).map(|_| ())
    }

    fn set_audio(
        &mut self,
        image_id: &str,
        audio: Option<&AudioTrack>,
    ) -> Result<(), StorageError> {
        self.check()?;
        self.database.set_audio(image_id, audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_rejects_everything() {
        let mut storage = MemoryStorage::with_images([Image::new("a", "a.png")]);
        storage.set_available(false);
        assert!(matches!(
            storage.get_image("a"),
            Err(StorageError::Unavailable(_))
        ));
        assert!(storage.delete_image("a").is_err());
        storage.set_available(true);
        assert_eq!(storage.list_images().unwrap().len(), 1);
    }

    #[test]
    fn test_get_missing_image() {
        let storage = MemoryStorage::new();
        assert!(storage.get_image("nope").unwrap_err().is_not_found());
    }
}
