//! The database document shared by the storage backends.
//!
//! On disk the document is `{ "version": .., "images": { id: image, .. }, "links": [..] }`.
//! Images are a JSON object keyed by id whose key order is upload order.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::model::{AudioTrack, Image, Link, Region};
use crate::storage::StorageError;

/// Images, regions and links as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    /// Document format version.
    #[serde(default = "Database::current_version")]
    pub version: String,

    /// Images keyed by id, in upload order.
    #[serde(with = "ordered_images", default)]
    pub images: Vec<Image>,

    /// Links in insertion order.
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Database {
    /// Version written by this build.
    pub const CURRENT_VERSION: &'static str = "1.0";

    fn current_version() -> String {
        Self::CURRENT_VERSION.to_string()
    }

    pub fn new() -> Self {
        Self {
            version: Self::current_version(),
            images: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Whether a file of `version` can be read by this build.
    pub fn is_version_readable(version: &str) -> bool {
        version.split('.').next() == Some("1")
    }

    pub fn image(&self, image_id: &str) -> Result<&Image, StorageError> {
        self.images
            .iter()
            .find(|i| i.id == image_id)
            .ok_or_else(|| StorageError::image_not_found(image_id))
    }

    fn image_mut(&mut self, image_id: &str) -> Result<&mut Image, StorageError> {
        self.images
            .iter_mut()
            .find(|i| i.id == image_id)
            .ok_or_else(|| StorageError::image_not_found(image_id))
    }

    /// Add an image, replacing a record with the same id in place.
    pub fn insert_image(&mut self, image: Image) {
        match self.images.iter_mut().find(|i| i.id == image.id) {
            Some(existing) => *existing = image,
            None => self.images.push(image),
        }
    }

    pub fn upsert_region(&mut self, image_id: &str, region: &Region) -> Result<(), StorageError> {
        let image = self.image_mut(image_id)?;
        match image.regions.iter_mut().find(|r| r.id == region.id) {
            Some(existing) => *existing = region.clone(),
            None => image.regions.push(region.clone()),
        }
        Ok(())
    }

    /// Store a link, dropping any other link leaving the same anchor.
    pub fn upsert_link(&mut self, link: &Link) -> Result<(), StorageError> {
        let source = self.image(&link.source_image_id)?;
        if source.region(&link.source_region_id).is_none() {
            return Err(StorageError::region_not_found(&link.source_region_id));
        }
        self.image(&link.target_image_id)?;

        self.links.retain(|l| {
            l.id != link.id && !l.starts_at(&link.source_image_id, &link.source_region_id)
        });
        self.links.push(link.clone());
        Ok(())
    }

    pub fn delete_region(&mut self, image_id: &str, region_id: &str) -> Result<(), StorageError> {
        let image = self.image_mut(image_id)?;
        let before = image.regions.len();
        image.regions.retain(|r| r.id != region_id);
        if image.regions.len() == before {
            return Err(StorageError::region_not_found(region_id));
        }
        self.links
            .retain(|l| !l.references_anchor(image_id, region_id));
        Ok(())
    }

    pub fn delete_link(&mut self, link_id: &str) -> Result<(), StorageError> {
        let before = self.links.len();
        self.links.retain(|l| l.id != link_id);
        if self.links.len() == before {
            return Err(StorageError::link_not_found(link_id));
        }
        Ok(())
    }

    pub fn delete_image(&mut self, image_id: &str) -> Result<Image, StorageError> {
        let index = self
            .images
            .iter()
            .position(|i| i.id == image_id)
            .ok_or_else(|| StorageError::image_not_found(image_id))?;
        let image = self.images.remove(index);
        self.links.retain(|l| !l.touches_image(image_id));
        Ok(image)
    }

    pub fn set_audio(
        &mut self,
        image_id: &str,
        audio: Option<&AudioTrack>,
    ) -> Result<(), StorageError> {
        self.image_mut(image_id)?.audio = audio.cloned();
        Ok(())
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize `Vec<Image>` as an id-keyed JSON object that keeps vector order.
mod ordered_images {
    use super::*;

    pub fn serialize<S: Serializer>(images: &[Image], serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(images.len()))?;
        for image in images {
            map.serialize_entry(&image.id, image)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Image>, D::Error> {
        deserializer.deserialize_map(OrderedImagesVisitor)
    }

    struct OrderedImagesVisitor;

    impl<'de> Visitor<'de> for OrderedImagesVisitor {
        type Value = Vec<Image>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of image id to image")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut images: Vec<Image> = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((key, mut image)) = access.next_entry::<String, Image>()? {
                // The key is authoritative for the id
                image.id = key;
                match images.iter_mut().find(|i| i.id == image.id) {
                    Some(existing) => *existing = image,
                    None => images.push(image),
                }
            }
            Ok(images)
        }
    }
}
