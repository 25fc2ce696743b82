//! Region storage for every image in the library.
//!
//! The store owns the image records and, through them, their regions.
//! Regions have no lifecycle of their own: removing an image drops them.

use chrono::Utc;
use uuid::Uuid;

use crate::constants::REGION_ID_PREFIX;
use crate::error::{CoreError, CoreResult};
use crate::model::{AudioTrack, Image, ImageId, Region, RegionDraft};

/// Generate a fresh region id.
pub fn new_region_id() -> String {
    format!("{}{}", REGION_ID_PREFIX, Uuid::new_v4())
}

/// Generate a fresh image id.
pub fn new_image_id() -> String {
    Uuid::new_v4().to_string()
}

/// Images in upload order, each with its ordered regions.
#[derive(Debug, Clone, Default)]
pub struct RegionStore {
    images: Vec<Image>,
}

impl RegionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from images already loaded from storage.
    ///
    /// Later duplicates of an image id replace earlier ones.
    pub fn from_images(images: impl IntoIterator<Item = Image>) -> Self {
        let mut store = Self::new();
        for image in images {
            store.insert_image(image);
        }
        store
    }

    /// Add an image, replacing any record with the same id in place.
    pub fn insert_image(&mut self, image: Image) {
        if let Some(existing) = self.images.iter_mut().find(|i| i.id == image.id) {
            log::debug!("Replacing image record {}", image.id);
            *existing = image;
        } else {
            log::debug!("Added image {} ({})", image.id, image.display_name());
            self.images.push(image);
        }
    }

    /// Remove an image and every region it owns.
    pub fn remove_image(&mut self, image_id: &str) -> CoreResult<Image> {
        let index = self
            .images
            .iter()
            .position(|i| i.id == image_id)
            .ok_or_else(|| CoreError::image_not_found(image_id))?;
        let image = self.images.remove(index);
        log::info!(
            "Removed image {} with {} regions",
            image.id,
            image.regions.len()
        );
        Ok(image)
    }

    pub fn contains_image(&self, image_id: &str) -> bool {
        self.images.iter().any(|i| i.id == image_id)
    }

    pub fn image(&self, image_id: &str) -> CoreResult<&Image> {
        self.images
            .iter()
            .find(|i| i.id == image_id)
            .ok_or_else(|| CoreError::image_not_found(image_id))
    }

    fn image_mut(&mut self, image_id: &str) -> CoreResult<&mut Image> {
        self.images
            .iter_mut()
            .find(|i| i.id == image_id)
            .ok_or_else(|| CoreError::image_not_found(image_id))
    }

    /// All images in upload order.
    pub fn images(&self) -> impl Iterator<Item = &Image> {
        self.images.iter()
    }

    /// The earliest uploaded image, if any.
    pub fn first_image(&self) -> Option<&Image> {
        self.images.first()
    }

    pub fn image_ids(&self) -> Vec<ImageId> {
        self.images.iter().map(|i| i.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Insert or replace a region on an image.
    ///
    /// A draft whose id matches an existing region replaces it entirely,
    /// keeping its position and `created_at`. Anything else is appended with
    /// a generated id if the draft has none.
    pub fn upsert(&mut self, image_id: &str, draft: RegionDraft) -> CoreResult<Region> {
        if !draft.rect.is_valid() {
            return Err(CoreError::invalid_geometry(format!(
                "region '{}' has non-positive size {}x{}",
                draft.name, draft.rect.relative_width, draft.rect.relative_height
            )));
        }

        let image = self.image_mut(image_id)?;
        let now = Utc::now();
        let id = draft.id.unwrap_or_else(new_region_id);

        if let Some(existing) = image.regions.iter_mut().find(|r| r.id == id) {
            *existing = Region {
                id,
                rect: draft.rect,
                name: draft.name,
                created_at: existing.created_at,
                updated_at: now,
            };
            log::info!("Region updated: {} ({})", existing.name, existing.id);
            return Ok(existing.clone());
        }

        let region = Region {
            id,
            rect: draft.rect,
            name: draft.name,
            created_at: now,
            updated_at: now,
        };
        log::info!("Region saved: {} ({})", region.name, region.id);
        image.regions.push(region.clone());
        Ok(region)
    }

    /// Remove a region from an image.
    ///
    /// Links are not touched here; the caller cascades to the link graph.
    pub fn delete(&mut self, image_id: &str, region_id: &str) -> CoreResult<Region> {
        let image = self.image_mut(image_id)?;
        let index = image
            .regions
            .iter()
            .position(|r| r.id == region_id)
            .ok_or_else(|| CoreError::region_not_found(image_id, region_id))?;
        let region = image.regions.remove(index);
        log::info!("Region deleted: {} ({})", region.name, region.id);
        Ok(region)
    }

    /// Regions of an image in insertion order.
    pub fn list(&self, image_id: &str) -> CoreResult<&[Region]> {
        Ok(&self.image(image_id)?.regions)
    }

    pub fn region(&self, image_id: &str, region_id: &str) -> CoreResult<&Region> {
        self.image(image_id)?
            .region(region_id)
            .ok_or_else(|| CoreError::region_not_found(image_id, region_id))
    }

    /// Replace or clear the soundtrack of an image.
    pub fn set_audio(&mut self, image_id: &str, audio: Option<AudioTrack>) -> CoreResult<()> {
        let image = self.image_mut(image_id)?;
        image.audio = audio;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NormalizedRect;

    fn store_with(ids: &[&str]) -> RegionStore {
        RegionStore::from_images(ids.iter().map(|id| Image::new(*id, format!("{id}.png"))))
    }

    #[test]
    fn test_upsert_assigns_prefixed_id() {
        let mut store = store_with(&["img1"]);
        let region = store
            .upsert("img1", RegionDraft::new("Door", NormalizedRect::new(0.1, 0.1, 0.2, 0.2)))
            .unwrap();
        assert!(region.id.starts_with(REGION_ID_PREFIX));
        assert_eq!(store.list("img1").unwrap().len(), 1);
    }

    #[test]
    fn test_upsert_replaces_existing_without_merge() {
        let mut store = store_with(&["img1"]);
        let first = store
            .upsert(
                "img1",
                RegionDraft::new("Door", NormalizedRect::new(0.1, 0.1, 0.2, 0.2)).with_id("r1"),
            )
            .unwrap();
        store
            .upsert(
                "img1",
                RegionDraft::new("Window", NormalizedRect::new(0.1, 0.1, 0.2, 0.2)).with_id("r2"),
            )
            .unwrap();

        let second = store
            .upsert(
                "img1",
                RegionDraft::new("Gate", NormalizedRect::new(0.5, 0.5, 0.1, 0.1)).with_id("r1"),
            )
            .unwrap();

        let regions = store.list("img1").unwrap();
        assert_eq!(regions.len(), 2);
        // Position in the sequence is kept
        assert_eq!(regions[0].id, "r1");
        assert_eq!(regions[0].name, "Gate");
        assert!(regions[0].rect.approx_eq(&NormalizedRect::new(0.5, 0.5, 0.1, 0.1), 1e-12));
        // First-insert timestamp survives, update timestamp moves
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let mut store = store_with(&["img1"]);
        for name in ["a", "b", "c"] {
            store
                .upsert(
                    "img1",
                    RegionDraft::new(name, NormalizedRect::full()).with_id(name),
                )
                .unwrap();
        }
        let names: Vec<_> = store.list("img1").unwrap().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn test_unknown_image_errors() {
        let mut store = store_with(&["img1"]);
        let err = store
            .upsert("nope", RegionDraft::new("x", NormalizedRect::full()))
            .unwrap_err();
        assert_eq!(err, CoreError::image_not_found("nope"));
        assert!(store.list("nope").is_err());
        assert!(store.delete("nope", "r1").is_err());
    }

    #[test]
    fn test_invalid_rect_rejected() {
        let mut store = store_with(&["img1"]);
        let result = store.upsert("img1", RegionDraft::new("flat", NormalizedRect::new(0.1, 0.1, 0.3, 0.0)));
        assert!(matches!(result, Err(CoreError::InvalidGeometry { .. })));
        assert!(store.list("img1").unwrap().is_empty());
    }

    #[test]
    fn test_delete_region() {
        let mut store = store_with(&["img1"]);
        store
            .upsert("img1", RegionDraft::new("a", NormalizedRect::full()).with_id("r1"))
            .unwrap();
        assert_eq!(store.delete("img1", "r1").unwrap().id, "r1");
        assert!(store.list("img1").unwrap().is_empty());
        assert_eq!(
            store.delete("img1", "r1").unwrap_err(),
            CoreError::region_not_found("img1", "r1")
        );
    }

    #[test]
    fn test_remove_image_drops_regions() {
        let mut store = store_with(&["img1", "img2"]);
        store
            .upsert("img1", RegionDraft::new("a", NormalizedRect::full()))
            .unwrap();
        let removed = store.remove_image("img1").unwrap();
        assert_eq!(removed.regions.len(), 1);
        assert!(!store.contains_image("img1"));
        assert_eq!(store.first_image().map(|i| i.id.as_str()), Some("img2"));
    }

    #[test]
    fn test_insert_image_replaces_in_place() {
        let mut store = store_with(&["img1", "img2"]);
        store.insert_image(Image::new("img1", "renamed.png"));
        assert_eq!(store.image_ids(), ["img1", "img2"]);
        assert_eq!(store.image("img1").unwrap().original_name, "renamed.png");
    }
}
