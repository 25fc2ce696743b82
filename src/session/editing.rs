//! Mutations: gestures, region/link/image edits and the editing lock.

use crate::coords::{PixelPoint, PixelRect};
use crate::error::{CoreError, CoreResult};
use crate::events::SessionEvent;
use crate::interaction::GestureOutcome;
use crate::model::{Anchor, AudioTrack, Image, Link, LinkTarget, Region, RegionDraft};
use crate::session::Session;
use crate::storage::Storage;

impl<S: Storage> Session<S> {
    // ------------------------------------------------------------------
    // Editing lock
    // ------------------------------------------------------------------

    /// Lock editing and strip handles from every rendered region.
    pub fn lock_editing(&mut self) {
        for intent in self.interaction.lock(&self.rendered) {
            intent.apply(self.surface.as_mut());
        }
    }

    /// Unlock editing and give every rendered region its handles back.
    pub fn unlock_editing(&mut self) {
        for intent in self.interaction.unlock(&self.rendered) {
            intent.apply(self.surface.as_mut());
        }
    }

    /// Flip the lock. Returns the new state.
    pub fn toggle_lock(&mut self) -> bool {
        if self.interaction.is_locked() {
            self.unlock_editing();
        } else {
            self.lock_editing();
        }
        self.interaction.is_locked()
    }

    // ------------------------------------------------------------------
    // Gestures
    // ------------------------------------------------------------------

    /// Arm the next drag on the image to draw a region.
    pub fn arm_draw(&mut self) -> bool {
        if self.navigation.current_image().is_none() {
            return false;
        }
        self.interaction.arm_draw()
    }

    pub fn pointer_down(&mut self, point: PixelPoint, hit: Option<&str>) -> GestureOutcome {
        self.interaction.pointer_down(point, hit)
    }

    pub fn pointer_move(&mut self, point: PixelPoint) -> GestureOutcome {
        self.interaction.pointer_move(point)
    }

    /// Finish a pointer gesture, committing a drawn region if it is big enough.
    ///
    /// Returns the new region, or `None` when nothing was committed.
    pub fn pointer_up(&mut self, point: PixelPoint) -> CoreResult<Option<Region>> {
        match self.interaction.pointer_up(point) {
            GestureOutcome::Drawn(rect) => self.commit_drawn(rect),
            _ => Ok(None),
        }
    }

    fn commit_drawn(&mut self, rect: PixelRect) -> CoreResult<Option<Region>> {
        let Some(image_id) = self.navigation.current_image().map(str::to_string) else {
            return Ok(None);
        };
        let Some(mapper) = self.mapper() else {
            return Ok(None);
        };
        // What lies over the image must still clear the threshold
        let visible = rect.intersect(&mapper.image_rect());
        if !visible.is_some_and(|v| self.interaction.is_large_enough(&v)) {
            log::debug!(
                "Drawn box not committed: {:?} of it lies over the image",
                visible
            );
            return Ok(None);
        }
        let normalized = match mapper.clip_to_normalized(&rect) {
            Ok(normalized) => normalized,
            Err(e) => {
                log::debug!("Drawn box not committed: {}", e);
                return Ok(None);
            }
        };

        let draft = RegionDraft::new(self.settings.default_region_name.clone(), normalized);
        self.upsert_region(&image_id, draft).map(Some)
    }

    pub fn manipulation_started(&mut self, region_id: &str) -> GestureOutcome {
        self.interaction.manipulation_started(region_id)
    }

    /// The renderer finished a move/resize; save the region's new geometry.
    ///
    /// While locked the element is snapped back to its stored geometry.
    pub fn manipulation_finished(
        &mut self,
        region_id: &str,
        rect: PixelRect,
    ) -> CoreResult<Option<Region>> {
        let outcome = self.interaction.manipulation_finished(region_id, rect);
        let image_id = self
            .navigation
            .current_image()
            .map(str::to_string)
            .ok_or_else(|| CoreError::constraint_violation("no image is being viewed"))?;
        let existing = self.regions.region(&image_id, region_id)?.clone();

        match outcome {
            GestureOutcome::Moved { rect, .. } => {
                let Some(mapper) = self.mapper() else {
                    return Ok(None);
                };
                let normalized = match mapper.clip_to_normalized(&rect) {
                    Ok(normalized) => normalized,
                    Err(e) => {
                        log::debug!("Region {} moved off the image: {}", region_id, e);
                        self.place_region(
                            existing.id.clone(),
                            existing.name.clone(),
                            mapper.to_pixels(&existing.rect),
                        );
                        return Ok(None);
                    }
                };
                let draft = RegionDraft {
                    rect: normalized,
                    ..RegionDraft::from(&existing)
                };
                self.upsert_region(&image_id, draft).map(Some)
            }
            _ => {
                if let Some(mapper) = self.mapper() {
                    self.place_region(
                        existing.id.clone(),
                        existing.name.clone(),
                        mapper.to_pixels(&existing.rect),
                    );
                }
                Ok(None)
            }
        }
    }

    // ------------------------------------------------------------------
    // Regions
    // ------------------------------------------------------------------

    /// Insert or replace a region and mirror it to storage.
    pub fn upsert_region(&mut self, image_id: &str, draft: RegionDraft) -> CoreResult<Region> {
        let region = self.regions.upsert(image_id, draft)?;

        let result = self.storage.persist_region(image_id, &region);
        self.report_persistence("persist_region", result);

        if self.navigation.current_image() == Some(image_id) {
            if let Some(mapper) = self.mapper() {
                self.place_region(
                    region.id.clone(),
                    region.name.clone(),
                    mapper.to_pixels(&region.rect),
                );
            }
            self.refresh_link_indicators();
        }
        Ok(region)
    }

    /// Rename a region on the current image, keeping its geometry.
    pub fn rename_region(&mut self, region_id: &str, name: &str) -> CoreResult<Region> {
        let image_id = self
            .navigation
            .current_image()
            .map(str::to_string)
            .ok_or_else(|| CoreError::constraint_violation("no image is being viewed"))?;
        let existing = self.regions.region(&image_id, region_id)?;
        let draft = RegionDraft {
            name: name.to_string(),
            ..RegionDraft::from(existing)
        };
        self.upsert_region(&image_id, draft)
    }

    /// Delete a region and every link referencing it.
    pub fn delete_region(&mut self, image_id: &str, region_id: &str) -> CoreResult<Region> {
        let region = self.regions.delete(image_id, region_id)?;
        let removed = self.links.delete_for_region(image_id, region_id);
        log::debug!("{} link(s) removed with region {}", removed.len(), region_id);

        let result = self.storage.delete_region(image_id, region_id);
        self.report_persistence("delete_region", result);

        for link in removed {
            self.emit(SessionEvent::LinkRemoved { link_id: link.id });
        }
        if self.navigation.current_image() == Some(image_id) {
            self.unplace_region(region_id);
        }
        self.refresh_link_indicators();
        Ok(region)
    }

    // ------------------------------------------------------------------
    // Links
    // ------------------------------------------------------------------

    /// Link a region to an image or a region on it, replacing any link
    /// already leaving that region.
    pub fn create_link(&mut self, source: Anchor, target: LinkTarget) -> CoreResult<Link> {
        let replaced: Vec<_> = self
            .links
            .outgoing_links_from(&source.image_id, &source.region_id)
            .into_iter()
            .map(|l| l.id.clone())
            .collect();
        let link = self.links.create_link(&self.regions, source, target)?;

        let result = self.storage.persist_link(&link);
        self.report_persistence("persist_link", result);

        for link_id in replaced {
            self.emit(SessionEvent::LinkRemoved { link_id });
        }
        self.refresh_link_indicators();
        Ok(link)
    }

    pub fn delete_link(&mut self, link_id: &str) -> CoreResult<Link> {
        let link = self.links.delete_link(link_id)?;

        let result = self.storage.delete_link(link_id);
        self.report_persistence("delete_link", result);

        self.emit(SessionEvent::LinkRemoved {
            link_id: link.id.clone(),
        });
        self.refresh_link_indicators();
        Ok(link)
    }

    // ------------------------------------------------------------------
    // Images
    // ------------------------------------------------------------------

    /// Add an image to the library (upload).
    pub fn register_image(&mut self, image: Image) {
        log::info!("Image added: {} ({})", image.display_name(), image.id);
        let result = self.storage.persist_image(&image);
        self.report_persistence("persist_image", result);
        self.regions.insert_image(image);
    }

    /// Delete an image, its regions and every link touching it.
    ///
    /// Deleting the image on screen closes the view, even while another
    /// image is still loading.
    pub fn delete_image(&mut self, image_id: &str) -> CoreResult<Image> {
        let image = self.regions.remove_image(image_id)?;
        let removed = self.links.delete_for_image(image_id);
        log::info!(
            "Image deleted: {} ({} region(s), {} link(s))",
            image_id,
            image.regions.len(),
            removed.len()
        );

        let result = self.storage.delete_image(image_id);
        self.report_persistence("delete_image", result);

        for link in removed {
            self.emit(SessionEvent::LinkRemoved { link_id: link.id });
        }

        let was_displayed = self.navigation.displayed_image() == Some(image_id);
        self.navigation.forget(image_id);

        if was_displayed {
            self.clear_view();
            self.emit(SessionEvent::ImageClosed {
                image_id: image_id.to_string(),
            });
            self.announce_soundtrack(None);
        } else {
            self.refresh_link_indicators();
        }
        Ok(image)
    }

    /// Replace or clear an image's soundtrack.
    pub fn set_audio(&mut self, image_id: &str, audio: Option<AudioTrack>) -> CoreResult<()> {
        self.regions.set_audio(image_id, audio.clone())?;
        log::info!(
            "Audio {} for {}",
            if audio.is_some() { "set" } else { "removed" },
            image_id
        );

        let result = self.storage.set_audio(image_id, audio.as_ref());
        self.report_persistence("set_audio", result);

        if self.navigation.current_image() == Some(image_id) {
            self.announce_soundtrack(audio);
        }
        Ok(())
    }
}
