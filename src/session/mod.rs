//! The slideshow session: one explicit context owning every component.
//!
//! A [`Session`] wires the region store, link graph and the two controllers
//! to a storage backend and a rendering surface. Every public operation
//! mutates the in-memory model first, mirrors the change to storage without
//! waiting on it, and queues [`SessionEvent`]s for the host to drain.
//!
//! Image loads are split in two so hosts can perform the I/O however they
//! like: [`Session::request_image`] (or an activation) yields a
//! [`PendingLoad`], and [`Session::complete_load`] reports the fetched image
//! back. [`Session::perform_load`] does both halves against the session's
//! own storage.

mod editing;
mod view;

#[cfg(test)]
mod tests;

use crate::config::SessionSettings;
use crate::coords::PixelRect;
use crate::debounce::Debouncer;
use crate::events::{SessionEvent, Warning};
use crate::interaction::{DirectManipulation, InteractionController, NoManipulation};
use crate::link_graph::LinkGraph;
use crate::model::{AudioTrack, Image, ImageId, RegionId};
use crate::navigation::{
    Activation, ChoiceHandle, Disambiguation, LoadCompletion, LoadTicket, NavState,
    NavigationController, PendingLoad,
};
use crate::region_store::RegionStore;
use crate::storage::{Storage, StorageError};

/// Counts shown in the info panel for the current image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSummary {
    pub image_id: ImageId,
    pub region_count: usize,
    /// Links where the image is source or target.
    pub links_touching: usize,
    /// Regions on the image that have an outgoing link.
    pub linked_regions: usize,
}

/// Explicit session context for one viewer/editor.
pub struct Session<S: Storage> {
    regions: RegionStore,
    links: LinkGraph,
    navigation: NavigationController,
    interaction: InteractionController,
    storage: S,
    surface: Box<dyn DirectManipulation>,
    settings: SessionSettings,

    /// Displayed image rect inside its container; `None` until laid out.
    viewport: Option<PixelRect>,
    resize: Debouncer,

    /// Regions of the current image that have an element on screen.
    rendered: Vec<RegionId>,
    /// Track last announced to the player.
    soundtrack: Option<AudioTrack>,
    events: Vec<SessionEvent>,
}

impl<S: Storage> Session<S> {
    /// Open a session over everything the storage backend holds.
    ///
    /// Links are taken as stored, so legacy data with several links per
    /// anchor is preserved and surfaces as a disambiguation prompt.
    pub fn open(storage: S, settings: SessionSettings) -> Result<Self, StorageError> {
        let images = storage.list_images()?;
        let links = storage.list_links()?;
        log::info!(
            "Opened session with {} images and {} links",
            images.len(),
            links.len()
        );

        Ok(Self {
            regions: RegionStore::from_images(images),
            links: LinkGraph::from_links(links),
            navigation: NavigationController::new(),
            interaction: InteractionController::new(
                settings.min_region_size,
                settings.start_locked,
            ),
            storage,
            surface: Box::new(NoManipulation),
            resize: Debouncer::new(settings.resize_debounce),
            settings,
            viewport: None,
            rendered: Vec::new(),
            soundtrack: None,
            events: Vec::new(),
        })
    }

    /// Attach the renderer's drag/resize capability.
    pub fn with_surface(mut self, surface: Box<dyn DirectManipulation>) -> Self {
        self.surface = surface;
        self
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn regions(&self) -> &RegionStore {
        &self.regions
    }

    pub fn links(&self) -> &LinkGraph {
        &self.links
    }

    pub fn interaction(&self) -> &InteractionController {
        &self.interaction
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn state(&self) -> &NavState {
        self.navigation.state()
    }

    pub fn current_image_id(&self) -> Option<&str> {
        self.navigation.current_image()
    }

    /// The image being viewed.
    pub fn current_image(&self) -> Option<&Image> {
        let id = self.navigation.current_image()?;
        self.regions.image(id).ok()
    }

    pub fn pending_choice(&self) -> Option<&Disambiguation> {
        self.navigation.pending_choice()
    }

    /// Take every event queued since the last call.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: SessionEvent) {
        log::trace!("Event: {:?}", event);
        self.events.push(event);
    }

    fn warn(&mut self, warning: Warning) {
        self.emit(SessionEvent::Warning(warning));
    }

    /// Surface a storage failure without touching the in-memory model.
    fn report_persistence(&mut self, operation: &str, result: Result<(), StorageError>) {
        if let Err(e) = result {
            log::warn!("Storage {} failed: {}", operation, e);
            self.warn(Warning::Persistence {
                operation: operation.to_string(),
                message: e.to_string(),
            });
        }
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Show the first image in upload order.
    ///
    /// Returns `None` when the library is empty; the session stays idle.
    pub fn start(&mut self) -> Option<LoadCompletion> {
        let Some(first) = self.regions.first_image().map(|i| i.id.clone()) else {
            log::info!("No images to show");
            return None;
        };
        Some(self.load_image(&first))
    }

    /// Request an image load, superseding any load in flight.
    pub fn request_image(&mut self, image_id: &str, highlight: Option<RegionId>) -> PendingLoad {
        self.navigation.begin_load(image_id.to_string(), highlight)
    }

    /// Fetch a requested image from storage and complete the load.
    pub fn perform_load(&mut self, pending: &PendingLoad) -> LoadCompletion {
        let fetched = self.storage.get_image(&pending.image_id);
        self.complete_load(pending.ticket, fetched)
    }

    /// Request and perform a load in one step.
    pub fn load_image(&mut self, image_id: &str) -> LoadCompletion {
        let pending = self.request_image(image_id, None);
        self.perform_load(&pending)
    }

    /// Report the outcome of a load started by `request_image` or an activation.
    ///
    /// Only the most recently requested load is applied. On success the
    /// previous view is discarded completely and rebuilt from the model; on
    /// failure the previous view stays and a warning is queued.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        fetched: Result<Image, StorageError>,
    ) -> LoadCompletion {
        let completion = self.navigation.complete_load(ticket, fetched.is_ok());
        match (&completion, fetched) {
            (LoadCompletion::Loaded { image_id, highlight }, Ok(image)) => {
                if !self.regions.contains_image(image_id) {
                    log::debug!("Adding {} from storage to the model", image_id);
                    self.regions.insert_image(image);
                }
                self.show_image(image_id.clone(), highlight.clone());
            }
            (LoadCompletion::Failed { image_id, .. }, Err(e)) => {
                self.warn(Warning::LoadFailed {
                    image_id: image_id.clone(),
                    message: e.to_string(),
                });
            }
            _ => {}
        }
        completion
    }

    /// Activate a region on the current image.
    ///
    /// A single link yields [`Activation::Navigate`]; pass its load to
    /// [`Session::perform_load`]. Several links queue a
    /// [`SessionEvent::ChoiceRequested`] prompt.
    pub fn activate(&mut self, region_id: &str) -> Activation {
        let activation = self.navigation.activate(&self.links, region_id);
        match &activation {
            Activation::NoLink { region_id, .. } => {
                self.warn(Warning::NoLink {
                    region_id: region_id.clone(),
                });
            }
            Activation::Choose(prompt) => {
                self.emit(SessionEvent::ChoiceRequested(prompt.clone()));
            }
            Activation::NotViewing | Activation::Busy | Activation::Navigate(_) => {}
        }
        activation
    }

    /// Answer a disambiguation prompt with a 1-based selection.
    ///
    /// Out-of-range selections do nothing and keep the prompt open.
    pub fn resolve_choice(&mut self, handle: ChoiceHandle, selection: usize) -> Option<PendingLoad> {
        self.navigation.resolve_choice(handle, selection)
    }

    /// Whether each region of the current image has an outgoing link.
    pub fn link_indicators(&self) -> Vec<(RegionId, bool)> {
        let Some(image) = self.current_image() else {
            return Vec::new();
        };
        image
            .regions
            .iter()
            .map(|r| (r.id.clone(), self.links.has_outgoing(&image.id, &r.id)))
            .collect()
    }

    /// Info panel counts for the current image.
    pub fn summary(&self) -> Option<ImageSummary> {
        let image = self.current_image()?;
        Some(ImageSummary {
            image_id: image.id.clone(),
            region_count: image.regions.len(),
            links_touching: self.links.links_touching(&image.id).len(),
            linked_regions: image
                .regions
                .iter()
                .filter(|r| self.links.has_outgoing(&image.id, &r.id))
                .count(),
        })
    }
}
