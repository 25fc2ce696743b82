//! View state: what is on screen for the current image.

use web_time::Instant;

use crate::coords::{CoordinateMapper, PixelRect};
use crate::events::{SessionEvent, Warning};
use crate::model::{AudioTrack, ImageId, RegionId};
use crate::session::Session;
use crate::storage::Storage;

impl<S: Storage> Session<S> {
    /// Displayed image rect last reported by the host.
    pub fn viewport(&self) -> Option<PixelRect> {
        self.viewport
    }

    /// Set the displayed image rect and reposition regions immediately.
    ///
    /// Every completed load forgets the rect, so call this after laying out
    /// each freshly loaded image. Bursts of window resizes should go through
    /// [`Session::viewport_resized`].
    pub fn set_viewport(&mut self, rect: PixelRect) {
        self.viewport = Some(rect);
        self.resize.cancel();
        self.render_current();
    }

    /// Record a resize; regions are repositioned once the burst settles.
    pub fn viewport_resized(&mut self, rect: PixelRect) {
        self.viewport = Some(rect);
        self.resize.trigger();
    }

    /// Run the debounced reposition pass if it is due.
    ///
    /// Returns whether a pass ran.
    pub fn poll_resize(&mut self) -> bool {
        self.poll_resize_at(Instant::now())
    }

    pub fn poll_resize_at(&mut self, now: Instant) -> bool {
        if self.resize.poll_at(now).is_none() {
            return false;
        }
        self.render_current();
        true
    }

    /// The mapper for the current viewport, or a warning if none is usable.
    pub(super) fn mapper(&mut self) -> Option<CoordinateMapper> {
        let rect = self.viewport?;
        match CoordinateMapper::new(rect) {
            Ok(mapper) => Some(mapper),
            Err(e) => {
                log::warn!("{}", e);
                self.warn(Warning::DegenerateViewport {
                    width: rect.width,
                    height: rect.height,
                });
                None
            }
        }
    }

    /// Emit pixel geometry for every region of the current image.
    ///
    /// Regions rendered for the first time get their manipulation handles
    /// set to match the editing lock.
    pub(super) fn render_current(&mut self) {
        let Some(image_id) = self.navigation.current_image().map(str::to_string) else {
            return;
        };
        let Some(mapper) = self.mapper() else {
            return;
        };
        let Ok(regions) = self.regions.list(&image_id) else {
            return;
        };

        let placed: Vec<_> = regions
            .iter()
            .map(|r| (r.id.clone(), r.name.clone(), mapper.to_pixels(&r.rect)))
            .collect();
        log::debug!("Positioning {} region(s) on {}", placed.len(), image_id);

        for (region_id, name, rect) in placed {
            self.place_region(region_id, name, rect);
        }
    }

    /// Emit one region's geometry, creating its element if needed.
    pub(super) fn place_region(&mut self, region_id: RegionId, name: String, rect: PixelRect) {
        if !self.rendered.contains(&region_id) {
            self.interaction
                .affordance_for(&region_id)
                .apply(self.surface.as_mut());
            self.rendered.push(region_id.clone());
        }
        self.emit(SessionEvent::RegionGeometry {
            region_id,
            name,
            rect,
        });
    }

    pub(super) fn unplace_region(&mut self, region_id: &str) {
        if let Some(index) = self.rendered.iter().position(|id| id == region_id) {
            self.rendered.remove(index);
            self.emit(SessionEvent::RegionRemoved {
                region_id: region_id.to_string(),
            });
        }
    }

    /// Re-announce the link badge of every region on the current image.
    pub(super) fn refresh_link_indicators(&mut self) {
        for (region_id, has_outgoing_link) in self.link_indicators() {
            self.emit(SessionEvent::LinkIndicator {
                region_id,
                has_outgoing_link,
            });
        }
    }

    /// Drop everything on screen.
    pub(super) fn clear_view(&mut self) {
        self.interaction.reset_view();
        self.rendered.clear();
        self.emit(SessionEvent::ViewCleared);
    }

    /// Rebuild the view for a freshly loaded image.
    ///
    /// The previous image's rect no longer applies, so regions are only
    /// positioned once the host reports the new one.
    pub(super) fn show_image(&mut self, image_id: ImageId, highlight: Option<RegionId>) {
        self.clear_view();
        self.viewport = None;
        self.resize.cancel();
        self.refresh_link_indicators();

        let (audio, has_highlight) = match self.regions.image(&image_id) {
            Ok(image) => (
                image.audio.clone(),
                highlight.as_deref().is_some_and(|id| image.region(id).is_some()),
            ),
            Err(_) => (None, false),
        };

        self.emit(SessionEvent::Navigated {
            image_id: image_id.clone(),
            highlight: highlight.clone(),
        });

        match highlight {
            Some(region_id) if has_highlight => {
                let duration = self.settings.highlight_duration;
                self.emit(SessionEvent::Highlight {
                    region_id,
                    duration,
                });
            }
            Some(region_id) => {
                log::warn!("Highlight target {} is not on {}", region_id, image_id);
            }
            None => {}
        }

        self.announce_soundtrack(audio);
    }

    /// Tell the player about a track change; repeats are swallowed.
    pub(super) fn announce_soundtrack(&mut self, track: Option<AudioTrack>) {
        if self.soundtrack == track {
            return;
        }
        self.soundtrack = track.clone();
        self.emit(SessionEvent::Soundtrack { track });
    }
}
