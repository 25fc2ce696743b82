//! Pointer gesture handling for drawing, moving and resizing regions.
//!
//! The controller works purely in container pixel space and emits
//! outcomes and intents; converting to normalized space and saving is the
//! session's job, and the actual drag/resize handles belong to the
//! renderer behind [`DirectManipulation`].

use crate::constants::MIN_REGION_SIZE;
use crate::coords::{PixelPoint, PixelRect};
use crate::model::RegionId;

/// Capability the renderer provides for drag/resize handles on a region element.
pub trait DirectManipulation {
    /// Attach move/resize handles to the region's element.
    fn enable_direct_manipulation(&mut self, region_id: &str);

    /// Remove move/resize handles from the region's element.
    fn disable_direct_manipulation(&mut self, region_id: &str);
}

/// Renderer without drag/resize support.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoManipulation;

impl DirectManipulation for NoManipulation {
    fn enable_direct_manipulation(&mut self, _region_id: &str) {}

    fn disable_direct_manipulation(&mut self, _region_id: &str) {}
}

/// Request to toggle drag/resize handles on one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManipulationIntent {
    Enable(RegionId),
    Disable(RegionId),
}

impl ManipulationIntent {
    /// Forward the intent to the renderer.
    pub fn apply(&self, surface: &mut dyn DirectManipulation) {
        match self {
            ManipulationIntent::Enable(id) => surface.enable_direct_manipulation(id),
            ManipulationIntent::Disable(id) => surface.disable_direct_manipulation(id),
        }
    }
}

/// Current pointer gesture.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    /// Dragging out a new region from `start`.
    Drawing {
        start: PixelPoint,
        current: PixelPoint,
    },
    /// The renderer is moving or resizing an existing region.
    DraggingOrResizing { region_id: RegionId },
}

/// What a pointer event resulted in.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// Nothing to do.
    None,
    /// A region was clicked and is now selected.
    Selected(RegionId),
    /// Rubber-band rect while drawing.
    Preview(PixelRect),
    /// A drawn box large enough to become a region.
    Drawn(PixelRect),
    /// A drawn box at or below the size threshold; nothing is saved.
    Discarded(PixelRect),
    /// An existing region was moved or resized to this on-screen rect.
    Moved { region_id: RegionId, rect: PixelRect },
    /// The gesture would change geometry but editing is locked.
    Locked,
}

/// Translates pointer events into region gestures.
#[derive(Debug)]
pub struct InteractionController {
    gesture: GestureState,
    editing_locked: bool,
    draw_armed: bool,
    selected: Option<RegionId>,
    min_region_size: f64,
}

impl InteractionController {
    /// Create a controller with the given size threshold and lock state.
    pub fn new(min_region_size: f64, editing_locked: bool) -> Self {
        Self {
            gesture: GestureState::Idle,
            editing_locked,
            draw_armed: false,
            selected: None,
            min_region_size,
        }
    }

    pub fn gesture(&self) -> &GestureState {
        &self.gesture
    }

    pub fn is_locked(&self) -> bool {
        self.editing_locked
    }

    pub fn is_draw_armed(&self) -> bool {
        self.draw_armed
    }

    /// Whether a box exceeds the size threshold in both dimensions.
    pub fn is_large_enough(&self, rect: &PixelRect) -> bool {
        rect.width > self.min_region_size && rect.height > self.min_region_size
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Lock editing: every rendered region loses its handles.
    pub fn lock<'a>(
        &mut self,
        rendered: impl IntoIterator<Item = &'a RegionId>,
    ) -> Vec<ManipulationIntent> {
        self.editing_locked = true;
        self.draw_armed = false;
        if matches!(self.gesture, GestureState::DraggingOrResizing { .. }) {
            self.gesture = GestureState::Idle;
        }
        log::info!("Editing locked");
        rendered
            .into_iter()
            .map(|id| ManipulationIntent::Disable(id.clone()))
            .collect()
    }

    /// Unlock editing: every rendered region gets its handles back.
    pub fn unlock<'a>(
        &mut self,
        rendered: impl IntoIterator<Item = &'a RegionId>,
    ) -> Vec<ManipulationIntent> {
        self.editing_locked = false;
        log::info!("Editing unlocked");
        rendered
            .into_iter()
            .map(|id| ManipulationIntent::Enable(id.clone()))
            .collect()
    }

    /// Handles a region should have right after it is rendered.
    pub fn affordance_for(&self, region_id: &str) -> ManipulationIntent {
        if self.editing_locked {
            ManipulationIntent::Disable(region_id.to_string())
        } else {
            ManipulationIntent::Enable(region_id.to_string())
        }
    }

    /// Arm the next drag on empty image space to draw a region.
    ///
    /// Refused while editing is locked.
    pub fn arm_draw(&mut self) -> bool {
        if self.editing_locked {
            log::debug!("Draw mode refused: editing is locked");
            return false;
        }
        self.draw_armed = true;
        true
    }

    /// Pointer pressed. `hit` is the region under the pointer, if any.
    pub fn pointer_down(&mut self, point: PixelPoint, hit: Option<&str>) -> GestureOutcome {
        if let Some(region_id) = hit {
            self.selected = Some(region_id.to_string());
            return GestureOutcome::Selected(region_id.to_string());
        }

        self.selected = None;
        if !self.draw_armed {
            return GestureOutcome::None;
        }
        if self.editing_locked {
            self.draw_armed = false;
            return GestureOutcome::Locked;
        }

        log::debug!("Started region at ({:.1}, {:.1})", point.x, point.y);
        self.gesture = GestureState::Drawing {
            start: point,
            current: point,
        };
        GestureOutcome::None
    }

    /// Pointer moved.
    pub fn pointer_move(&mut self, point: PixelPoint) -> GestureOutcome {
        match &mut self.gesture {
            GestureState::Drawing { start, current } => {
                *current = point;
                GestureOutcome::Preview(PixelRect::from_corners(*start, point))
            }
            _ => GestureOutcome::None,
        }
    }

    /// Pointer released. Finishes a drawing gesture.
    ///
    /// The box must exceed the size threshold in both dimensions to count.
    pub fn pointer_up(&mut self, point: PixelPoint) -> GestureOutcome {
        let GestureState::Drawing { start, .. } = self.gesture else {
            return GestureOutcome::None;
        };
        self.gesture = GestureState::Idle;
        self.draw_armed = false;

        let rect = PixelRect::from_corners(start, point);
        if self.is_large_enough(&rect) {
            log::debug!("Drew {:.1}x{:.1} box", rect.width, rect.height);
            GestureOutcome::Drawn(rect)
        } else {
            log::debug!(
                "Discarded {:.1}x{:.1} box (minimum {:.0})",
                rect.width,
                rect.height,
                self.min_region_size
            );
            GestureOutcome::Discarded(rect)
        }
    }

    /// The renderer started moving or resizing a region.
    pub fn manipulation_started(&mut self, region_id: &str) -> GestureOutcome {
        if self.editing_locked {
            return GestureOutcome::Locked;
        }
        self.gesture = GestureState::DraggingOrResizing {
            region_id: region_id.to_string(),
        };
        GestureOutcome::None
    }

    /// The renderer finished moving or resizing; `rect` is the element's final rect.
    pub fn manipulation_finished(&mut self, region_id: &str, rect: PixelRect) -> GestureOutcome {
        if self.editing_locked {
            self.gesture = GestureState::Idle;
            return GestureOutcome::Locked;
        }
        if let GestureState::DraggingOrResizing { region_id: active } = &self.gesture {
            if active != region_id {
                log::warn!(
                    "Manipulation finished for {} while {} was active",
                    region_id,
                    active
                );
            }
        }
        self.gesture = GestureState::Idle;
        GestureOutcome::Moved {
            region_id: region_id.to_string(),
            rect,
        }
    }

    /// Abandon the current gesture and forget the selection.
    pub fn cancel(&mut self) {
        self.gesture = GestureState::Idle;
        self.draw_armed = false;
    }

    /// Drop state tied to the previous image.
    pub fn reset_view(&mut self) {
        self.cancel();
        self.selected = None;
    }
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(MIN_REGION_SIZE, true)
    }
}
