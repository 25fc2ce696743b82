//! Slide navigation state machine.
//!
//! ```text
//!   Idle ──begin_load──▶ Navigating ──complete_load(ok)──▶ Viewing(id)
//!                           │  ▲                              │
//!            complete_load  │  └────activate / resolve_choice─┘
//!               (failed)    ▼
//!               previous Viewing, or Idle
//! ```
//!
//! The controller only decides; it never performs I/O. Every load is
//! identified by a ticket and only the most recently issued ticket may
//! complete, so an older load finishing late cannot overwrite a newer one.

use crate::link_graph::LinkGraph;
use crate::model::{Anchor, ImageId, Link, RegionId};

/// Identifies one requested image load.
pub type LoadTicket = u64;

/// Identifies one outstanding disambiguation prompt.
pub type ChoiceHandle = u64;

/// Where the slideshow currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavState {
    /// No image loaded.
    Idle,
    /// An image is displayed.
    Viewing(ImageId),
    /// An image swap is in flight.
    Navigating {
        target: ImageId,
        /// Image to fall back to if the load fails.
        previous: Option<ImageId>,
    },
}

/// An image load the host must perform and report back with `complete_load`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLoad {
    pub ticket: LoadTicket,
    pub image_id: ImageId,
    /// Region to highlight once the image is shown.
    pub highlight: Option<RegionId>,
}

/// One entry of a disambiguation prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    /// 1-based position shown to the user.
    pub index: usize,
    pub link: Link,
}

/// A pending choice between several links leaving the same anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct Disambiguation {
    pub handle: ChoiceHandle,
    pub source: Anchor,
    /// Candidates in link insertion order.
    pub choices: Vec<Choice>,
}

/// Result of activating a region.
#[derive(Debug, Clone, PartialEq)]
pub enum Activation {
    /// No image is being viewed; nothing to activate.
    NotViewing,
    /// A navigation is already in flight; the activation was rejected.
    Busy,
    /// The region has no outgoing link.
    NoLink { image_id: ImageId, region_id: RegionId },
    /// Exactly one link: the host should load the target.
    Navigate(PendingLoad),
    /// Several links: the host should ask the user to pick one.
    Choose(Disambiguation),
}

/// Result of reporting a load back to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadCompletion {
    /// The image is now being viewed.
    Loaded {
        image_id: ImageId,
        highlight: Option<RegionId>,
    },
    /// A newer load was requested after this one; the result was dropped.
    Superseded,
    /// The load failed and the controller fell back to `restored`.
    Failed { image_id: ImageId, restored: NavState },
}

/// Decides what region activation does and tracks the current image.
#[derive(Debug)]
pub struct NavigationController {
    state: NavState,
    in_flight: Option<PendingLoad>,
    pending_choice: Option<Disambiguation>,
    next_ticket: LoadTicket,
    next_handle: ChoiceHandle,
}

impl NavigationController {
    pub fn new() -> Self {
        Self {
            state: NavState::Idle,
            in_flight: None,
            pending_choice: None,
            next_ticket: 1,
            next_handle: 1,
        }
    }

    pub fn state(&self) -> &NavState {
        &self.state
    }

    /// The image being viewed, if the controller is in `Viewing`.
    pub fn current_image(&self) -> Option<&str> {
        match &self.state {
            NavState::Viewing(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_navigating(&self) -> bool {
        matches!(self.state, NavState::Navigating { .. })
    }

    /// The load the controller is waiting for, if any.
    pub fn in_flight(&self) -> Option<&PendingLoad> {
        self.in_flight.as_ref()
    }

    /// The unanswered disambiguation prompt, if any.
    pub fn pending_choice(&self) -> Option<&Disambiguation> {
        self.pending_choice.as_ref()
    }

    /// Activate a region on the current image.
    pub fn activate(&mut self, graph: &LinkGraph, region_id: &str) -> Activation {
        let image_id = match &self.state {
            NavState::Viewing(id) => id.clone(),
            NavState::Navigating { target, .. } => {
                log::debug!(
                    "Ignoring activation of {} while navigating to {}",
                    region_id,
                    target
                );
                return Activation::Busy;
            }
            NavState::Idle => return Activation::NotViewing,
        };

        let outgoing = graph.outgoing_links_from(&image_id, region_id);
        match outgoing.as_slice() {
            [] => {
                log::info!("Region {} on {} has no links", region_id, image_id);
                Activation::NoLink {
                    image_id,
                    region_id: region_id.to_string(),
                }
            }
            [link] => {
                let pending = self.begin_load(
                    link.target_image_id.clone(),
                    link.target_region_id.clone(),
                );
                Activation::Navigate(pending)
            }
            links => {
                let handle = self.next_handle;
                self.next_handle += 1;
                let prompt = Disambiguation {
                    handle,
                    source: Anchor::new(image_id, region_id),
                    choices: links
                        .iter()
                        .enumerate()
                        .map(|(i, link)| Choice {
                            index: i + 1,
                            link: (*link).clone(),
                        })
                        .collect(),
                };
                log::info!(
                    "Region {} has {} links, asking for a choice",
                    region_id,
                    prompt.choices.len()
                );
                self.pending_choice = Some(prompt.clone());
                Activation::Choose(prompt)
            }
        }
    }

    /// Answer a disambiguation prompt with a 1-based selection.
    ///
    /// Out-of-range selections, stale handles and answers arriving after the
    /// view changed are no-ops and leave the prompt open.
    pub fn resolve_choice(&mut self, handle: ChoiceHandle, selection: usize) -> Option<PendingLoad> {
        let prompt = self.pending_choice.as_ref()?;
        if prompt.handle != handle {
            log::debug!("Ignoring answer for stale prompt {}", handle);
            return None;
        }
        if self.current_image() != Some(prompt.source.image_id.as_str()) {
            log::debug!("Ignoring answer for prompt {}: view changed", handle);
            return None;
        }
        let Some(choice) = selection
            .checked_sub(1)
            .and_then(|i| prompt.choices.get(i))
        else {
            log::debug!(
                "Selection {} out of range 1..={}",
                selection,
                prompt.choices.len()
            );
            return None;
        };

        let link = choice.link.clone();
        Some(self.begin_load(link.target_image_id, link.target_region_id))
    }

    /// Start loading an image, superseding any load already in flight.
    pub fn begin_load(&mut self, image_id: ImageId, highlight: Option<RegionId>) -> PendingLoad {
        let previous = match &self.state {
            NavState::Viewing(id) => Some(id.clone()),
            NavState::Navigating { previous, .. } => previous.clone(),
            NavState::Idle => None,
        };
        if let Some(old) = &self.in_flight {
            log::debug!(
                "Load of {} (ticket {}) superseded by {}",
                old.image_id,
                old.ticket,
                image_id
            );
        }

        let pending = PendingLoad {
            ticket: self.next_ticket,
            image_id: image_id.clone(),
            highlight,
        };
        self.next_ticket += 1;
        self.pending_choice = None;
        self.in_flight = Some(pending.clone());
        self.state = NavState::Navigating {
            target: image_id,
            previous,
        };
        log::debug!("Navigating to {} (ticket {})", pending.image_id, pending.ticket);
        pending
    }

    /// Report the outcome of the load identified by `ticket`.
    pub fn complete_load(&mut self, ticket: LoadTicket, succeeded: bool) -> LoadCompletion {
        let is_current = self.in_flight.as_ref().is_some_and(|p| p.ticket == ticket);
        if !is_current {
            log::debug!("Dropping completion of superseded load ticket {}", ticket);
            return LoadCompletion::Superseded;
        }
        let Some(pending) = self.in_flight.take() else {
            return LoadCompletion::Superseded;
        };

        if succeeded {
            self.state = NavState::Viewing(pending.image_id.clone());
            log::info!("Viewing {}", pending.image_id);
            LoadCompletion::Loaded {
                image_id: pending.image_id,
                highlight: pending.highlight,
            }
        } else {
            let restored = match &self.state {
                NavState::Navigating {
                    previous: Some(previous),
                    ..
                } => NavState::Viewing(previous.clone()),
                _ => NavState::Idle,
            };
            log::warn!(
                "Load of {} failed, returning to {:?}",
                pending.image_id,
                restored
            );
            self.state = restored.clone();
            LoadCompletion::Failed {
                image_id: pending.image_id,
                restored,
            }
        }
    }

    /// The image currently on screen: the one being viewed, or the one a
    /// load in flight would fall back to.
    pub fn displayed_image(&self) -> Option<&str> {
        match &self.state {
            NavState::Viewing(id) => Some(id.as_str()),
            NavState::Navigating { previous, .. } => previous.as_deref(),
            NavState::Idle => None,
        }
    }

    /// Drop every reference to a deleted image.
    ///
    /// A load of it is abandoned, it stops being viewed, and it is no longer
    /// a fallback for a load in flight.
    pub fn forget(&mut self, image_id: &str) {
        if self.in_flight.as_ref().is_some_and(|p| p.image_id == image_id) {
            log::debug!("Abandoning load of deleted image {}", image_id);
            self.in_flight = None;
            self.state = match &self.state {
                NavState::Navigating {
                    previous: Some(previous),
                    ..
                } => NavState::Viewing(previous.clone()),
                _ => NavState::Idle,
            };
        }

        if matches!(&self.state, NavState::Viewing(id) if id == image_id) {
            self.state = NavState::Idle;
        }
        if let NavState::Navigating { previous, .. } = &mut self.state {
            if previous.as_deref() == Some(image_id) {
                *previous = None;
            }
        }
        if self
            .pending_choice
            .as_ref()
            .is_some_and(|c| c.source.image_id == image_id)
        {
            self.pending_choice = None;
        }
    }
}

impl Default for NavigationController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LinkTarget;

    fn viewing(controller: &mut NavigationController, image_id: &str) {
        let pending = controller.begin_load(image_id.to_string(), None);
        controller.complete_load(pending.ticket, true);
        assert_eq!(controller.current_image(), Some(image_id));
    }

    fn graph_with(links: &[(&str, &str, &str, &str, Option<&str>)]) -> LinkGraph {
        let mut graph = LinkGraph::new();
        for (id, src_img, src_region, dst_img, dst_region) in links {
            let target = match dst_region {
                Some(r) => LinkTarget::region(*dst_img, *r),
                None => LinkTarget::image(*dst_img),
            };
            graph.inject(Link::new(*id, Anchor::new(*src_img, *src_region), target));
        }
        graph
    }

    #[test]
    fn test_activate_while_idle() {
        let mut nav = NavigationController::new();
        assert_eq!(nav.activate(&LinkGraph::new(), "r1"), Activation::NotViewing);
        assert_eq!(nav.state(), &NavState::Idle);
    }

    #[test]
    fn test_no_link_stays_viewing() {
        let mut nav = NavigationController::new();
        viewing(&mut nav, "img1");
        let result = nav.activate(&LinkGraph::new(), "r1");
        assert!(matches!(result, Activation::NoLink { .. }));
        assert_eq!(nav.state(), &NavState::Viewing("img1".to_string()));
    }

    #[test]
    fn test_single_link_navigates_with_highlight() {
        let graph = graph_with(&[("l1", "img1", "r1", "img2", Some("r2"))]);
        let mut nav = NavigationController::new();
        viewing(&mut nav, "img1");

        let Activation::Navigate(pending) = nav.activate(&graph, "r1") else {
            panic!("expected navigation");
        };
        assert_eq!(pending.image_id, "img2");
        assert!(nav.is_navigating());

        let done = nav.complete_load(pending.ticket, true);
        assert_eq!(
            done,
            LoadCompletion::Loaded {
                image_id: "img2".to_string(),
                highlight: Some("r2".to_string()),
            }
        );
        assert_eq!(nav.current_image(), Some("img2"));
    }

    #[test]
    fn test_activate_while_navigating_is_rejected() {
        let graph = graph_with(&[
            ("l1", "img1", "r1", "img2", None),
            ("l2", "img1", "r2", "img3", None),
        ]);
        let mut nav = NavigationController::new();
        viewing(&mut nav, "img1");
        let Activation::Navigate(first) = nav.activate(&graph, "r1") else {
            panic!("expected navigation");
        };
        assert_eq!(nav.activate(&graph, "r2"), Activation::Busy);
        assert_eq!(nav.in_flight(), Some(&first));
    }

    #[test]
    fn test_failed_load_restores_previous_view() {
        let graph = graph_with(&[("l1", "img1", "r1", "img2", None)]);
        let mut nav = NavigationController::new();
        viewing(&mut nav, "img1");
        let Activation::Navigate(pending) = nav.activate(&graph, "r1") else {
            panic!("expected navigation");
        };
        let done = nav.complete_load(pending.ticket, false);
        assert!(matches!(done, LoadCompletion::Failed { .. }));
        assert_eq!(nav.state(), &NavState::Viewing("img1".to_string()));
    }

    #[test]
    fn test_failed_first_load_returns_to_idle() {
        let mut nav = NavigationController::new();
        let pending = nav.begin_load("img1".to_string(), None);
        nav.complete_load(pending.ticket, false);
        assert_eq!(nav.state(), &NavState::Idle);
    }

    #[test]
    fn test_last_requested_load_wins() {
        let mut nav = NavigationController::new();
        let a = nav.begin_load("imgA".to_string(), None);
        let b = nav.begin_load("imgB".to_string(), None);

        assert_eq!(nav.complete_load(b.ticket, true), LoadCompletion::Loaded {
            image_id: "imgB".to_string(),
            highlight: None,
        });
        // A finishing late cannot overwrite B
        assert_eq!(nav.complete_load(a.ticket, true), LoadCompletion::Superseded);
        assert_eq!(nav.current_image(), Some("imgB"));
    }

    #[test]
    fn test_superseding_load_keeps_original_fallback() {
        let mut nav = NavigationController::new();
        viewing(&mut nav, "img1");
        nav.begin_load("imgA".to_string(), None);
        let b = nav.begin_load("imgB".to_string(), None);
        nav.complete_load(b.ticket, false);
        assert_eq!(nav.state(), &NavState::Viewing("img1".to_string()));
    }

    #[test]
    fn test_disambiguation_selection() {
        let graph = graph_with(&[
            ("l1", "img1", "r1", "img2", None),
            ("l2", "img1", "r1", "img3", Some("t3")),
        ]);
        let mut nav = NavigationController::new();
        viewing(&mut nav, "img1");

        let Activation::Choose(prompt) = nav.activate(&graph, "r1") else {
            panic!("expected a choice");
        };
        let indices: Vec<_> = prompt.choices.iter().map(|c| c.index).collect();
        assert_eq!(indices, [1, 2]);
        assert_eq!(prompt.choices[0].link.id, "l1");

        assert_eq!(nav.resolve_choice(prompt.handle, 99), None);
        assert_eq!(nav.resolve_choice(prompt.handle, 0), None);
        assert_eq!(nav.state(), &NavState::Viewing("img1".to_string()));

        let pending = nav.resolve_choice(prompt.handle, 2).expect("valid selection");
        assert_eq!(pending.image_id, "img3");
        assert_eq!(pending.highlight.as_deref(), Some("t3"));
        assert!(nav.pending_choice().is_none());
    }

    #[test]
    fn test_stale_choice_handle_is_ignored() {
        let graph = graph_with(&[
            ("l1", "img1", "r1", "img2", None),
            ("l2", "img1", "r1", "img3", None),
        ]);
        let mut nav = NavigationController::new();
        viewing(&mut nav, "img1");
        let Activation::Choose(first) = nav.activate(&graph, "r1") else {
            panic!("expected a choice");
        };
        let Activation::Choose(second) = nav.activate(&graph, "r1") else {
            panic!("expected a choice");
        };
        assert_ne!(first.handle, second.handle);
        assert_eq!(nav.resolve_choice(first.handle, 1), None);
        assert!(nav.resolve_choice(second.handle, 1).is_some());
    }

    #[test]
    fn test_forget_deleted_fallback() {
        let mut nav = NavigationController::new();
        viewing(&mut nav, "img1");
        let pending = nav.begin_load("img2".to_string(), None);
        assert_eq!(nav.displayed_image(), Some("img1"));

        nav.forget("img1");
        assert_eq!(nav.displayed_image(), None);

        let done = nav.complete_load(pending.ticket, false);
        assert_eq!(
            done,
            LoadCompletion::Failed {
                image_id: "img2".to_string(),
                restored: NavState::Idle,
            }
        );
        assert_eq!(nav.state(), &NavState::Idle);
    }

    #[test]
    fn test_forget_load_target_restores_previous() {
        let mut nav = NavigationController::new();
        viewing(&mut nav, "img1");
        let pending = nav.begin_load("img2".to_string(), None);

        nav.forget("img2");
        assert_eq!(nav.state(), &NavState::Viewing("img1".to_string()));
        assert!(nav.in_flight().is_none());
        assert_eq!(nav.complete_load(pending.ticket, true), LoadCompletion::Superseded);

        nav.forget("img1");
        assert_eq!(nav.state(), &NavState::Idle);
    }
}
