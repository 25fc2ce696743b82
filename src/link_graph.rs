//! Directed link graph between region anchors and images.
//!
//! Every source anchor has at most one outgoing link: creating a link from
//! an anchor that already has one replaces it. Queries still return
//! sequences so data written before that rule (several links per anchor)
//! stays navigable.

use uuid::Uuid;

use crate::constants::LINK_ID_PREFIX;
use crate::error::{CoreError, CoreResult};
use crate::model::{Anchor, Link, LinkTarget};
use crate::region_store::RegionStore;

/// Generate a fresh link id.
pub fn new_link_id() -> String {
    format!("{}{}", LINK_ID_PREFIX, Uuid::new_v4())
}

/// All links, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct LinkGraph {
    links: Vec<Link>,
}

impl LinkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from stored links exactly as given.
    ///
    /// No invariant is enforced, so legacy data with several links per
    /// anchor is kept intact.
    pub fn from_links(links: impl IntoIterator<Item = Link>) -> Self {
        Self {
            links: links.into_iter().collect(),
        }
    }

    /// Append a link as-is, bypassing validation and replacement.
    pub fn inject(&mut self, link: Link) {
        log::debug!("Injected link {} without validation", link.id);
        self.links.push(link);
    }

    /// Create a link from a region anchor to an image (or a region on it).
    ///
    /// Both images must exist and the source region must exist on the
    /// source image. A named target region must exist on the target image.
    /// Any link already leaving `source` is replaced; on error nothing changes.
    pub fn create_link(
        &mut self,
        regions: &RegionStore,
        source: Anchor,
        target: LinkTarget,
    ) -> CoreResult<Link> {
        if source.image_id.is_empty() || source.region_id.is_empty() || target.image_id.is_empty()
        {
            return Err(CoreError::constraint_violation(
                "link requires source image, source region and target image",
            ));
        }
        regions.region(&source.image_id, &source.region_id)?;
        regions.image(&target.image_id)?;
        if let Some(region_id) = &target.region_id {
            regions.region(&target.image_id, region_id)?;
        }

        let link = Link::new(new_link_id(), source, target);
        let before = self.links.len();
        self.links
            .retain(|l| !l.starts_at(&link.source_image_id, &link.source_region_id));
        if self.links.len() < before {
            log::debug!(
                "Replaced {} existing link(s) from {}/{}",
                before - self.links.len(),
                link.source_image_id,
                link.source_region_id
            );
        }
        self.links.push(link.clone());
        log::info!(
            "Link created: {} ({}/{} -> {})",
            link.id,
            link.source_image_id,
            link.source_region_id,
            link.target_image_id
        );
        Ok(link)
    }

    /// Remove a link by id.
    pub fn delete_link(&mut self, link_id: &str) -> CoreResult<Link> {
        let index = self
            .links
            .iter()
            .position(|l| l.id == link_id)
            .ok_or_else(|| CoreError::link_not_found(link_id))?;
        let link = self.links.remove(index);
        log::info!("Link deleted: {}", link.id);
        Ok(link)
    }

    /// Links leaving an anchor, in insertion order.
    pub fn outgoing_links_from(&self, image_id: &str, region_id: &str) -> Vec<&Link> {
        let links: Vec<&Link> = self
            .links
            .iter()
            .filter(|l| l.starts_at(image_id, region_id))
            .collect();
        log::debug!(
            "{} outgoing link(s) from {}/{}",
            links.len(),
            image_id,
            region_id
        );
        links
    }

    /// Whether the anchor has any outgoing link.
    pub fn has_outgoing(&self, image_id: &str, region_id: &str) -> bool {
        self.links.iter().any(|l| l.starts_at(image_id, region_id))
    }

    /// Links where the image is source or target.
    pub fn links_touching(&self, image_id: &str) -> Vec<&Link> {
        self.links
            .iter()
            .filter(|l| l.touches_image(image_id))
            .collect()
    }

    /// Remove every link touching an image. Returns the removed links.
    pub fn delete_for_image(&mut self, image_id: &str) -> Vec<Link> {
        let (removed, kept): (Vec<Link>, Vec<Link>) = std::mem::take(&mut self.links)
            .into_iter()
            .partition(|l| l.touches_image(image_id));
        self.links = kept;
        log_cascade(&removed, image_id);
        removed
    }

    /// Remove every link whose source or target is the anchor.
    pub fn delete_for_region(&mut self, image_id: &str, region_id: &str) -> Vec<Link> {
        let (removed, kept): (Vec<Link>, Vec<Link>) = std::mem::take(&mut self.links)
            .into_iter()
            .partition(|l| l.references_anchor(image_id, region_id));
        self.links = kept;
        log_cascade(&removed, &format!("{image_id}/{region_id}"));
        removed
    }

    pub fn get(&self, link_id: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.id == link_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Link> {
        self.links.iter()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

fn log_cascade(removed: &[Link], what: &str) {
    if !removed.is_empty() {
        log::info!("Removed {} link(s) referencing {}", removed.len(), what);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Image, NormalizedRect, RegionDraft};

    /// img1 has r1, r2; img2 has t1; img3 has nothing.
    fn fixture() -> RegionStore {
        let mut store = RegionStore::from_images([
            Image::new("img1", "one.png"),
            Image::new("img2", "two.png"),
            Image::new("img3", "three.png"),
        ]);
        for (image, region) in [("img1", "r1"), ("img1", "r2"), ("img2", "t1")] {
            store
                .upsert(
                    image,
                    RegionDraft::new(region, NormalizedRect::new(0.1, 0.1, 0.2, 0.2)).with_id(region),
                )
                .unwrap();
        }
        store
    }

    #[test]
    fn test_second_link_replaces_first() {
        let regions = fixture();
        let mut graph = LinkGraph::new();
        graph
            .create_link(&regions, Anchor::new("img1", "r1"), LinkTarget::image("img2"))
            .unwrap();
        let second = graph
            .create_link(&regions, Anchor::new("img1", "r1"), LinkTarget::image("img3"))
            .unwrap();

        let outgoing = graph.outgoing_links_from("img1", "r1");
        assert_eq!(outgoing.len(), 1);
        assert_eq!(outgoing[0], &second);
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_distinct_sources_coexist() {
        let regions = fixture();
        let mut graph = LinkGraph::new();
        graph
            .create_link(&regions, Anchor::new("img1", "r1"), LinkTarget::image("img2"))
            .unwrap();
        graph
            .create_link(&regions, Anchor::new("img1", "r2"), LinkTarget::image("img3"))
            .unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.outgoing_links_from("img1", "r2")[0].target_image_id, "img3");
    }

    #[test]
    fn test_create_link_validation_writes_nothing() {
        let regions = fixture();
        let mut graph = LinkGraph::new();
        graph
            .create_link(&regions, Anchor::new("img1", "r1"), LinkTarget::image("img2"))
            .unwrap();

        let missing_region =
            graph.create_link(&regions, Anchor::new("img1", "nope"), LinkTarget::image("img2"));
        assert_eq!(
            missing_region.unwrap_err(),
            CoreError::region_not_found("img1", "nope")
        );

        let missing_target =
            graph.create_link(&regions, Anchor::new("img1", "r1"), LinkTarget::image("ghost"));
        assert_eq!(missing_target.unwrap_err(), CoreError::image_not_found("ghost"));

        let missing_target_region = graph.create_link(
            &regions,
            Anchor::new("img1", "r1"),
            LinkTarget::region("img2", "ghost"),
        );
        assert!(missing_target_region.is_err());

        let empty = graph.create_link(&regions, Anchor::new("img1", ""), LinkTarget::image("img2"));
        assert!(matches!(empty, Err(CoreError::ConstraintViolation { .. })));

        // The original link survived every rejected replacement
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.outgoing_links_from("img1", "r1")[0].target_image_id, "img2");
    }

    #[test]
    fn test_delete_link() {
        let regions = fixture();
        let mut graph = LinkGraph::new();
        let link = graph
            .create_link(&regions, Anchor::new("img1", "r1"), LinkTarget::image("img2"))
            .unwrap();
        assert_eq!(graph.delete_link(&link.id).unwrap().id, link.id);
        assert_eq!(
            graph.delete_link(&link.id).unwrap_err(),
            CoreError::link_not_found(link.id.clone())
        );
    }

    #[test]
    fn test_zero_results_are_not_errors() {
        let graph = LinkGraph::new();
        assert!(graph.outgoing_links_from("img1", "r1").is_empty());
        assert!(graph.links_touching("img1").is_empty());
    }

    #[test]
    fn test_delete_for_region_removes_source_and_target_references() {
        let regions = fixture();
        let mut graph = LinkGraph::new();
        graph
            .create_link(&regions, Anchor::new("img1", "r1"), LinkTarget::region("img2", "t1"))
            .unwrap();
        graph
            .create_link(&regions, Anchor::new("img2", "t1"), LinkTarget::image("img3"))
            .unwrap();
        graph
            .create_link(&regions, Anchor::new("img1", "r2"), LinkTarget::image("img2"))
            .unwrap();

        let removed = graph.delete_for_region("img2", "t1");
        assert_eq!(removed.len(), 2);
        let touching = graph.links_touching("img2");
        assert_eq!(touching.len(), 1);
        assert_eq!(touching[0].source_region_id, "r2");
    }

    #[test]
    fn test_delete_for_image() {
        let regions = fixture();
        let mut graph = LinkGraph::new();
        graph
            .create_link(&regions, Anchor::new("img1", "r1"), LinkTarget::image("img2"))
            .unwrap();
        graph
            .create_link(&regions, Anchor::new("img2", "t1"), LinkTarget::image("img3"))
            .unwrap();
        graph
            .create_link(&regions, Anchor::new("img1", "r2"), LinkTarget::image("img3"))
            .unwrap();

        assert_eq!(graph.delete_for_image("img2").len(), 2);
        assert!(graph.links_touching("img2").is_empty());
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_injected_duplicates_are_listed_in_order() {
        let mut graph = LinkGraph::new();
        graph.inject(Link::new("l1", Anchor::new("img1", "r1"), LinkTarget::image("img2")));
        graph.inject(Link::new("l2", Anchor::new("img1", "r1"), LinkTarget::image("img3")));
        let ids: Vec<_> = graph
            .outgoing_links_from("img1", "r1")
            .iter()
            .map(|l| l.id.as_str())
            .collect();
        assert_eq!(ids, ["l1", "l2"]);
    }
}
