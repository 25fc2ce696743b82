//! Scenario tests for the session.
//!
//! Each scenario drives a [`Session`] over a [`MemoryStorage`] seeded with a
//! small three-slide library and checks the model, storage and the events
//! the UI would see.

mod view_tests;

use std::cell::RefCell;
use std::rc::Rc;

use chrono::Utc;

use crate::config::SessionSettings;
use crate::coords::PixelRect;
use crate::events::{SessionEvent, Warning};
use crate::interaction::{DirectManipulation, ManipulationIntent};
use crate::model::{AudioTrack, Image, Link, NormalizedRect, Region};
use crate::session::Session;
use crate::storage::{Database, MemoryStorage};

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Displayed image rect used by most scenarios.
fn viewport() -> PixelRect {
    PixelRect::new(0.0, 0.0, 1000.0, 500.0)
}

fn region(id: &str, rect: NormalizedRect) -> Region {
    Region {
        id: id.to_string(),
        rect,
        name: format!("Region {id}"),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// img1 with r1, img2 with r2 and a soundtrack, img3 empty.
fn library() -> Database {
    let mut img1 = Image::new("img1", "harbour.jpg");
    img1.regions
        .push(region("r1", NormalizedRect::new(0.1, 0.1, 0.2, 0.2)));

    let mut img2 = Image::new("img2", "lighthouse.jpg")
        .with_audio(AudioTrack::new("/uploads/waves.mp3", "sea_waves.mp3"));
    img2.regions.push(region("r2", NormalizedRect::full()));

    let img3 = Image::new("img3", "cliffs.jpg");

    let mut db = Database::new();
    db.insert_image(img1);
    db.insert_image(img2);
    db.insert_image(img3);
    db
}

fn open(database: Database) -> Session<MemoryStorage> {
    Session::open(
        MemoryStorage::from_database(database),
        SessionSettings::default(),
    )
    .unwrap()
}

/// Session already viewing `image_id` with the standard viewport, events drained.
fn viewing(database: Database, image_id: &str) -> Session<MemoryStorage> {
    let mut session = open(database);
    session.load_image(image_id);
    session.set_viewport(viewport());
    session.drain_events();
    session
}

fn with_links(mut database: Database, links: impl IntoIterator<Item = Link>) -> Database {
    database.links.extend(links);
    database
}

fn warnings(events: &[SessionEvent]) -> Vec<&Warning> {
    events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::Warning(w) => Some(w),
            _ => None,
        })
        .collect()
}

fn geometry_of<'a>(events: &'a [SessionEvent], region_id: &str) -> Vec<&'a PixelRect> {
    events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::RegionGeometry { region_id: id, rect, .. } if id == region_id => {
                Some(rect)
            }
            _ => None,
        })
        .collect()
}

/// Surface that records every manipulation intent it receives.
#[derive(Debug, Clone, Default)]
struct RecordingSurface(Rc<RefCell<Vec<ManipulationIntent>>>);

impl RecordingSurface {
    fn take(&self) -> Vec<ManipulationIntent> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

impl DirectManipulation for RecordingSurface {
    fn enable_direct_manipulation(&mut self, region_id: &str) {
        self.0
            .borrow_mut()
            .push(ManipulationIntent::Enable(region_id.to_string()));
    }

    fn disable_direct_manipulation(&mut self, region_id: &str) {
        self.0
            .borrow_mut()
            .push(ManipulationIntent::Disable(region_id.to_string()));
    }
}
