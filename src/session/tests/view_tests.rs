//! Viewport, letterbox and view reset scenarios.

use std::time::Duration;

use web_time::Instant;

use super::*;
use crate::coords::{CoordinateMapper, fit_contain};

#[test]
fn test_load_discards_previous_view() {
    let mut session = viewing(library(), "img1");
    session.load_image("img2");

    let events = session.drain_events();
    assert_eq!(events.first(), Some(&SessionEvent::ViewCleared));
    assert!(geometry_of(&events, "r1").is_empty());
    assert!(geometry_of(&events, "r2").is_empty());
    assert_eq!(session.viewport(), None);

    session.set_viewport(viewport());
    let events = session.drain_events();
    assert_eq!(
        geometry_of(&events, "r2"),
        [&PixelRect::new(0.0, 0.0, 1000.0, 500.0)]
    );
}

#[test]
fn test_new_image_never_uses_previous_rect() {
    let mut database = library();
    for image in &mut database.images {
        image.dimensions = match image.id.as_str() {
            "img1" => Some((1600, 900)),
            "img2" => Some((900, 1600)),
            _ => None,
        };
    }
    let stage = PixelRect::new(0.0, 0.0, 1600.0, 900.0);

    let mut session = open(database);
    session.load_image("img1");
    session.set_viewport(fit_contain(stage, (1600, 900)).unwrap());
    session.drain_events();

    // Portrait image: the landscape rect must not leak into its geometry
    session.load_image("img2");
    assert!(geometry_of(&session.drain_events(), "r2").is_empty());

    let portrait = fit_contain(stage, (900, 1600)).unwrap();
    session.set_viewport(portrait);
    assert_eq!(geometry_of(&session.drain_events(), "r2"), [&portrait]);
}

#[test]
fn test_load_drops_pending_resize() {
    let mut session = viewing(library(), "img1");
    session.viewport_resized(PixelRect::new(0.0, 0.0, 800.0, 400.0));
    session.load_image("img2");
    session.drain_events();

    assert!(!session.poll_resize_at(Instant::now() + Duration::from_millis(200)));
    assert!(session.drain_events().is_empty());
}

#[test]
fn test_regions_wait_for_viewport() {
    let mut session = open(library());
    session.load_image("img1");
    let events = session.drain_events();
    assert!(geometry_of(&events, "r1").is_empty());

    session.set_viewport(viewport());
    let events = session.drain_events();
    assert_eq!(
        geometry_of(&events, "r1"),
        [&PixelRect::new(100.0, 50.0, 200.0, 100.0)]
    );
}

#[test]
fn test_resize_burst_repositions_once() {
    let mut session = viewing(library(), "img1");
    let before = Instant::now();

    session.viewport_resized(PixelRect::new(0.0, 0.0, 800.0, 400.0));
    session.viewport_resized(PixelRect::new(0.0, 0.0, 600.0, 300.0));
    session.viewport_resized(PixelRect::new(0.0, 0.0, 500.0, 250.0));

    assert!(!session.poll_resize_at(before));
    assert!(session.drain_events().is_empty());

    assert!(session.poll_resize_at(Instant::now() + Duration::from_millis(200)));
    let events = session.drain_events();
    assert_eq!(
        geometry_of(&events, "r1"),
        [&PixelRect::new(50.0, 25.0, 100.0, 50.0)]
    );

    assert!(!session.poll_resize_at(Instant::now() + Duration::from_millis(400)));
}

#[test]
fn test_degenerate_viewport_warns() {
    let mut session = viewing(library(), "img1");
    session.set_viewport(PixelRect::new(0.0, 0.0, 0.0, 500.0));

    let events = session.drain_events();
    assert!(geometry_of(&events, "r1").is_empty());
    assert_eq!(
        warnings(&events),
        vec![&Warning::DegenerateViewport {
            width: 0.0,
            height: 500.0
        }]
    );
}

#[test]
fn test_letterboxed_regions_are_layout_invariant() {
    let mut session = viewing(library(), "img1");
    let stored = session.regions().region("img1", "r1").unwrap().rect;

    // A 2:1 image in a square container gets bars above and below
    let letterboxed = fit_contain(PixelRect::new(0.0, 0.0, 1000.0, 1000.0), (2000, 1000)).unwrap();
    assert_eq!(letterboxed, PixelRect::new(0.0, 250.0, 1000.0, 500.0));
    session.set_viewport(letterboxed);

    let events = session.drain_events();
    let rects = geometry_of(&events, "r1");
    assert_eq!(rects, [&PixelRect::new(100.0, 300.0, 200.0, 100.0)]);

    let back = CoordinateMapper::new(letterboxed)
        .unwrap()
        .rect_to_normalized(rects[0]);
    assert!(back.approx_eq(&stored, 1e-6));
}
