#![allow(clippy::float_cmp)]

use super::*;

// =============================================================
// Helpers
// =============================================================

/// Decodes `b"IMG:<w>x<h>"` into its declared size.
struct SizeDecoder;

impl ImageDecoder for SizeDecoder {
    type Image = Size;

    fn decode(&self, bytes: &[u8]) -> Option<Size> {
        let text = std::str::from_utf8(bytes).ok()?;
        let dims = text.strip_prefix("IMG:")?;
        let (w, h) = dims.split_once('x')?;
        Some(Size::new(w.parse().ok()?, h.parse().ok()?))
    }

    fn natural_size(&self, image: &Size) -> Size {
        *image
    }
}

fn engine() -> EngineCore<SizeDecoder> {
    EngineCore::new(SizeDecoder, Size::new(800.0, 600.0))
}

fn remote(url: &str) -> Background {
    Background::RemoteUrl(url.to_owned())
}

fn fetch_request(actions: &[Action]) -> Option<FetchRequest> {
    actions.iter().find_map(|a| match a {
        Action::FetchBackground(req) => Some(req.clone()),
        Action::RenderNeeded => None,
    })
}

// =============================================================
// Scenario
// =============================================================

#[test]
fn add_move_scale_blank_scenario() {
    let mut core = engine();

    let id = core.add_emoji("😀", DocPoint::new(0, 0), 40).unwrap();
    assert_eq!(id, 1);
    assert_eq!(core.document().len(), 1);
    let e = core.document().emoji(id).unwrap();
    assert_eq!((e.x(), e.y(), e.size()), (0, 0, 40));

    assert!(core.move_emoji(id, 10, -5));
    let e = core.document().emoji(id).unwrap();
    assert_eq!((e.x(), e.y()), (10, -5));

    assert_eq!(core.scale_emoji(id, 1.5), Ok(true));
    assert_eq!(core.document().emoji(id).unwrap().size(), 60);

    core.set_background(Background::Blank);
    assert_eq!(core.fetch_status(), FetchStatus::Idle);
    assert!(core.background_image().is_none());
}

// =============================================================
// set_background
// =============================================================

#[test]
fn set_remote_background_requests_fetch() {
    let mut core = engine();
    let actions = core.set_background(remote("https://a.test/a.png"));
    assert_eq!(
        actions,
        vec![Action::FetchBackground(FetchRequest { url: "https://a.test/a.png".into() }), Action::RenderNeeded]
    );
    assert!(core.is_fetching());
}

#[test]
fn setting_same_background_does_nothing() {
    let mut core = engine();
    core.set_background(remote("https://a.test/a.png"));
    let before = core.snapshot();
    let actions = core.set_background(remote("https://a.test/a.png"));
    assert!(actions.is_empty());
    assert!(Arc::ptr_eq(&before, &core.snapshot()));
    assert!(core.is_fetching());
}

#[test]
fn set_blank_from_fresh_document_is_unchanged() {
    let mut core = engine();
    assert!(core.set_background(Background::Blank).is_empty());
}

#[test]
fn inline_background_resolves_immediately() {
    let mut core = engine();
    let actions = core.set_background(Background::inline(b"IMG:200x100".to_vec()));
    assert_eq!(actions, vec![Action::RenderNeeded]);
    assert_eq!(core.fetch_status(), FetchStatus::Idle);
    assert_eq!(core.background_image_size(), Some(Size::new(200.0, 100.0)));
}

#[test]
fn new_background_clears_previous_image() {
    let mut core = engine();
    core.set_background(Background::inline(b"IMG:200x100".to_vec()));
    core.set_background(remote("https://a.test/a.png"));
    assert!(core.background_image().is_none());
}

// =============================================================
// complete_fetch
// =============================================================

#[test]
fn completed_fetch_publishes_image() {
    let mut core = engine();
    let req = fetch_request(&core.set_background(remote("https://a.test/a.png"))).unwrap();
    assert_eq!(core.complete_fetch(&req, Some(Size::new(64.0, 32.0))), FetchOutcome::Applied);
    assert!(!core.is_fetching());
    assert_eq!(core.background_image(), Some(&Size::new(64.0, 32.0)));
}

#[test]
fn stale_fetch_never_overwrites_newer_background() {
    let mut core = engine();
    let req_a = fetch_request(&core.set_background(remote("https://a.test/a.png"))).unwrap();
    let req_b = fetch_request(&core.set_background(remote("https://b.test/b.png"))).unwrap();

    assert_eq!(core.complete_fetch(&req_b, Some(Size::new(10.0, 10.0))), FetchOutcome::Applied);
    assert_eq!(core.complete_fetch(&req_a, Some(Size::new(999.0, 999.0))), FetchOutcome::Stale);

    assert_eq!(core.background_image(), Some(&Size::new(10.0, 10.0)));
    assert_eq!(core.document().background(), &remote("https://b.test/b.png"));
}

#[test]
fn failed_fetch_degrades_to_no_image() {
    let mut core = engine();
    let req = fetch_request(&core.set_background(remote("https://a.test/a.png"))).unwrap();
    assert_eq!(core.complete_fetch(&req, None), FetchOutcome::Applied);
    assert_eq!(core.fetch_status(), FetchStatus::Idle);
    assert!(core.background_image().is_none());
}

// =============================================================
// No-op safety
// =============================================================

#[test]
fn missing_id_leaves_snapshot_identical() {
    let mut core = engine();
    core.add_emoji("😀", DocPoint::new(1, 2), 40).unwrap();
    let before = core.snapshot();

    assert!(!core.move_emoji(77, 5, 5));
    assert_eq!(core.scale_emoji(77, 2.0), Ok(false));

    assert!(Arc::ptr_eq(&before, &core.snapshot()));
}

#[test]
fn invalid_scale_is_rejected_before_lookup() {
    let mut core = engine();
    assert_eq!(core.scale_emoji(77, 0.0), Err(DocError::InvalidScale(0.0)));
}

#[test]
fn snapshot_is_isolated_from_later_mutation() {
    let mut core = engine();
    let id = core.add_emoji("😀", DocPoint::new(0, 0), 40).unwrap();
    let before = core.snapshot();
    core.move_emoji(id, 3, 4);
    assert_eq!(before.emoji(id).unwrap().position(), DocPoint::new(0, 0));
    assert_eq!(core.document().emoji(id).unwrap().position(), DocPoint::new(3, 4));
}

// =============================================================
// Projection
// =============================================================

#[test]
fn drop_at_viewport_center_lands_on_origin() {
    let mut core = engine();
    let id = core.drop_emoji("🦜", Point::new(400.0, 300.0)).unwrap();
    let e = core.document().emoji(id).unwrap();
    assert_eq!(e.position(), DocPoint::new(0, 0));
    assert_eq!(e.size(), 40);
}

#[test]
fn drop_respects_pan_and_zoom() {
    let mut core = engine();
    core.zoom_ended(2.0);
    core.pan_ended(Point::new(100.0, 0.0)); // 50 doc units -> 100 screen px at zoom 2
    let id = core.drop_emoji("🦜", Point::new(520.0, 280.0)).unwrap();
    let e = core.document().emoji(id).unwrap();
    // (520 - 100 - 400) / 2 = 10, (280 - 0 - 300) / 2 = -10
    assert_eq!(e.position(), DocPoint::new(10, -10));
    assert_eq!(e.size(), 20);
}

#[test]
fn drop_emoji_size_truncates_and_floors_at_minimum() {
    let mut core = engine();
    core.zoom_ended(3.0);
    // 40 / 3 = 13.33 -> 13
    assert_eq!(core.drop_emoji_size(), 13);
    core.zoom_ended(100.0);
    assert_eq!(core.drop_emoji_size(), 1);
}

#[test]
fn drop_rejects_non_glyph_text() {
    let mut core = engine();
    assert!(core.drop_emoji("", Point::new(0.0, 0.0)).is_err());
    assert!(core.document().is_empty());
}

#[test]
fn emoji_screen_position_and_font_size_follow_camera() {
    let mut core = engine();
    let id = core.add_emoji("😀", DocPoint::new(10, 20), 40).unwrap();
    core.zoom_ended(2.0);
    assert_eq!(core.emoji_screen_position(id), Some(Point::new(420.0, 340.0)));
    assert_eq!(core.emoji_font_size(id), Some(80.0));
    assert_eq!(core.emoji_screen_position(99), None);
}

#[test]
fn pointer_drag_moves_projection_not_document() {
    let mut core = engine();
    let id = core.add_emoji("😀", DocPoint::new(0, 0), 40).unwrap();
    core.on_pointer_down(Point::new(0.0, 0.0));
    assert_eq!(core.on_pointer_move(Point::new(15.0, 5.0)), vec![Action::RenderNeeded]);
    assert_eq!(core.emoji_screen_position(id), Some(Point::new(415.0, 305.0)));
    core.on_pointer_up(Point::new(20.0, 10.0));
    assert_eq!(core.emoji_screen_position(id), Some(Point::new(420.0, 310.0)));
    assert_eq!(core.document().emoji(id).unwrap().position(), DocPoint::new(0, 0));
}

#[test]
fn pointer_move_without_drag_requests_nothing() {
    let mut core = engine();
    assert!(core.on_pointer_move(Point::new(1.0, 1.0)).is_empty());
    assert!(core.on_pointer_up(Point::new(1.0, 1.0)).is_empty());
}

// =============================================================
// zoom_to_fit
// =============================================================

#[test]
fn zoom_to_fit_uses_resolved_image() {
    let mut core = engine();
    core.set_background(Background::inline(b"IMG:400x150".to_vec()));
    core.pan_ended(Point::new(30.0, 30.0));
    assert_eq!(core.zoom_to_fit(), vec![Action::RenderNeeded]);
    // min(800/400, 600/150) = 2
    assert_eq!(core.camera(), Camera { pan_x: 0.0, pan_y: 0.0, zoom: 2.0 });
}

#[test]
fn zoom_to_fit_without_image_is_noop() {
    let mut core = engine();
    core.zoom_ended(1.5);
    assert!(core.zoom_to_fit().is_empty());
    assert_eq!(core.camera().zoom, 1.5);
}

#[test]
fn zoom_to_fit_with_degenerate_image_or_viewport_is_noop() {
    let mut core = engine();
    core.set_background(Background::inline(b"IMG:0x100".to_vec()));
    assert!(core.zoom_to_fit().is_empty());

    core.set_background(Background::inline(b"IMG:100x100".to_vec()));
    let viewport = core.viewport();
    assert!(!core.set_viewport(Size::new(300.0, 0.0)));
    assert!(!core.set_viewport(Size::new(f64::NAN, 300.0)));
    assert!(!core.set_viewport(Size::new(-1.0, 300.0)));
    assert_eq!(core.viewport(), viewport);
    assert_eq!(core.camera().zoom, 1.0);
}

#[test]
fn set_viewport_reports_change() {
    let mut core = engine();
    assert!(core.set_viewport(Size::new(200.0, 100.0)));
    assert!(!core.set_viewport(Size::new(200.0, 100.0)));
    assert_eq!(core.viewport(), Size::new(200.0, 100.0));
}
