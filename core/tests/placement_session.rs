use machigai_core::{
    AssetEntry, AssetManifest, BoardGeometry, BoundingBoxSet, GameRules, PlacementSession,
    PlacementSnapshot, PlacementWarning, Point, Rect, SeededRng, SessionError, Size, Template,
};

fn manifest() -> AssetManifest {
    AssetManifest {
        backgrounds: vec![AssetEntry {
            filename: "garden.jpg".to_string(),
            width: Some(1200.0),
            height: Some(900.0),
        }],
        sprites: vec![
            AssetEntry {
                filename: "bee.png".to_string(),
                width: Some(64.0),
                height: Some(64.0),
            },
            AssetEntry {
                filename: "rose.png".to_string(),
                width: Some(40.0),
                height: Some(80.0),
            },
        ],
    }
}

fn geometry() -> BoardGeometry {
    BoardGeometry {
        background: Rect::new(10.0, 10.0, 600.0, 450.0),
        container: Rect::new(0.0, 0.0, 620.0, 470.0),
    }
}

fn srcs(count: usize) -> Vec<String> {
    (0..count)
        .map(|idx| if idx % 2 == 0 { "bee.png" } else { "rose.png" }.to_string())
        .collect()
}

#[test]
fn bulk_placement_fills_boxes_in_plan_order() {
    let mut boxes = BoundingBoxSet::new();
    boxes.begin_draw(Point::new(0.0, 0.0));
    boxes.commit_draw(Point::new(170.0, 170.0));
    boxes.begin_draw(Point::new(300.0, 0.0));
    boxes.commit_draw(Point::new(600.0, 340.0));
    let regions = boxes.rects();

    let mut session = PlacementSession::new(GameRules::default());
    session.set_background("garden.jpg", Size::new(600.0, 450.0));
    let mut rng = SeededRng::new(17);
    let report = session.place_all(&srcs(12), &manifest(), &regions, &geometry(), &mut rng);

    assert_eq!(report.placed.len(), 12);
    assert_eq!(session.sprites().len(), 12);
    let in_first = report
        .placed
        .iter()
        .filter(|placed| placed.background.x < 170.0)
        .count();
    // Capacities 4 and 12.
    assert_eq!(in_first, 3);
    for (placed, region) in report.placed.iter().zip(
        std::iter::repeat(regions[0]).take(3).chain(std::iter::repeat(regions[1])),
    ) {
        assert!(placed.background.x >= region.x);
        assert!(placed.background.y >= region.y);
        assert!(placed.background.right() <= region.right() + 1.0);
        assert!(placed.background.bottom() <= region.bottom() + 1.0);
    }
}

#[test]
fn missing_assets_are_skipped_with_warning() {
    let mut session = PlacementSession::new(GameRules::default());
    let mut rng = SeededRng::new(2);
    let names = vec!["bee.png".to_string(), "ghost.png".to_string()];
    let report = session.place_all(&names, &manifest(), &[], &geometry(), &mut rng);
    assert_eq!(report.placed.len(), 1);
    assert!(report
        .warnings
        .iter()
        .any(|warning| matches!(warning, PlacementWarning::AssetMissing { src, .. } if src == "ghost.png")));
}

#[test]
fn new_bulk_placement_replaces_previous_board() {
    let mut session = PlacementSession::new(GameRules::default());
    let mut rng = SeededRng::new(3);
    session.place_all(&srcs(5), &manifest(), &[], &geometry(), &mut rng);
    session.place_all(&srcs(2), &manifest(), &[], &geometry(), &mut rng);
    assert_eq!(session.sprites().len(), 2);
    assert_eq!(session.engine().detector().placed().len(), 2);
}

#[test]
fn layering_and_dragging_edit_paint_order() {
    let mut session = PlacementSession::new(GameRules::default());
    let manifest = manifest();
    let first = session.add_at("bee.png", &manifest, Point::new(100.0, 100.0)).expect("bee");
    let second = session.add_at("rose.png", &manifest, Point::new(110.0, 110.0)).expect("rose");
    assert!(session.add_at("ghost.png", &manifest, Point::new(0.0, 0.0)).is_none());

    assert_eq!(session.sprite_at(Point::new(105.0, 105.0)).map(|s| s.id.clone()), Some(second.clone()));
    assert!(session.bring_to_front(&first));
    assert_eq!(session.sprite_at(Point::new(105.0, 105.0)).map(|s| s.id.clone()), Some(first.clone()));
    assert!(session.send_to_back(&first));
    assert_eq!(session.sprites()[0].id, first);

    assert!(session.move_to(&second, Point::new(300.0, 200.0)));
    let rose = session.sprite(&second).expect("rose");
    assert_eq!(rose.rect, Rect::new(300.0, 200.0, 40.0, 80.0));
    assert!(session.remove(&first));
    assert!(!session.remove(&first));
}

#[test]
fn export_reload_keeps_positions() {
    let mut session = PlacementSession::new(GameRules::default());
    let mut rng = SeededRng::new(44);
    session.set_background("garden.jpg", Size::new(600.0, 450.0));
    session.place_all(&srcs(6), &manifest(), &[], &geometry(), &mut rng);
    let template = session
        .to_template("garden-1", Some(Size::new(1200.0, 900.0)))
        .expect("template");
    let json = template.to_json_pretty().expect("json");
    let reread = Template::from_json(&json).expect("reread");
    reread.validate_against(&manifest()).expect("known sprites");

    let mut other = PlacementSession::new(GameRules::default());
    let report = other.load_template(&reread, &manifest(), &geometry());
    assert!(report.warnings.is_empty());
    let before: Vec<Rect> = session.sprites().iter().map(|s| s.rect).collect();
    let after: Vec<Rect> = other.sprites().iter().map(|s| s.rect).collect();
    assert_eq!(before, after);
}

#[test]
fn reloaded_template_with_id_gaps_gets_fresh_ids() {
    let mut session = PlacementSession::new(GameRules::default());
    session.set_background("garden.jpg", Size::new(600.0, 450.0));
    for idx in 0..3 {
        session.add_at("bee.png", &manifest(), Point::new(100.0 + idx as f64 * 100.0, 100.0));
    }
    assert!(session.remove("sprite-1"));
    let template = session.to_template("gappy", None).expect("template");

    let mut other = PlacementSession::new(GameRules::default());
    other.load_template(&template, &manifest(), &geometry());
    let added = other
        .add_at("rose.png", &manifest(), Point::new(300.0, 300.0))
        .expect("known sprite");
    assert_eq!(added, "sprite-4");

    let mut ids: Vec<&str> = other.sprites().iter().map(|sprite| sprite.id.as_str()).collect();
    assert_eq!(ids, vec!["sprite-2", "sprite-3", "sprite-4"]);
    ids.dedup();
    assert_eq!(ids.len(), 3);
}

#[test]
fn requests_skip_ids_already_on_the_board() {
    let mut snapshot = {
        let mut session = PlacementSession::new(GameRules::default());
        session.set_background("garden.jpg", Size::new(600.0, 450.0));
        session.add_at("bee.png", &manifest(), Point::new(100.0, 100.0));
        session.add_at("rose.png", &manifest(), Point::new(200.0, 100.0));
        session.snapshot()
    };
    snapshot.next_id = 0;

    let mut session = PlacementSession::new(GameRules::default());
    session.restore(snapshot).expect("restore");
    let added = session
        .add_at("bee.png", &manifest(), Point::new(300.0, 300.0))
        .expect("known sprite");
    assert_eq!(added, "sprite-3");
    assert_eq!(session.sprites().len(), 3);
}

#[test]
fn export_requires_background() {
    let session = PlacementSession::new(GameRules::default());
    assert_eq!(session.to_template("x", None).unwrap_err(), SessionError::NoBackground);
}

#[test]
fn snapshot_survives_bytes() {
    let mut session = PlacementSession::new(GameRules::default());
    session.set_background("garden.jpg", Size::new(600.0, 450.0));
    session.add_at("bee.png", &manifest(), Point::new(50.0, 60.0));
    let bytes = session.snapshot().to_bytes().expect("encode");
    let decoded = PlacementSnapshot::from_bytes(&bytes).expect("decode");
    let mut restored = PlacementSession::new(GameRules::default());
    restored.restore(decoded).expect("restore");
    assert_eq!(restored.sprites(), session.sprites());
    assert_eq!(restored.background(), Some("garden.jpg"));

    let mut stale = session.snapshot();
    stale.version += 1;
    assert!(matches!(
        restored.restore(stale),
        Err(SessionError::VersionMismatch { .. })
    ));
    assert_eq!(PlacementSnapshot::from_bytes(&[1, 2, 3]), Err(SessionError::Decode));
}
