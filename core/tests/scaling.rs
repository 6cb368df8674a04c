use machigai_core::{
    background_to_container, AssetEntry, AssetManifest, BackgroundDimensions, BoardGeometry,
    GameRules, PlacementEngine, Point, PuzzleGame, Rect, ScalingContext, Side, Size,
    SpriteTemplateEntry, Template,
};

fn sprite() -> SpriteTemplateEntry {
    SpriteTemplateEntry {
        id: "lamp".to_string(),
        src: "lamp.png".to_string(),
        render_coordinates: Point::new(100.0, 150.0),
        render_dimensions: Some(Size::new(80.0, 60.0)),
    }
}

fn geometry() -> BoardGeometry {
    BoardGeometry {
        background: Rect::new(64.0, 90.0, 320.0, 480.0),
        container: Rect::new(24.0, 70.0, 400.0, 520.0),
    }
}

#[test]
fn template_sprite_is_rescaled_before_conversion() {
    let geometry = geometry();
    let scaling = ScalingContext::new(Size::new(400.0, 600.0), geometry.background_size(), 1.0);
    assert!(scaling.is_scaling_needed());
    assert_eq!((scaling.scale_x, scaling.scale_y), (0.8, 0.8));

    let mut engine = PlacementEngine::new(GameRules::default());
    let placed =
        engine.place_at_template_coords(&sprite(), &scaling, Size::new(80.0, 80.0), &geometry);
    let expected = background_to_container(
        Point::new(80.0, 120.0),
        &geometry.background,
        &geometry.container,
    );
    assert_eq!(placed.container.origin(), expected);
    assert_eq!(placed.container.size(), Size::new(64.0, 48.0));
    assert_eq!(placed.background, Rect::new(80.0, 120.0, 64.0, 48.0));
    assert_eq!(engine.detector().placed(), &[placed.container]);
}

#[test]
fn matching_render_size_uses_coordinates_as_is() {
    let geometry = BoardGeometry {
        background: Rect::new(0.0, 0.0, 400.0, 600.0),
        container: Rect::new(0.0, 0.0, 400.0, 600.0),
    };
    let scaling = ScalingContext::new(Size::new(400.0, 600.0), geometry.background_size(), 1.0);
    assert!(!scaling.is_scaling_needed());
    let mut engine = PlacementEngine::new(GameRules::default());
    let placed =
        engine.place_at_template_coords(&sprite(), &scaling, Size::new(80.0, 80.0), &geometry);
    assert_eq!(placed.container, Rect::new(100.0, 150.0, 80.0, 60.0));
}

#[test]
fn rescaled_template_round_trips_through_reciprocal() {
    let template = Template {
        name: "room".to_string(),
        background: "room.jpg".to_string(),
        background_dimensions: Some(BackgroundDimensions {
            original_dimensions: None,
            render_dimensions: Size::new(400.0, 600.0),
        }),
        sprites: vec![sprite()],
    };
    let smaller = template.rescaled(Size::new(320.0, 480.0), 1.0);
    assert_eq!(smaller.sprites[0].render_coordinates, Point::new(80.0, 120.0));
    assert_eq!(smaller.sprites[0].render_dimensions, Some(Size::new(64.0, 48.0)));
    let restored = smaller.rescaled(Size::new(400.0, 600.0), 1.0);
    assert_eq!(restored, template);
}

#[test]
fn game_differences_use_scaled_centers() {
    let template = Template {
        name: "room".to_string(),
        background: "room.jpg".to_string(),
        background_dimensions: Some(BackgroundDimensions {
            original_dimensions: None,
            render_dimensions: Size::new(400.0, 600.0),
        }),
        sprites: vec![sprite()],
    };
    let manifest = AssetManifest {
        backgrounds: Vec::new(),
        sprites: vec![AssetEntry {
            filename: "lamp.png".to_string(),
            width: None,
            height: None,
        }],
    };
    let (game, _) = PuzzleGame::start(&template, &manifest, Size::new(320.0, 480.0), 5, GameRules::default());
    let lamp = game.board(Side::Left).sprite("lamp").expect("lamp");
    assert_eq!(lamp.rect, Rect::new(80.0, 120.0, 64.0, 48.0));
    assert_eq!(lamp.center(), Point::new(112.0, 144.0));
}
