pub mod board;
pub mod bounding_box;
pub mod collision;
pub mod differences;
pub mod distribution;
pub mod game;
pub mod geometry;
pub mod manifest;
pub mod mode;
pub mod placement;
pub mod rng;
pub mod rules;
pub mod seed;
pub mod session;
pub mod template;

pub use board::{Board, BoardSprite, Side};
pub use bounding_box::{BoundingBox, BoundingBoxError, BoundingBoxSet, BoxId};
pub use collision::{CandidatePosition, CollisionDetector};
pub use differences::{
    difference_count_bounds, generate_differences, try_match, Difference, FoundSet,
};
pub use distribution::{plan_distribution, region_capacity, Footprint};
pub use game::{ClickOutcome, GameEvent, PuzzleGame};
pub use geometry::{
    background_to_container, container_to_background, viewport_to_background,
    viewport_to_container, Point, Rect, Size,
};
pub use manifest::{AssetEntry, AssetManifest};
pub use mode::{AppMode, ModeChange, ModeError, ModeMachine};
pub use placement::{
    BoardGeometry, PlacementEngine, PlacementError, PlacementJob, PlacementReport,
    PlacementWarning, ScalingContext, SpritePlacement, SpriteRequest,
};
pub use rng::{RandomSource, SeededRng};
pub use rules::GameRules;
pub use seed::{parse_seed, seed_from_unit, SeedError, SEED_QUERY_PARAM, SEED_RANGE};
pub use session::{PlacedSprite, PlacementSession, PlacementSnapshot, SessionError};
pub use template::{BackgroundDimensions, SpriteTemplateEntry, Template, TemplateError};
