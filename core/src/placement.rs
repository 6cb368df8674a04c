use crate::collision::{CandidatePosition, CollisionDetector};
use crate::distribution::plan_distribution;
use crate::geometry::{
    background_rect_to_container, container_rect_to_background, Point, Rect, Size,
};
use crate::manifest::AssetManifest;
use crate::rng::RandomSource;
use crate::rules::GameRules;
use crate::template::SpriteTemplateEntry;

pub const SCALE_TOLERANCE_DEFAULT: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("{0} is not rendered yet")]
    ResourceUnavailable(&'static str),
}

/// Relates the background size a template was recorded at to the size it is
/// rendered at now.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScalingContext {
    pub template_dimensions: Size,
    pub actual_dimensions: Size,
    pub scale_x: f64,
    pub scale_y: f64,
    pub tolerance: f64,
}

impl ScalingContext {
    pub fn new(template_dimensions: Size, actual_dimensions: Size, tolerance: f64) -> Self {
        let scale_x = axis_scale(actual_dimensions.width, template_dimensions.width);
        let scale_y = axis_scale(actual_dimensions.height, template_dimensions.height);
        Self {
            template_dimensions,
            actual_dimensions,
            scale_x,
            scale_y,
            tolerance,
        }
    }

    pub fn identity(size: Size) -> Self {
        Self::new(size, size, SCALE_TOLERANCE_DEFAULT)
    }

    /// Context for a template recorded at `recorded` (if known) shown at `actual`.
    pub fn for_template(recorded: Option<Size>, actual: Size, tolerance: f64) -> Self {
        match recorded {
            Some(recorded) => Self::new(recorded, actual, tolerance),
            None => Self::identity(actual),
        }
    }

    pub fn is_scaling_needed(&self) -> bool {
        (self.actual_dimensions.width - self.template_dimensions.width).abs() > self.tolerance
            || (self.actual_dimensions.height - self.template_dimensions.height).abs()
                > self.tolerance
    }

    pub fn scale_point(&self, point: Point) -> Point {
        if !self.is_scaling_needed() {
            return point;
        }
        Point::new(
            (point.x * self.scale_x).round(),
            (point.y * self.scale_y).round(),
        )
    }

    pub fn scale_size(&self, size: Size) -> Size {
        if !self.is_scaling_needed() {
            return size;
        }
        Size::new(
            (size.width * self.scale_x).round(),
            (size.height * self.scale_y).round(),
        )
    }

    pub fn scale_rect(&self, rect: &Rect) -> Rect {
        Rect::from_origin_size(self.scale_point(rect.origin()), self.scale_size(rect.size()))
    }

    pub fn inverse(&self) -> Self {
        Self::new(self.actual_dimensions, self.template_dimensions, self.tolerance)
    }
}

fn axis_scale(actual: f64, recorded: f64) -> f64 {
    if recorded > 0.0 && actual > 0.0 {
        actual / recorded
    } else {
        1.0
    }
}

/// On-screen rects of one board's background and container, read together.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoardGeometry {
    pub background: Rect,
    pub container: Rect,
}

impl BoardGeometry {
    /// Fails when either element is missing or has not been laid out yet.
    pub fn from_rects(
        background: Option<Rect>,
        container: Option<Rect>,
    ) -> Result<Self, PlacementError> {
        let background = background
            .filter(|rect| !rect.size().is_empty())
            .ok_or(PlacementError::ResourceUnavailable("background"))?;
        let container = container.ok_or(PlacementError::ResourceUnavailable("container"))?;
        Ok(Self {
            background,
            container,
        })
    }

    pub fn background_size(&self) -> Size {
        self.background.size()
    }

    pub fn background_bounds(&self) -> Rect {
        Rect::from_origin_size(Point::default(), self.background.size())
    }

    pub fn to_container(&self, rect: &Rect) -> Rect {
        background_rect_to_container(rect, &self.background, &self.container)
    }

    pub fn to_background(&self, rect: &Rect) -> Rect {
        container_rect_to_background(rect, &self.background, &self.container)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpriteRequest {
    pub id: String,
    pub src: String,
}

impl SpriteRequest {
    pub fn new(id: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            src: src.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpritePlacement {
    pub id: String,
    pub src: String,
    pub background: Rect,
    pub container: Rect,
    pub attempts: u32,
    pub collision_free: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PlacementWarning {
    AssetMissing { id: String, src: String },
    Overlapping { id: String, attempts: u32 },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlacementReport {
    pub placed: Vec<SpritePlacement>,
    pub warnings: Vec<PlacementWarning>,
}

/// One sprite ready to place, with the background-relative region it goes in
/// (`None` means anywhere on the background).
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementJob {
    pub request: SpriteRequest,
    pub size: Size,
    pub region: Option<Rect>,
}

/// Expands a sprite list into ordered placement jobs: sprites keep their list
/// order and are dealt out region by region according to the distribution
/// plan. Sprites missing from the manifest are dropped with a warning.
pub fn plan_jobs(
    requests: &[SpriteRequest],
    manifest: &AssetManifest,
    regions: &[Rect],
    rules: &GameRules,
) -> (Vec<PlacementJob>, Vec<PlacementWarning>) {
    let mut warnings = Vec::new();
    let mut available = Vec::with_capacity(requests.len());
    for request in requests {
        if manifest.has_sprite(&request.src) {
            available.push(request.clone());
        } else {
            warnings.push(PlacementWarning::AssetMissing {
                id: request.id.clone(),
                src: request.src.clone(),
            });
        }
    }
    let sized = |request: SpriteRequest, region: Option<Rect>| PlacementJob {
        size: manifest.sprite_display_size(&request.src, rules.sprite_max_dimension),
        request,
        region,
    };
    if regions.is_empty() {
        let jobs = available
            .into_iter()
            .map(|request| sized(request, None))
            .collect();
        return (jobs, warnings);
    }
    let sizes: Vec<Size> = regions.iter().map(Rect::size).collect();
    let plan = plan_distribution(&sizes, available.len(), &rules.footprint());
    let mut jobs = Vec::with_capacity(available.len());
    let mut pending = available.into_iter();
    for (region, count) in regions.iter().zip(plan) {
        for request in pending.by_ref().take(count) {
            jobs.push(sized(request, Some(*region)));
        }
    }
    (jobs, warnings)
}

/// Resolves a template entry to its background-relative rect at the current
/// render size. Recorded sizes scale with the background; `fallback` is
/// already in current pixels and is used as-is.
pub fn template_sprite_rect(
    entry: &SpriteTemplateEntry,
    scaling: &ScalingContext,
    fallback: Size,
) -> Rect {
    let origin = scaling.scale_point(entry.render_coordinates);
    let size = match entry.render_dimensions {
        Some(size) => scaling.scale_size(size),
        None => fallback,
    };
    Rect::from_origin_size(origin, size)
}

/// Places sprites on one board. Collision bookkeeping is kept in container
/// space.
#[derive(Clone, Debug)]
pub struct PlacementEngine {
    detector: CollisionDetector,
    rules: GameRules,
}

impl PlacementEngine {
    pub fn new(rules: GameRules) -> Self {
        let sprite = Size::new(rules.sprite_max_dimension, rules.sprite_max_dimension);
        Self {
            detector: CollisionDetector::new(Vec::new(), sprite, rules.collision_buffer),
            rules,
        }
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn detector(&self) -> &CollisionDetector {
        &self.detector
    }

    pub fn reset(&mut self) {
        self.detector.clear();
    }

    /// Replaces the bookkeeping with the given background-relative rects.
    pub fn rebuild<'a, I>(&mut self, rects: I, geometry: &BoardGeometry)
    where
        I: IntoIterator<Item = &'a Rect>,
    {
        self.detector.clear();
        for rect in rects {
            self.detector.add_rect(geometry.to_container(rect));
        }
    }

    /// Picks one of `regions` at random (the whole background when empty)
    /// and places a sprite of `size` in it.
    pub fn place_random<R: RandomSource>(
        &mut self,
        size: Size,
        regions: &[Rect],
        geometry: &BoardGeometry,
        rng: &mut R,
    ) -> SpritePlacement {
        let region = if regions.is_empty() {
            geometry.background_bounds()
        } else {
            regions[rng.next_index(regions.len())]
        };
        self.place_in_region(size, &region, geometry, rng)
    }

    pub fn place_in_region<R: RandomSource>(
        &mut self,
        size: Size,
        region: &Rect,
        geometry: &BoardGeometry,
        rng: &mut R,
    ) -> SpritePlacement {
        let area = geometry.to_container(region);
        self.detector.set_sprite_size(size);
        let CandidatePosition {
            x,
            y,
            attempts,
            collision_free,
        } = self
            .detector
            .find_non_colliding_position(&area, self.rules.max_placement_attempts, rng);
        self.detector.add_position(x, y, size.width, size.height);
        let container = Rect::new(x, y, size.width, size.height);
        SpritePlacement {
            id: String::new(),
            src: String::new(),
            background: geometry.to_background(&container),
            container,
            attempts,
            collision_free,
        }
    }

    pub fn place_job<R: RandomSource>(
        &mut self,
        job: &PlacementJob,
        geometry: &BoardGeometry,
        rng: &mut R,
    ) -> SpritePlacement {
        let mut placement = match job.region {
            Some(region) => self.place_in_region(job.size, &region, geometry, rng),
            None => self.place_random(job.size, &[], geometry, rng),
        };
        placement.id = job.request.id.clone();
        placement.src = job.request.src.clone();
        placement
    }

    /// Places every request in order. Missing assets are skipped and
    /// crowded placements kept, both reported as warnings.
    pub fn place_all<R: RandomSource>(
        &mut self,
        requests: &[SpriteRequest],
        manifest: &AssetManifest,
        regions: &[Rect],
        geometry: &BoardGeometry,
        rng: &mut R,
    ) -> PlacementReport {
        let (jobs, mut warnings) = plan_jobs(requests, manifest, regions, &self.rules);
        let mut placed = Vec::with_capacity(jobs.len());
        for job in &jobs {
            let placement = self.place_job(job, geometry, rng);
            if !placement.collision_free {
                warnings.push(PlacementWarning::Overlapping {
                    id: placement.id.clone(),
                    attempts: placement.attempts,
                });
            }
            placed.push(placement);
        }
        PlacementReport { placed, warnings }
    }

    /// Places a template sprite at its recorded coordinates, rescaled when
    /// the background renders at a different size than recorded.
    pub fn place_at_template_coords(
        &mut self,
        entry: &SpriteTemplateEntry,
        scaling: &ScalingContext,
        fallback: Size,
        geometry: &BoardGeometry,
    ) -> SpritePlacement {
        let background = template_sprite_rect(entry, scaling, fallback);
        let container = geometry.to_container(&background);
        self.detector.add_rect(container);
        SpritePlacement {
            id: entry.id.clone(),
            src: entry.src.clone(),
            background,
            container,
            attempts: 0,
            collision_free: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeededRng;

    fn geometry() -> BoardGeometry {
        BoardGeometry {
            background: Rect::new(40.0, 30.0, 320.0, 480.0),
            container: Rect::new(20.0, 10.0, 400.0, 520.0),
        }
    }

    #[test]
    fn unavailable_geometry_is_reported() {
        let err = BoardGeometry::from_rects(None, Some(Rect::new(0.0, 0.0, 1.0, 1.0))).unwrap_err();
        assert_eq!(err, PlacementError::ResourceUnavailable("background"));
        let zero = Some(Rect::new(0.0, 0.0, 0.0, 0.0));
        assert!(BoardGeometry::from_rects(zero, Some(Rect::default())).is_err());
    }

    #[test]
    fn scaling_tolerates_one_pixel() {
        let context = ScalingContext::new(Size::new(400.0, 600.0), Size::new(400.5, 599.2), 1.0);
        assert!(!context.is_scaling_needed());
        assert_eq!(context.scale_point(Point::new(13.0, 17.0)), Point::new(13.0, 17.0));
    }

    #[test]
    fn reciprocal_scale_restores_coordinates() {
        let context = ScalingContext::new(Size::new(400.0, 600.0), Size::new(320.0, 480.0), 1.0);
        let there = context.scale_point(Point::new(100.0, 150.0));
        assert_eq!(there, Point::new(80.0, 120.0));
        assert_eq!(context.inverse().scale_point(there), Point::new(100.0, 150.0));
    }

    #[test]
    fn random_placement_stays_on_background() {
        let geometry = geometry();
        let mut engine = PlacementEngine::new(GameRules::default());
        let mut rng = SeededRng::new(21);
        for _ in 0..10 {
            let placed = engine.place_random(Size::new(80.0, 80.0), &[], &geometry, &mut rng);
            assert!(placed.background.x >= 0.0 && placed.background.right() <= 320.0);
            assert!(placed.background.y >= 0.0 && placed.background.bottom() <= 480.0);
            assert_eq!(placed.container.x - placed.background.x, 20.0);
            assert_eq!(placed.container.y - placed.background.y, 20.0);
        }
        assert_eq!(engine.detector().placed().len(), 10);
    }

    #[test]
    fn region_placement_respects_region() {
        let geometry = geometry();
        let mut engine = PlacementEngine::new(GameRules::default());
        let mut rng = SeededRng::new(8);
        let region = Rect::new(100.0, 200.0, 150.0, 120.0);
        let placed = engine.place_random(Size::new(40.0, 40.0), &[region], &geometry, &mut rng);
        assert!(placed.background.x >= 100.0 && placed.background.right() <= 250.0);
        assert!(placed.background.y >= 200.0 && placed.background.bottom() <= 320.0);
    }
}
