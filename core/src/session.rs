use rkyv::rancor::Error as RkyvError;
use rkyv::util::AlignedVec;

use crate::geometry::{Point, Rect, Size};
use crate::manifest::AssetManifest;
use crate::placement::{
    plan_jobs, BoardGeometry, PlacementEngine, PlacementJob, PlacementReport, PlacementWarning,
    ScalingContext, SpritePlacement, SpriteRequest,
};
use crate::rng::RandomSource;
use crate::rules::GameRules;
use crate::template::{BackgroundDimensions, SpriteTemplateEntry, Template};

pub const PLACEMENT_SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("no background selected")]
    NoBackground,
    #[error("failed to encode placement snapshot")]
    Encode,
    #[error("failed to decode placement snapshot")]
    Decode,
    #[error("placement snapshot version {found} does not match {expected}")]
    VersionMismatch { found: u32, expected: u32 },
}

#[derive(Clone, Debug, PartialEq, rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)]
pub struct PlacedSprite {
    pub id: String,
    pub src: String,
    /// Background-relative.
    pub rect: Rect,
}

#[derive(Clone, Debug, PartialEq, rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)]
pub struct PlacementSnapshot {
    pub version: u32,
    pub background: Option<String>,
    pub background_size: Size,
    pub sprites: Vec<PlacedSprite>,
    pub next_id: u64,
}

impl PlacementSnapshot {
    pub fn to_bytes(&self) -> Result<Vec<u8>, SessionError> {
        rkyv::to_bytes::<RkyvError>(self)
            .map(|bytes| bytes.into_vec())
            .map_err(|_| SessionError::Encode)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SessionError> {
        let mut aligned = AlignedVec::<16>::with_capacity(bytes.len());
        aligned.extend_from_slice(bytes);
        let snapshot = rkyv::from_bytes::<Self, RkyvError>(&aligned)
            .map_err(|_| SessionError::Decode)?;
        if snapshot.version != PLACEMENT_SNAPSHOT_VERSION {
            return Err(SessionError::VersionMismatch {
                found: snapshot.version,
                expected: PLACEMENT_SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot)
    }
}

/// Placement Mode working set: the sprites currently on the authoring board
/// in paint order, plus collision bookkeeping for random placement.
#[derive(Clone, Debug)]
pub struct PlacementSession {
    rules: GameRules,
    background: Option<String>,
    background_size: Size,
    sprites: Vec<PlacedSprite>,
    engine: PlacementEngine,
    next_id: u64,
}

impl PlacementSession {
    pub fn new(rules: GameRules) -> Self {
        Self {
            rules,
            background: None,
            background_size: Size::default(),
            sprites: Vec::new(),
            engine: PlacementEngine::new(rules),
            next_id: 0,
        }
    }

    pub fn background(&self) -> Option<&str> {
        self.background.as_deref()
    }

    pub fn background_size(&self) -> Size {
        self.background_size
    }

    pub fn set_background(&mut self, name: impl Into<String>, size: Size) {
        self.background = Some(name.into());
        self.background_size = size;
    }

    pub fn sprites(&self) -> &[PlacedSprite] {
        &self.sprites
    }

    pub fn sprite(&self, id: &str) -> Option<&PlacedSprite> {
        self.sprites.iter().find(|sprite| sprite.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    pub fn engine(&self) -> &PlacementEngine {
        &self.engine
    }

    /// New request with an id no sprite on the board already uses.
    pub fn request(&mut self, src: &str) -> SpriteRequest {
        loop {
            self.next_id += 1;
            let candidate = format!("sprite-{}", self.next_id);
            if self.sprite(&candidate).is_none() {
                return SpriteRequest::new(candidate, src);
            }
        }
    }

    pub fn clear(&mut self) {
        self.sprites.clear();
        self.engine.reset();
    }

    /// Clears the board and returns the ordered jobs for a bulk placement.
    /// Callers that pace placement feed the jobs to [`Self::place_job`] one
    /// at a time.
    pub fn begin_bulk(
        &mut self,
        srcs: &[String],
        manifest: &AssetManifest,
        regions: &[Rect],
    ) -> (Vec<PlacementJob>, Vec<PlacementWarning>) {
        self.clear();
        let requests: Vec<SpriteRequest> = srcs.iter().map(|src| self.request(src)).collect();
        plan_jobs(&requests, manifest, regions, &self.rules)
    }

    pub fn place_job<R: RandomSource>(
        &mut self,
        job: &PlacementJob,
        geometry: &BoardGeometry,
        rng: &mut R,
    ) -> SpritePlacement {
        self.background_size = geometry.background_size();
        self.engine
            .rebuild(self.sprites.iter().map(|sprite| &sprite.rect), geometry);
        let placement = self.engine.place_job(job, geometry, rng);
        self.sprites.push(PlacedSprite {
            id: placement.id.clone(),
            src: placement.src.clone(),
            rect: placement.background,
        });
        placement
    }

    /// Replaces the board with `srcs` placed randomly, inside `regions` when
    /// any are given.
    pub fn place_all<R: RandomSource>(
        &mut self,
        srcs: &[String],
        manifest: &AssetManifest,
        regions: &[Rect],
        geometry: &BoardGeometry,
        rng: &mut R,
    ) -> PlacementReport {
        let (jobs, mut warnings) = self.begin_bulk(srcs, manifest, regions);
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

    /// Drops one sprite centered on a background point. Returns its id, or
    /// `None` when the asset is unknown.
    pub fn add_at(&mut self, src: &str, manifest: &AssetManifest, center: Point) -> Option<String> {
        if !manifest.has_sprite(src) {
            return None;
        }
        let size = manifest.sprite_display_size(src, self.rules.sprite_max_dimension);
        let request = self.request(src);
        let rect = Rect::new(
            (center.x - size.width * 0.5).round(),
            (center.y - size.height * 0.5).round(),
            size.width,
            size.height,
        );
        self.sprites.push(PlacedSprite {
            id: request.id.clone(),
            src: request.src,
            rect,
        });
        Some(request.id)
    }

    /// Topmost sprite under a background point.
    pub fn sprite_at(&self, point: Point) -> Option<&PlacedSprite> {
        self.sprites.iter().rev().find(|sprite| sprite.rect.contains(point))
    }

    pub fn move_to(&mut self, id: &str, origin: Point) -> bool {
        let Some(sprite) = self.sprites.iter_mut().find(|sprite| sprite.id == id) else {
            return false;
        };
        sprite.rect.x = origin.x;
        sprite.rect.y = origin.y;
        true
    }

    pub fn bring_to_front(&mut self, id: &str) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let sprite = self.sprites.remove(index);
        self.sprites.push(sprite);
        true
    }

    pub fn send_to_back(&mut self, id: &str) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let sprite = self.sprites.remove(index);
        self.sprites.insert(0, sprite);
        true
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.sprites.remove(index);
        true
    }

    /// Puts every template sprite on the board at its recorded position,
    /// rescaled to the current background size.
    pub fn load_template(
        &mut self,
        template: &Template,
        manifest: &AssetManifest,
        geometry: &BoardGeometry,
    ) -> PlacementReport {
        self.clear();
        self.set_background(template.background.clone(), geometry.background_size());
        let scaling = ScalingContext::for_template(
            template.render_size(),
            geometry.background_size(),
            self.rules.scale_tolerance,
        );
        let mut report = PlacementReport::default();
        for entry in &template.sprites {
            if !manifest.has_sprite(&entry.src) {
                report.warnings.push(PlacementWarning::AssetMissing {
                    id: entry.id.clone(),
                    src: entry.src.clone(),
                });
                continue;
            }
            let fallback = manifest.sprite_display_size(&entry.src, self.rules.sprite_max_dimension);
            let placement = self
                .engine
                .place_at_template_coords(entry, &scaling, fallback, geometry);
            self.sprites.push(PlacedSprite {
                id: placement.id.clone(),
                src: placement.src.clone(),
                rect: placement.background,
            });
            report.placed.push(placement);
        }
        let highest = self
            .sprites
            .iter()
            .filter_map(|sprite| sprite.id.strip_prefix("sprite-"))
            .filter_map(|suffix| suffix.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        self.next_id = self.next_id.max(highest);
        report
    }

    /// Current board as a template recorded at the current background size.
    pub fn to_template(
        &self,
        name: &str,
        original_dimensions: Option<Size>,
    ) -> Result<Template, SessionError> {
        let background = self.background.clone().ok_or(SessionError::NoBackground)?;
        let sprites = self
            .sprites
            .iter()
            .map(|sprite| SpriteTemplateEntry {
                id: sprite.id.clone(),
                src: sprite.src.clone(),
                render_coordinates: Point::new(sprite.rect.x.round(), sprite.rect.y.round()),
                render_dimensions: Some(sprite.rect.size()),
            })
            .collect();
        Ok(Template {
            name: name.to_string(),
            background,
            background_dimensions: Some(BackgroundDimensions {
                original_dimensions,
                render_dimensions: self.background_size,
            }),
            sprites,
        })
    }

    pub fn snapshot(&self) -> PlacementSnapshot {
        PlacementSnapshot {
            version: PLACEMENT_SNAPSHOT_VERSION,
            background: self.background.clone(),
            background_size: self.background_size,
            sprites: self.sprites.clone(),
            next_id: self.next_id,
        }
    }

    /// Replaces the working set with a snapshot. Collision bookkeeping is
    /// rebuilt on the next random placement.
    pub fn restore(&mut self, snapshot: PlacementSnapshot) -> Result<(), SessionError> {
        if snapshot.version != PLACEMENT_SNAPSHOT_VERSION {
            return Err(SessionError::VersionMismatch {
                found: snapshot.version,
                expected: PLACEMENT_SNAPSHOT_VERSION,
            });
        }
        self.engine.reset();
        self.background = snapshot.background;
        self.background_size = snapshot.background_size;
        self.sprites = snapshot.sprites;
        self.next_id = snapshot.next_id;
        Ok(())
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.sprites.iter().position(|sprite| sprite.id == id)
    }
}
