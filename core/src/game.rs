use std::collections::HashSet;

use crate::board::{Board, Side};
use crate::differences::{generate_differences, try_match, Difference, FoundSet};
use crate::geometry::{Point, Size};
use crate::manifest::AssetManifest;
use crate::placement::{PlacementWarning, ScalingContext};
use crate::rng::SeededRng;
use crate::rules::GameRules;
use crate::template::Template;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Found {
        id: String,
        found: usize,
        total: usize,
    },
    Completed {
        total: usize,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum ClickOutcome {
    Miss,
    Found {
        difference: Difference,
        completed: bool,
    },
}

/// One running puzzle: both boards, the omitted sprites, and which of them
/// the player has found.
#[derive(Clone, Debug)]
pub struct PuzzleGame {
    template_name: String,
    background: String,
    seed: u32,
    rules: GameRules,
    scaling: ScalingContext,
    left: Board,
    right: Board,
    differences: Vec<Difference>,
    found: FoundSet,
    completed: bool,
    events: Vec<GameEvent>,
    /// Sprite files taken out of play after they failed to load.
    dropped_srcs: Vec<String>,
}

impl PuzzleGame {
    /// Builds both boards from `template` at the background's current render
    /// size and removes a seeded subset of sprites from the right board.
    pub fn start(
        template: &Template,
        manifest: &AssetManifest,
        background_size: Size,
        seed: u32,
        rules: GameRules,
    ) -> (Self, Vec<PlacementWarning>) {
        let scaling =
            ScalingContext::for_template(template.render_size(), background_size, rules.scale_tolerance);
        let (left, warnings) = Board::from_template(Side::Left, template, &scaling, manifest, &rules);
        let mut right = left.mirrored(Side::Right);
        let mut rng = SeededRng::new(seed);
        let differences = generate_differences(&mut right, &mut rng, &rules);
        let game = Self {
            template_name: template.name.clone(),
            background: template.background.clone(),
            seed,
            rules,
            scaling,
            left,
            right,
            differences,
            found: FoundSet::new(),
            completed: false,
            events: Vec::new(),
            dropped_srcs: Vec::new(),
        };
        (game, warnings)
    }

    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    pub fn background(&self) -> &str {
        &self.background
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn scaling(&self) -> &ScalingContext {
        &self.scaling
    }

    pub fn board(&self, side: Side) -> &Board {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn differences(&self) -> &[Difference] {
        &self.differences
    }

    pub fn is_found(&self, id: &str) -> bool {
        self.found.contains(id)
    }

    pub fn score(&self) -> usize {
        self.found.len()
    }

    pub fn total(&self) -> usize {
        self.differences.len()
    }

    pub fn remaining(&self) -> usize {
        self.total().saturating_sub(self.score())
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    /// Resolves a click given in background-relative coordinates. Both boards
    /// share the background, so the side clicked does not matter.
    pub fn click(&mut self, point: Point) -> ClickOutcome {
        let threshold = self.rules.match_threshold;
        let Some(hit) = try_match(point, &self.differences, &mut self.found, threshold) else {
            return ClickOutcome::Miss;
        };
        let difference = hit.clone();
        self.events.push(GameEvent::Found {
            id: difference.id.clone(),
            found: self.found.len(),
            total: self.differences.len(),
        });
        let completed = !self.completed && self.found.len() == self.differences.len();
        if completed {
            self.completed = true;
            self.events.push(GameEvent::Completed {
                total: self.differences.len(),
            });
        }
        ClickOutcome::Found {
            difference,
            completed,
        }
    }

    /// Re-lays both boards for a new background render size. Differences
    /// keep their ids and found state, and their centers follow the sprites.
    /// Returns `false` when the size is within the scale tolerance of the
    /// current one.
    pub fn resize(
        &mut self,
        template: &Template,
        manifest: &AssetManifest,
        background_size: Size,
    ) -> bool {
        let current = self.scaling.actual_dimensions;
        let tolerance = self.rules.scale_tolerance;
        if (background_size.width - current.width).abs() <= tolerance
            && (background_size.height - current.height).abs() <= tolerance
        {
            return false;
        }
        let scaling =
            ScalingContext::for_template(template.render_size(), background_size, tolerance);
        let (mut left, _) =
            Board::from_template(Side::Left, template, &scaling, manifest, &self.rules);
        left.sprites
            .retain(|sprite| !self.dropped_srcs.contains(&sprite.src));
        let mut right = left.mirrored(Side::Right);
        for difference in &mut self.differences {
            if let Some(sprite) = right.remove(&difference.id) {
                let center = sprite.center();
                difference.center_x = center.x;
                difference.center_y = center.y;
            }
        }
        self.scaling = scaling;
        self.left = left;
        self.right = right;
        true
    }

    /// Takes every sprite drawn from `src` off both boards. Differences on
    /// those sprites no longer count toward the total. Returns how many
    /// differences were dropped.
    pub fn drop_src(&mut self, src: &str) -> usize {
        if self.dropped_srcs.iter().any(|dropped| dropped == src) {
            return 0;
        }
        self.dropped_srcs.push(src.to_string());
        let ids: HashSet<String> = self
            .left
            .sprites
            .iter()
            .filter(|sprite| sprite.src == src)
            .map(|sprite| sprite.id.clone())
            .collect();
        self.left.sprites.retain(|sprite| sprite.src != src);
        self.right.sprites.retain(|sprite| sprite.src != src);
        let before = self.differences.len();
        self.differences.retain(|difference| !ids.contains(&difference.id));
        for id in &ids {
            self.found.remove(id);
        }
        let dropped = before - self.differences.len();
        let total = self.differences.len();
        if dropped > 0 && !self.completed && total > 0 && self.found.len() == total {
            self.completed = true;
            self.events.push(GameEvent::Completed { total });
        }
        dropped
    }

    /// Events raised since the last call, oldest first.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Clears progress; the boards and differences stay as generated.
    pub fn reset_progress(&mut self) {
        self.found.clear();
        self.completed = false;
        self.events.clear();
    }
}
