use serde::{Deserialize, Serialize};

use crate::collision::{COLLISION_BUFFER_DEFAULT, MAX_PLACEMENT_ATTEMPTS_DEFAULT};
use crate::differences::{
    DIFFERENCE_RATIO_DEFAULT, MATCH_THRESHOLD_DEFAULT, MAX_DIFFERENCES_DEFAULT,
    MIN_DIFFERENCES_DEFAULT,
};
use crate::distribution::Footprint;
use crate::manifest::SPRITE_MAX_DIMENSION_DEFAULT;
use crate::placement::SCALE_TOLERANCE_DEFAULT;

pub const PLACEMENT_PACING_MS_DEFAULT: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRules {
    pub sprite_max_dimension: f64,
    pub collision_buffer: f64,
    pub max_placement_attempts: u32,
    pub match_threshold: f64,
    pub max_differences: u32,
    pub min_differences: u32,
    pub difference_ratio: f64,
    pub scale_tolerance: f64,
    pub placement_pacing_ms: u32,
}

impl GameRules {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn footprint(&self) -> Footprint {
        Footprint {
            sprite_size: self.sprite_max_dimension,
            buffer: self.collision_buffer,
        }
    }
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            sprite_max_dimension: SPRITE_MAX_DIMENSION_DEFAULT,
            collision_buffer: COLLISION_BUFFER_DEFAULT,
            max_placement_attempts: MAX_PLACEMENT_ATTEMPTS_DEFAULT,
            match_threshold: MATCH_THRESHOLD_DEFAULT,
            max_differences: MAX_DIFFERENCES_DEFAULT,
            min_differences: MIN_DIFFERENCES_DEFAULT,
            difference_ratio: DIFFERENCE_RATIO_DEFAULT,
            scale_tolerance: SCALE_TOLERANCE_DEFAULT,
            placement_pacing_ms: PLACEMENT_PACING_MS_DEFAULT,
        }
    }
}
