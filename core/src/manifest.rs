use serde::{Deserialize, Serialize};

use crate::geometry::Size;

pub const SPRITE_MAX_DIMENSION_DEFAULT: f64 = 80.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssetEntry {
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl AssetEntry {
    pub fn dimensions(&self) -> Option<Size> {
        match (self.width, self.height) {
            (Some(width), Some(height)) if width > 0.0 && height > 0.0 => {
                Some(Size::new(width, height))
            }
            _ => None,
        }
    }
}

/// Asset list written by the build-time image scan.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetManifest {
    #[serde(default)]
    pub backgrounds: Vec<AssetEntry>,
    #[serde(default)]
    pub sprites: Vec<AssetEntry>,
}

impl AssetManifest {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn sprite(&self, filename: &str) -> Option<&AssetEntry> {
        self.sprites.iter().find(|entry| entry.filename == filename)
    }

    pub fn background(&self, filename: &str) -> Option<&AssetEntry> {
        self.backgrounds
            .iter()
            .find(|entry| entry.filename == filename)
    }

    pub fn has_sprite(&self, filename: &str) -> bool {
        self.sprite(filename).is_some()
    }

    /// On-board size for a sprite; unknown sprites or missing dimensions
    /// fall back to a `max_dimension` square.
    pub fn sprite_display_size(&self, filename: &str, max_dimension: f64) -> Size {
        let dims = self.sprite(filename).and_then(AssetEntry::dimensions);
        display_size(dims, max_dimension)
    }
}

/// Scales `natural` so its longer side equals `max_dimension`, keeping the
/// aspect ratio.
pub fn display_size(natural: Option<Size>, max_dimension: f64) -> Size {
    let max_dimension = max_dimension.max(1.0);
    let Some(natural) = natural else {
        return Size::new(max_dimension, max_dimension);
    };
    let longest = natural.width.max(natural.height);
    let scale = max_dimension / longest;
    Size::new(
        (natural.width * scale).round().max(1.0),
        (natural.height * scale).round().max(1.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_parses_and_ignores_extra_fields() {
        let raw = r#"{
            "backgrounds": [{"filename": "park.jpg", "width": 800, "height": 1200, "bytes": 1}],
            "sprites": [{"filename": "cat.png", "width": 160, "height": 80}, {"filename": "dog.png"}]
        }"#;
        let manifest = AssetManifest::from_json(raw).expect("manifest");
        assert_eq!(manifest.backgrounds.len(), 1);
        assert_eq!(manifest.sprite_display_size("cat.png", 80.0), Size::new(80.0, 40.0));
        assert_eq!(manifest.sprite_display_size("dog.png", 80.0), Size::new(80.0, 80.0));
        assert_eq!(manifest.sprite_display_size("nope.png", 80.0), Size::new(80.0, 80.0));
    }

    #[test]
    fn tall_sprites_keep_aspect() {
        let size = display_size(Some(Size::new(30.0, 120.0)), 80.0);
        assert_eq!(size, Size::new(20.0, 80.0));
    }
}
