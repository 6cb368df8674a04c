use crate::geometry::{Point, Rect};
use crate::manifest::AssetManifest;
use crate::placement::{template_sprite_rect, BoardGeometry, PlacementWarning, ScalingContext};
use crate::rules::GameRules;
use crate::template::Template;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn label(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoardSprite {
    pub id: String,
    pub src: String,
    /// Background-relative.
    pub rect: Rect,
}

impl BoardSprite {
    pub fn center(&self) -> Point {
        self.rect.center()
    }
}

/// One side of the puzzle. Sprite order is paint order.
#[derive(Clone, Debug, PartialEq)]
pub struct Board {
    pub side: Side,
    pub sprites: Vec<BoardSprite>,
}

impl Board {
    pub fn empty(side: Side) -> Self {
        Self {
            side,
            sprites: Vec::new(),
        }
    }

    /// Lays out every template sprite at its recorded position. Sprites
    /// whose asset is not in the manifest are left out and reported.
    pub fn from_template(
        side: Side,
        template: &Template,
        scaling: &ScalingContext,
        manifest: &AssetManifest,
        rules: &GameRules,
    ) -> (Self, Vec<PlacementWarning>) {
        let mut sprites = Vec::with_capacity(template.sprites.len());
        let mut warnings = Vec::new();
        for entry in &template.sprites {
            if !manifest.has_sprite(&entry.src) {
                warnings.push(PlacementWarning::AssetMissing {
                    id: entry.id.clone(),
                    src: entry.src.clone(),
                });
                continue;
            }
            let fallback = manifest.sprite_display_size(&entry.src, rules.sprite_max_dimension);
            sprites.push(BoardSprite {
                id: entry.id.clone(),
                src: entry.src.clone(),
                rect: template_sprite_rect(entry, scaling, fallback),
            });
        }
        (Self { side, sprites }, warnings)
    }

    /// Same sprites on the other side.
    pub fn mirrored(&self, side: Side) -> Self {
        Self {
            side,
            sprites: self.sprites.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    pub fn sprite(&self, id: &str) -> Option<&BoardSprite> {
        self.sprites.iter().find(|sprite| sprite.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sprite(id).is_some()
    }

    pub fn remove(&mut self, id: &str) -> Option<BoardSprite> {
        let index = self.sprites.iter().position(|sprite| sprite.id == id)?;
        Some(self.sprites.remove(index))
    }

    /// Container-relative rects for rendering, in paint order.
    pub fn container_rects(&self, geometry: &BoardGeometry) -> Vec<(&BoardSprite, Rect)> {
        self.sprites
            .iter()
            .map(|sprite| (sprite, geometry.to_container(&sprite.rect)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use crate::manifest::AssetEntry;
    use crate::template::SpriteTemplateEntry;

    fn manifest() -> AssetManifest {
        AssetManifest {
            backgrounds: Vec::new(),
            sprites: vec![AssetEntry {
                filename: "cat.png".to_string(),
                width: Some(100.0),
                height: Some(50.0),
            }],
        }
    }

    fn entry(id: &str, src: &str, dims: Option<Size>) -> SpriteTemplateEntry {
        SpriteTemplateEntry {
            id: id.to_string(),
            src: src.to_string(),
            render_coordinates: Point::new(10.0, 20.0),
            render_dimensions: dims,
        }
    }

    #[test]
    fn missing_assets_are_left_out() {
        let template = Template {
            name: "t".to_string(),
            background: "bg.jpg".to_string(),
            background_dimensions: None,
            sprites: vec![entry("a", "cat.png", None), entry("b", "ghost.png", None)],
        };
        let scaling = ScalingContext::identity(Size::new(400.0, 600.0));
        let (board, warnings) =
            Board::from_template(Side::Left, &template, &scaling, &manifest(), &GameRules::default());
        assert_eq!(board.len(), 1);
        assert_eq!(board.sprites[0].rect, Rect::new(10.0, 20.0, 80.0, 40.0));
        assert_eq!(
            warnings,
            vec![PlacementWarning::AssetMissing {
                id: "b".to_string(),
                src: "ghost.png".to_string()
            }]
        );
    }

    #[test]
    fn remove_returns_sprite_once() {
        let mut board = Board::empty(Side::Right);
        board.sprites.push(BoardSprite {
            id: "x".to_string(),
            src: "cat.png".to_string(),
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
        });
        assert!(board.remove("x").is_some());
        assert!(board.remove("x").is_none());
    }
}
