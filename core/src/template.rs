use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::geometry::{Point, Rect, Size};
use crate::manifest::AssetManifest;
use crate::placement::ScalingContext;

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("invalid template json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("template must be a json object")]
    NotAnObject,
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("field `{0}` must be a non-empty string")]
    EmptyField(&'static str),
    #[error("field `{field}` {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("sprite {index}: {reason}")]
    InvalidSprite { index: usize, reason: String },
    #[error("sprite {index}: `{src}` is not in the asset manifest")]
    UnknownSprite { index: usize, src: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpriteTemplateEntry {
    pub id: String,
    pub src: String,
    pub render_coordinates: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_dimensions: Option<Size>,
}

impl SpriteTemplateEntry {
    pub fn rect(&self, fallback: Size) -> Rect {
        Rect::from_origin_size(
            self.render_coordinates,
            self.render_dimensions.unwrap_or(fallback),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundDimensions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_dimensions: Option<Size>,
    pub render_dimensions: Size,
}

/// Serializable puzzle layout: one background plus sprite positions recorded
/// at a known background render size.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub name: String,
    pub background: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_dimensions: Option<BackgroundDimensions>,
    pub sprites: Vec<SpriteTemplateEntry>,
}

impl Template {
    /// Parses and validates a template. Both the legacy per-sprite `x`/`y`
    /// shape and the `renderCoordinates` shape are accepted.
    pub fn from_json(raw: &str) -> Result<Self, TemplateError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, TemplateError> {
        let object = value.as_object().ok_or(TemplateError::NotAnObject)?;
        let name = required_string(object, "name")?;
        let background = required_string(object, "background")?;
        let background_dimensions = match object.get("backgroundDimensions") {
            None | Some(Value::Null) => None,
            Some(raw) => Some(parse_background_dimensions(raw)?),
        };
        let sprites_value = object
            .get("sprites")
            .ok_or(TemplateError::MissingField("sprites"))?;
        let sprite_values = sprites_value
            .as_array()
            .ok_or_else(|| TemplateError::InvalidField {
                field: "sprites",
                reason: "must be an array".to_string(),
            })?;
        let mut seen = HashSet::new();
        let mut sprites = Vec::with_capacity(sprite_values.len());
        for (index, raw) in sprite_values.iter().enumerate() {
            let mut entry = parse_sprite(index, raw)?;
            if !seen.insert(entry.id.clone()) {
                entry.id = format!("{}-{index}", entry.id);
                seen.insert(entry.id.clone());
            }
            sprites.push(entry);
        }
        Ok(Self {
            name,
            background,
            background_dimensions,
            sprites,
        })
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn render_size(&self) -> Option<Size> {
        self.background_dimensions
            .map(|dims| dims.render_dimensions)
            .filter(|size| !size.is_empty())
    }

    /// Rejects templates whose sprites are not listed in the manifest.
    pub fn validate_against(&self, manifest: &AssetManifest) -> Result<(), TemplateError> {
        for (index, sprite) in self.sprites.iter().enumerate() {
            if !manifest.has_sprite(&sprite.src) {
                return Err(TemplateError::UnknownSprite {
                    index,
                    src: sprite.src.clone(),
                });
            }
        }
        Ok(())
    }

    /// Copy of this template re-recorded at `actual` background size.
    pub fn rescaled(&self, actual: Size, tolerance: f64) -> Self {
        let Some(recorded) = self.render_size() else {
            let mut copy = self.clone();
            copy.background_dimensions = Some(BackgroundDimensions {
                original_dimensions: None,
                render_dimensions: actual,
            });
            return copy;
        };
        let scaling = ScalingContext::new(recorded, actual, tolerance);
        let sprites = self
            .sprites
            .iter()
            .map(|sprite| SpriteTemplateEntry {
                id: sprite.id.clone(),
                src: sprite.src.clone(),
                render_coordinates: scaling.scale_point(sprite.render_coordinates),
                render_dimensions: sprite.render_dimensions.map(|size| scaling.scale_size(size)),
            })
            .collect();
        Self {
            name: self.name.clone(),
            background: self.background.clone(),
            background_dimensions: Some(BackgroundDimensions {
                original_dimensions: self
                    .background_dimensions
                    .and_then(|dims| dims.original_dimensions),
                render_dimensions: actual,
            }),
            sprites,
        }
    }
}

fn required_string(object: &Map<String, Value>, field: &'static str) -> Result<String, TemplateError> {
    let value = object.get(field).ok_or(TemplateError::MissingField(field))?;
    match value.as_str() {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        _ => Err(TemplateError::EmptyField(field)),
    }
}

fn parse_background_dimensions(value: &Value) -> Result<BackgroundDimensions, TemplateError> {
    let invalid = |reason: &str| TemplateError::InvalidField {
        field: "backgroundDimensions",
        reason: reason.to_string(),
    };
    let object = value.as_object().ok_or_else(|| invalid("must be an object"))?;
    let render = object
        .get("renderDimensions")
        .and_then(parse_size)
        .ok_or_else(|| invalid("needs numeric renderDimensions.width/height"))?;
    let original = object.get("originalDimensions").and_then(parse_size);
    Ok(BackgroundDimensions {
        original_dimensions: original,
        render_dimensions: render,
    })
}

fn parse_sprite(index: usize, value: &Value) -> Result<SpriteTemplateEntry, TemplateError> {
    let invalid = |reason: &str| TemplateError::InvalidSprite {
        index,
        reason: reason.to_string(),
    };
    let object = value.as_object().ok_or_else(|| invalid("must be an object"))?;
    let src = match object.get("src").and_then(Value::as_str) {
        Some(src) if !src.trim().is_empty() => src.to_string(),
        _ => return Err(invalid("`src` must be a non-empty string")),
    };
    let id = match object.get("id") {
        Some(Value::String(id)) if !id.trim().is_empty() => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => format!("sprite-{index}"),
    };

    let render_coordinates = match object.get("renderCoordinates") {
        Some(coords) => {
            parse_point(coords).ok_or_else(|| invalid("`renderCoordinates` needs numeric x and y"))?
        }
        None => {
            let x = object.get("x").and_then(finite_number);
            let y = object.get("y").and_then(finite_number);
            match (x, y) {
                (Some(x), Some(y)) => Point::new(x, y),
                _ => return Err(invalid("needs numeric `x` and `y`")),
            }
        }
    };

    let render_dimensions = match object.get("renderDimensions") {
        Some(dims) => Some(
            parse_size(dims).ok_or_else(|| invalid("`renderDimensions` needs positive width and height"))?,
        ),
        None => match (object.get("width"), object.get("height")) {
            (None, None) => None,
            (width, height) => {
                let width = width.and_then(finite_number).filter(|v| *v > 0.0);
                let height = height.and_then(finite_number).filter(|v| *v > 0.0);
                match (width, height) {
                    (Some(width), Some(height)) => Some(Size::new(width, height)),
                    _ => return Err(invalid("`width` and `height` must be positive numbers")),
                }
            }
        },
    };

    Ok(SpriteTemplateEntry {
        id,
        src,
        render_coordinates,
        render_dimensions,
    })
}

fn finite_number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|number| number.is_finite())
}

fn parse_point(value: &Value) -> Option<Point> {
    let x = value.get("x").and_then(finite_number)?;
    let y = value.get("y").and_then(finite_number)?;
    Some(Point::new(x, y))
}

fn parse_size(value: &Value) -> Option<Size> {
    let width = value.get("width").and_then(finite_number)?;
    let height = value.get("height").and_then(finite_number)?;
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    Some(Size::new(width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_shape_is_accepted() {
        let raw = r#"{"name": "park", "background": "park.jpg",
            "sprites": [{"src": "cat.png", "x": 10, "y": 20}, {"src": "dog.png", "x": 5.5, "y": 0, "width": 40, "height": 30}]}"#;
        let template = Template::from_json(raw).expect("template");
        assert_eq!(template.sprites[0].id, "sprite-0");
        assert_eq!(template.sprites[0].render_coordinates, Point::new(10.0, 20.0));
        assert_eq!(template.sprites[0].render_dimensions, None);
        assert_eq!(template.sprites[1].render_dimensions, Some(Size::new(40.0, 30.0)));
        assert!(template.render_size().is_none());
    }

    #[test]
    fn current_shape_round_trips_through_json() {
        let raw = r#"{"name": "park", "background": "park.jpg",
            "backgroundDimensions": {"originalDimensions": {"width": 800, "height": 1200},
                                     "renderDimensions": {"width": 400, "height": 600}},
            "sprites": [{"id": "a", "src": "cat.png",
                         "renderCoordinates": {"x": 100, "y": 150},
                         "renderDimensions": {"width": 80, "height": 60}}]}"#;
        let template = Template::from_json(raw).expect("template");
        let written = template.to_json_pretty().expect("json");
        assert!(written.contains("renderCoordinates"));
        let reread = Template::from_json(&written).expect("reread");
        assert_eq!(reread, template);
    }

    #[test]
    fn missing_name_is_rejected() {
        let err = Template::from_json(r#"{"background": "a.jpg", "sprites": []}"#).unwrap_err();
        assert!(matches!(err, TemplateError::MissingField("name")));
    }

    #[test]
    fn malformed_coordinates_name_the_sprite() {
        let raw = r#"{"name": "n", "background": "b.jpg",
            "sprites": [{"src": "a.png", "x": 1, "y": 2}, {"src": "b.png", "x": "left", "y": 2}]}"#;
        let err = Template::from_json(raw).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidSprite { index: 1, .. }));
        assert!(err.to_string().starts_with("sprite 1:"));
    }

    #[test]
    fn duplicate_ids_are_made_unique() {
        let raw = r#"{"name": "n", "background": "b.jpg",
            "sprites": [{"id": "cat", "src": "a.png", "x": 1, "y": 2}, {"id": "cat", "src": "a.png", "x": 3, "y": 4}]}"#;
        let template = Template::from_json(raw).expect("template");
        assert_eq!(template.sprites[0].id, "cat");
        assert_eq!(template.sprites[1].id, "cat-1");
    }
}
