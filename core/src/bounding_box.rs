use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect, Size};

pub const MIN_BOX_SIZE: f64 = 10.0;

#[derive(Debug, thiserror::Error)]
pub enum BoundingBoxError {
    #[error("invalid bounding box json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("box {index}: {reason}")]
    InvalidBox { index: usize, reason: String },
    #[error("box {index}: duplicate id `{id}`")]
    DuplicateId { index: usize, id: BoxId },
}

/// Box ids are strings when drawn in this session; imported files may
/// carry numbers, which are kept as-is so exports round-trip.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoxId {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoxId::Number(value) => value.fmt(f),
            BoxId::Text(value) => value.fmt(f),
        }
    }
}

/// Placement region, background-relative.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub id: BoxId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    fn check(&self, index: usize) -> Result<(), BoundingBoxError> {
        let invalid = |reason: &str| BoundingBoxError::InvalidBox {
            index,
            reason: reason.to_string(),
        };
        if ![self.x, self.y, self.width, self.height]
            .iter()
            .all(|value| value.is_finite())
        {
            return Err(invalid("coordinates must be finite numbers"));
        }
        if self.width < 0.0 || self.height < 0.0 {
            return Err(invalid("width and height must not be negative"));
        }
        Ok(())
    }
}

/// Boxes drawn during one Edit Mode session.
#[derive(Clone, Debug, Default)]
pub struct BoundingBoxSet {
    boxes: Vec<BoundingBox>,
    next_id: u64,
    draw_start: Option<Point>,
    bounds: Option<Size>,
}

impl BoundingBoxSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits drawn boxes to a background of `size`.
    pub fn set_bounds(&mut self, size: Option<Size>) {
        self.bounds = size;
    }

    pub fn boxes(&self) -> &[BoundingBox] {
        &self.boxes
    }

    pub fn rects(&self) -> Vec<Rect> {
        self.boxes.iter().map(BoundingBox::rect).collect()
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn is_drawing(&self) -> bool {
        self.draw_start.is_some()
    }

    pub fn begin_draw(&mut self, start: Point) {
        self.draw_start = Some(self.clamp(start));
    }

    /// Preview of the box being drawn.
    pub fn update_draw(&self, current: Point) -> Option<Rect> {
        let start = self.draw_start?;
        Some(Rect::from_corners(start, self.clamp(current)))
    }

    /// Finishes the drag. Boxes smaller than [`MIN_BOX_SIZE`] on either axis
    /// are discarded.
    pub fn commit_draw(&mut self, end: Point) -> Option<&BoundingBox> {
        let start = self.draw_start.take()?;
        let rect = Rect::from_corners(start, self.clamp(end));
        if rect.width < MIN_BOX_SIZE || rect.height < MIN_BOX_SIZE {
            return None;
        }
        let id = self.allocate_id();
        self.boxes.push(BoundingBox {
            id,
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        });
        self.boxes.last()
    }

    pub fn cancel_draw(&mut self) {
        self.draw_start = None;
    }

    pub fn remove(&mut self, id: &BoxId) -> bool {
        let before = self.boxes.len();
        self.boxes.retain(|entry| &entry.id != id);
        self.boxes.len() != before
    }

    pub fn clear(&mut self) {
        self.boxes.clear();
        self.draw_start = None;
    }

    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.boxes)
    }

    /// Replaces every box with the parsed list. Nothing changes on error.
    pub fn import_json(&mut self, raw: &str) -> Result<usize, BoundingBoxError> {
        let boxes = parse_boxes(raw)?;
        self.boxes = boxes;
        self.draw_start = None;
        self.next_id = self.next_id.max(self.boxes.len() as u64);
        Ok(self.boxes.len())
    }

    fn allocate_id(&mut self) -> BoxId {
        loop {
            self.next_id += 1;
            let candidate = BoxId::Text(format!("box-{}", self.next_id));
            if !self.boxes.iter().any(|entry| entry.id == candidate) {
                return candidate;
            }
        }
    }

    fn clamp(&self, point: Point) -> Point {
        match self.bounds {
            Some(size) => Point::new(
                point.x.clamp(0.0, size.width.max(0.0)),
                point.y.clamp(0.0, size.height.max(0.0)),
            ),
            None => point,
        }
    }
}

pub fn parse_boxes(raw: &str) -> Result<Vec<BoundingBox>, BoundingBoxError> {
    let boxes: Vec<BoundingBox> = serde_json::from_str(raw)?;
    for (index, entry) in boxes.iter().enumerate() {
        entry.check(index)?;
        if boxes[..index].iter().any(|other| other.id == entry.id) {
            return Err(BoundingBoxError::DuplicateId {
                index,
                id: entry.id.clone(),
            });
        }
    }
    Ok(boxes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_then_import_is_exact() {
        let raw = r#"[{"id": 1700000000123, "x": 10.5, "y": 20.25, "width": 100, "height": 80.125},
                      {"id": "box-2", "x": 0, "y": 0, "width": 0, "height": 12}]"#;
        let mut set = BoundingBoxSet::new();
        assert_eq!(set.import_json(raw).expect("import"), 2);
        let exported = set.export_json().expect("export");
        let mut other = BoundingBoxSet::new();
        other.import_json(&exported).expect("reimport");
        assert_eq!(other.boxes(), set.boxes());
        assert!(exported.contains("1700000000123"));
    }

    #[test]
    fn bad_import_leaves_boxes_untouched() {
        let mut set = BoundingBoxSet::new();
        set.begin_draw(Point::new(0.0, 0.0));
        set.commit_draw(Point::new(50.0, 50.0));
        let err = set
            .import_json(r#"[{"id": "a", "x": 0, "y": 0, "width": -4, "height": 2}]"#)
            .unwrap_err();
        assert!(matches!(err, BoundingBoxError::InvalidBox { index: 0, .. }));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn tiny_drags_are_discarded_and_ids_stay_unique() {
        let mut set = BoundingBoxSet::new();
        set.set_bounds(Some(Size::new(200.0, 200.0)));
        set.begin_draw(Point::new(5.0, 5.0));
        assert!(set.commit_draw(Point::new(8.0, 40.0)).is_none());
        set.begin_draw(Point::new(150.0, 150.0));
        let first = set.commit_draw(Point::new(260.0, 90.0)).cloned().expect("box");
        assert_eq!(first.rect(), Rect::new(150.0, 90.0, 50.0, 60.0));
        set.begin_draw(Point::new(0.0, 0.0));
        let second = set.commit_draw(Point::new(20.0, 20.0)).cloned().expect("box");
        assert_ne!(first.id, second.id);
        assert!(set.remove(&first.id));
        assert_eq!(set.len(), 1);
    }
}
