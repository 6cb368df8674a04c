use crate::geometry::{Point, Rect, Size};
use crate::rng::RandomSource;

pub const COLLISION_BUFFER_DEFAULT: f64 = 5.0;
pub const MAX_PLACEMENT_ATTEMPTS_DEFAULT: u32 = 50;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CandidatePosition {
    pub x: f64,
    pub y: f64,
    pub attempts: u32,
    /// False when every sample collided and the last one was kept anyway.
    pub collision_free: bool,
}

impl CandidatePosition {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Collision bookkeeping for one board. All rects share one coordinate
/// space, chosen by the caller.
#[derive(Clone, Debug)]
pub struct CollisionDetector {
    placed: Vec<Rect>,
    sprite_size: Size,
    buffer: f64,
}

impl CollisionDetector {
    pub fn new(placed: Vec<Rect>, sprite_size: Size, buffer: f64) -> Self {
        Self {
            placed,
            sprite_size,
            buffer,
        }
    }

    pub fn with_defaults(sprite_size: Size) -> Self {
        Self::new(Vec::new(), sprite_size, COLLISION_BUFFER_DEFAULT)
    }

    pub fn sprite_size(&self) -> Size {
        self.sprite_size
    }

    pub fn set_sprite_size(&mut self, size: Size) {
        self.sprite_size = size;
    }

    pub fn buffer(&self) -> f64 {
        self.buffer
    }

    pub fn placed(&self) -> &[Rect] {
        &self.placed
    }

    pub fn clear(&mut self) {
        self.placed.clear();
    }

    pub fn has_collision(&self, x: f64, y: f64) -> bool {
        let width = self.sprite_size.width;
        let height = self.sprite_size.height;
        self.placed.iter().any(|existing| {
            !(x + width < existing.x - self.buffer
                || x > existing.right() + self.buffer
                || y + height < existing.y - self.buffer
                || y > existing.bottom() + self.buffer)
        })
    }

    /// Samples up to `max_attempts` positions that keep the sprite inside
    /// the area and returns the first free one. When all samples collide
    /// the last sample is returned; placement never fails.
    pub fn find_non_colliding_position<R: RandomSource>(
        &self,
        area: &Rect,
        max_attempts: u32,
        rng: &mut R,
    ) -> CandidatePosition {
        let span_x = (area.width - self.sprite_size.width).max(1.0);
        let span_y = (area.height - self.sprite_size.height).max(1.0);
        let attempts = max_attempts.max(1);
        let mut last = CandidatePosition {
            x: area.x,
            y: area.y,
            attempts: 0,
            collision_free: false,
        };
        for attempt in 1..=attempts {
            let x = area.x + (rng.next_unit() * span_x).floor();
            let y = area.y + (rng.next_unit() * span_y).floor();
            last = CandidatePosition {
                x,
                y,
                attempts: attempt,
                collision_free: false,
            };
            if !self.has_collision(x, y) {
                last.collision_free = true;
                return last;
            }
        }
        last
    }

    pub fn add_position(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.placed.push(Rect::new(x, y, width, height));
    }

    pub fn add_rect(&mut self, rect: Rect) {
        self.placed.push(rect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeededRng;

    fn detector_with_one() -> CollisionDetector {
        let mut detector = CollisionDetector::with_defaults(Size::new(80.0, 80.0));
        detector.add_position(10.0, 10.0, 80.0, 80.0);
        detector
    }

    #[test]
    fn overlapping_candidate_collides() {
        let detector = detector_with_one();
        assert!(detector.has_collision(15.0, 15.0));
        assert!(!detector.has_collision(200.0, 200.0));
    }

    #[test]
    fn buffer_extends_existing_rects() {
        let detector = detector_with_one();
        // Right edge at 90, buffer reaches 95.
        assert!(detector.has_collision(94.0, 10.0));
        assert!(!detector.has_collision(96.0, 10.0));
    }

    #[test]
    fn free_slot_is_found_inside_area() {
        let detector = detector_with_one();
        let mut rng = SeededRng::new(3);
        let area = Rect::new(0.0, 0.0, 600.0, 600.0);
        let found = detector.find_non_colliding_position(&area, 50, &mut rng);
        assert!(found.collision_free);
        assert!(!detector.has_collision(found.x, found.y));
        assert!(found.x >= 0.0 && found.x + 80.0 <= 600.0);
        assert!(found.y >= 0.0 && found.y + 80.0 <= 600.0);
    }

    #[test]
    fn crowded_area_keeps_last_sample() {
        let mut detector = CollisionDetector::with_defaults(Size::new(80.0, 80.0));
        detector.add_position(0.0, 0.0, 100.0, 100.0);
        let mut rng = SeededRng::new(11);
        let area = Rect::new(0.0, 0.0, 100.0, 100.0);
        let found = detector.find_non_colliding_position(&area, 5, &mut rng);
        assert!(!found.collision_free);
        assert_eq!(found.attempts, 5);
    }

    #[test]
    fn degenerate_area_clamps_span() {
        let detector = CollisionDetector::with_defaults(Size::new(80.0, 80.0));
        let mut rng = SeededRng::new(5);
        let area = Rect::new(30.0, 40.0, 20.0, 20.0);
        let found = detector.find_non_colliding_position(&area, 10, &mut rng);
        assert_eq!((found.x, found.y), (30.0, 40.0));
    }
}
