use std::collections::HashSet;

use crate::board::{Board, Side};
use crate::geometry::Point;
use crate::rng::RandomSource;
use crate::rules::GameRules;

pub const MATCH_THRESHOLD_DEFAULT: f64 = 30.0;
pub const MAX_DIFFERENCES_DEFAULT: u32 = 7;
pub const MIN_DIFFERENCES_DEFAULT: u32 = 3;
pub const DIFFERENCE_RATIO_DEFAULT: f64 = 0.2;

/// A sprite left out of one side. The center is background-relative.
#[derive(Clone, Debug, PartialEq)]
pub struct Difference {
    pub id: String,
    pub center_x: f64,
    pub center_y: f64,
    pub side: Side,
}

impl Difference {
    pub fn center(&self) -> Point {
        Point::new(self.center_x, self.center_y)
    }
}

/// Inclusive `(min, max)` number of differences for a board of
/// `sprite_count` sprites.
pub fn difference_count_bounds(sprite_count: usize, rules: &GameRules) -> (u32, u32) {
    let by_ratio = (sprite_count as f64 * rules.difference_ratio).floor().max(0.0) as u32;
    let max = rules.max_differences.min(by_ratio);
    let min = rules.min_differences.min(max);
    (min, max)
}

/// Picks sprites to omit from `right` and removes them. The choice depends
/// only on the RNG state and the board's sprite order.
pub fn generate_differences<R: RandomSource>(
    right: &mut Board,
    rng: &mut R,
    rules: &GameRules,
) -> Vec<Difference> {
    let (min, max) = difference_count_bounds(right.len(), rules);
    let count = rng.next_int(min as i64, max as i64).max(0) as usize;

    let mut shuffled = right.sprites.clone();
    rng.shuffle(&mut shuffled);

    let mut differences = Vec::with_capacity(count);
    for sprite in shuffled.into_iter().take(count) {
        let center = sprite.center();
        differences.push(Difference {
            id: sprite.id.clone(),
            center_x: center.x,
            center_y: center.y,
            side: right.side,
        });
        right.remove(&sprite.id);
    }
    differences
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FoundSet {
    ids: HashSet<String>,
}

impl FoundSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// True the first time an id is inserted.
    pub fn insert(&mut self, id: &str) -> bool {
        self.ids.insert(id.to_string())
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.ids.remove(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

/// Returns the first unfound difference (in creation order) whose center is
/// within `threshold` of the click, and marks it found.
pub fn try_match<'a>(
    click: Point,
    differences: &'a [Difference],
    found: &mut FoundSet,
    threshold: f64,
) -> Option<&'a Difference> {
    let hit = differences.iter().find(|difference| {
        !found.contains(&difference.id) && click.distance_to(difference.center()) <= threshold
    })?;
    found.insert(&hit.id);
    Some(hit)
}

pub fn all_found(differences: &[Difference], found: &FoundSet) -> bool {
    differences
        .iter()
        .all(|difference| found.contains(&difference.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn difference(id: &str, x: f64, y: f64) -> Difference {
        Difference {
            id: id.to_string(),
            center_x: x,
            center_y: y,
            side: Side::Right,
        }
    }

    #[test]
    fn bounds_follow_ratio_and_caps() {
        let rules = GameRules::default();
        assert_eq!(difference_count_bounds(4, &rules), (0, 0));
        assert_eq!(difference_count_bounds(10, &rules), (2, 2));
        assert_eq!(difference_count_bounds(20, &rules), (3, 4));
        assert_eq!(difference_count_bounds(100, &rules), (3, 7));
    }

    #[test]
    fn first_match_in_creation_order_wins() {
        let differences = vec![difference("a", 100.0, 100.0), difference("b", 110.0, 100.0)];
        let mut found = FoundSet::new();
        let hit = try_match(Point::new(108.0, 100.0), &differences, &mut found, 30.0);
        assert_eq!(hit.map(|d| d.id.as_str()), Some("a"));
        let next = try_match(Point::new(108.0, 100.0), &differences, &mut found, 30.0);
        assert_eq!(next.map(|d| d.id.as_str()), Some("b"));
        assert!(try_match(Point::new(108.0, 100.0), &differences, &mut found, 30.0).is_none());
    }

    #[test]
    fn clicks_outside_threshold_miss() {
        let differences = vec![difference("a", 0.0, 0.0)];
        let mut found = FoundSet::new();
        assert!(try_match(Point::new(30.0, 0.1), &differences, &mut found, 30.0).is_none());
        assert!(try_match(Point::new(30.0, 0.0), &differences, &mut found, 30.0).is_some());
        assert!(all_found(&differences, &found));
    }
}
