use std::collections::{HashMap, VecDeque};

use super::types::Point;

/// Snake body, head first. `occupancy` counts segments per cell so that a
/// shielded snake passing through itself keeps exact lookups.
#[derive(Clone, Debug)]
pub struct Snake {
    body: VecDeque<Point>,
    occupancy: HashMap<Point, u32>,
}

impl Snake {
    pub fn new(start_pos: Point) -> Self {
        Self::from_segments(&[start_pos])
    }

    /// Builds a snake from head-first segments. Panics on an empty slice.
    pub fn from_segments(segments: &[Point]) -> Self {
        assert!(!segments.is_empty(), "Snake body should never be empty");

        let mut snake = Self {
            body: VecDeque::with_capacity(segments.len()),
            occupancy: HashMap::new(),
        };
        for &segment in segments {
            snake.body.push_back(segment);
            *snake.occupancy.entry(segment).or_insert(0) += 1;
        }
        snake
    }

    pub fn head(&self) -> Point {
        self.body[0]
    }

    pub fn tail(&self) -> Point {
        self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn contains(&self, point: &Point) -> bool {
        self.occupancy.contains_key(point)
    }

    pub fn segments(&self) -> impl Iterator<Item = &Point> {
        self.body.iter()
    }

    pub fn has_overlap(&self) -> bool {
        self.occupancy.len() != self.body.len()
    }

    pub fn push_head(&mut self, point: Point) {
        self.body.push_front(point);
        *self.occupancy.entry(point).or_insert(0) += 1;
    }

    /// Removes the tail segment, never the last remaining one.
    pub fn pop_tail(&mut self) -> Option<Point> {
        if self.body.len() <= 1 {
            return None;
        }
        let tail = self.body.pop_back()?;
        self.release(tail);
        Some(tail)
    }

    /// Moves only the head segment, leaving the rest of the body in place.
    pub fn relocate_head(&mut self, point: Point) {
        let old_head = self.body[0];
        self.release(old_head);
        self.body[0] = point;
        *self.occupancy.entry(point).or_insert(0) += 1;
    }

    fn release(&mut self, point: Point) {
        if let Some(count) = self.occupancy.get_mut(&point) {
            *count -= 1;
            if *count == 0 {
                self.occupancy.remove(&point);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_pop_keep_occupancy() {
        let mut snake = Snake::new(Point::new(5, 5));
        snake.push_head(Point::new(6, 5));
        assert_eq!(snake.len(), 2);
        assert_eq!(snake.head(), Point::new(6, 5));
        assert_eq!(snake.tail(), Point::new(5, 5));

        assert_eq!(snake.pop_tail(), Some(Point::new(5, 5)));
        assert!(!snake.contains(&Point::new(5, 5)));
        assert!(snake.contains(&Point::new(6, 5)));
    }

    #[test]
    fn test_never_pops_last_segment() {
        let mut snake = Snake::new(Point::new(1, 1));
        assert_eq!(snake.pop_tail(), None);
        assert_eq!(snake.len(), 1);
    }

    #[test]
    fn test_overlap_is_counted() {
        let mut snake = Snake::from_segments(&[Point::new(2, 1), Point::new(1, 1), Point::new(1, 2)]);
        assert!(!snake.has_overlap());
        snake.push_head(Point::new(1, 2));
        assert!(snake.has_overlap());

        snake.pop_tail();
        assert!(snake.contains(&Point::new(1, 2)));
        assert!(!snake.has_overlap());
    }

    #[test]
    fn test_relocate_head() {
        let mut snake = Snake::from_segments(&[Point::new(3, 3), Point::new(2, 3)]);
        snake.relocate_head(Point::new(10, 10));
        assert_eq!(snake.head(), Point::new(10, 10));
        assert!(!snake.contains(&Point::new(3, 3)));
        assert_eq!(snake.tail(), Point::new(2, 3));
    }
}
