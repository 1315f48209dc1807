use std::collections::HashSet;

use crate::GameError;
use super::types::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Result<Self, GameError> {
        if width <= 0 || height <= 0 {
            return Err(GameError::config(format!(
                "grid dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn contains(&self, point: Point) -> bool {
        (0..self.width).contains(&point.x) && (0..self.height).contains(&point.y)
    }

    pub fn collides(&self, point: Point, occupied: &HashSet<Point>) -> bool {
        occupied.contains(&point)
    }

    /// Folds any coordinate back onto the grid, toroidally.
    pub fn wrap(&self, point: Point) -> Point {
        Point::new(point.x.rem_euclid(self.width), point.y.rem_euclid(self.height))
    }

    /// Row-major iteration over every cell.
    pub fn cells(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Point::new(x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive_dimensions() {
        assert!(Grid::new(0, 10).unwrap_err().is_configuration_error());
        assert!(Grid::new(10, -3).is_err());
        assert!(Grid::new(1, 1).is_ok());
    }

    #[test]
    fn test_bounds() {
        let grid = Grid::new(20, 10).unwrap();
        assert!(grid.contains(Point::new(0, 0)));
        assert!(grid.contains(Point::new(19, 9)));
        assert!(!grid.contains(Point::new(20, 5)));
        assert!(!grid.contains(Point::new(5, 10)));
        assert!(!grid.contains(Point::new(-1, 0)));
    }

    #[test]
    fn test_wrap() {
        let grid = Grid::new(20, 20).unwrap();
        assert_eq!(grid.wrap(Point::new(20, 5)), Point::new(0, 5));
        assert_eq!(grid.wrap(Point::new(-1, 5)), Point::new(19, 5));
        assert_eq!(grid.wrap(Point::new(3, -1)), Point::new(3, 19));
        assert_eq!(grid.wrap(Point::new(7, 7)), Point::new(7, 7));
    }

    #[test]
    fn test_collides_and_cells() {
        let grid = Grid::new(3, 2).unwrap();
        let occupied: HashSet<Point> = [Point::new(1, 1)].into_iter().collect();
        assert!(grid.collides(Point::new(1, 1), &occupied));
        assert!(!grid.collides(Point::new(0, 1), &occupied));
        assert_eq!(grid.cells().count(), grid.cell_count());
        assert_eq!(grid.cells().last(), Some(Point::new(2, 1)));
    }
}
