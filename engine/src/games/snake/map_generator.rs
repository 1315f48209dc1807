use std::collections::HashSet;

use crate::{GameError, log};
use crate::games::SessionRng;
use super::grid::Grid;
use super::types::{Direction, Point};

/// Rejected draws allowed per cell before falling back to enumerating the
/// free cells.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 10_000;

/// Fixed cell the maze carve starts from. Always a corridor.
pub const MAZE_START: Point = Point::new(1, 1);

#[derive(Clone, Copy, Debug)]
pub struct MapGenerator {
    grid: Grid,
}

impl MapGenerator {
    pub fn new(grid: Grid) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn place_obstacles(
        &self,
        rng: &mut SessionRng,
        occupied: &HashSet<Point>,
        count: usize,
    ) -> Result<HashSet<Point>, GameError> {
        let cells = self.sample_free_cells(rng, occupied, count)?;
        Ok(cells.into_iter().collect())
    }

    pub fn place_portals(
        &self,
        rng: &mut SessionRng,
        occupied: &HashSet<Point>,
    ) -> Result<(Point, Point), GameError> {
        let cells = self.sample_free_cells(rng, occupied, 2)?;
        Ok((cells[0], cells[1]))
    }

    pub fn place_food(&self, rng: &mut SessionRng, occupied: &HashSet<Point>) -> Result<Point, GameError> {
        let cells = self.sample_free_cells(rng, occupied, 1)?;
        Ok(cells[0])
    }

    /// Carves a perfect maze with randomized depth-first backtracking over
    /// odd-indexed cells and returns the wall cells. The open cells form a
    /// tree that contains [`MAZE_START`].
    pub fn generate_maze(&self, rng: &mut SessionRng) -> Result<HashSet<Point>, GameError> {
        if self.grid.width() < 3 || self.grid.height() < 3 {
            return Err(GameError::config(format!(
                "maze needs at least a 3x3 grid, got {}x{}",
                self.grid.width(),
                self.grid.height()
            )));
        }

        let mut open = HashSet::new();
        open.insert(MAZE_START);
        let mut stack = vec![MAZE_START];

        while let Some(&current) = stack.last() {
            let candidates: Vec<(Point, Point)> = Direction::ALL
                .iter()
                .filter_map(|direction| {
                    let between = current.step(*direction);
                    let next = between.step(*direction);
                    (self.is_interior(next) && !open.contains(&next)).then_some((between, next))
                })
                .collect();

            match rng.pick(&candidates) {
                Some((between, next)) => {
                    open.insert(between);
                    open.insert(next);
                    stack.push(next);
                }
                None => {
                    stack.pop();
                }
            }
        }

        Ok(self.grid.cells().filter(|cell| !open.contains(cell)).collect())
    }

    fn is_interior(&self, point: Point) -> bool {
        (1..self.grid.width() - 1).contains(&point.x) && (1..self.grid.height() - 1).contains(&point.y)
    }

    fn sample_free_cells(
        &self,
        rng: &mut SessionRng,
        occupied: &HashSet<Point>,
        count: usize,
    ) -> Result<Vec<Point>, GameError> {
        let available = self.grid.cells().filter(|cell| !occupied.contains(cell)).count();
        if count > available {
            return Err(GameError::PlacementExhausted { requested: count, available });
        }

        let mut chosen: Vec<Point> = Vec::with_capacity(count);

        while chosen.len() < count {
            let sampled = (0..MAX_PLACEMENT_ATTEMPTS).find_map(|_| {
                let candidate = Point::new(
                    rng.random_range(0..self.grid.width()),
                    rng.random_range(0..self.grid.height()),
                );
                (!occupied.contains(&candidate) && !chosen.contains(&candidate)).then_some(candidate)
            });

            let cell = match sampled {
                Some(cell) => cell,
                None => {
                    log!(
                        "Rejection sampling gave up after {} attempts, enumerating free cells",
                        MAX_PLACEMENT_ATTEMPTS
                    );
                    let free: Vec<Point> = self
                        .grid
                        .cells()
                        .filter(|cell| !occupied.contains(cell) && !chosen.contains(cell))
                        .collect();
                    rng.pick(&free).ok_or(GameError::PlacementExhausted {
                        requested: count,
                        available: chosen.len(),
                    })?
                }
            };
            chosen.push(cell);
        }

        Ok(chosen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    fn generator(width: i32, height: i32) -> MapGenerator {
        MapGenerator::new(Grid::new(width, height).unwrap())
    }

    fn open_cells(grid: Grid, walls: &HashSet<Point>) -> HashSet<Point> {
        grid.cells().filter(|c| !walls.contains(c)).collect()
    }

    fn reachable_from(start: Point, open: &HashSet<Point>) -> HashSet<Point> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        seen.insert(start);
        queue.push_back(start);
        while let Some(cell) = queue.pop_front() {
            for direction in Direction::ALL {
                let next = cell.step(direction);
                if open.contains(&next) && seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    #[test]
    fn test_maze_is_connected_from_start() {
        for seed in 0..20 {
            let generator = generator(20, 20);
            let mut rng = SessionRng::new(seed);
            let walls = generator.generate_maze(&mut rng).unwrap();
            let open = open_cells(generator.grid(), &walls);

            assert!(open.contains(&MAZE_START));
            assert_eq!(reachable_from(MAZE_START, &open), open, "seed {}", seed);
        }
    }

    #[test]
    fn test_maze_has_no_cycles() {
        let generator = generator(21, 15);
        let mut rng = SessionRng::new(99);
        let walls = generator.generate_maze(&mut rng).unwrap();
        let open = open_cells(generator.grid(), &walls);

        let edges = open
            .iter()
            .flat_map(|cell| [cell.step(Direction::Right), cell.step(Direction::Down)])
            .filter(|neighbor| open.contains(neighbor))
            .count();
        assert_eq!(edges, open.len() - 1);
    }

    #[test]
    fn test_maze_visits_every_odd_interior_cell() {
        let generator = generator(11, 11);
        let mut rng = SessionRng::new(5);
        let walls = generator.generate_maze(&mut rng).unwrap();

        for y in (1..10).step_by(2) {
            for x in (1..10).step_by(2) {
                assert!(!walls.contains(&Point::new(x, y)));
            }
        }
        for x in 0..11 {
            assert!(walls.contains(&Point::new(x, 0)));
            assert!(walls.contains(&Point::new(x, 10)));
        }
    }

    #[test]
    fn test_maze_rejects_tiny_grid() {
        let mut rng = SessionRng::new(1);
        assert!(generator(2, 10).generate_maze(&mut rng).unwrap_err().is_configuration_error());
    }

    #[test]
    fn test_obstacles_avoid_occupied_cells() {
        let generator = generator(10, 10);
        let mut rng = SessionRng::new(11);
        let occupied: HashSet<Point> = (0..10).map(|x| Point::new(x, 0)).collect();

        let obstacles = generator.place_obstacles(&mut rng, &occupied, 30).unwrap();
        assert_eq!(obstacles.len(), 30);
        assert!(obstacles.is_disjoint(&occupied));
        assert!(obstacles.iter().all(|p| generator.grid().contains(*p)));
    }

    #[test]
    fn test_portals_are_distinct_and_free() {
        let generator = generator(5, 5);
        let mut rng = SessionRng::new(2);
        let occupied: HashSet<Point> = generator.grid().cells().skip(2).collect();

        let (a, b) = generator.place_portals(&mut rng, &occupied).unwrap();
        assert_ne!(a, b);
        assert!(!occupied.contains(&a));
        assert!(!occupied.contains(&b));
    }

    #[test]
    fn test_food_finds_the_last_free_cell() {
        let generator = generator(4, 4);
        let mut rng = SessionRng::new(8);
        let free = Point::new(2, 3);
        let occupied: HashSet<Point> = generator.grid().cells().filter(|c| *c != free).collect();

        assert_eq!(generator.place_food(&mut rng, &occupied).unwrap(), free);
    }

    #[test]
    fn test_too_many_cells_is_placement_exhausted() {
        let generator = generator(3, 3);
        let mut rng = SessionRng::new(4);
        let occupied: HashSet<Point> = [Point::new(0, 0)].into_iter().collect();

        let error = generator.place_obstacles(&mut rng, &occupied, 9).unwrap_err();
        assert!(matches!(error, GameError::PlacementExhausted { requested: 9, available: 8 }));
        assert!(error.is_configuration_error());
    }
}
