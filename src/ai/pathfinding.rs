//! A* pathfinding on a ground grid
//!
//! The battlefield is a grid of walkable/blocked cells on the XZ plane.
//! Movement is 8-directional; diagonal steps may not cut blocked corners.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use glam::{Vec2, Vec3};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Waypoints of a computed path
pub type Waypoints = SmallVec<[Vec3; 16]>;

/// Cell coordinates in a [`Grid`]
pub type Cell = (usize, usize);

const STRAIGHT_COST: f32 = 1.0;
const DIAGONAL_COST: f32 = std::f32::consts::SQRT_2;

/// A walkability grid on the ground plane
#[derive(Debug, Clone)]
pub struct Grid {
    /// Width in cells (along X)
    pub width: usize,
    /// Depth in cells (along Z)
    pub depth: usize,
    /// Cell size in world units
    pub cell_size: f32,
    /// World position (x, z) of the grid's corner
    pub origin: Vec2,
    /// Walkable cells, row-major by z
    cells: Vec<bool>,
}

impl Grid {
    /// Create a fully walkable grid
    #[must_use]
    pub fn new(width: usize, depth: usize, cell_size: f32) -> Self {
        Self {
            width,
            depth,
            cell_size,
            origin: Vec2::ZERO,
            cells: vec![true; width * depth],
        }
    }

    /// Place the grid's corner at a world (x, z) position
    #[must_use]
    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Mark a cell blocked or walkable; out-of-range cells are ignored
    pub fn set_walkable(&mut self, (x, z): Cell, walkable: bool) {
        if x < self.width && z < self.depth {
            self.cells[z * self.width + x] = walkable;
        }
    }

    /// Whether a cell exists and is walkable
    #[must_use]
    pub fn is_walkable(&self, (x, z): Cell) -> bool {
        x < self.width && z < self.depth && self.cells[z * self.width + x]
    }

    /// Cell containing a world position, if it lies on the grid
    #[must_use]
    pub fn cell_at(&self, position: Vec3) -> Option<Cell> {
        let local = (Vec2::new(position.x, position.z) - self.origin) / self.cell_size;
        if local.x < 0.0 || local.y < 0.0 {
            return None;
        }
        let cell = (local.x.floor() as usize, local.y.floor() as usize);
        (cell.0 < self.width && cell.1 < self.depth).then_some(cell)
    }

    /// World position of a cell's center (y = 0)
    #[must_use]
    pub fn cell_center(&self, (x, z): Cell) -> Vec3 {
        let center = self.origin + (Vec2::new(x as f32, z as f32) + 0.5) * self.cell_size;
        Vec3::new(center.x, 0.0, center.y)
    }

    /// Walkable neighbors and their step costs
    fn neighbors(&self, (x, z): Cell) -> SmallVec<[(Cell, f32); 8]> {
        let mut result = SmallVec::new();

        for dz in -1i64..=1 {
            for dx in -1i64..=1 {
                if dx == 0 && dz == 0 {
                    continue;
                }
                let nx = x as i64 + dx;
                let nz = z as i64 + dz;
                if nx < 0 || nz < 0 {
                    continue;
                }
                let next = (nx as usize, nz as usize);
                if !self.is_walkable(next) {
                    continue;
                }

                let diagonal = dx != 0 && dz != 0;
                if diagonal
                    && !(self.is_walkable((next.0, z)) && self.is_walkable((x, next.1)))
                {
                    continue;
                }

                let cost = if diagonal { DIAGONAL_COST } else { STRAIGHT_COST };
                result.push((next, cost));
            }
        }

        result
    }
}

/// Open-set entry, ordered as a min-heap on `f_cost`
#[derive(Debug, Clone, Copy)]
struct Node {
    cell: Cell,
    f_cost: f32,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.cell == other.cell
    }
}

impl Eq for Node {}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_cost
            .partial_cmp(&self.f_cost)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Octile distance between two cells
fn heuristic(a: Cell, b: Cell) -> f32 {
    let dx = a.0.abs_diff(b.0) as f32;
    let dz = a.1.abs_diff(b.1) as f32;
    let (low, high) = if dx < dz { (dx, dz) } else { (dz, dx) };
    high * STRAIGHT_COST + low * (DIAGONAL_COST - STRAIGHT_COST)
}

/// Find a path of world-space waypoints from `start` to `goal`.
///
/// The returned waypoints exclude the start and end exactly at `goal`.
/// Returns `None` if either end is off-grid or blocked, or no route exists.
#[must_use]
pub fn find_path(grid: &Grid, start: Vec3, goal: Vec3) -> Option<Waypoints> {
    let start_cell = grid.cell_at(start)?;
    let goal_cell = grid.cell_at(goal)?;

    if !grid.is_walkable(start_cell) || !grid.is_walkable(goal_cell) {
        return None;
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: FxHashMap<Cell, Cell> = FxHashMap::default();
    let mut g_score: FxHashMap<Cell, f32> = FxHashMap::default();

    g_score.insert(start_cell, 0.0);
    open_set.push(Node {
        cell: start_cell,
        f_cost: heuristic(start_cell, goal_cell),
    });

    while let Some(Node { cell, f_cost }) = open_set.pop() {
        let g = g_score.get(&cell).copied().unwrap_or(f32::MAX);

        if cell == goal_cell {
            return Some(reconstruct(grid, &came_from, goal_cell, goal));
        }

        // Stale heap entry
        if f_cost > g + heuristic(cell, goal_cell) + f32::EPSILON {
            continue;
        }

        for (next, cost) in grid.neighbors(cell) {
            let tentative = g + cost;
            if tentative < g_score.get(&next).copied().unwrap_or(f32::MAX) {
                came_from.insert(next, cell);
                g_score.insert(next, tentative);
                open_set.push(Node {
                    cell: next,
                    f_cost: tentative + heuristic(next, goal_cell),
                });
            }
        }
    }

    None
}

fn reconstruct(
    grid: &Grid,
    came_from: &FxHashMap<Cell, Cell>,
    goal_cell: Cell,
    goal: Vec3,
) -> Waypoints {
    let mut cells: SmallVec<[Cell; 16]> = SmallVec::new();
    let mut current = goal_cell;
    while let Some(&prev) = came_from.get(&current) {
        cells.push(current);
        current = prev;
    }
    cells.reverse();

    let mut waypoints: Waypoints = cells.iter().map(|&c| grid.cell_center(c)).collect();
    // The last cell center is replaced by the exact goal
    waypoints.pop();
    waypoints.push(goal);
    waypoints
}

/// Total length of a polyline starting at `from`
#[must_use]
pub fn path_length(from: Vec3, waypoints: &[Vec3]) -> f32 {
    let mut length = 0.0;
    let mut previous = from;
    for &point in waypoints {
        length += previous.distance(point);
        previous = point;
    }
    length
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32, z: f32) -> Vec3 {
        Vec3::new(x, 0.0, z)
    }

    #[test]
    fn test_direct_path() {
        let grid = Grid::new(10, 10, 1.0);

        let path = find_path(&grid, at(0.5, 0.5), at(3.5, 0.5)).expect("path");

        assert_eq!(path.len(), 3);
        assert_eq!(path.last(), Some(&at(3.5, 0.5)));
    }

    #[test]
    fn test_path_around_wall() {
        let mut grid = Grid::new(10, 10, 1.0);
        for z in 2..8 {
            grid.set_walkable((5, z), false);
        }

        let path = find_path(&grid, at(2.5, 5.5), at(8.5, 5.5)).expect("path");

        assert!(path.len() > 6);
        let crosses_wall = path
            .iter()
            .filter_map(|&p| grid.cell_at(p))
            .any(|cell| !grid.is_walkable(cell));
        assert!(!crosses_wall);
        assert!(path_length(at(2.5, 5.5), &path) > 6.0);
    }

    #[test]
    fn test_diagonal_path() {
        let grid = Grid::new(10, 10, 1.0);

        let path = find_path(&grid, at(0.5, 0.5), at(4.5, 4.5)).expect("path");

        assert_eq!(path.len(), 4);
    }

    #[test]
    fn test_same_cell_goes_straight_to_goal() {
        let grid = Grid::new(4, 4, 2.0);

        let path = find_path(&grid, at(0.2, 0.2), at(1.5, 1.0)).expect("path");

        assert_eq!(path.as_slice(), &[at(1.5, 1.0)]);
    }

    #[test]
    fn test_no_path() {
        let mut grid = Grid::new(5, 5, 1.0);
        for cell in [(3, 2), (3, 4), (2, 3), (4, 3), (2, 2), (4, 4), (2, 4), (4, 2)] {
            grid.set_walkable(cell, false);
        }

        assert!(find_path(&grid, at(0.5, 0.5), at(3.5, 3.5)).is_none());
    }

    #[test]
    fn test_off_grid() {
        let grid = Grid::new(5, 5, 1.0);

        assert!(find_path(&grid, at(-1.0, 0.5), at(3.5, 3.5)).is_none());
        assert!(find_path(&grid, at(0.5, 0.5), at(30.0, 3.5)).is_none());
    }

    #[test]
    fn test_origin_offset() {
        let grid = Grid::new(4, 4, 1.0).with_origin(Vec2::new(-2.0, -2.0));

        assert_eq!(grid.cell_at(at(-2.0, -2.0)), Some((0, 0)));
        assert_eq!(grid.cell_center((3, 3)), at(1.5, 1.5));
    }
}
