/*
grid.rs

Copyright 2026 Hervé Quatremain

This file is part of Raildraft.

Raildraft is free software: you can redistribute it and/or modify it under
the terms of the GNU General Public License as published by the Free Software
Foundation, either version 3 of the License, or (at your option) any later
version.

Raildraft is distributed in the hope that it will be useful, but WITHOUT ANY
WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR
A PARTICULAR PURPOSE. See the GNU General Public License for more details.

You should have received a copy of the GNU General Public License along with
Raildraft. If not, see <https://www.gnu.org/licenses/>.

SPDX-License-Identifier: GPL-3.0-or-later
*/

//! Uniform spatial grid for short-range pair queries.
//!
//! Repulsion only acts between entities closer than the interaction radius,
//! so the simulation never needs the full quadratic pair set. The grid
//! buckets every point into square cells as large as the query radius; all
//! pairs within the radius are then found by scanning the 3x3 cell
//! neighborhood of each point.

use std::collections::HashMap;

use crate::graph::node::Point;

/// A spatial hash of point indexes, bucketed into square cells.
pub struct SpatialGrid {
    /// Cell side length.
    cell_size: f64,

    /// For each occupied cell, the indexes of the points inside it, in
    /// ascending order.
    cells: HashMap<(i64, i64), Vec<usize>>,
}

impl SpatialGrid {
    /// Bucket the given points into cells of the given size. Points with
    /// non-finite coordinates are left out.
    pub fn build(positions: &[Point], cell_size: f64) -> Self {
        let mut cells: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
        for (index, position) in positions.iter().enumerate() {
            if !position.is_finite() {
                continue;
            }
            cells
                .entry(Self::cell_of(position, cell_size))
                .or_default()
                .push(index);
        }
        Self { cell_size, cells }
    }

    /// Enumerate all unordered pairs of points within the given radius of
    /// each other. The radius must not exceed the cell size. Pairs are
    /// returned as `(smaller index, larger index)` in ascending order, so
    /// the caller's force accumulation is deterministic.
    pub fn pairs_within(&self, positions: &[Point], radius: f64) -> Vec<(usize, usize)> {
        let mut pairs: Vec<(usize, usize)> = Vec::new();
        for (cell, members) in &self.cells {
            for i in members {
                for dx in -1..=1i64 {
                    for dy in -1..=1i64 {
                        let neighbor: (i64, i64) = (cell.0 + dx, cell.1 + dy);
                        if let Some(others) = self.cells.get(&neighbor) {
                            for j in others {
                                if j > i && positions[*i].distance(&positions[*j]) <= radius {
                                    pairs.push((*i, *j));
                                }
                            }
                        }
                    }
                }
            }
        }
        pairs.sort_unstable();
        pairs
    }

    /// The cell containing the given point.
    fn cell_of(position: &Point, cell_size: f64) -> (i64, i64) {
        (
            (position.x / cell_size).floor() as i64,
            (position.y / cell_size).floor() as i64,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_close_pairs_across_cells() {
        // Two points close together but on both sides of a cell boundary,
        // one point far away.
        let positions: Vec<Point> = vec![
            Point::new(0.9, 0.0),
            Point::new(1.1, 0.0),
            Point::new(10.0, 10.0),
        ];
        let grid: SpatialGrid = SpatialGrid::build(&positions, 1.0);
        assert_eq!(grid.pairs_within(&positions, 1.0), vec![(0, 1)]);
    }

    #[test]
    fn pair_set_matches_brute_force() {
        // Deterministic pseudo-random cloud, compared against the naive
        // quadratic enumeration.
        let mut positions: Vec<Point> = Vec::new();
        let mut seed: u64 = 42;
        for _ in 0..60 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            let x: f64 = (seed >> 33) as f64 / u32::MAX as f64 * 20.0;
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            let y: f64 = (seed >> 33) as f64 / u32::MAX as f64 * 20.0;
            positions.push(Point::new(x, y));
        }
        let radius: f64 = 2.5;
        let grid: SpatialGrid = SpatialGrid::build(&positions, radius);

        let mut expected: Vec<(usize, usize)> = Vec::new();
        for i in 0..positions.len() {
            for j in i + 1..positions.len() {
                if positions[i].distance(&positions[j]) <= radius {
                    expected.push((i, j));
                }
            }
        }
        assert_eq!(grid.pairs_within(&positions, radius), expected);
    }

    #[test]
    fn skips_non_finite_points() {
        let positions: Vec<Point> = vec![
            Point::new(0.0, 0.0),
            Point::new(f64::NAN, 0.0),
            Point::new(0.5, 0.0),
        ];
        let grid: SpatialGrid = SpatialGrid::build(&positions, 1.0);
        assert_eq!(grid.pairs_within(&positions, 1.0), vec![(0, 2)]);
    }
}
