/*
 * Spatial Grid Module
 *
 * This module defines the NeighborIndex trait, the only view the update
 * rule has of the population, and SpatialGrid, a uniform 3D grid that
 * answers it. The simulation volume is divided into cubic cells so a
 * radius query only visits the cells the query sphere can touch instead of
 * every agent.
 *
 * Positions outside the volume are bucketed into the nearest edge cell.
 */

use nannou::prelude::*;

// Neighbor discovery over a frozen snapshot of agent positions
pub trait NeighborIndex {
    // Replace the indexed snapshot
    fn rebuild(&mut self, positions: &[Vec3]);

    // Closest other agent within `radius`; ties go to the lower index
    fn nearest(&self, idx: usize, radius: f32) -> Option<usize>;

    // Every other agent within `radius`, in no particular order
    fn within(&self, idx: usize, radius: f32) -> Vec<usize>;
}

// Cells per axis never exceed this; larger query radii just visit more cells
const MAX_CELLS_PER_AXIS: usize = 64;

pub struct SpatialGrid {
    pub cell_size: f32,
    pub grid_size: usize,
    half_extent: f32,
    cells: Vec<Vec<usize>>,
    positions: Vec<Vec3>,
}

impl SpatialGrid {
    // `half_extent` is the boundary: the grid covers [-half_extent, half_extent]^3
    pub fn new(cell_size: f32, half_extent: f32) -> Self {
        let floor = 2.0 * half_extent / MAX_CELLS_PER_AXIS as f32;
        let cell_size = cell_size.max(floor).max(f32::EPSILON);
        let grid_size = ((2.0 * half_extent / cell_size).ceil() as usize).clamp(1, MAX_CELLS_PER_AXIS);

        Self {
            cell_size,
            grid_size,
            half_extent,
            cells: vec![Vec::new(); grid_size * grid_size * grid_size],
            positions: Vec::new(),
        }
    }

    // Convert a world coordinate to a clamped cell coordinate on one axis
    #[inline]
    fn axis_cell(&self, value: f32) -> usize {
        let cell = ((value + self.half_extent) / self.cell_size).floor();
        cell.clamp(0.0, (self.grid_size - 1) as f32) as usize
    }

    #[inline]
    fn cell_coords(&self, pos: Vec3) -> [usize; 3] {
        [self.axis_cell(pos.x), self.axis_cell(pos.y), self.axis_cell(pos.z)]
    }

    #[inline]
    fn cell_index(&self, [x, y, z]: [usize; 3]) -> usize {
        (z * self.grid_size + y) * self.grid_size + x
    }

    // Visit every agent in the cells a sphere of `radius` around `center` can reach
    fn visit_candidates(&self, center: Vec3, radius: f32, mut visit: impl FnMut(usize)) {
        let reach = (radius / self.cell_size).ceil() as usize;
        let [cx, cy, cz] = self.cell_coords(center);
        let last = self.grid_size - 1;

        for z in cz.saturating_sub(reach)..=(cz + reach).min(last) {
            for y in cy.saturating_sub(reach)..=(cy + reach).min(last) {
                for x in cx.saturating_sub(reach)..=(cx + reach).min(last) {
                    for &other in &self.cells[self.cell_index([x, y, z])] {
                        visit(other);
                    }
                }
            }
        }
    }
}

impl NeighborIndex for SpatialGrid {
    fn rebuild(&mut self, positions: &[Vec3]) {
        for cell in &mut self.cells {
            cell.clear();
        }
        self.positions.clear();
        self.positions.extend_from_slice(positions);

        for (i, &position) in positions.iter().enumerate() {
            let cell = self.cell_index(self.cell_coords(position));
            self.cells[cell].push(i);
        }
    }

    fn nearest(&self, idx: usize, radius: f32) -> Option<usize> {
        let origin = *self.positions.get(idx)?;
        let radius_sq = radius * radius;
        let mut best: Option<(f32, usize)> = None;

        self.visit_candidates(origin, radius, |other| {
            if other == idx {
                return;
            }
            let d_squared = origin.distance_squared(self.positions[other]);
            if d_squared > radius_sq {
                return;
            }
            let closer = match best {
                None => true,
                Some((best_sq, best_idx)) => {
                    d_squared < best_sq || (d_squared == best_sq && other < best_idx)
                }
            };
            if closer {
                best = Some((d_squared, other));
            }
        });

        best.map(|(_, other)| other)
    }

    fn within(&self, idx: usize, radius: f32) -> Vec<usize> {
        let Some(&origin) = self.positions.get(idx) else {
            return Vec::new();
        };
        let radius_sq = radius * radius;
        let mut result = Vec::new();

        self.visit_candidates(origin, radius, |other| {
            if other != idx && origin.distance_squared(self.positions[other]) <= radius_sq {
                result.push(other);
            }
        });

        result
    }
}
