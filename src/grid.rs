use std::collections::HashMap;

use rayon::prelude::*;

use crate::particle::Particle;
use crate::sim_params::SimParams;
use crate::vecmath::Vec2;

/// Spatial hash over the periodic domain. Keys are `(cx, cy)` cell
/// coordinates in `[0, grid_dim)^2`, values the ids of the particles inside;
/// empty cells are absent. Transient: rebuilt from the current generation
/// every step.
#[derive(Debug)]
pub struct CellGrid {
    m: u32,
    cell_size: f64,
    cells: HashMap<(u32, u32), Vec<u32>>,
}

impl CellGrid {
    /// Buckets a generation sequentially.
    pub fn build(particles: &[Particle], params: &SimParams) -> Self {
        let mut grid = CellGrid {
            m: params.grid_dim,
            cell_size: params.cell_size,
            cells: HashMap::new(),
        };
        for p in particles {
            let cell = grid.cell_of(p.position);
            grid.cells.entry(cell).or_default().push(p.id);
        }
        grid
    }

    /// Buckets a generation in parallel: per-chunk private maps, then an
    /// order-preserving merge. Buckets come out identical to `build`'s
    /// because chunks cover the id-ordered slice in order and the merge
    /// appends later chunks after earlier ones.
    pub fn par_build(particles: &[Particle], params: &SimParams) -> Self {
        let m = params.grid_dim;
        let cell_size = params.cell_size;
        let cells = particles
            .par_iter()
            .fold(HashMap::new, |mut acc: HashMap<(u32, u32), Vec<u32>>, p| {
                acc.entry(cell_for(p.position, cell_size, m)).or_default().push(p.id);
                acc
            })
            .reduce(HashMap::new, |mut left, right| {
                for (cell, mut ids) in right {
                    left.entry(cell).or_default().append(&mut ids);
                }
                left
            });
        CellGrid { m, cell_size, cells }
    }

    /// Cell coordinates containing a position.
    #[inline]
    pub fn cell_of(&self, pos: Vec2) -> (u32, u32) {
        cell_for(pos, self.cell_size, self.m)
    }

    /// Ids bucketed in a cell; empty slice for an unoccupied cell.
    pub fn bucket(&self, cell: (u32, u32)) -> &[u32] {
        self.cells.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The distinct cells of the wrapped 3x3 block around `cell`. On grids
    /// narrower than three cells the wrapped offsets alias each other, and a
    /// repeated visit would test the same pair twice, so aliases are dropped.
    pub fn neighbor_cells(&self, cell: (u32, u32)) -> Vec<(u32, u32)> {
        let m = self.m as i64;
        let mut out = Vec::with_capacity(9);
        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                let wrapped = (
                    (cell.0 as i64 + dx).rem_euclid(m) as u32,
                    (cell.1 as i64 + dy).rem_euclid(m) as u32,
                );
                if !out.contains(&wrapped) {
                    out.push(wrapped);
                }
            }
        }
        out
    }

    /// Iterates over occupied cells and their buckets.
    pub fn occupied(&self) -> impl Iterator<Item = ((u32, u32), &[u32])> + '_ {
        self.cells.iter().map(|(cell, ids)| (*cell, ids.as_slice()))
    }

    pub fn grid_dim(&self) -> u32 {
        self.m
    }
}

/// Maps a coordinate to its cell along one axis and folds the result back
/// into [0, m). The fold guards the case where a position just below the
/// domain edge divides out to exactly `m`.
#[inline(always)]
fn cell_for(pos: Vec2, cell_size: f64, m: u32) -> (u32, u32) {
    let axis = |v: f64| ((v / cell_size).floor() as i64).rem_euclid(m as i64) as u32;
    (axis(pos.x), axis(pos.y))
}
