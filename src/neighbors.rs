use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::grid::CellGrid;
use crate::particle::Particle;
use crate::sim_params::SimParams;
use crate::vecmath::torus_distance_sq;

/// How a step resolves the neighbor relation.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NeighborStrategy {
    /// Bucket particles into grid cells and test pairs inside wrapped 3x3
    /// blocks.
    CellIndex,
    /// Test every unordered pair. O(n^2), the reference the others must
    /// reproduce exactly.
    BruteForce,
    /// Cell-index discovery with per-particle candidate lists collected in
    /// parallel and merged sequentially.
    Parallel,
}

/// Symmetric, self-exclusive neighbor relation for one generation, keyed by
/// particle id. Lists are sorted ascending, so the relation compares equal
/// however it was discovered.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborMap {
    lists: Vec<Vec<u32>>,
}

impl NeighborMap {
    fn with_capacity(n: usize) -> Self {
        NeighborMap { lists: vec![Vec::new(); n] }
    }

    /// Records an undirected edge.
    fn add_edge(&mut self, a: u32, b: u32) {
        self.lists[a as usize].push(b);
        self.lists[b as usize].push(a);
    }

    fn sort(&mut self) {
        for list in &mut self.lists {
            list.sort_unstable();
        }
    }

    pub fn neighbors_of(&self, id: u32) -> &[u32] {
        &self.lists[id as usize]
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.lists.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// True when every edge appears in both directions, without duplicates,
    /// and no particle lists itself.
    pub fn is_symmetric(&self) -> bool {
        self.lists.iter().enumerate().all(|(id, list)| {
            list.iter().all(|&other| {
                other as usize != id && self.lists[other as usize].contains(&(id as u32))
            }) && list.windows(2).all(|w| w[0] != w[1])
        })
    }
}

/// Builds the neighbor relation for a generation with the selected strategy.
/// Every strategy applies the same inclusive rule: two particles interact
/// when their torus distance is at most the interaction radius.
pub fn find_neighbors(
    particles: &[Particle],
    params: &SimParams,
    strategy: NeighborStrategy,
) -> NeighborMap {
    let mut map = match strategy {
        NeighborStrategy::CellIndex => cell_index(particles, params),
        NeighborStrategy::BruteForce => brute_force(particles, params),
        NeighborStrategy::Parallel => cell_index_parallel(particles, params),
    };
    map.sort();
    map
}

fn cell_index(particles: &[Particle], params: &SimParams) -> NeighborMap {
    let grid = CellGrid::build(particles, params);
    let mut map = NeighborMap::with_capacity(particles.len());
    let l = params.side_length;
    let r_sq = params.interaction_radius_sq;

    for (cell, ids) in grid.occupied() {
        for scan in grid.neighbor_cells(cell) {
            // The p < q guard keeps each unordered pair to the single visit
            // where its lower id sits in the iterated cell.
            for &p in ids {
                for &q in grid.bucket(scan) {
                    if p < q {
                        let a = particles[p as usize].position;
                        let b = particles[q as usize].position;
                        if torus_distance_sq(a, b, l) <= r_sq {
                            map.add_edge(p, q);
                        }
                    }
                }
            }
        }
    }
    map
}

fn brute_force(particles: &[Particle], params: &SimParams) -> NeighborMap {
    let mut map = NeighborMap::with_capacity(particles.len());
    let l = params.side_length;
    let r_sq = params.interaction_radius_sq;

    for (i, p) in particles.iter().enumerate() {
        for q in &particles[i + 1..] {
            if torus_distance_sq(p.position, q.position, l) <= r_sq {
                map.add_edge(p.id, q.id);
            }
        }
    }
    map
}

fn cell_index_parallel(particles: &[Particle], params: &SimParams) -> NeighborMap {
    let grid = CellGrid::par_build(particles, params);
    let l = params.side_length;
    let r_sq = params.interaction_radius_sq;

    // Phase 1: every particle collects its own candidates into a private
    // vector. Nothing shared is written, so no synchronization is needed.
    let candidates: Vec<Vec<u32>> = particles
        .par_iter()
        .map(|p| {
            let mut found = Vec::new();
            for scan in grid.neighbor_cells(grid.cell_of(p.position)) {
                for &q in grid.bucket(scan) {
                    if q != p.id {
                        let other = particles[q as usize].position;
                        if torus_distance_sq(p.position, other, l) <= r_sq {
                            found.push(q);
                        }
                    }
                }
            }
            found
        })
        .collect();

    // Phase 2: sequential merge. The candidate lists are symmetric by
    // construction, so keeping the i < j half materializes each undirected
    // edge exactly once.
    let mut map = NeighborMap::with_capacity(particles.len());
    for (i, found) in candidates.iter().enumerate() {
        for &j in found {
            if (i as u32) < j {
                map.add_edge(i as u32, j);
            }
        }
    }
    map
}
