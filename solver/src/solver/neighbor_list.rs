use log::debug;
use na::Vector2;
use rayon::prelude::*;
use brownian_core::{Particle, SimulationBox};

/// Distance under which a pair enters the list.
pub const NEIGHBOR_CUTOFF: f64 = 6.0;
/// Accumulated displacement after which the list is considered stale.
pub const REBUILD_DISPLACEMENT: f64 = 2.0;

/// Verlet list of candidate pairs `(i, j)` with `i < j`.
///
/// A pair is stored when its minimum-image distance was at most
/// [NEIGHBOR_CUTOFF] at the last rebuild. The list is flagged stale as soon as
/// one particle has drifted [REBUILD_DISPLACEMENT] from where it was at that
/// rebuild, which keeps every pair with squared distance at most 4.0
/// (distance 2.0) inside the list.
#[derive(Clone, Debug)]
pub struct NeighborList {
    pairs: Vec<(usize, usize)>,
    cutoff2: f64,
    rebuild_displacement2: f64,
    needs_rebuild: bool,
    rebuild_count: usize,
}

impl NeighborList {
    /// Empty list that needs a rebuild before use.
    pub fn new() -> Self {
        Self::with_cutoff(NEIGHBOR_CUTOFF, REBUILD_DISPLACEMENT)
    }

    pub fn with_cutoff(cutoff: f64, rebuild_displacement: f64) -> Self {
        Self {
            pairs: vec![],
            cutoff2: cutoff * cutoff,
            rebuild_displacement2: rebuild_displacement * rebuild_displacement,
            needs_rebuild: true,
            rebuild_count: 0,
        }
    }

    /// Recollect every pair inside the cutoff and restart displacement tracking.
    pub fn rebuild(&mut self, particles: &mut [Particle], boundary_box: &SimulationBox) {
        let number_particles = particles.len();
        let cutoff2 = self.cutoff2;
        let positions: &[Particle] = particles;
        self.pairs.clear();
        self.pairs.par_extend((0..number_particles).into_par_iter().flat_map_iter(move |i| {
            let pi = positions[i].position;
            ((i + 1)..number_particles).filter_map(move |j| {
                let r = boundary_box.minimum_image_delta(&pi, &positions[j].position);
                if r.magnitude_squared() <= cutoff2 {
                    Some((i, j))
                } else {
                    None
                }
            })
        }));
        particles.iter_mut().for_each(|particle| {
            particle.displacement = Vector2::zeros();
        });
        self.needs_rebuild = false;
        self.rebuild_count += 1;
        debug!("Verlet list rebuilt: {} pairs (rebuild #{})", self.pairs.len(), self.rebuild_count);
    }

    /// Credit `delta` to the particle's displacement since the last rebuild.
    pub fn mark_displacement(&mut self, particle: &mut Particle, delta: &Vector2<f64>) {
        particle.displacement += delta;
        if particle.displacement.magnitude_squared() >= self.rebuild_displacement2 {
            self.needs_rebuild = true;
        }
    }

    pub fn needs_rebuild(&self) -> bool {
        self.needs_rebuild
    }

    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn rebuild_count(&self) -> usize {
        self.rebuild_count
    }

    pub fn cutoff2(&self) -> f64 {
        self.cutoff2
    }
}

impl Default for NeighborList {
    fn default() -> Self {
        Self::new()
    }
}
