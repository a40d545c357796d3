use itertools::Itertools;
use log::warn;
use na::Vector2;
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use brownian_core::{Error, Result, State};
use crate::solver::{pair_force_magnitude, ClassDrive, ForceTable, NeighborList};

/// Pair enumeration and kernel used for the pairwise force.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ForceStrategy {
    /// Every pair, closed-form force. Reference path.
    DirectAllPairs,
    /// Every pair, tabulated force
    TabulatedAllPairs,
    /// Verlet list pairs, closed-form force
    DirectNeighborList,
    /// Verlet list pairs, tabulated force. Fast path.
    TabulatedNeighborList,
}

impl ForceStrategy {
    pub fn uses_table(&self) -> bool {
        matches!(self, ForceStrategy::TabulatedAllPairs | ForceStrategy::TabulatedNeighborList)
    }

    pub fn uses_neighbor_list(&self) -> bool {
        matches!(self, ForceStrategy::DirectNeighborList | ForceStrategy::TabulatedNeighborList)
    }

    /// Numbering used by the scaling benchmark: bit 0 selects the table,
    /// bit 1 selects the Verlet list.
    pub fn from_run_type(run_type: u8) -> Option<Self> {
        match run_type {
            0 => Some(ForceStrategy::DirectAllPairs),
            1 => Some(ForceStrategy::TabulatedAllPairs),
            2 => Some(ForceStrategy::DirectNeighborList),
            3 => Some(ForceStrategy::TabulatedNeighborList),
            _ => None,
        }
    }

    pub fn run_type(&self) -> u8 {
        match self {
            ForceStrategy::DirectAllPairs => 0,
            ForceStrategy::TabulatedAllPairs => 1,
            ForceStrategy::DirectNeighborList => 2,
            ForceStrategy::TabulatedNeighborList => 3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Parallelism {
    Serial,
    /// Per-thread force buffers reduced at the end of the pair loop
    Rayon,
}

/// What to do with pairs that come closer than `min_distance`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClampPolicy {
    pub min_distance: f64,
    /// Force magnitude used instead of the diverging closed form
    pub fallback_force: f64,
    /// Log every clamped pair
    pub warn: bool,
}

impl Default for ClampPolicy {
    fn default() -> Self {
        Self {
            min_distance: 0.2,
            fallback_force: 100.0,
            warn: false,
        }
    }
}

impl ClampPolicy {
    pub fn validate(&self) -> Result<()> {
        if !(self.min_distance >= 0.0 && self.fallback_force.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "clamp distance {} must be non-negative and fallback force {} finite",
                self.min_distance, self.fallback_force
            )));
        }
        Ok(())
    }
}

/// Accumulates pair, pinning, external and noise forces into particles.
///
/// Particles with index below `static_count` are anchored: no contribution
/// is ever added to them.
#[derive(Clone, Debug)]
pub struct ForceEvaluator {
    strategy: ForceStrategy,
    parallelism: Parallelism,
    clamp: ClampPolicy,
    static_count: usize,
    table: Option<ForceTable>,
}

impl ForceEvaluator {
    /// Create evaluator. The force table is built only for tabulated strategies.
    pub fn new(strategy: ForceStrategy, parallelism: Parallelism,
               clamp: ClampPolicy, static_count: usize) -> Self {
        let table = if strategy.uses_table() {
            Some(ForceTable::default())
        } else {
            None
        };
        Self {
            strategy,
            parallelism,
            clamp,
            static_count,
            table,
        }
    }

    pub fn strategy(&self) -> ForceStrategy {
        self.strategy
    }

    pub fn static_count(&self) -> usize {
        self.static_count
    }

    pub fn table(&self) -> Option<&ForceTable> {
        self.table.as_ref()
    }

    fn clamped_force(&self, r: &Vector2<f64>, dr: f64) -> Vector2<f64> {
        if dr == 0.0 {
            return Vector2::zeros();
        }
        let f = self.clamp.fallback_force;
        Vector2::new(f * r.x / dr, f * r.y / dr)
    }

    /// Force on the first particle of a pair separated by `r`, and whether
    /// the clamp policy replaced it.
    pub fn pair_force(&self, r: &Vector2<f64>) -> (Vector2<f64>, bool) {
        let dr2 = r.magnitude_squared();
        let min_distance = self.clamp.min_distance;
        match &self.table {
            Some(table) => {
                if dr2 < min_distance * min_distance {
                    return (self.clamped_force(r, dr2.sqrt()), true);
                }
                (r * table.lookup(dr2), false)
            }
            None => {
                let dr = dr2.sqrt();
                if dr < min_distance {
                    return (self.clamped_force(r, dr), true);
                }
                let f = pair_force_magnitude(dr);
                (Vector2::new(f * r.x / dr, f * r.y / dr), false)
            }
        }
    }

    fn pair_contribution(&self, state: &State, i: usize, j: usize, step: usize) -> Vector2<f64> {
        let r = state.boundary_box.minimum_image_delta(&state.particles[i].position,
                                                        &state.particles[j].position);
        let (force, clamped) = self.pair_force(&r);
        if clamped && self.clamp.warn {
            warn!("Particles {} and {} too close at step {} (distance {:.4})", i, j, step, r.magnitude());
        }
        force
    }

    fn accumulate(&self, forces: &mut [Vector2<f64>], i: usize, j: usize, force: &Vector2<f64>) {
        if i >= self.static_count {
            forces[i] += force;
        }
        if j >= self.static_count {
            forces[j] -= force;
        }
    }

    /// Add the pairwise repulsion. `neighbor_list` is only read by the
    /// neighbor-list strategies and must be fresh for them.
    pub fn update_pair_forces(&self, state: &mut State, neighbor_list: &NeighborList, step: usize) {
        let forces = match self.parallelism {
            Parallelism::Serial => self.pair_forces_serial(state, neighbor_list, step),
            Parallelism::Rayon => self.pair_forces_parallel(state, neighbor_list, step),
        };
        state.particles.iter_mut().zip(forces).for_each(|(particle, force)| {
            particle.force += force;
        });
    }

    fn pair_forces_serial(&self, state: &State, neighbor_list: &NeighborList, step: usize) -> Vec<Vector2<f64>> {
        let number_particles = state.particles.len();
        let mut forces = vec![Vector2::zeros(); number_particles];
        if self.strategy.uses_neighbor_list() {
            for &(i, j) in neighbor_list.pairs() {
                let force = self.pair_contribution(state, i, j, step);
                self.accumulate(&mut forces, i, j, &force);
            }
        } else {
            for (i, j) in (0..number_particles).tuple_combinations() {
                let force = self.pair_contribution(state, i, j, step);
                self.accumulate(&mut forces, i, j, &force);
            }
        }
        forces
    }

    fn pair_forces_parallel(&self, state: &State, neighbor_list: &NeighborList, step: usize) -> Vec<Vector2<f64>> {
        let number_particles = state.particles.len();
        let zeros = move || vec![Vector2::zeros(); number_particles];
        let sum = |mut a: Vec<Vector2<f64>>, b: Vec<Vector2<f64>>| {
            a.iter_mut().zip(b).for_each(|(x, y)| *x += y);
            a
        };
        if self.strategy.uses_neighbor_list() {
            neighbor_list.pairs()
                .par_iter()
                .fold(zeros, |mut forces, &(i, j)| {
                    let force = self.pair_contribution(state, i, j, step);
                    self.accumulate(&mut forces, i, j, &force);
                    forces
                })
                .reduce(zeros, sum)
        } else {
            (0..number_particles)
                .into_par_iter()
                .fold(zeros, |mut forces, i| {
                    for j in (i + 1)..number_particles {
                        let force = self.pair_contribution(state, i, j, step);
                        self.accumulate(&mut forces, i, j, &force);
                    }
                    forces
                })
                .reduce(zeros, sum)
        }
    }

    /// Linear spring towards (or away from) every pinning site whose radius
    /// contains the particle: `-f_max / r * d`, `d` pointing from the site.
    pub fn update_pinning_forces(&self, state: &mut State) {
        let bb = state.boundary_box;
        let sites = &state.pinning_sites;
        for particle in state.particles.iter_mut().skip(self.static_count) {
            for site in sites {
                let r = bb.minimum_image_delta(&particle.position, &site.position);
                if r.magnitude_squared() < site.radius * site.radius {
                    particle.force -= r * (site.f_max / site.radius);
                }
            }
        }
    }

    /// Add the class-dependent drives for `step`.
    pub fn update_external_forces(&self, state: &mut State, rules: &[ClassDrive], step: usize) {
        for particle in state.particles.iter_mut().skip(self.static_count) {
            for rule in rules.iter().filter(|rule| rule.class == particle.class) {
                particle.force += rule.drive.force_at(step);
            }
        }
    }

    /// Uniform random kick in `[-amplitude/2, amplitude/2)` on each axis.
    pub fn update_thermal_forces<R: Rng>(&self, state: &mut State, amplitude: f64, rng: &mut R) {
        let uniform = Uniform::new(0.0f64, 1.0f64);
        for particle in state.particles.iter_mut().skip(self.static_count) {
            let kick_x = amplitude * (uniform.sample(rng) - 0.5);
            let kick_y = amplitude * (uniform.sample(rng) - 0.5);
            particle.force += Vector2::new(kick_x, kick_y);
        }
    }
}
