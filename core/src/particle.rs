use na::Vector2;
use serde::{Deserialize, Serialize};
use crate::SimulationBox;

/// Structure that keeps all data for particle
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// position of particle in the periodic box
    pub position: Vector2<f64>,
    /// The sum of the forces acting on the particle during the current step
    pub force: Vector2<f64>,
    /// Displacement accumulated since the last neighbor list rebuild
    pub displacement: Vector2<f64>,
    /// Class tag. Selects which external drive acts on the particle
    pub class: u16,
    /// Stable identity, used to correlate trajectory frames
    pub id: usize,
}

/// Fixed attractor (`f_max > 0`) or repeller (`f_max < 0`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PinningSite {
    pub position: Vector2<f64>,
    /// Interaction radius
    pub radius: f64,
    /// Force at the rim of the site
    pub f_max: f64,
}

/// Row of a trajectory frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticleSnapshot {
    pub id: usize,
    pub x: f64,
    pub y: f64,
    pub class: u16,
}

/// Structure that keeps current state
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct State {
    /// Particles ordered by creation. Index and `id` coincide.
    pub particles: Vec<Particle>,
    pub pinning_sites: Vec<PinningSite>,
    /// Boundary conditions for current state
    pub boundary_box: SimulationBox,
}

impl Particle {
    /// Create particle of class `class` at `position` with empty force and
    /// displacement accumulators.
    ///
    /// # Examples
    ///
    /// ```
    /// # use nalgebra::Vector2;
    /// # use brownian_core::Particle;
    /// let particle = Particle::new(7, 1, Vector2::new(1.0, 2.0));
    /// assert_eq!(particle.id, 7);
    /// assert_eq!(particle.class, 1);
    /// assert_eq!(particle.force, Vector2::zeros());
    /// assert_eq!(particle.displacement, Vector2::zeros());
    /// ```
    pub fn new(id: usize, class: u16, position: Vector2<f64>) -> Self {
        Particle {
            position,
            force: Vector2::zeros(),
            displacement: Vector2::zeros(),
            class,
            id,
        }
    }

    pub fn snapshot(&self) -> ParticleSnapshot {
        ParticleSnapshot {
            id: self.id,
            x: self.position.x,
            y: self.position.y,
            class: self.class,
        }
    }
}

impl Default for Particle {
    /// Creates default particle for tests. Every parameter is zero.
    fn default() -> Self {
        Particle::new(0, 0, Vector2::zeros())
    }
}

impl PinningSite {
    pub fn new(position: Vector2<f64>, radius: f64, f_max: f64) -> Self {
        PinningSite {
            position,
            radius,
            f_max,
        }
    }

    pub fn is_attractive(&self) -> bool {
        self.f_max > 0.0
    }
}

impl State {
    /// Empty state in `boundary_box`.
    pub fn new(boundary_box: SimulationBox) -> Self {
        State {
            particles: vec![],
            pinning_sites: vec![],
            boundary_box,
        }
    }

    /// Makes every particle to satisfy periodic boundary conditions.
    pub fn apply_boundary_conditions(&mut self) {
        let bb = self.boundary_box;
        self.particles.iter_mut().for_each(|particle| {
            particle.position = bb.wrap_position(&particle.position);
        });
    }

    pub fn snapshot(&self) -> Vec<ParticleSnapshot> {
        self.particles.iter().map(Particle::snapshot).collect()
    }

    /// Number of particles with class tag `class`.
    pub fn class_count(&self, class: u16) -> usize {
        self.particles.iter().filter(|p| p.class == class).count()
    }
}
