use na::Vector2;
use brownian_core::State;
use crate::solver::NeighborList;

pub enum Integrator {
    /// First-order Euler step of overdamped dynamics: velocity equals force.
    OverdampedEuler,
}

impl Integrator {
    /// Just integrator iteration. Moves every non-static particle by
    /// `force * delta_time`, feeds the displacement to `neighbor_list`,
    /// wraps into the box and clears all forces.
    ///
    /// `delta_time` must keep per-step displacements below one box length.
    pub fn calculate(&self, state: &mut State, neighbor_list: &mut NeighborList,
                     delta_time: f64, static_count: usize) {
        match self {
            Integrator::OverdampedEuler => {
                state.particles.iter_mut().enumerate().for_each(|(index, particle)| {
                    if index >= static_count {
                        let delta = particle.force * delta_time;
                        particle.position += delta;
                        neighbor_list.mark_displacement(particle, &delta);
                    }
                    particle.force = Vector2::zeros();
                });
                state.apply_boundary_conditions();
            }
        }
    }
}
