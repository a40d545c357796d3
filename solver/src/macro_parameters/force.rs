use na::Vector2;
use brownian_core::State;

/// Mean accumulated force over every particle, anchored ones included.
///
/// Only meaningful between force evaluation and integration, the integrator
/// clears all forces.
pub fn get_mean_force(state: &State) -> Vector2<f64> {
    if state.particles.is_empty() {
        return Vector2::zeros();
    }
    let total: Vector2<f64> = state.particles.iter().map(|particle| particle.force).sum();
    total / state.particles.len() as f64
}

pub fn get_mean_force_x(state: &State) -> f64 {
    get_mean_force(state).x
}
