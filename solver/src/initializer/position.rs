use na::Vector2;
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use brownian_core::{Error, Particle, Result, SimulationBox, State};
use crate::config::PlacementConfig;

/// Draw a uniformly distributed point of the box.
pub(crate) fn random_point<R: Rng>(boundary_box: &SimulationBox, rng: &mut R) -> Vector2<f64> {
    let size = boundary_box.size();
    let x = Uniform::new(0.0, size.x).sample(rng);
    let y = Uniform::new(0.0, size.y).sample(rng);
    Vector2::new(x, y)
}

/// Append `count` particles at random positions, none of them closer than
/// `placement.min_separation` to another one.
///
/// Each particle is tagged with class 1 with probability `class_one_fraction`,
/// class 0 otherwise.
///
/// # Errors
///
/// [Error::TooDense] when `placement.max_tries` candidates in a row overlap
/// with already placed particles. `state` is then left as it was before the call.
pub fn randomize_positions<R: Rng>(state: &mut State,
                                   rng: &mut R,
                                   count: usize,
                                   class_one_fraction: f64,
                                   placement: &PlacementConfig) -> Result<()> {
    let bb = state.boundary_box;
    let first_particle = state.particles.len();
    let min_separation2 = placement.min_separation * placement.min_separation;
    state.particles.reserve(count);
    for i in 0..count {
        let mut position = None;
        for _ in 0..placement.max_tries {
            let candidate = random_point(&bb, rng);
            let overlap = state.particles.iter().any(|particle| {
                bb.minimum_image_delta(&candidate, &particle.position).magnitude_squared() < min_separation2
            });
            if !overlap {
                position = Some(candidate);
                break;
            }
        }
        let position = match position {
            Some(position) => position,
            None => {
                state.particles.truncate(first_particle);
                return Err(Error::TooDense {
                    placed: i,
                    requested: count,
                    tries: placement.max_tries,
                });
            }
        };
        let class = if rng.gen::<f64>() < class_one_fraction { 1 } else { 0 };
        state.particles.push(Particle::new(first_particle + i, class, position));
    }
    Ok(())
}
