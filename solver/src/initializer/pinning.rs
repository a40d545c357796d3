use log::warn;
use na::Vector2;
use rand::Rng;
use brownian_core::{PinningSite, State};
use crate::config::PinningConfig;
use super::position::random_point;

/// Scatter `config.count` pinning sites over the box.
///
/// Sites try to keep `config.min_separation` from each other. If no free spot
/// is found within `config.max_tries` candidates the last one is used anyway.
pub fn initialize_pinning_sites<R: Rng>(state: &mut State, rng: &mut R, config: &PinningConfig) {
    let bb = state.boundary_box;
    let min_separation2 = config.min_separation * config.min_separation;
    let overlaps = |candidate: &Vector2<f64>, sites: &[PinningSite]| {
        sites.iter().any(|site| {
            bb.minimum_image_delta(candidate, &site.position).magnitude_squared() < min_separation2
        })
    };
    state.pinning_sites.reserve(config.count);
    for i in 0..config.count {
        let mut candidate = random_point(&bb, rng);
        let mut tries = 1;
        while overlaps(&candidate, &state.pinning_sites) {
            if tries >= config.max_tries {
                warn!("Pinning site {} placed closer than {} to another site", i, config.min_separation);
                break;
            }
            candidate = random_point(&bb, rng);
            tries += 1;
        }
        let f_max = config.sign.f_max(i, config.max_force);
        state.pinning_sites.push(PinningSite::new(candidate, config.radius, f_max));
    }
}
