mod domain;
mod error;
mod particle;
mod save_data;
extern crate nalgebra as na;
extern crate serde;

pub use domain::SimulationBox;
pub use error::{Error, Result};
pub use particle::{Particle, ParticleSnapshot, PinningSite, State};
pub use save_data::*;

#[cfg(test)]
mod tests {
    use std::fs;
    use na::Vector2;
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;
    use tempdir::TempDir;
    use crate::*;

    fn test_state() -> State {
        let mut state = State::new(SimulationBox::new(20.0, 20.0).unwrap());
        state.particles.push(Particle::new(0, 0, Vector2::new(1.0, 2.0)));
        state.particles.push(Particle::new(1, 1, Vector2::new(3.5, 4.25)));
        state.pinning_sites.push(PinningSite::new(Vector2::new(10.0, 12.5), 1.0, 2.0));
        state
    }

    #[test]
    fn minimum_image_is_antisymmetric_and_short() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            let sx = rng.gen_range(12.0..100.0);
            let sy = rng.gen_range(12.0..100.0);
            let bb = SimulationBox::new(sx, sy).unwrap();
            let a = Vector2::new(rng.gen_range(0.0..sx), rng.gen_range(0.0..sy));
            let b = Vector2::new(rng.gen_range(0.0..sx), rng.gen_range(0.0..sy));
            let ab = bb.minimum_image_delta(&a, &b);
            let ba = bb.minimum_image_delta(&b, &a);
            assert_eq!(ab, -ba);
            assert!(ab.x.abs() <= bb.half().x);
            assert!(ab.y.abs() <= bb.half().y);
            assert!(ab.magnitude() <= bb.half().magnitude() + 1e-12);
        }
    }

    #[test]
    fn minimum_image_crosses_the_boundary() {
        let bb = SimulationBox::new(20.0, 30.0).unwrap();
        let delta = bb.minimum_image_delta(&Vector2::new(19.5, 1.0), &Vector2::new(0.5, 29.0));
        assert!((delta.x + 1.0).abs() < 1e-12);
        assert!((delta.y - 2.0).abs() < 1e-12);
        let delta = bb.minimum_image_delta(&Vector2::new(5.0, 5.0), &Vector2::new(7.0, 4.0));
        assert_eq!(delta, Vector2::new(-2.0, 1.0));
    }

    #[test]
    fn wrap_is_idempotent() {
        let mut rng = StdRng::seed_from_u64(7);
        let bb = SimulationBox::new(47.0, 23.0).unwrap();
        for _ in 0..1000 {
            let p = Vector2::new(rng.gen_range(-47.0..94.0), rng.gen_range(-23.0..46.0));
            let once = bb.wrap_position(&p);
            let twice = bb.wrap_position(&once);
            assert_eq!(once, twice);
            assert!(once.x >= 0.0 && once.x <= 47.0);
            assert!(once.y >= 0.0 && once.y <= 23.0);
        }
        assert_eq!(bb.wrap_position(&Vector2::new(-0.5, 23.5)), Vector2::new(46.5, 0.5));
    }

    #[test]
    fn boundary_conditions_wrap_every_particle() {
        let mut state = test_state();
        state.particles[0].position = Vector2::new(-1.0, 21.0);
        state.apply_boundary_conditions();
        assert_eq!(state.particles[0].position, Vector2::new(19.0, 1.0));
        assert_eq!(state.particles[1].position, Vector2::new(3.5, 4.25));
    }

    #[test]
    fn snapshot_and_class_count() {
        let state = test_state();
        let snapshot = state.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[1], ParticleSnapshot { id: 1, x: 3.5, y: 4.25, class: 1 });
        assert_eq!(state.class_count(0), 1);
        assert_eq!(state.class_count(3), 0);
    }

    #[test]
    fn cmovie_frame_layout() {
        let temp_dir = TempDir::new("test_dir").expect("Can't create temp directory");
        let path = temp_dir.path().join("movie.mvi");
        let state = test_state();
        let mut writer = TrajectoryWriter::create(&path, TrajectoryFormat::CMovie).unwrap();
        writer.write_frame(0, &state.snapshot()).unwrap();
        writer.write_frame(100, &state.snapshot()).unwrap();
        assert_eq!(writer.frames_written(), 2);
        writer.finish().unwrap();
        let bytes = fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 2 * (8 + 2 * 20));
        let word = |offset: usize| i32::from_ne_bytes(bytes[offset..offset + 4].try_into().unwrap());
        let float = |offset: usize| f32::from_ne_bytes(bytes[offset..offset + 4].try_into().unwrap());
        assert_eq!(word(0), 2);
        assert_eq!(word(4), 0);
        assert_eq!(word(8), 2);
        assert_eq!(word(12), 0);
        assert_eq!(float(16), 1.0);
        assert_eq!(float(20), 2.0);
        assert_eq!(float(24), 1.0);
        assert_eq!(word(28), 3);
        assert_eq!(word(32), 1);
        assert_eq!(word(48 + 4), 100);
    }

    #[test]
    fn cmovie_rejects_values_beyond_i32() {
        let temp_dir = TempDir::new("test_dir").expect("Can't create temp directory");
        let path = temp_dir.path().join("movie.mvi");
        let mut writer = TrajectoryWriter::create(&path, TrajectoryFormat::CMovie).unwrap();
        let huge_id = [ParticleSnapshot { id: i32::MAX as usize + 1, x: 1.0, y: 1.0, class: 0 }];
        assert!(matches!(writer.write_frame(0, &huge_id), Err(Error::InvalidConfig(_))));
        let snapshot = test_state().snapshot();
        assert!(matches!(writer.write_frame(i32::MAX as usize + 1, &snapshot), Err(Error::InvalidConfig(_))));
        assert_eq!(writer.frames_written(), 0);
        writer.write_frame(i32::MAX as usize, &snapshot).unwrap();
        writer.finish().unwrap();
        assert_eq!(fs::read(&path).unwrap().len(), 8 + 2 * 20);
    }

    #[test]
    fn tecplot_frame_layout() {
        let temp_dir = TempDir::new("test_dir").expect("Can't create temp directory");
        let path = temp_dir.path().join("movie.dat");
        let mut writer = TrajectoryWriter::create(&path, TrajectoryFormat::Tecplot).unwrap();
        writer.write_frame(300, &test_state().snapshot()).unwrap();
        writer.finish().unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "VARIABLES = \"X\" , \"Y\", \"Z\", \"R\", \"G\", \"B\"");
        assert_eq!(lines[1], "ZONE T=\"300\"  I=2 J=1, F=POINT ");
        assert_eq!(lines[2], "1.000000 2.000000 0.000000 1.000000 0.000000 0.000000");
        assert_eq!(lines[3], "3.500000 4.250000 0.000000 0.000000 0.000000 1.000000");
    }

    #[test]
    fn statistics_csv() {
        let temp_dir = TempDir::new("test_dir").expect("Can't create temp directory");
        let path = temp_dir.path().join("stats.csv");
        let mut writer = StatisticsWriter::create(&path).unwrap();
        writer.write(0, 0.5).unwrap();
        writer.write(1, -0.25).unwrap();
        writer.finish().unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "step,mean_force_x\n0,0.5\n1,-0.25\n");
    }

    #[test]
    fn contour_file() {
        let temp_dir = TempDir::new("test_dir").expect("Can't create temp directory");
        let path = temp_dir.path().join("contour.txt");
        write_contour_file(&path, &test_state().pinning_sites).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["1", "1.000000e+01", "1.250000e+01",
                               "1.000000e+00", "1.000000e+00", "1.000000e+00"]);
    }

    #[test]
    fn state_file() {
        let temp_dir = TempDir::new("test_dir").expect("Can't create temp directory");
        let path = temp_dir.path().join("state.json");
        let state = test_state();
        save_state_to_file(&state, &path).unwrap();
        let loaded = load_state_from_file(&path).unwrap();
        assert_eq!(loaded.particles, state.particles);
        assert_eq!(loaded.pinning_sites, state.pinning_sites);
        assert_eq!(loaded.boundary_box, state.boundary_box);
        let missing = load_state_from_file(&temp_dir.path().join("missing.json"));
        assert!(matches!(missing, Err(Error::Io(_))));
    }

    #[test]
    fn timing_log_appends() {
        let temp_dir = TempDir::new("test_dir").expect("Can't create temp directory");
        let path = temp_dir.path().join("timings.txt");
        append_timing(&path, "3", 100, 1.5).unwrap();
        append_timing(&path, "0", 400, 2.0).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "3 100 1.500000\n0 400 2.000000\n");
    }
}
