use std::fs;
use std::path::{Path, PathBuf};
use indicatif::ProgressBar;
use log::info;
use brownian_core::{
    append_timing, save_state_to_file, write_contour_file, Error, ParticleSnapshot, Result,
    StatisticsWriter, TrajectoryFormat, TrajectoryWriter,
};
use brownian_solver::config::{PinningConfig, PinningSign, SimulationConfig};
use brownian_solver::simulation::{Observer, RunSummary, Simulation};
use brownian_solver::solver::{ClassDrive, ForceStrategy, Parallelism};
use crate::args::RunOverrides;

pub const PIN_COUNTS: [usize; 5] = [10, 30, 70, 100, 250];
pub const PIN_STRENGTHS: [f64; 5] = [1.0, 2.0, 4.0, 16.0, 100.0];
pub const STATIC_COUNTS: [usize; 4] = [0, 10, 40, 100];
pub const SCALING_PARTICLES: [usize; 5] = [100, 400, 900, 1600, 2500];
pub const SCALING_BOX_SIDES: [f64; 5] = [20.0, 80.0, 180.0, 320.0, 500.0];

pub const CONFIG_FILE: &str = "config.json";
pub const CONTOUR_FILE: &str = "contour.txt";
pub const FINAL_STATE_FILE: &str = "final_state.json";
pub const TIMINGS_FILE: &str = "timings.txt";
/// Steps over which the class 0 drive reaches full strength, whatever the run length
pub const DRIVE_RAMP_STEPS: usize = 100000;

/// File names of one run inside its output directory.
#[derive(Clone, Debug)]
pub struct OutputNames {
    /// Trajectory file name without extension
    pub trajectory: String,
    pub statistics: String,
}

impl Default for OutputNames {
    fn default() -> Self {
        Self {
            trajectory: "results".to_string(),
            statistics: "statistics.csv".to_string(),
        }
    }
}

impl OutputNames {
    pub fn trajectory_path(&self, out_dir: &Path, format: TrajectoryFormat) -> PathBuf {
        out_dir.join(&self.trajectory).with_extension(format.extension())
    }

    pub fn statistics_path(&self, out_dir: &Path) -> PathBuf {
        out_dir.join(&self.statistics)
    }
}

/// Streams frames and statistics to disk while the simulation runs.
pub struct RunRecorder {
    trajectory: TrajectoryWriter,
    statistics: StatisticsWriter,
    progress_bar: ProgressBar,
}

impl RunRecorder {
    pub fn create(out_dir: &Path, names: &OutputNames, format: TrajectoryFormat, steps: usize) -> Result<Self> {
        let trajectory = TrajectoryWriter::create(&names.trajectory_path(out_dir, format), format)?;
        let statistics = StatisticsWriter::create(&names.statistics_path(out_dir))?;
        Ok(Self {
            trajectory,
            statistics,
            progress_bar: ProgressBar::new(steps as u64),
        })
    }

    /// Flush both writers.
    pub fn close(self) -> Result<usize> {
        let frames = self.trajectory.frames_written();
        self.trajectory.finish()?;
        self.statistics.finish()?;
        Ok(frames)
    }
}

impl Observer for RunRecorder {
    fn on_statistics(&mut self, step: usize, mean_force_x: f64) -> Result<()> {
        self.statistics.write(step, mean_force_x)
    }

    fn on_frame(&mut self, step: usize, snapshot: &[ParticleSnapshot]) -> Result<()> {
        self.trajectory.write_frame(step, snapshot)
    }

    fn on_progress(&mut self, step: usize, _total: usize) -> Result<()> {
        self.progress_bar.set_position(step as u64);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.progress_bar.finish_with_message("Calculated");
        Ok(())
    }
}

/// Run `config` to completion and write every output into `out_dir`.
pub fn run_simulation(config: SimulationConfig,
                      out_dir: &Path,
                      names: &OutputNames,
                      format: TrajectoryFormat) -> Result<RunSummary> {
    fs::create_dir_all(out_dir)?;
    config.save_to_file(&out_dir.join(CONFIG_FILE))?;
    let steps = config.steps;
    let mut simulation = Simulation::new(config)?;
    simulation.initialize()?;
    write_contour_file(&out_dir.join(CONTOUR_FILE), simulation.pinning_sites())?;
    let mut recorder = RunRecorder::create(out_dir, names, format, steps)?;
    let summary = simulation.run(&mut recorder)?;
    let frames = recorder.close()?;
    save_state_to_file(simulation.state(), &out_dir.join(FINAL_STATE_FILE))?;
    info!("{} frames saved to {}", frames, names.trajectory_path(out_dir, format).to_string_lossy());
    Ok(summary)
}

pub fn apply_overrides(config: &mut SimulationConfig, overrides: &RunOverrides) {
    if let Some(steps) = overrides.steps {
        config.steps = steps;
    }
    if let Some(seed) = overrides.seed {
        config.seed = seed;
    }
    if let Some(particles) = overrides.particles {
        config.particle_count = particles;
    }
    if let Some(strategy) = overrides.strategy {
        config.strategy = strategy.into();
    }
    if overrides.parallel {
        config.parallelism = Parallelism::Rayon;
    }
    if let Some(amplitude) = overrides.thermal_noise {
        config.thermal_noise = Some(amplitude);
    }
    if let Some(static_count) = overrides.static_count {
        config.static_count = static_count;
    }
}

pub fn run(config_file: Option<&Path>,
           overrides: &RunOverrides,
           out_dir: &Path,
           format: TrajectoryFormat) -> Result<RunSummary> {
    let mut config = match config_file {
        Some(path) => SimulationConfig::load_from_file(path)?,
        None => SimulationConfig::default(),
    };
    apply_overrides(&mut config, overrides);
    run_simulation(config, out_dir, &OutputNames::default(), format)
}

pub fn generate_config(file: &Path) -> Result<()> {
    SimulationConfig::default().save_to_file(file)?;
    info!("Default configuration saved to {}", file.to_string_lossy());
    Ok(())
}

fn preset<T: Copy>(values: &[T], index: usize, what: &str) -> Result<T> {
    values.get(index).copied().ok_or_else(|| Error::InvalidConfig(format!(
        "{} index {} is out of range 0..{}", what, index, values.len()
    )))
}

/// Configuration of one cell of the pinning experiment grid.
pub fn pinning_sweep_config(pins: usize, strength: usize, repelling: bool,
                            static_particles: usize, steps: usize) -> Result<SimulationConfig> {
    let count = preset(&PIN_COUNTS, pins, "pin count")?;
    let max_force = preset(&PIN_STRENGTHS, strength, "pin strength")?;
    let static_count = preset(&STATIC_COUNTS, static_particles, "static particle count")?;
    let sign = if repelling {
        PinningSign::Alternating
    } else {
        PinningSign::Attractive
    };
    Ok(SimulationConfig {
        steps,
        static_count,
        pinning: Some(PinningConfig {
            count,
            max_force,
            sign,
            ..PinningConfig::default()
        }),
        external: ClassDrive::default_rules(DRIVE_RAMP_STEPS),
        ..SimulationConfig::default()
    })
}

pub fn pinning_sweep(pins: usize, strength: usize, repelling: bool, static_particles: usize,
                     steps: usize, out_dir: &Path, format: TrajectoryFormat) -> Result<RunSummary> {
    let config = pinning_sweep_config(pins, strength, repelling, static_particles, steps)?;
    let count = PIN_COUNTS[pins];
    let max_force = PIN_STRENGTHS[strength];
    let names = OutputNames {
        trajectory: format!("{}-f{}-np-results", count, max_force),
        statistics: format!("stats-np-{}-f{}-static{}.csv", count, max_force, config.static_count),
    };
    info!("{} pins of strength {}, {} static particles", count, max_force, config.static_count);
    run_simulation(config, out_dir, &names, format)
}

/// Configuration of one system size of the scaling benchmark.
pub fn scaling_config(setup: usize, run_type: u8, steps: usize) -> Result<SimulationConfig> {
    let particle_count = preset(&SCALING_PARTICLES, setup, "setup")?;
    let side = SCALING_BOX_SIDES[setup];
    let strategy = ForceStrategy::from_run_type(run_type).ok_or_else(|| {
        Error::InvalidConfig(format!("run type {} is not one of 0, 1, 2, 3", run_type))
    })?;
    Ok(SimulationConfig {
        box_size: (side, side),
        particle_count,
        class_one_fraction: 0.5,
        steps,
        strategy,
        external: ClassDrive::default_rules(DRIVE_RAMP_STEPS),
        ..SimulationConfig::default()
    })
}

pub fn scaling_benchmark(setup: usize, run_type: u8, steps: usize,
                         out_dir: &Path, format: TrajectoryFormat) -> Result<RunSummary> {
    let config = scaling_config(setup, run_type, steps)?;
    let particle_count = config.particle_count;
    info!("Nr part = {}, run type = {}", particle_count, run_type);
    let summary = run_simulation(config, out_dir, &OutputNames::default(), format)?;
    append_timing(&out_dir.join(TIMINGS_FILE), &run_type.to_string(),
                  particle_count, summary.elapsed.as_secs_f64())?;
    Ok(summary)
}
