use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use serde::{Deserialize, Serialize};
use brownian_core::{Error, Result};
use crate::solver::{ClampPolicy, ClassDrive, ForceStrategy, Parallelism, NEIGHBOR_CUTOFF};

/// Sign assignment for pinning sites.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PinningSign {
    /// Every site pulls particles in
    Attractive,
    /// Every site pushes particles out
    Repulsive,
    /// Even sites repel, odd sites attract
    Alternating,
}

impl PinningSign {
    /// Signed `f_max` of the `index`-th site.
    pub fn f_max(&self, index: usize, max_force: f64) -> f64 {
        match self {
            PinningSign::Attractive => max_force,
            PinningSign::Repulsive => -max_force,
            PinningSign::Alternating => {
                if index % 2 == 0 {
                    -max_force
                } else {
                    max_force
                }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinningConfig {
    pub count: usize,
    pub max_force: f64,
    pub radius: f64,
    pub sign: PinningSign,
    /// Best-effort distance between sites
    pub min_separation: f64,
    pub max_tries: usize,
}

impl Default for PinningConfig {
    fn default() -> Self {
        Self {
            count: 70,
            max_force: 2.0,
            radius: 1.0,
            sign: PinningSign::Attractive,
            min_separation: 2.5,
            max_tries: 100,
        }
    }
}

/// Rejection sampling limits for the initial particle positions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub min_separation: f64,
    /// Tries per particle before the system is declared too dense
    pub max_tries: usize,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            min_separation: 0.2,
            max_tries: 100,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Steps between trajectory frames
    pub frame_stride: usize,
    /// Steps between progress reports
    pub progress_stride: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            frame_stride: 100,
            progress_stride: 10000,
        }
    }
}

/// Everything a run needs. Defaults reproduce the single-class pinning
/// experiment without pinning sites.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Box sides `(SX, SY)`
    pub box_size: (f64, f64),
    pub particle_count: usize,
    /// Probability that a particle is tagged with class 1 instead of class 0
    pub class_one_fraction: f64,
    pub dt: f64,
    pub steps: usize,
    pub seed: u64,
    pub strategy: ForceStrategy,
    pub parallelism: Parallelism,
    pub clamp: ClampPolicy,
    /// Particles with index below this never receive force and never move
    pub static_count: usize,
    pub placement: PlacementConfig,
    pub pinning: Option<PinningConfig>,
    pub external: Vec<ClassDrive>,
    /// Amplitude of the uniform random kick, if any
    pub thermal_noise: Option<f64>,
    pub output: OutputConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            box_size: (47.0, 47.0),
            particle_count: 23 * 23,
            class_one_fraction: 0.0,
            dt: 0.002,
            steps: 100000,
            seed: 1,
            strategy: ForceStrategy::TabulatedNeighborList,
            parallelism: Parallelism::Serial,
            clamp: ClampPolicy::default(),
            static_count: 0,
            placement: PlacementConfig::default(),
            pinning: None,
            external: ClassDrive::default_rules(100000),
            thermal_noise: None,
            output: OutputConfig::default(),
        }
    }
}

fn invalid<T>(message: String) -> Result<T> {
    Err(Error::InvalidConfig(message))
}

impl SimulationConfig {
    /// Check every constraint the solver relies on.
    pub fn validate(&self) -> Result<()> {
        let (sx, sy) = self.box_size;
        let min_side = 2.0 * NEIGHBOR_CUTOFF;
        if !(sx >= min_side && sy >= min_side) {
            return invalid(format!(
                "box {sx} x {sy} is smaller than twice the neighbor cutoff ({min_side})"
            ));
        }
        if self.particle_count == 0 {
            return invalid("particle count must be positive".to_string());
        }
        if !(self.class_one_fraction >= 0.0 && self.class_one_fraction <= 1.0) {
            return invalid(format!("class one fraction {} is outside [0, 1]", self.class_one_fraction));
        }
        if !(self.dt > 0.0 && self.dt.is_finite()) {
            return invalid(format!("time step {} must be positive", self.dt));
        }
        if self.static_count > self.particle_count {
            return invalid(format!(
                "static count {} exceeds particle count {}",
                self.static_count, self.particle_count
            ));
        }
        if self.placement.max_tries == 0 {
            return invalid("placement needs at least one try per particle".to_string());
        }
        if self.placement.min_separation < 0.0 {
            return invalid("placement separation must not be negative".to_string());
        }
        if self.output.frame_stride == 0 || self.output.progress_stride == 0 {
            return invalid("output strides must be positive".to_string());
        }
        self.clamp.validate()?;
        if let Some(pinning) = &self.pinning {
            if !(pinning.radius > 0.0) {
                return invalid(format!("pinning radius {} must be positive", pinning.radius));
            }
            if !pinning.max_force.is_finite() {
                return invalid("pinning force must be finite".to_string());
            }
        }
        for rule in &self.external {
            rule.drive.validate()?;
        }
        if let Some(amplitude) = self.thermal_noise {
            if !(amplitude >= 0.0 && amplitude.is_finite()) {
                return invalid(format!("thermal noise amplitude {amplitude} must be non-negative"));
            }
        }
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let config: SimulationConfig = serde_json::de::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::ser::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}
