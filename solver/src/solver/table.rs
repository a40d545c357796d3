use log::info;
use brownian_core::{Error, Result};

/// Smallest tabulated distance
pub const TABLE_X_MIN: f64 = 0.1;
/// Largest tabulated distance, equal to the neighbor list cutoff
pub const TABLE_X_MAX: f64 = 6.0;
pub const TABLE_SAMPLES: usize = 50000;

/// Magnitude of the pair force at distance `r`.
pub fn pair_force_magnitude(r: f64) -> f64 {
    1.0 / (r * r) * (-0.25 * r).exp()
}

/// Force divided by distance sampled on an even grid in `r²`, so a lookup
/// never needs a square root.
#[derive(Clone, Debug)]
pub struct ForceTable {
    samples: Vec<f64>,
    start: f64,
    step: f64,
}

impl ForceTable {
    /// Tabulate `f(r)/r` for `r²` in `[x_min², x_max²]` with `n` samples.
    ///
    /// # Errors
    ///
    /// [Error::InvalidConfig] unless `n` is at least 2 and `0 < x_min < x_max`.
    pub fn build(x_min: f64, x_max: f64, n: usize) -> Result<Self> {
        if n < 2 {
            return Err(Error::InvalidConfig(format!("force table needs at least two samples, got {n}")));
        }
        if !(x_min > 0.0 && x_max > x_min && x_max.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "invalid tabulation range [{x_min}, {x_max}]"
            )));
        }
        Ok(Self::tabulate(x_min, x_max, n))
    }

    fn tabulate(x_min: f64, x_max: f64, n: usize) -> Self {
        let start = x_min * x_min;
        let step = (x_max * x_max - start) / (n as f64 - 1.0);
        let samples = (0..n)
            .map(|k| {
                let x2 = start + k as f64 * step;
                let x = x2.sqrt();
                pair_force_magnitude(x) / x
            })
            .collect();
        info!("Force table built: start = {:.6}, step = {:.8}, {} samples", start, step, n);
        Self { samples, start, step }
    }

    /// Force per distance at squared distance `dr2`.
    ///
    /// Values are flat per bin. Beyond the last bin the force is zero. Below
    /// the first bin the lookup saturates at the first sample.
    pub fn lookup(&self, dr2: f64) -> f64 {
        let index = ((dr2 - self.start) / self.step).floor();
        if index >= self.samples.len() as f64 {
            return 0.0;
        }
        if index < 0.0 {
            return self.samples[0];
        }
        self.samples[index as usize]
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl Default for ForceTable {
    fn default() -> Self {
        ForceTable::tabulate(TABLE_X_MIN, TABLE_X_MAX, TABLE_SAMPLES)
    }
}
