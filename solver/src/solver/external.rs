use na::Vector2;
use serde::{Deserialize, Serialize};
use brownian_core::{Error, Result};

/// Time dependence of an external drift force.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Drive {
    /// Same force every step
    Constant { fx: f64, fy: f64 },
    /// Grows linearly from zero to `(max_fx, max_fy)` over `ramp_steps` steps, then stays there
    Ramp {
        max_fx: f64,
        max_fy: f64,
        ramp_steps: usize,
    },
}

impl Drive {
    pub fn force_at(&self, step: usize) -> Vector2<f64> {
        match *self {
            Drive::Constant { fx, fy } => Vector2::new(fx, fy),
            Drive::Ramp { max_fx, max_fy, ramp_steps } => {
                let progress = step.min(ramp_steps) as f64 / ramp_steps as f64;
                Vector2::new(max_fx * progress, max_fy * progress)
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            Drive::Constant { fx, fy } if !(fx.is_finite() && fy.is_finite()) => Err(
                Error::InvalidConfig("constant drive must be finite".to_string()),
            ),
            Drive::Ramp { ramp_steps: 0, .. } => Err(Error::InvalidConfig(
                "ramp drive needs at least one step".to_string(),
            )),
            Drive::Ramp { max_fx, max_fy, .. } if !(max_fx.is_finite() && max_fy.is_finite()) => Err(
                Error::InvalidConfig("ramp drive must be finite".to_string()),
            ),
            _ => Ok(()),
        }
    }
}

/// Drive applied to every particle with class tag `class`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassDrive {
    pub class: u16,
    pub drive: Drive,
}

impl ClassDrive {
    /// Class 0 is pushed along +x with a force growing to 2.0 over
    /// `ramp_steps`, class 1 is dragged along -x with a constant 0.5.
    pub fn default_rules(ramp_steps: usize) -> Vec<ClassDrive> {
        vec![
            ClassDrive {
                class: 0,
                drive: Drive::Ramp {
                    max_fx: 2.0,
                    max_fy: 0.0,
                    ramp_steps,
                },
            },
            ClassDrive {
                class: 1,
                drive: Drive::Constant { fx: -0.5, fy: 0.0 },
            },
        ]
    }
}
