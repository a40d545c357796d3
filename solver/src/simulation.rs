use std::time::{Duration, Instant};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use brownian_core::{Error, ParticleSnapshot, PinningSite, Result, SimulationBox, State};
use crate::config::SimulationConfig;
use crate::initializer::{initialize_pinning_sites, randomize_positions};
use crate::macro_parameters::get_mean_force_x;
use crate::solver::{ForceEvaluator, Integrator, NeighborList};

/// Lifecycle of a [Simulation]. Transitions only move forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Configuration accepted, no particles yet
    Uninitialized,
    /// Particles and pinning sites placed
    Ready,
    /// Stepping
    Running,
    /// Configured number of steps done
    Finished,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Uninitialized => "uninitialized",
            Phase::Ready => "ready",
            Phase::Running => "running",
            Phase::Finished => "finished",
        }
    }
}

/// Receives what a run produces. Any error aborts the run.
pub trait Observer {
    /// Called every step after forces are accumulated and before they are consumed.
    fn on_statistics(&mut self, step: usize, mean_force_x: f64) -> Result<()>;

    /// Called every `frame_stride` steps after the particles moved.
    fn on_frame(&mut self, step: usize, snapshot: &[ParticleSnapshot]) -> Result<()>;

    fn on_progress(&mut self, _step: usize, _total: usize) -> Result<()> {
        Ok(())
    }

    /// Called once after the last step.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Observer that drops everything.
pub struct NullObserver;

impl Observer for NullObserver {
    fn on_statistics(&mut self, _step: usize, _mean_force_x: f64) -> Result<()> {
        Ok(())
    }

    fn on_frame(&mut self, _step: usize, _snapshot: &[ParticleSnapshot]) -> Result<()> {
        Ok(())
    }
}

/// Outcome of [Simulation::run].
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub steps: usize,
    pub rebuilds: usize,
    pub elapsed: Duration,
}

/// Owns everything one run mutates.
pub struct Simulation {
    config: SimulationConfig,
    state: State,
    neighbor_list: NeighborList,
    evaluator: ForceEvaluator,
    integrator: Integrator,
    rng: StdRng,
    phase: Phase,
    step_index: usize,
}

impl Simulation {
    /// Validate `config` and prepare the force evaluator.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let (sx, sy) = config.box_size;
        let state = State::new(SimulationBox::new(sx, sy)?);
        let evaluator = ForceEvaluator::new(config.strategy, config.parallelism,
                                            config.clamp, config.static_count);
        let rng = StdRng::seed_from_u64(config.seed);
        Ok(Self {
            config,
            state,
            neighbor_list: NeighborList::new(),
            evaluator,
            integrator: Integrator::OverdampedEuler,
            rng,
            phase: Phase::Uninitialized,
            step_index: 0,
        })
    }

    /// Ready simulation around already placed particles. `config.box_size`
    /// and `config.particle_count` are taken from `state`.
    pub fn from_state(mut config: SimulationConfig, state: State) -> Result<Self> {
        let size = state.boundary_box.size();
        config.box_size = (size.x, size.y);
        config.particle_count = state.particles.len();
        let mut simulation = Self::new(config)?;
        simulation.state = state;
        simulation.phase = Phase::Ready;
        Ok(simulation)
    }

    fn expect_phase(&self, expected: Phase) -> Result<()> {
        if self.phase != expected {
            return Err(Error::InvalidPhase {
                expected: expected.name(),
                found: self.phase.name(),
            });
        }
        Ok(())
    }

    /// Place particles and pinning sites.
    ///
    /// # Errors
    ///
    /// [Error::TooDense] if the particles don't fit with the configured separation.
    pub fn initialize(&mut self) -> Result<()> {
        self.expect_phase(Phase::Uninitialized)?;
        randomize_positions(&mut self.state, &mut self.rng, self.config.particle_count,
                            self.config.class_one_fraction, &self.config.placement)?;
        if let Some(pinning) = &self.config.pinning {
            initialize_pinning_sites(&mut self.state, &mut self.rng, pinning);
        }
        let attractive = self.state.pinning_sites.iter().filter(|site| site.is_attractive()).count();
        info!("Placed {} particles ({} of class 1) and {} pinning sites ({} attractive) in a {} x {} box",
              self.state.particles.len(), self.state.class_count(1),
              self.state.pinning_sites.len(), attractive,
              self.config.box_size.0, self.config.box_size.1);
        self.phase = Phase::Ready;
        Ok(())
    }

    /// Build the Verlet list, if the strategy needs one, and start stepping.
    pub fn start(&mut self) -> Result<()> {
        self.expect_phase(Phase::Ready)?;
        if self.evaluator.strategy().uses_neighbor_list() {
            self.neighbor_list.rebuild(&mut self.state.particles, &self.state.boundary_box);
        }
        self.phase = if self.step_index >= self.config.steps {
            Phase::Finished
        } else {
            Phase::Running
        };
        Ok(())
    }

    /// Accumulate every enabled force contribution for the current step.
    pub fn evaluate_forces(&mut self) {
        let step = self.step_index;
        self.evaluator.update_pair_forces(&mut self.state, &self.neighbor_list, step);
        if let Some(amplitude) = self.config.thermal_noise {
            self.evaluator.update_thermal_forces(&mut self.state, amplitude, &mut self.rng);
        }
        self.evaluator.update_external_forces(&mut self.state, &self.config.external, step);
        if !self.state.pinning_sites.is_empty() {
            self.evaluator.update_pinning_forces(&mut self.state);
        }
    }

    /// One full time step.
    pub fn step(&mut self, observer: &mut impl Observer) -> Result<()> {
        self.expect_phase(Phase::Running)?;
        let t = self.step_index;
        self.evaluate_forces();
        observer.on_statistics(t, self.mean_force_x())?;
        self.integrator.calculate(&mut self.state, &mut self.neighbor_list,
                                  self.config.dt, self.config.static_count);
        if self.evaluator.strategy().uses_neighbor_list() && self.neighbor_list.needs_rebuild() {
            self.neighbor_list.rebuild(&mut self.state.particles, &self.state.boundary_box);
        }
        if t % self.config.output.frame_stride == 0 {
            observer.on_frame(t, &self.snapshot())?;
        }
        if t % self.config.output.progress_stride == 0 {
            info!("time = {}", t);
            observer.on_progress(t, self.config.steps)?;
        }
        self.step_index += 1;
        if self.step_index >= self.config.steps {
            self.phase = Phase::Finished;
        }
        Ok(())
    }

    /// Drive the simulation to [Phase::Finished], initializing and starting it
    /// first when needed.
    pub fn run(&mut self, observer: &mut impl Observer) -> Result<RunSummary> {
        let time_start = Instant::now();
        if self.phase == Phase::Uninitialized {
            self.initialize()?;
        }
        if self.phase == Phase::Ready {
            self.start()?;
        }
        while self.phase == Phase::Running {
            self.step(observer)?;
        }
        observer.finish()?;
        let elapsed = time_start.elapsed();
        info!("Program running time = {:.3} seconds ({} Verlet rebuilds)",
              elapsed.as_secs_f64(), self.neighbor_list.rebuild_count());
        Ok(RunSummary {
            steps: self.step_index,
            rebuilds: self.neighbor_list.rebuild_count(),
            elapsed,
        })
    }

    pub fn snapshot(&self) -> Vec<ParticleSnapshot> {
        self.state.snapshot()
    }

    /// Mean x-force. Valid after [Simulation::evaluate_forces] and before the
    /// integrator clears the forces.
    pub fn mean_force_x(&self) -> f64 {
        get_mean_force_x(&self.state)
    }

    pub fn pinning_sites(&self) -> &[PinningSite] {
        &self.state.pinning_sites
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn neighbor_list(&self) -> &NeighborList {
        &self.neighbor_list
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_step(&self) -> usize {
        self.step_index
    }
}
