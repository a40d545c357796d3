use std::path::PathBuf;
use clap::{Parser, Subcommand, ValueEnum};
use brownian_core::TrajectoryFormat;
use brownian_solver::solver::ForceStrategy;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// layout of trajectory files
    #[arg(long, value_enum, global = true, default_value = "cmovie")]
    pub trajectory_format: TrajectoryFormatChoose,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum TrajectoryFormatChoose {
    /// binary frames for cmovie
    Cmovie,
    /// text zones for tecplot
    Tecplot,
}

impl From<TrajectoryFormatChoose> for TrajectoryFormat {
    fn from(value: TrajectoryFormatChoose) -> Self {
        match value {
            TrajectoryFormatChoose::Cmovie => TrajectoryFormat::CMovie,
            TrajectoryFormatChoose::Tecplot => TrajectoryFormat::Tecplot,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum StrategyChoose {
    /// every pair, closed-form force
    DirectAllPairs,
    /// every pair, tabulated force
    TabulatedAllPairs,
    /// Verlet list, closed-form force
    DirectNeighborList,
    /// Verlet list, tabulated force
    TabulatedNeighborList,
}

impl From<StrategyChoose> for ForceStrategy {
    fn from(value: StrategyChoose) -> Self {
        match value {
            StrategyChoose::DirectAllPairs => ForceStrategy::DirectAllPairs,
            StrategyChoose::TabulatedAllPairs => ForceStrategy::TabulatedAllPairs,
            StrategyChoose::DirectNeighborList => ForceStrategy::DirectNeighborList,
            StrategyChoose::TabulatedNeighborList => ForceStrategy::TabulatedNeighborList,
        }
    }
}

/// Values replacing the ones from the configuration file
#[derive(clap::Args, Clone, Debug, Default)]
pub struct RunOverrides {
    /// number of steps
    #[arg(short = 'n', long)]
    pub steps: Option<usize>,
    /// random seed
    #[arg(short = 's', long)]
    pub seed: Option<u64>,
    /// number of particles
    #[arg(short = 'p', long)]
    pub particles: Option<usize>,
    /// pair force strategy
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyChoose>,
    /// accumulate pair forces on all cores
    #[arg(long)]
    pub parallel: bool,
    /// amplitude of the random thermal kick
    #[arg(long)]
    pub thermal_noise: Option<f64>,
    /// number of anchored particles
    #[arg(long)]
    pub static_count: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// run one simulation
    Run {
        /// configuration file, defaults are used without it
        #[arg(short = 'c', long)]
        config: Option<PathBuf>,
        /// directory for output files
        #[arg(short = 'o', long)]
        out_dir: PathBuf,
        #[command(flatten)]
        overrides: RunOverrides,
    },
    /// write the default configuration
    GenerateConfig {
        /// path of the configuration file
        #[arg(short = 'f', long)]
        file: PathBuf,
    },
    /// pinning experiment from the preset grid
    PinningSweep {
        /// index of pin count in 10, 30, 70, 100, 250
        pins: usize,
        /// index of pin strength in 1, 2, 4, 16, 100
        strength: usize,
        /// 1 makes every even pin repulsive
        repelling: u8,
        /// index of static particle count in 0, 10, 40, 100
        static_particles: usize,
        /// directory for output files
        #[arg(short = 'o', long)]
        out_dir: PathBuf,
        /// number of steps
        #[arg(short = 'n', long, default_value_t = 100000)]
        steps: usize,
    },
    /// timing run from the preset system sizes
    ScalingBenchmark {
        /// index of system in 100/20, 400/80, 900/180, 1600/320, 2500/500 (particles/box side)
        setup: usize,
        /// 0 direct, 1 tabulated, 2 direct with Verlet list, 3 tabulated with Verlet list
        run_type: u8,
        /// directory for output files
        #[arg(short = 'o', long)]
        out_dir: PathBuf,
        /// number of steps
        #[arg(short = 'n', long, default_value_t = 100000)]
        steps: usize,
    },
}
