use clap::Parser;
use log::{error, info};
use brownian_core::{Result, TrajectoryFormat};
use crate::args::*;
use crate::commands::{generate_config, pinning_sweep, run, scaling_benchmark};

mod args;
mod commands;


fn execute(args: &Args) -> Result<()> {
    let format: TrajectoryFormat = args.trajectory_format.into();
    match &args.command {
        Commands::Run {
            config,
            out_dir,
            overrides,
        } => {
            let summary = run(config.as_deref(), overrides, out_dir, format)?;
            info!("{} steps done in {:.3} seconds", summary.steps, summary.elapsed.as_secs_f64());
        }
        Commands::GenerateConfig { file } => {
            generate_config(file)?;
        }
        Commands::PinningSweep {
            pins,
            strength,
            repelling,
            static_particles,
            out_dir,
            steps,
        } => {
            pinning_sweep(*pins, *strength, *repelling != 0, *static_particles,
                          *steps, out_dir, format)?;
        }
        Commands::ScalingBenchmark {
            setup,
            run_type,
            out_dir,
            steps,
        } => {
            scaling_benchmark(*setup, *run_type, *steps, out_dir, format)?;
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(err) = execute(&args) {
        error!("{}", err);
        std::process::exit(1);
    }
}
