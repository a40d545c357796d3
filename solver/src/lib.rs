extern crate nalgebra as na;

pub mod config;
pub mod initializer;
pub mod macro_parameters;
pub mod simulation;
pub mod solver;
