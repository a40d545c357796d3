mod force;

pub use force::*;
