mod pinning;
mod position;

pub use pinning::*;
pub use position::*;
