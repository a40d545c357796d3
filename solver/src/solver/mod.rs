mod external;
mod forces;
mod integrator;
mod neighbor_list;
mod table;

pub use external::*;
pub use forces::*;
pub use integrator::*;
pub use neighbor_list::*;
pub use table::*;
