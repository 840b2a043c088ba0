mod align;
mod comparator;
mod error;
mod runner;
mod sink;
mod timer;
mod types;
mod worker;
mod workload;

pub use align::*;
pub use comparator::*;
pub use error::*;
pub use runner::*;
pub use sink::*;
pub use timer::*;
pub use types::*;
pub use worker::*;
pub use workload::*;
