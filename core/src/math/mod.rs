pub mod stats;
pub mod window;

pub use stats::{StatsHelper, StdDevMode};
