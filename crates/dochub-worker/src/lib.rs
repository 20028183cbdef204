//! Background maintenance for DocHub.
//!
//! - A retention sweep that removes notifications and activity logs past
//!   the retention horizon
//! - A runner that repeats the sweep on a fixed interval until shutdown

pub mod retention;
pub mod runner;

pub use retention::{RetentionSweeper, SweepReport};
pub use runner::SweeperRunner;
