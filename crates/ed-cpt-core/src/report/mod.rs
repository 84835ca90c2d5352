//! Reporting: note complexity, reviewer recommendations, and exportable reports.

mod coding;
mod complexity;
mod recommendations;

pub use coding::*;
pub use complexity::*;
pub use recommendations::*;
