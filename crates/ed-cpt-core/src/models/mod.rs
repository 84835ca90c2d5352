//! Domain models for the CPT extraction system.

mod analysis;
mod candidate;
mod code;

pub use analysis::*;
pub use candidate::*;
pub use code::*;
