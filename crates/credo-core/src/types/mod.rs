//! Core data types for credo.

mod goal;
mod observation;
mod records;
mod summary;

pub use goal::*;
pub use observation::*;
pub use records::*;
pub use summary::*;
