//! Shared trait-first kernel substrate.
//!
//! Constructor validation, 1D buffer adapters and the error taxonomy used by
//! every convolution, transform and prediction kernel in the crate.

mod errors;
mod io;
mod lifecycle;

pub use errors::*;
pub use io::*;
pub use lifecycle::*;
