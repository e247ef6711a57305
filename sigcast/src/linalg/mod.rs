//! Linear-algebra helpers used to analyse estimated predictor polynomials.

mod companion;

pub use companion::*;
