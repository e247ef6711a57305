//! Convolution and Fourier transforms, plus the capability traits every
//! kernel in the crate implements.

pub mod convolve;
pub mod fourier;
pub mod traits;
