//! Small signal-analysis toolkit over real-valued sequences.
//!
//! * [`signal::convolve`]: causal convolution truncated to the second operand.
//! * [`signal::fourier`]: an O(N²) DFT/IDFT pair with a sine-real,
//!   cosine-imaginary spectrum convention.
//! * [`predict::levinson`] and [`predict::lpc`]: Levinson-Durbin coefficient
//!   estimation and multi-step linear-prediction forecasts.
//! * [`predict::dead_reckoning`]: constant-velocity and constant-acceleration
//!   extrapolation.
//!
//! Every operation is available as a validated kernel
//! ([`kernel::KernelLifecycle`] plus a capability trait from
//! [`signal::traits`]) and as a free function.

#![no_std]
#![deny(missing_docs)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod kernel;
pub mod linalg;
pub mod predict;
pub mod signal;

pub use nalgebra as na;
pub use nalgebra::Complex;
