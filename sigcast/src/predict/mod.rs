//! Forecasting: autoregressive estimation, LPC extrapolation and dead
//! reckoning.

pub mod dead_reckoning;
pub mod levinson;
pub mod lpc;
