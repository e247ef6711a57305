//! Trait interfaces for signal-processing capabilities.
//!
//! Each capability offers a checked `run_into` that writes into a
//! caller-provided buffer of the exact expected length, and an allocating
//! variant.

use crate::kernel::{ExecInvariantViolation, Read1D, Write1D};
use alloc::vec::Vec;
use nalgebra::Complex;

/// 1D causal convolution capability.
pub trait Convolve1D<T> {
    /// Run convolution into a caller-provided output buffer of `right.len()`.
    fn run_into<I1, I2, O>(
        &self,
        left: &I1,
        right: &I2,
        out: &mut O,
    ) -> Result<(), ExecInvariantViolation>
    where
        I1: Read1D<T> + ?Sized,
        I2: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized;

    /// Run convolution and allocate output.
    fn run_alloc<I1, I2>(&self, left: &I1, right: &I2) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I1: Read1D<T> + ?Sized,
        I2: Read1D<T> + ?Sized;
}

/// Forward discrete Fourier transform capability (real in, complex out).
pub trait Dft1D<T> {
    /// Transform into a caller-provided spectrum buffer.
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<Complex<T>> + ?Sized;

    /// Transform and allocate the spectrum.
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<Complex<T>>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// Inverse discrete Fourier transform capability (complex in, real out).
pub trait Idft1D<T> {
    /// Synthesize into a caller-provided sample buffer.
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<Complex<T>> + ?Sized,
        O: Write1D<T> + ?Sized;

    /// Synthesize and allocate the samples.
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<Complex<T>> + ?Sized;
}

/// Autocorrelation capability over lags `0..=order`.
pub trait Autocorrelate1D<T> {
    /// Compute lags into a caller-provided buffer of `order + 1`.
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized;

    /// Compute lags and allocate output.
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// Autoregressive coefficient estimation capability.
pub trait LevinsonDurbin1D<T> {
    /// Full estimation result.
    type Output;

    /// Estimate coefficients into a caller-provided buffer of `order`.
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized;

    /// Estimate coefficients together with recursion diagnostics.
    fn run<I>(&self, input: &I) -> Result<Self::Output, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// Multi-step linear-prediction forecast capability.
pub trait LpcForecast1D<T> {
    /// Forecast into a caller-provided buffer of `frames`.
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized;

    /// Forecast and allocate output.
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// Finite-difference extrapolation capability.
pub trait DeadReckon1D<T> {
    /// Predict the sample following the end of `input`.
    fn run<I>(&self, input: &I) -> Result<T, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;

    /// Rolling one-step predictions into a caller-provided buffer.
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized;

    /// Rolling one-step predictions, allocated.
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}
