//! Multi-step linear-prediction forecasting.
//!
//! Coefficients are estimated from the whole input window with
//! [`LevinsonKernel`], then every forecast frame is fed back as history for
//! the next one. When the last three samples are nearly constant the forecast
//! is flat and no estimation happens at all.

use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D, Write1D};
use crate::linalg::polynomial_roots;
use crate::predict::levinson::{DegeneratePolicy, LevinsonConfig, LevinsonKernel};
use crate::signal::traits::{LevinsonDurbin1D, LpcForecast1D};
use alloc::vec;
use alloc::vec::Vec;
use itertools::Itertools;
use nalgebra::{Complex, RealField};

/// Samples inspected by the stillness test.
const STILLNESS_WINDOW: usize = 3;

/// Default maximum step between the last three samples that still counts as
/// "not moving".
pub const DEFAULT_STILLNESS_THRESHOLD: f64 = 0.01;

/// Constructor config for [`LpcForecastKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LpcForecastConfig<F> {
    /// Prediction order (number of poles).
    pub order: usize,
    /// Number of frames to forecast.
    pub frames: usize,
    /// Both of the last two steps must be strictly below this for the flat
    /// forecast to apply.
    pub stillness_threshold: F,
    /// Reaction to a vanishing prediction error during estimation.
    pub degenerate: DegeneratePolicy,
}

impl<F> LpcForecastConfig<F>
where
    F: RealField + Copy,
{
    /// Config with the default stillness threshold and degenerate policy.
    pub fn new(order: usize, frames: usize) -> Self {
        Self {
            order,
            frames,
            stillness_threshold: nalgebra::convert(DEFAULT_STILLNESS_THRESHOLD),
            degenerate: DegeneratePolicy::default(),
        }
    }
}

/// Trait-first LPC forecaster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LpcForecastKernel<F> {
    frames: usize,
    stillness_threshold: F,
    levinson: LevinsonKernel,
}

impl<F> LpcForecastKernel<F>
where
    F: RealField + Copy,
{
    /// Return configured prediction order.
    pub fn order(&self) -> usize {
        self.levinson.order()
    }

    /// Return configured forecast horizon.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Return configured stillness threshold.
    pub fn stillness_threshold(&self) -> F {
        self.stillness_threshold
    }

    /// Last sample when the tail of `input` is still; caller guarantees at
    /// least [`STILLNESS_WINDOW`] samples.
    fn still_value(&self, input: &[F]) -> Option<F> {
        let tail = &input[input.len() - STILLNESS_WINDOW..];
        let still = tail
            .iter()
            .tuple_windows()
            .all(|(&prev, &next)| (next - prev).abs() < self.stillness_threshold);
        still.then(|| tail[STILLNESS_WINDOW - 1])
    }

    fn forecast(&self, input: &[F]) -> Result<Vec<F>, ExecInvariantViolation> {
        if input.len() < STILLNESS_WINDOW {
            return Err(ExecInvariantViolation::InsufficientSamples {
                arg: "input",
                required: STILLNESS_WINDOW.max(self.order() + 1),
                got: input.len(),
            });
        }
        if let Some(last) = self.still_value(input) {
            log::debug!(
                "lpc forecast: input is still, emitting {} flat frames",
                self.frames
            );
            return Ok(vec![last; self.frames]);
        }
        if input.len() <= self.order() {
            return Err(ExecInvariantViolation::InsufficientSamples {
                arg: "input",
                required: self.order() + 1,
                got: input.len(),
            });
        }
        let estimate = LevinsonDurbin1D::<F>::run(&self.levinson, input)?;
        Ok(extrapolate(input, &estimate.coefficients, self.frames))
    }
}

impl<F> KernelLifecycle for LpcForecastKernel<F>
where
    F: RealField + Copy,
{
    type Config = LpcForecastConfig<F>;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        let threshold = config.stillness_threshold;
        if !threshold.is_finite() || threshold < F::zero() {
            return Err(ConfigError::InvalidArgument {
                arg: "stillness_threshold",
                reason: "stillness threshold must be finite and >= 0",
            });
        }
        let levinson = LevinsonKernel::try_new(LevinsonConfig {
            order: config.order,
            degenerate: config.degenerate,
        })?;
        Ok(Self {
            frames: config.frames,
            stillness_threshold: threshold,
            levinson,
        })
    }
}

/// Run the all-pole predictor forward for `frames` steps.
///
/// `history` grows append-only; the caller's samples are copied, never
/// touched.
fn extrapolate<F>(input: &[F], coeffs: &[F], frames: usize) -> Vec<F>
where
    F: RealField + Copy,
{
    let mut history = Vec::with_capacity(input.len() + frames);
    history.extend_from_slice(input);
    for _ in 0..frames {
        let next = -history
            .iter()
            .rev()
            .zip(coeffs.iter())
            .fold(F::zero(), |acc, (&x, &a)| acc + x * a);
        history.push(next);
    }
    history.split_off(input.len())
}

impl<F> LpcForecast1D<F> for LpcForecastKernel<F>
where
    F: RealField + Copy,
{
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
        O: Write1D<F> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        let out = out
            .write_slice_mut()
            .map_err(ExecInvariantViolation::from)?;
        if out.len() != self.frames {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "out",
                expected: self.frames,
                got: out.len(),
            });
        }
        let frames = self.forecast(input)?;
        out.copy_from_slice(&frames);
        Ok(())
    }

    fn run_alloc<I>(&self, input: &I) -> Result<Vec<F>, ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        self.forecast(input)
    }
}

/// Forecast `frames` samples past the end of `signal` with an order-`order`
/// linear predictor.
///
/// ```
/// use sigcast::predict::lpc::predict_lpc;
///
/// let flat = predict_lpc(&[5.0, 5.0, 5.0, 5.0], 8, 3).unwrap();
/// assert_eq!(flat, vec![5.0; 3]);
/// ```
pub fn predict_lpc<F>(
    signal: &[F],
    order: usize,
    frames: usize,
) -> Result<Vec<F>, ExecInvariantViolation>
where
    F: RealField + Copy,
{
    let kernel = LpcForecastKernel::try_new(LpcForecastConfig::new(order, frames))
        .map_err(ExecInvariantViolation::from)?;
    kernel.run_alloc(signal)
}

/// Poles of the all-pole model `1 / A(z)` for prediction-error taps
/// `a[1..=P]`, i.e. the roots of `zᴾ + a[1]·zᴾ⁻¹ + … + a[P]`.
///
/// An empty tap list has no poles.
pub fn lpc_poles<F>(coeffs: &[F]) -> Result<Vec<Complex<F>>, ExecInvariantViolation>
where
    F: RealField + Copy,
{
    if coeffs.is_empty() {
        return Ok(Vec::new());
    }
    let mut monic = Vec::with_capacity(coeffs.len() + 1);
    monic.push(F::one());
    monic.extend_from_slice(coeffs);
    polynomial_roots(&monic)
}
