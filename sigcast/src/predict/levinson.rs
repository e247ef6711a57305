//! Autocorrelation and Levinson-Durbin autoregressive coefficient estimation.
//!
//! Coefficients follow the prediction-error filter convention
//! `A(z) = 1 + a[1]·z⁻¹ + … + a[P]·z⁻ᴾ`, returned without the leading unity
//! tap, so the one-step prediction is `x̂[n] = -Σ a[i]·x[n-i]`.

use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D, Write1D};
use crate::signal::traits::{Autocorrelate1D, LevinsonDurbin1D};
use alloc::vec;
use alloc::vec::Vec;
use nalgebra::RealField;

/// How the recursion reacts when the prediction error stops being positive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DegeneratePolicy {
    /// Fail with [`ExecInvariantViolation::DegenerateSignal`].
    #[default]
    Reject,
    /// Use a zero reflection coefficient for the affected stage and every
    /// later one, keeping the coefficients already estimated.
    ZeroReflection,
}

/// Constructor config for [`AutocorrelateKernel`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AutocorrelateConfig {
    /// Highest lag to compute.
    pub order: usize,
}

/// Trait-first autocorrelation kernel over lags `0..=order`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AutocorrelateKernel {
    order: usize,
}

impl AutocorrelateKernel {
    /// Return configured highest lag.
    pub fn order(&self) -> usize {
        self.order
    }
}

impl KernelLifecycle for AutocorrelateKernel {
    type Config = AutocorrelateConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        Ok(Self {
            order: config.order,
        })
    }
}

fn ensure_history<F>(signal: &[F], order: usize) -> Result<(), ExecInvariantViolation> {
    if signal.len() <= order {
        return Err(ExecInvariantViolation::InsufficientSamples {
            arg: "signal",
            required: order + 1,
            got: signal.len(),
        });
    }
    Ok(())
}

/// `r[i] = Σ_j signal[j] * signal[j + i]`; caller guarantees `signal.len() > out.len() - 1`.
fn autocorrelate_impl<F>(signal: &[F], out: &mut [F])
where
    F: RealField + Copy,
{
    for (lag, r) in out.iter_mut().enumerate() {
        *r = signal
            .iter()
            .zip(signal[lag..].iter())
            .fold(F::zero(), |acc, (&x, &y)| acc + x * y);
    }
}

impl<F> Autocorrelate1D<F> for AutocorrelateKernel
where
    F: RealField + Copy,
{
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
        O: Write1D<F> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        ensure_history(input, self.order)?;
        let out = out
            .write_slice_mut()
            .map_err(ExecInvariantViolation::from)?;
        if out.len() != self.order + 1 {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "out",
                expected: self.order + 1,
                got: out.len(),
            });
        }
        autocorrelate_impl(input, out);
        Ok(())
    }

    fn run_alloc<I>(&self, input: &I) -> Result<Vec<F>, ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        ensure_history(input, self.order)?;
        let mut out = vec![F::zero(); self.order + 1];
        autocorrelate_impl(input, &mut out);
        Ok(out)
    }
}

/// Output of a Levinson-Durbin run.
#[derive(Debug, Clone, PartialEq)]
pub struct LevinsonResult<F> {
    /// Prediction-error filter taps `a[1..=P]`.
    pub coefficients: Vec<F>,
    /// Reflection coefficient of every recursion stage.
    pub reflection: Vec<F>,
    /// Prediction error power left after the final stage.
    pub error: F,
}

impl<F> LevinsonResult<F>
where
    F: RealField + Copy,
{
    /// Prediction order.
    pub fn order(&self) -> usize {
        self.coefficients.len()
    }

    /// True when every reflection coefficient has magnitude below one, i.e.
    /// all poles of `1 / A(z)` lie strictly inside the unit circle.
    pub fn is_stable(&self) -> bool {
        self.reflection.iter().all(|k| k.abs() < F::one())
    }
}

/// Run the recursion on an autocorrelation sequence `r[0..=P]`.
///
/// Both halves of the symmetric tap update are read before either is
/// written, so the result does not depend on update order.
pub fn levinson_durbin<F>(
    autocorr: &[F],
    policy: DegeneratePolicy,
) -> Result<LevinsonResult<F>, ExecInvariantViolation>
where
    F: RealField + Copy,
{
    if autocorr.is_empty() {
        return Err(ExecInvariantViolation::InvalidInput {
            arg: "autocorr",
            reason: "autocorrelation must contain at least lag 0",
        });
    }
    let order = autocorr.len() - 1;
    let mut a = vec![F::zero(); order + 1];
    a[0] = F::one();
    let mut reflection = Vec::with_capacity(order);
    let mut error = autocorr[0];

    for k in 0..order {
        // Written so NaN also lands in the degenerate branch.
        let lambda = if error > F::zero() {
            let acc = a[..=k]
                .iter()
                .zip(autocorr[1..=k + 1].iter().rev())
                .fold(F::zero(), |acc, (&aj, &rj)| acc + aj * rj);
            -acc / error
        } else {
            match policy {
                DegeneratePolicy::Reject => {
                    return Err(ExecInvariantViolation::DegenerateSignal { stage: k });
                }
                DegeneratePolicy::ZeroReflection => {
                    log::warn!(
                        "levinson-durbin: prediction error vanished at stage {k}, using zero reflection"
                    );
                    F::zero()
                }
            }
        };

        for n in 0..=(k + 1) / 2 {
            let lo = a[n];
            let hi = a[k + 1 - n];
            a[n] = lo + lambda * hi;
            a[k + 1 - n] = hi + lambda * lo;
        }

        error *= F::one() - lambda * lambda;
        reflection.push(lambda);
    }

    a.remove(0);
    Ok(LevinsonResult {
        coefficients: a,
        reflection,
        error,
    })
}

/// Constructor config for [`LevinsonKernel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevinsonConfig {
    /// Number of coefficients to estimate.
    pub order: usize,
    /// Reaction to a vanishing prediction error.
    pub degenerate: DegeneratePolicy,
}

/// Trait-first Levinson-Durbin estimator working from raw samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevinsonKernel {
    order: usize,
    degenerate: DegeneratePolicy,
}

impl LevinsonKernel {
    /// Return configured order.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Return configured degenerate-signal policy.
    pub fn degenerate(&self) -> DegeneratePolicy {
        self.degenerate
    }
}

impl KernelLifecycle for LevinsonKernel {
    type Config = LevinsonConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if config.order == 0 {
            return Err(ConfigError::InvalidArgument {
                arg: "order",
                reason: "order must be > 0",
            });
        }
        Ok(Self {
            order: config.order,
            degenerate: config.degenerate,
        })
    }
}

impl<F> LevinsonDurbin1D<F> for LevinsonKernel
where
    F: RealField + Copy,
{
    type Output = LevinsonResult<F>;

    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
        O: Write1D<F> + ?Sized,
    {
        let result = self.run(input)?;
        let out = out
            .write_slice_mut()
            .map_err(ExecInvariantViolation::from)?;
        if out.len() != self.order {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "out",
                expected: self.order,
                got: out.len(),
            });
        }
        out.copy_from_slice(&result.coefficients);
        Ok(())
    }

    fn run<I>(&self, input: &I) -> Result<Self::Output, ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        ensure_history(input, self.order)?;
        let mut autocorr = vec![F::zero(); self.order + 1];
        autocorrelate_impl(input, &mut autocorr);
        levinson_durbin(&autocorr, self.degenerate)
    }
}

/// Autocorrelation of `signal` at lags `0..=order`.
pub fn autocorrelate<F>(signal: &[F], order: usize) -> Result<Vec<F>, ExecInvariantViolation>
where
    F: RealField + Copy,
{
    let kernel = AutocorrelateKernel::try_new(AutocorrelateConfig { order })
        .map_err(ExecInvariantViolation::from)?;
    kernel.run_alloc(signal)
}

/// Estimate `order` autoregressive coefficients from `signal`.
///
/// Requires `signal.len() > order` and rejects degenerate (zero-energy)
/// windows with [`ExecInvariantViolation::DegenerateSignal`].
pub fn estimate_coefficients<F>(
    signal: &[F],
    order: usize,
) -> Result<Vec<F>, ExecInvariantViolation>
where
    F: RealField + Copy,
{
    let kernel = LevinsonKernel::try_new(LevinsonConfig {
        order,
        degenerate: DegeneratePolicy::Reject,
    })
    .map_err(ExecInvariantViolation::from)?;
    Ok(kernel.run(signal)?.coefficients)
}
