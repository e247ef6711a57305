//! Finite-difference extrapolation from the last few samples.

use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D, Write1D};
use crate::signal::traits::DeadReckon1D;
use alloc::vec;
use alloc::vec::Vec;
use nalgebra::RealField;

/// Motion model used by [`DeadReckoningKernel`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeadReckoningOrder {
    /// Constant velocity: `last + (last - prev)`.
    #[default]
    Velocity,
    /// Constant acceleration: `last + vel + accel / 2`.
    Acceleration,
}

impl DeadReckoningOrder {
    /// Samples needed for a single prediction.
    pub fn required_samples(self) -> usize {
        match self {
            Self::Velocity => 2,
            Self::Acceleration => 3,
        }
    }
}

/// Constructor config for [`DeadReckoningKernel`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeadReckoningConfig {
    /// Motion model.
    pub order: DeadReckoningOrder,
}

/// Trait-first dead-reckoning kernel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeadReckoningKernel {
    order: DeadReckoningOrder,
}

impl DeadReckoningKernel {
    /// Return configured motion model.
    pub fn order(&self) -> DeadReckoningOrder {
        self.order
    }

    fn ensure_history<F>(&self, input: &[F]) -> Result<(), ExecInvariantViolation> {
        let required = self.order.required_samples();
        if input.len() < required {
            return Err(ExecInvariantViolation::InsufficientSamples {
                arg: "input",
                required,
                got: input.len(),
            });
        }
        Ok(())
    }

    /// Prediction from exactly `required_samples()` trailing values.
    fn step<F>(&self, window: &[F]) -> F
    where
        F: RealField + Copy,
    {
        let n = window.len();
        let last = window[n - 1];
        let vel1 = last - window[n - 2];
        match self.order {
            DeadReckoningOrder::Velocity => last + vel1,
            DeadReckoningOrder::Acceleration => {
                let vel2 = window[n - 2] - window[n - 3];
                let accel = vel1 - vel2;
                last + vel1 + accel / nalgebra::convert::<f64, F>(2.0)
            }
        }
    }
}

impl KernelLifecycle for DeadReckoningKernel {
    type Config = DeadReckoningConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        Ok(Self {
            order: config.order,
        })
    }
}

impl<F> DeadReckon1D<F> for DeadReckoningKernel
where
    F: RealField + Copy,
{
    fn run<I>(&self, input: &I) -> Result<F, ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        self.ensure_history(input)?;
        Ok(self.step(input))
    }

    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
        O: Write1D<F> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        self.ensure_history(input)?;
        let out = out
            .write_slice_mut()
            .map_err(ExecInvariantViolation::from)?;
        let required = self.order.required_samples();
        let expected = input.len() - required + 1;
        if out.len() != expected {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "out",
                expected,
                got: out.len(),
            });
        }
        for (slot, window) in out.iter_mut().zip(input.windows(required)) {
            *slot = self.step(window);
        }
        Ok(())
    }

    fn run_alloc<I>(&self, input: &I) -> Result<Vec<F>, ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        self.ensure_history(input)?;
        let mut out = vec![F::zero(); input.len() - self.order.required_samples() + 1];
        self.run_into(input, &mut out)?;
        Ok(out)
    }
}

/// Constant-velocity prediction of the sample after `signal`.
///
/// ```
/// use sigcast::predict::dead_reckoning::predict_dead_reckoning_1;
///
/// assert_eq!(predict_dead_reckoning_1(&[1.0, 2.0, 3.0]).unwrap(), 4.0);
/// ```
pub fn predict_dead_reckoning_1<F>(signal: &[F]) -> Result<F, ExecInvariantViolation>
where
    F: RealField + Copy,
{
    DeadReckoningKernel::try_new(DeadReckoningConfig {
        order: DeadReckoningOrder::Velocity,
    })
    .map_err(ExecInvariantViolation::from)?
    .run(signal)
}

/// Constant-acceleration prediction of the sample after `signal`.
pub fn predict_dead_reckoning_2<F>(signal: &[F]) -> Result<F, ExecInvariantViolation>
where
    F: RealField + Copy,
{
    DeadReckoningKernel::try_new(DeadReckoningConfig {
        order: DeadReckoningOrder::Acceleration,
    })
    .map_err(ExecInvariantViolation::from)?
    .run(signal)
}
