//! Causal linear convolution truncated to the length of the second operand.

use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D, Write1D};
use crate::signal::traits::Convolve1D;
use alloc::vec;
use alloc::vec::Vec;
use num_traits::NumAssign;

/// Constructor config for [`ConvolveKernel`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvolveConfig;

/// Trait-first causal convolution kernel.
///
/// `out[n] = Σ left[m] * right[n - m]` for `m` in `0..=min(n, left.len() - 1)`
/// and `n` in `0..right.len()`. Samples of `left` past its end contribute
/// nothing, so an empty `left` yields all zeros.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvolveKernel;

impl KernelLifecycle for ConvolveKernel {
    type Config = ConvolveConfig;

    fn try_new(_: Self::Config) -> Result<Self, ConfigError> {
        Ok(Self)
    }
}

fn convolve_impl<T>(left: &[T], right: &[T], out: &mut [T])
where
    T: NumAssign + Copy,
{
    for (n, y) in out.iter_mut().enumerate() {
        *y = left
            .iter()
            .zip(right[..=n].iter().rev())
            .fold(T::zero(), |acc, (&l, &r)| acc + l * r);
    }
}

impl<T> Convolve1D<T> for ConvolveKernel
where
    T: NumAssign + Copy,
{
    fn run_into<I1, I2, O>(
        &self,
        left: &I1,
        right: &I2,
        out: &mut O,
    ) -> Result<(), ExecInvariantViolation>
    where
        I1: Read1D<T> + ?Sized,
        I2: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized,
    {
        let left = left.read_slice().map_err(ExecInvariantViolation::from)?;
        let right = right.read_slice().map_err(ExecInvariantViolation::from)?;
        let out = out
            .write_slice_mut()
            .map_err(ExecInvariantViolation::from)?;
        if out.len() != right.len() {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "out",
                expected: right.len(),
                got: out.len(),
            });
        }
        convolve_impl(left, right, out);
        Ok(())
    }

    fn run_alloc<I1, I2>(&self, left: &I1, right: &I2) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I1: Read1D<T> + ?Sized,
        I2: Read1D<T> + ?Sized,
    {
        let left = left.read_slice().map_err(ExecInvariantViolation::from)?;
        let right = right.read_slice().map_err(ExecInvariantViolation::from)?;
        let mut out = vec![T::zero(); right.len()];
        convolve_impl(left, right, &mut out);
        Ok(out)
    }
}

/// Convolve `left` with `right`, keeping the first `right.len()` samples.
///
/// ```
/// use sigcast::signal::convolve::convolve;
///
/// let y = convolve(&[1.0, 0.5], &[2.0, 4.0, 6.0]);
/// assert_eq!(y, vec![2.0, 5.0, 8.0]);
/// ```
pub fn convolve<T>(left: &[T], right: &[T]) -> Vec<T>
where
    T: NumAssign + Copy,
{
    let mut out = vec![T::zero(); right.len()];
    convolve_impl(left, right, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::Rng;

    #[test]
    fn integer_operands_are_exact() {
        assert_eq!(convolve(&[1i64, 2, 3], &[4, 5, 6, 7]), vec![4, 13, 28, 34]);
    }

    #[test]
    fn unit_impulse_is_identity() {
        let right = [3.0f64, -1.5, 2.25, 0.0, 7.0];
        assert_eq!(convolve(&[1.0], &right), right.to_vec());
    }

    #[test]
    fn output_tracks_second_operand_length() {
        let left = [1.0f64, 2.0, 3.0];
        let right = [0.0f64, 1.0, 0.5];
        // numpy.convolve(left, right)[:3]
        assert_eq!(convolve(&left, &right), vec![0.0, 1.0, 2.5]);
        assert_eq!(convolve(&right, &left), vec![0.0, 1.0, 2.5]);
    }

    #[test]
    fn empty_left_yields_zeros() {
        let y = convolve::<f64>(&[], &[1.0, 2.0, 3.0]);
        assert_eq!(y, vec![0.0; 3]);
    }

    #[test]
    fn shorter_right_only_sees_overlap() {
        let y = convolve(&[1.0f64, 1.0, 1.0, 1.0, 1.0], &[2.0, 3.0]);
        assert_eq!(y, vec![2.0, 5.0]);
        assert!(convolve::<f64>(&[1.0, 2.0], &[]).is_empty());
    }

    #[test]
    fn convolution_is_linear_in_left_operand() {
        let mut rng = rand::rng();
        for _ in 0..20 {
            let len_ab = rng.random_range(1..12);
            let len_c = rng.random_range(1..24);
            let a: Vec<f64> = (0..len_ab).map(|_| rng.random_range(-5.0..5.0)).collect();
            let b: Vec<f64> = (0..len_ab).map(|_| rng.random_range(-5.0..5.0)).collect();
            let c: Vec<f64> = (0..len_c).map(|_| rng.random_range(-5.0..5.0)).collect();
            let sum: Vec<f64> = a.iter().zip(b.iter()).map(|(x, y)| x + y).collect();

            let lhs = convolve(&sum, &c);
            let ya = convolve(&a, &c);
            let yb = convolve(&b, &c);
            for ((l, x), y) in lhs.iter().zip(ya.iter()).zip(yb.iter()) {
                assert_abs_diff_eq!(*l, x + y, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn kernel_run_into_overwrites_stale_output() {
        let kernel = ConvolveKernel::try_new(ConvolveConfig).expect("kernel should initialize");
        let left = [1.0f32, 0.5];
        let right = [2.0f32, 4.0, 6.0];
        let mut out = [99.0f32; 3];
        kernel
            .run_into(&left, &right, &mut out)
            .expect("convolve kernel run_into should succeed");
        assert_eq!(out, [2.0, 5.0, 8.0]);
    }

    #[test]
    fn kernel_run_into_rejects_mis_sized_output() {
        let kernel = ConvolveKernel;
        let mut out = vec![0.0f64; 2];
        let err = kernel
            .run_into(&[1.0f64], &[1.0f64, 2.0, 3.0], &mut out)
            .expect_err("length mismatch should fail");
        assert_eq!(
            err,
            ExecInvariantViolation::LengthMismatch {
                arg: "out",
                expected: 3,
                got: 2,
            }
        );
    }

    #[test]
    fn kernel_accepts_ndarray_operands() {
        use ndarray::array;

        let kernel = ConvolveKernel;
        let left = array![0.5f64, 0.5];
        let right = array![2.0f64, 4.0, 8.0];
        let y = kernel
            .run_alloc(&left, &right)
            .expect("ndarray operands are contiguous");
        assert_eq!(y, vec![1.0, 3.0, 6.0]);
    }
}
