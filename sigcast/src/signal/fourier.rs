//! O(N²) discrete Fourier transform pair.
//!
//! The forward transform puts the sine projection in the real component and
//! the cosine projection in the imaginary component:
//!
//! `X[k] = Σ x[n] * (sin(ω) + i·cos(ω))`, `ω = 2πkn/N`
//!
//! so bin `k` holds `i·E[k]` where `E` is the textbook spectrum
//! `Σ x[n]·e^{-iω}`. [`to_euler`] and [`from_euler`] convert between the two.
//! The inverse undoes exactly this convention, so `idft(dft(x)) == x` up to
//! rounding.

use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D, Write1D};
use crate::signal::traits::{Dft1D, Idft1D};
use alloc::vec;
use alloc::vec::Vec;
use nalgebra::{Complex, RealField};

/// Constructor config for [`DftKernel`] and [`IdftKernel`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FourierConfig;

/// Trait-first forward DFT kernel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DftKernel;

/// Trait-first inverse DFT kernel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdftKernel;

impl KernelLifecycle for DftKernel {
    type Config = FourierConfig;

    fn try_new(_: Self::Config) -> Result<Self, ConfigError> {
        Ok(Self)
    }
}

impl KernelLifecycle for IdftKernel {
    type Config = FourierConfig;

    fn try_new(_: Self::Config) -> Result<Self, ConfigError> {
        Ok(Self)
    }
}

/// Convert a bin from this crate's convention to the textbook `Σ x·e^{-iω}` form.
pub fn to_euler<F>(bin: Complex<F>) -> Complex<F>
where
    F: RealField + Copy,
{
    Complex::new(bin.im, -bin.re)
}

/// Convert a textbook `Σ x·e^{-iω}` bin to this crate's convention.
pub fn from_euler<F>(bin: Complex<F>) -> Complex<F>
where
    F: RealField + Copy,
{
    Complex::new(-bin.im, bin.re)
}

/// Angle of the `(k * n) mod N` twiddle. Reducing the product first keeps the
/// argument inside `[0, 2π)` for long inputs.
#[inline]
fn twiddle_angle<F>(step: F, k: usize, n: usize, len: usize) -> F
where
    F: RealField + Copy,
{
    step * nalgebra::convert::<f64, F>(((k * n) % len) as f64)
}

fn angular_step<F>(len: usize) -> F
where
    F: RealField + Copy,
{
    F::two_pi() / nalgebra::convert::<f64, F>(len as f64)
}

fn ensure_non_empty(len: usize) -> Result<(), ExecInvariantViolation> {
    if len == 0 {
        return Err(ExecInvariantViolation::InvalidInput {
            arg: "signal",
            reason: "transform length must be at least 1",
        });
    }
    Ok(())
}

fn dft_impl<F>(signal: &[F], out: &mut [Complex<F>])
where
    F: RealField + Copy,
{
    let len = signal.len();
    let step = angular_step::<F>(len);
    for (k, bin) in out.iter_mut().enumerate() {
        let mut acc = Complex::new(F::zero(), F::zero());
        for (n, &sample) in signal.iter().enumerate() {
            let (sin, cos) = twiddle_angle(step, k, n, len).sin_cos();
            acc.re += sample * sin;
            acc.im += sample * cos;
        }
        *bin = acc;
    }
}

fn idft_impl<F>(spectrum: &[Complex<F>], out: &mut [F])
where
    F: RealField + Copy,
{
    let len = spectrum.len();
    let step = angular_step::<F>(len);
    let scale = F::one() / nalgebra::convert::<f64, F>(len as f64);
    for (n, sample) in out.iter_mut().enumerate() {
        let mut acc = F::zero();
        for (k, &bin) in spectrum.iter().enumerate() {
            let euler = to_euler(bin);
            let (sin, cos) = twiddle_angle(step, n, k, len).sin_cos();
            acc += cos * euler.re - sin * euler.im;
        }
        *sample = acc * scale;
    }
}

impl<F> Dft1D<F> for DftKernel
where
    F: RealField + Copy,
{
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
        O: Write1D<Complex<F>> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        ensure_non_empty(input.len())?;
        let out = out
            .write_slice_mut()
            .map_err(ExecInvariantViolation::from)?;
        if out.len() != input.len() {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "out",
                expected: input.len(),
                got: out.len(),
            });
        }
        dft_impl(input, out);
        Ok(())
    }

    fn run_alloc<I>(&self, input: &I) -> Result<Vec<Complex<F>>, ExecInvariantViolation>
    where
        I: Read1D<F> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        ensure_non_empty(input.len())?;
        let mut out = vec![Complex::new(F::zero(), F::zero()); input.len()];
        dft_impl(input, &mut out);
        Ok(out)
    }
}

impl<F> Idft1D<F> for IdftKernel
where
    F: RealField + Copy,
{
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<Complex<F>> + ?Sized,
        O: Write1D<F> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        ensure_non_empty(input.len())?;
        let out = out
            .write_slice_mut()
            .map_err(ExecInvariantViolation::from)?;
        if out.len() != input.len() {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "out",
                expected: input.len(),
                got: out.len(),
            });
        }
        idft_impl(input, out);
        Ok(())
    }

    fn run_alloc<I>(&self, input: &I) -> Result<Vec<F>, ExecInvariantViolation>
    where
        I: Read1D<Complex<F>> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        ensure_non_empty(input.len())?;
        let mut out = vec![F::zero(); input.len()];
        idft_impl(input, &mut out);
        Ok(out)
    }
}

/// Forward DFT of a real signal.
///
/// Fails with [`ExecInvariantViolation::InvalidInput`] when `signal` is empty.
pub fn dft<F>(signal: &[F]) -> Result<Vec<Complex<F>>, ExecInvariantViolation>
where
    F: RealField + Copy,
{
    DftKernel.run_alloc(signal)
}

/// Inverse DFT back to real samples, scaled by `1/N`.
///
/// Fails with [`ExecInvariantViolation::InvalidInput`] when `spectrum` is empty.
pub fn idft<F>(spectrum: &[Complex<F>]) -> Result<Vec<F>, ExecInvariantViolation>
where
    F: RealField + Copy,
{
    IdftKernel.run_alloc(spectrum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::Rng;

    #[test]
    fn constant_signal_concentrates_in_bin_zero() {
        let c = 2.5f64;
        let x = vec![c; 8];
        let spectrum = dft(&x).expect("non-empty input");
        assert_eq!(spectrum.len(), 8);

        assert_abs_diff_eq!(spectrum[0].im, 8.0 * c, epsilon = 1e-12);
        assert_abs_diff_eq!(spectrum[0].re, 0.0, epsilon = 1e-12);
        for bin in &spectrum[1..] {
            assert_abs_diff_eq!(bin.re, 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(bin.im, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn leading_impulse_is_flat_cosine_spectrum() {
        let spectrum = dft(&[1.0f64, 0.0, 0.0, 0.0, 0.0]).expect("non-empty input");
        for bin in spectrum {
            assert_abs_diff_eq!(bin.re, 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(bin.im, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn single_sample_round_trips() {
        let spectrum = dft(&[-3.0f64]).expect("single sample");
        assert_eq!(spectrum, vec![Complex::new(0.0, -3.0)]);
        assert_eq!(idft(&spectrum).expect("single bin"), vec![-3.0]);
    }

    #[test]
    fn round_trip_reconstructs_random_signals() {
        let mut rng = rand::rng();
        for _ in 0..25 {
            let len = rng.random_range(1..96);
            let x: Vec<f64> = (0..len).map(|_| rng.random_range(-100.0..100.0)).collect();
            let y = idft(&dft(&x).expect("dft")).expect("idft");
            assert_eq!(y.len(), x.len());
            for (a, b) in x.iter().zip(y.iter()) {
                assert_abs_diff_eq!(*a, *b, epsilon = 1e-9 * (1.0 + a.abs()));
            }
        }
    }

    #[test]
    fn round_trip_holds_for_f32() {
        let x: Vec<f32> = (0..32).map(|i| (i as f32 * 0.37).sin() * 4.0).collect();
        let y = idft(&dft(&x).expect("dft")).expect("idft");
        for (a, b) in x.iter().zip(y.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-3);
        }
    }

    #[test]
    fn matches_fft_after_euler_mapping() {
        use rustfft::FftPlanner;

        let x: Vec<f64> = (0..48)
            .map(|i| {
                let t = i as f64 / 7.0;
                t.sin() + 0.4 * (3.1 * t).cos() - 0.2
            })
            .collect();
        let spectrum = dft(&x).expect("dft");

        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(x.len());
        let mut buf: Vec<rustfft::num_complex::Complex<f64>> = x
            .iter()
            .map(|&v| rustfft::num_complex::Complex::new(v, 0.0))
            .collect();
        fft.process(&mut buf);

        for (ours, reference) in spectrum.iter().zip(buf.iter()) {
            let euler = to_euler(*ours);
            assert_abs_diff_eq!(euler.re, reference.re, epsilon = 1e-9);
            assert_abs_diff_eq!(euler.im, reference.im, epsilon = 1e-9);
        }
    }

    #[test]
    fn euler_helpers_are_inverse() {
        let bin = Complex::new(1.25f64, -0.5);
        assert_eq!(from_euler(to_euler(bin)), bin);
        assert_eq!(to_euler(from_euler(bin)), bin);
    }

    #[test]
    fn empty_transforms_are_rejected() {
        let expected = ExecInvariantViolation::InvalidInput {
            arg: "signal",
            reason: "transform length must be at least 1",
        };
        assert_eq!(dft::<f64>(&[]).expect_err("empty dft"), expected);
        assert_eq!(idft::<f64>(&[]).expect_err("empty idft"), expected);

        let mut out: [Complex<f64>; 0] = [];
        assert_eq!(
            DftKernel
                .run_into(&[] as &[f64], &mut out)
                .expect_err("empty dft run_into"),
            expected
        );
    }

    #[test]
    fn kernel_run_into_checks_spectrum_length() {
        let kernel = DftKernel::try_new(FourierConfig).expect("kernel should initialize");
        let mut out = vec![Complex::new(0.0f64, 0.0); 3];
        let err = kernel
            .run_into(&[1.0f64, 2.0, 3.0, 4.0], &mut out)
            .expect_err("mis-sized spectrum");
        assert_eq!(
            err,
            ExecInvariantViolation::LengthMismatch {
                arg: "out",
                expected: 4,
                got: 3,
            }
        );
    }

    #[test]
    fn inverse_kernel_run_into_fills_caller_buffer() {
        let forward = DftKernel;
        let inverse = IdftKernel::try_new(FourierConfig).expect("kernel should initialize");
        let x = [0.5f64, -1.0, 2.0, 0.25];
        let spectrum = forward.run_alloc(&x).expect("dft");
        let mut y = [0.0f64; 4];
        inverse
            .run_into(&spectrum, &mut y)
            .expect("idft run_into should succeed");
        for (a, b) in x.iter().zip(y.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
        }
    }
}
