use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D};
use alloc::vec;
use alloc::vec::Vec;
use nalgebra::{Complex, DMatrix, RealField};

/// 1D companion-matrix construction capability.
pub trait CompanionBuild1D<T> {
    /// Output matrix type.
    type Output;

    /// Build companion matrix from polynomial coefficients.
    fn run<I>(&self, input: &I) -> Result<Self::Output, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// Constructor config for [`CompanionKernel`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompanionConfig {
    /// Optional expected coefficient length.
    pub expected_len: Option<usize>,
}

/// Trait-first companion-matrix kernel.
///
/// For `p(z) = c[0]·zᴹ + c[1]·zᴹ⁻¹ + … + c[M]` the first row holds
/// `-c[i] / c[0]` and the sub-diagonal is one, so the eigenvalues are the
/// roots of `p`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompanionKernel {
    expected_len: Option<usize>,
}

impl KernelLifecycle for CompanionKernel {
    type Config = CompanionConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if let Some(expected_len) = config.expected_len {
            if expected_len < 2 {
                return Err(ConfigError::InvalidArgument {
                    arg: "expected_len",
                    reason: "companion requires at least 2 coefficients",
                });
            }
        }
        Ok(Self {
            expected_len: config.expected_len,
        })
    }
}

impl<T> CompanionBuild1D<T> for CompanionKernel
where
    T: RealField + Copy,
{
    type Output = DMatrix<T>;

    fn run<I>(&self, input: &I) -> Result<Self::Output, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
    {
        let coeffs = input.read_slice().map_err(ExecInvariantViolation::from)?;
        if coeffs.len() < 2 {
            return Err(ExecInvariantViolation::InvalidInput {
                arg: "coeffs",
                reason: "companion requires at least 2 coefficients",
            });
        }
        if let Some(expected_len) = self.expected_len {
            if coeffs.len() != expected_len {
                return Err(ExecInvariantViolation::LengthMismatch {
                    arg: "coeffs",
                    expected: expected_len,
                    got: coeffs.len(),
                });
            }
        }
        if coeffs[0] == T::zero() {
            return Err(ExecInvariantViolation::InvalidInput {
                arg: "coeffs",
                reason: "leading coefficient must be non-zero",
            });
        }
        Ok(companion_from_slice(coeffs))
    }
}

fn companion_from_slice<T>(coeffs: &[T]) -> DMatrix<T>
where
    T: RealField + Copy,
{
    let m = coeffs.len() - 1;
    let a0 = coeffs[0];
    DMatrix::from_fn(m, m, |row, col| {
        if row == 0 {
            -coeffs[col + 1] / a0
        } else if row == col + 1 {
            T::one()
        } else {
            T::zero()
        }
    })
}

/// Roots of the polynomial `c[0]·zᴹ + … + c[M]`.
///
/// Fails when fewer than two coefficients are given or `c[0]` is zero.
pub fn polynomial_roots<T>(coeffs: &[T]) -> Result<Vec<Complex<T>>, ExecInvariantViolation>
where
    T: RealField + Copy,
{
    let matrix = CompanionKernel::default().run(coeffs)?;
    if matrix.nrows() == 1 {
        return Ok(vec![Complex::new(matrix[(0, 0)], T::zero())]);
    }
    Ok(matrix.complex_eigenvalues().iter().copied().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::matrix;

    #[test]
    fn scipy_example() {
        let coeffs = [1.0f64, -10.0, 31.0, -30.0];
        let kernel = CompanionKernel::try_new(CompanionConfig {
            expected_len: Some(coeffs.len()),
        })
        .expect("kernel should initialize");
        let actual = kernel.run(&coeffs).expect("kernel should run");

        let expected = matrix![
            10., -31.,  30.;
            1.,   0.,   0.;
            0.,   1.,   0.;
        ];
        assert_eq!(actual.nrows(), 3);
        for row in 0..3 {
            for col in 0..3 {
                assert_eq!(actual[(row, col)], expected[(row, col)]);
            }
        }
    }

    #[test]
    fn kernel_validates_config_and_input() {
        let bad_len = CompanionKernel::try_new(CompanionConfig {
            expected_len: Some(1),
        })
        .expect_err("short expected_len should fail");
        assert_eq!(
            bad_len,
            ConfigError::InvalidArgument {
                arg: "expected_len",
                reason: "companion requires at least 2 coefficients",
            }
        );

        let kernel = CompanionKernel::try_new(CompanionConfig {
            expected_len: Some(3),
        })
        .expect("kernel should initialize");
        assert!(matches!(
            kernel.run(&[1.0f64, 2.0]),
            Err(ExecInvariantViolation::LengthMismatch { expected: 3, got: 2, .. })
        ));
        assert!(matches!(
            kernel.run(&[0.0f64, 2.0, 1.0]),
            Err(ExecInvariantViolation::InvalidInput { .. })
        ));
    }

    #[test]
    fn roots_of_cubic_with_integer_roots() {
        // (z - 2)(z - 3)(z - 5)
        let mut roots = polynomial_roots(&[1.0f64, -10.0, 31.0, -30.0]).expect("cubic");
        roots.sort_by(|a, b| a.re.total_cmp(&b.re));
        for (root, expected) in roots.iter().zip([2.0, 3.0, 5.0]) {
            assert_abs_diff_eq!(root.re, expected, epsilon = 1e-9);
            assert_abs_diff_eq!(root.im, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn roots_reject_degenerate_polynomials() {
        assert!(matches!(
            polynomial_roots(&[0.0f64, 1.0, 2.0]),
            Err(ExecInvariantViolation::InvalidInput { arg: "coeffs", .. })
        ));
        assert!(matches!(
            polynomial_roots(&[3.0f64]),
            Err(ExecInvariantViolation::InvalidInput { arg: "coeffs", .. })
        ));
    }

    #[test]
    fn linear_polynomial_has_single_root() {
        let roots = polynomial_roots(&[2.0f64, -1.0]).expect("linear");
        assert_eq!(roots, vec![Complex::new(0.5, 0.0)]);
    }
}
