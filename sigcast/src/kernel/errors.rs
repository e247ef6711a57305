use core::fmt;

/// Validation errors raised at kernel construction or adapter binding time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A configuration argument value is invalid.
    InvalidArgument {
        /// Name of the argument.
        arg: &'static str,
        /// Human readable reason.
        reason: &'static str,
    },
    /// A contiguous 1D slice view could not be obtained.
    NonContiguous {
        /// Name of the argument that is non-contiguous.
        arg: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidArgument { arg, reason } => {
                write!(f, "Invalid argument `{arg}`: {reason}")
            }
            ConfigError::NonContiguous { arg } => {
                write!(f, "Argument `{arg}` is not contiguous in memory.")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Runtime failures reported by checked kernel entrypoints.
///
/// Every variant is returned before any output is produced, so a failed call
/// never leaves a partially written result behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecInvariantViolation {
    /// The input cannot be processed at all, e.g. a zero-length transform.
    InvalidInput {
        /// Name of the argument.
        arg: &'static str,
        /// Human readable reason.
        reason: &'static str,
    },
    /// Fewer samples than the predictor needs as history.
    InsufficientSamples {
        /// Name of the argument.
        arg: &'static str,
        /// Minimum number of samples.
        required: usize,
        /// Received number of samples.
        got: usize,
    },
    /// Levinson-Durbin reached a non-positive prediction error.
    DegenerateSignal {
        /// Zero-based recursion stage whose reflection coefficient could not
        /// be formed.
        stage: usize,
    },
    /// Output length mismatched the expected runtime shape.
    LengthMismatch {
        /// Name of the argument.
        arg: &'static str,
        /// Required length.
        expected: usize,
        /// Received length.
        got: usize,
    },
    /// Adapter binding/configuration failure.
    Config(ConfigError),
}

impl From<ConfigError> for ExecInvariantViolation {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl fmt::Display for ExecInvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecInvariantViolation::InvalidInput { arg, reason } => {
                write!(f, "Invalid input `{arg}`: {reason}")
            }
            ExecInvariantViolation::InsufficientSamples { arg, required, got } => {
                write!(
                    f,
                    "Insufficient samples in `{arg}`. Required at least {required}, got {got}."
                )
            }
            ExecInvariantViolation::DegenerateSignal { stage } => {
                write!(
                    f,
                    "Degenerate signal: prediction error vanished at recursion stage {stage}."
                )
            }
            ExecInvariantViolation::LengthMismatch { arg, expected, got } => {
                write!(
                    f,
                    "Execution length mismatch on `{arg}`. Expected {expected}, got {got}."
                )
            }
            ExecInvariantViolation::Config(err) => write!(f, "{err}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ExecInvariantViolation {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecInvariantViolation::Config(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn insufficient_samples_message_names_argument() {
        let err = ExecInvariantViolation::InsufficientSamples {
            arg: "input",
            required: 3,
            got: 2,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient samples in `input`. Required at least 3, got 2."
        );
    }

    #[test]
    fn config_error_converts_and_displays_transparently() {
        let cfg = ConfigError::InvalidArgument {
            arg: "order",
            reason: "order must be > 0",
        };
        let err = ExecInvariantViolation::from(cfg.clone());
        assert_eq!(err, ExecInvariantViolation::Config(cfg.clone()));
        assert_eq!(err.to_string(), cfg.to_string());
    }

    #[cfg(feature = "std")]
    #[test]
    fn config_error_is_exposed_as_source() {
        use std::error::Error;

        let err = ExecInvariantViolation::from(ConfigError::NonContiguous { arg: "array" });
        assert!(err.source().is_some());
        assert!(ExecInvariantViolation::DegenerateSignal { stage: 1 }
            .source()
            .is_none());
    }
}
