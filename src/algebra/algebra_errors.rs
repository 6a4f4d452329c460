//! Error type shared by the function algebra, the calculus layer, the Newton solver
//! and the approximation constructors.
use std::fmt;

/// Error types for operations on multivariate functions
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionError {
    /// division by a function, negative or fractional powers
    UnsupportedOperation(String),
    /// point outside every subdomain of a piecewise function
    DomainError(String),
    /// re-basing an exponential overflowed or underflowed; only produced by the optional check
    BaseConversionPrecision { rate: f64, from: f64, to: f64 },
    /// too few observations or knots
    InsufficientData { needed: usize, got: usize },
    /// Jacobian, Hessian or design matrix not invertible
    SingularSystem(String),
    /// iteration budget exhausted or no improving split found
    NonConvergence(String),
    /// the function depends on a dimension the point does not assign
    MissingDimension(String),
    InvalidInput(String),
}

impl fmt::Display for FunctionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FunctionError::UnsupportedOperation(msg) => {
                write!(f, "Unsupported operation: {}", msg)
            }
            FunctionError::DomainError(msg) => write!(f, "Domain error: {}", msg),
            FunctionError::BaseConversionPrecision { rate, from, to } => write!(
                f,
                "Changing base from {} to {} with rate {} is outside machine precision",
                from, to, rate
            ),
            FunctionError::InsufficientData { needed, got } => write!(
                f,
                "Insufficient data: at least {} points needed, got {}",
                needed, got
            ),
            FunctionError::SingularSystem(msg) => write!(f, "Singular system: {}", msg),
            FunctionError::NonConvergence(msg) => write!(f, "No convergence: {}", msg),
            FunctionError::MissingDimension(dim) => {
                write!(f, "No value given for dimension '{}'", dim)
            }
            FunctionError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for FunctionError {}

pub type Result<T> = std::result::Result<T, FunctionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = FunctionError::InsufficientData { needed: 2, got: 1 };
        assert_eq!(
            err.to_string(),
            "Insufficient data: at least 2 points needed, got 1"
        );
        let err = FunctionError::MissingDimension("y".to_string());
        assert_eq!(err.to_string(), "No value given for dimension 'y'");
    }

    #[test]
    fn test_boxed_error() {
        let err: Box<dyn std::error::Error> =
            Box::new(FunctionError::UnsupportedOperation("division".to_string()));
        assert!(err.to_string().contains("division"));
    }
}
