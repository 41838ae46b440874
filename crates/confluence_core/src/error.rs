//! Error type shared by every core operation.

use thiserror::Error;

/// Precondition violations reported at the core boundary.
///
/// All operations are total over their documented domains, so the only
/// failure is a caller handing in something outside of it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StreamError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, StreamError>;

/// Returns early with [`StreamError::InvalidArgument`].
macro_rules! invalid {
    ($($arg:tt)*) => {
        return Err($crate::error::StreamError::InvalidArgument(format!($($arg)*)))
    };
}

pub(crate) use invalid;

pub(crate) fn ensure_finite(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        invalid!("{name} must be finite, got {value}.");
    }
    Ok(())
}

pub(crate) fn ensure_non_negative(name: &str, value: f64) -> Result<()> {
    ensure_finite(name, value)?;
    if value < 0.0 {
        invalid!("{name} must be non-negative, got {value}.");
    }
    Ok(())
}

pub(crate) fn ensure_positive(name: &str, value: f64) -> Result<()> {
    ensure_finite(name, value)?;
    if value <= 0.0 {
        invalid!("{name} must be positive, got {value}.");
    }
    Ok(())
}
