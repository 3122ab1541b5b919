//! Failures of the observation side channel.

use thiserror::Error;

use debugkit_core::{ReportError, SampleError};

/// A reporter or sampler failure raised by a wrapper's own phases.
///
/// It is converted into the wrapped callable's error type before it leaves
/// the wrapper.
#[derive(Debug, Error)]
pub(crate) enum ObservationError {
    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Sample(#[from] SampleError),
}

impl ObservationError {
    /// Convert into the callable's error type.
    pub(crate) fn into_error<E>(self) -> E
    where
        E: From<ReportError> + From<SampleError>,
    {
        match self {
            ObservationError::Report(e) => E::from(e),
            ObservationError::Sample(e) => E::from(e),
        }
    }
}
