use crate::foundation::core::SampleFormat;

/// Convenience alias for results carrying a [`TessellaError`].
pub type TessellaResult<T> = Result<T, TessellaError>;

/// Errors raised by Tessella.
///
/// Everything here surfaces at plan construction or at the host boundary;
/// absence of coverage, alpha or ROI in the hot path is never an error.
#[derive(thiserror::Error, Debug)]
pub enum TessellaError {
    /// A source, alpha image or tile does not share the expected sample
    /// format.
    #[error("sample format is not the same for every source: expected {expected:?}, found {found:?}")]
    MismatchedSampleFormat {
        /// Format derived from the first source (or the layout hint).
        expected: SampleFormat,
        /// Offending format.
        found: SampleFormat,
    },

    /// A source or alpha image does not carry the expected number of bands.
    #[error("band count mismatch: expected {expected}, found {found}")]
    MismatchedBandCount {
        /// Required band count (1 for alpha images).
        expected: usize,
        /// Offending band count.
        found: usize,
    },

    /// Without sources, the layout hint cannot supply a complete layout.
    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    /// A source's no-data range element type does not match the source's
    /// sample format.
    #[error("no-data range format {found:?} does not match the source sample format {expected:?}")]
    InvalidNoDataRange {
        /// The source's sample format.
        expected: SampleFormat,
        /// The range's element format.
        found: SampleFormat,
    },

    /// A host-contract or argument violation outside the structured kinds.
    #[error("validation error: {0}")]
    Validation(String),

    /// Foreign error passthrough.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TessellaError {
    /// Build a [`TessellaError::Validation`] from any message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TessellaError::InvalidLayout`] from any message.
    pub fn invalid_layout(msg: impl Into<String>) -> Self {
        Self::InvalidLayout(msg.into())
    }
}
