//! Error types for the estimator.

use thiserror::Error;

/// Errors reported by the estimator.
///
/// Whenever an operation returns an error, the filter state is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FilterError {
    /// A tag's geometry makes the range update ill-defined.
    #[error("Degenerate geometry for tag {tag}: {cause}")]
    DegenerateGeometry {
        /// The index of the offending tag within the batch.
        tag: usize,
        /// What made the geometry degenerate.
        cause: DegenerateCause,
    },

    /// A raw measurement row has too few fields.
    #[error("Invalid input shape: expected at least {expected} fields, found {found}")]
    InvalidInputShape { expected: usize, found: usize },

    /// A tag batch exceeds the number of tags tracked per update.
    #[error("Too many tags: capacity is {capacity}, batch has {found}")]
    TooManyTags { capacity: usize, found: usize },

    /// A value handed to a setter is NaN or infinite.
    #[error("Non-finite value in {0}")]
    NonFinite(&'static str),
}

/// The reason a tag's geometry was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DegenerateCause {
    /// The tag sits at zero height, so its noise scaling divides by zero.
    #[error("tag is at zero height")]
    ZeroTagHeight,

    /// The innovation variance is zero, so the gain divides by zero.
    #[error("innovation variance is zero")]
    ZeroInnovationVariance,
}
