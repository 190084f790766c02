//! Rejection reasons for path edits.

use thiserror::Error;

/// Why a structural edit or setting change was rejected.
///
/// A rejected operation never modifies the path.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathEditError {
    #[error("segments can only be appended to an open path")]
    ClosedPath,

    #[error("path must keep at least {minimum} segments, has {actual}")]
    TooFewSegments { minimum: usize, actual: usize },

    #[error("point index {index} out of range for {len} points")]
    PointOutOfRange { index: usize, len: usize },

    #[error("segment index {index} out of range for {count} segments")]
    SegmentOutOfRange { index: usize, count: usize },

    #[error("point {0} is not an anchor")]
    NotAnAnchor(usize),

    #[error("spacing must be finite and at least 0.001, got {0}")]
    InvalidSpacing(f32),

    #[error("{len} points do not form a valid control polygon (closed: {closed})")]
    InvalidPointCount { len: usize, closed: bool },
}

/// Result alias for path edits.
pub type PathResult<T> = Result<T, PathEditError>;
