use thiserror::Error;

/// Errors reported by fallible [`Vector`](crate::Vector) operations.
///
/// Every check runs before the vector is touched, so an `Err` always leaves the
/// vector exactly as it was before the call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum VectorError {
    /// Indexed access at or beyond the current length.
    #[error("index {index} is out of range for a vector of length {len}")]
    OutOfRange { index: usize, len: usize },

    /// A cursor offset outside the range accepted by the operation.
    #[error("iterator offset {offset} is out of bounds for a vector of length {len}")]
    IteratorOutOfRange { offset: isize, len: usize },

    /// `pop_back()` on an empty vector.
    #[error("pop_back() invalid: vector is already empty")]
    InvalidOperation,

    /// The cursor was obtained from a buffer this vector no longer owns, either
    /// because the vector reallocated or because it came from another vector.
    #[error("iterator was invalidated by a reallocation or belongs to another vector")]
    InvalidatedIterator,
}
