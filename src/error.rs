// SPDX-License-Identifier: Apache-2.0

//! Failure codes for the memory operations.

use thiserror::Error;

/// Error returned by the memory operations.
///
/// Only recoverable conditions are represented here. Contract
/// violations — a zero-size allocation request, freeing internal memory
/// at a different granularity than it was allocated at — indicate a bug
/// in the caller and trap immediately instead of being returned.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum Error {
    /// The arguments do not describe a legal request.
    #[error("invalid argument")]
    InvalidArgument,

    /// The requested address collides with an existing reservation.
    #[error("access denied")]
    Denied,

    /// The page allocator is exhausted, or the VMA registry is full.
    #[error("out of memory")]
    OutOfMemory,
}

/// Result type returned by the memory operations.
pub type Result<T> = core::result::Result<T, Error>;
