use std::fmt;

/// Result type alias for tree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by [`BTree`](crate::BTree) and [`Cursor`](crate::Cursor).
///
/// An operation that fails leaves the tree exactly as valid as it was before the call;
/// nothing is retried internally.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Minimum degree below 2, or too large for node buffers to be laid out.
    InvalidDegree {
        /// The degree asked for.
        degree: usize,
    },
    /// A buffer of `cap` elements cannot be described by a [`Layout`](std::alloc::Layout).
    CapacityOverflow {
        /// Elements asked for.
        cap: usize,
    },
    /// The allocator could not supply `size` bytes.
    Alloc {
        /// Bytes asked for.
        size: usize,
    },
    /// The tree is taller than the cursor's frame stack.
    DepthExceeded {
        /// Frames available to the cursor.
        limit: usize,
    },
    /// The tree changed since the cursor was created or last reset.
    StaleCursor,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidDegree { degree } => {
                write!(f, "invalid minimum degree {degree} (must be at least 2)")
            }
            Error::CapacityOverflow { cap } => {
                write!(f, "node buffer of {cap} elements overflows the address space")
            }
            Error::Alloc { size } => write!(f, "failed to allocate {size} bytes for a node"),
            Error::DepthExceeded { limit } => {
                write!(f, "tree is deeper than the cursor limit of {limit} frames")
            }
            Error::StaleCursor => write!(f, "cursor used after the tree was modified"),
        }
    }
}

impl std::error::Error for Error {}
