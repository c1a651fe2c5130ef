//! The crate's collections and the errors they report.

use alloc::alloc::{Layout, LayoutError};
use core::fmt::{self, Display};

pub mod binary_heap;
pub mod buffer;

#[doc(no_inline)]
pub use binary_heap::BinaryHeap;

#[doc(no_inline)]
pub use buffer::GrowableBuffer;

/// The error type for operations on this crate's collections.
///
/// Misuse that a caller can trigger (an empty collection, an index past the end,
/// a zero capacity) is reported here rather than by panicking, as is any failure
/// to obtain memory. Whenever an operation returns an error, the collection it
/// was called on is left exactly as it was before the call.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Error {
    /// An argument was outside the domain the operation accepts.
    InvalidArgument(&'static str),

    /// The operation needs at least one element, but the collection was empty.
    EmptyCollection,

    /// An index was not less than the collection's length.
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// The collection's length at the time of the call.
        len: usize,
    },

    /// Memory could not be obtained.
    Alloc(TryReserveError),
}

impl From<TryReserveError> for Error {
    #[inline]
    fn from(error: TryReserveError) -> Self {
        Error::Alloc(error)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(reason) => write!(f, "invalid argument: {reason}"),
            Error::EmptyCollection => f.write_str("the collection is empty"),
            Error::IndexOutOfRange { index, len } => {
                write!(f, "index {index} is out of range for length {len}")
            }
            Error::Alloc(error) => Display::fmt(error, f),
        }
    }
}

/// The error returned when a collection cannot obtain the memory it needs.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TryReserveError {
    kind: TryReserveErrorKind,
}

impl TryReserveError {
    /// Details about the allocation that caused the error
    #[inline]
    #[must_use]
    pub fn kind(&self) -> TryReserveErrorKind {
        self.kind.clone()
    }
}

/// Details of the allocation that caused a [`TryReserveError`]
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TryReserveErrorKind {
    /// The requested capacity, in bytes, does not fit a valid [`Layout`].
    CapacityOverflow,

    /// The allocator refused the request.
    AllocError {
        /// The layout that was requested
        layout: Layout,
    },
}

impl From<TryReserveErrorKind> for TryReserveError {
    #[inline]
    fn from(kind: TryReserveErrorKind) -> Self {
        Self { kind }
    }
}

impl From<LayoutError> for TryReserveErrorKind {
    /// Always evaluates to [`TryReserveErrorKind::CapacityOverflow`].
    #[inline]
    fn from(_: LayoutError) -> Self {
        TryReserveErrorKind::CapacityOverflow
    }
}

impl Display for TryReserveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("memory allocation failed")?;
        match self.kind {
            TryReserveErrorKind::CapacityOverflow => {
                f.write_str(" because the computed capacity exceeded the collection's maximum")
            }
            TryReserveErrorKind::AllocError { layout } => write!(
                f,
                " because the allocator refused {} bytes aligned to {}",
                layout.size(),
                layout.align()
            ),
        }
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "std")] {
        impl std::error::Error for Error {
            fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
                match self {
                    Error::Alloc(error) => Some(error),
                    _ => None,
                }
            }
        }

        impl std::error::Error for TryReserveError {}
    } else if #[cfg(feature = "error_in_core")] {
        impl core::error::Error for Error {
            fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
                match self {
                    Error::Alloc(error) => Some(error),
                    _ => None,
                }
            }
        }

        impl core::error::Error for TryReserveError {}
    }
}

/// Shorthand for the error reported when the allocator refuses `layout`.
#[inline]
pub(crate) fn alloc_error(layout: Layout) -> Error {
    Error::Alloc(TryReserveErrorKind::AllocError { layout }.into())
}

/// Shorthand for the error reported when a capacity overflows its layout.
#[inline]
pub(crate) fn capacity_overflow() -> Error {
    Error::Alloc(TryReserveErrorKind::CapacityOverflow.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::ToString;

    #[test]
    fn test_display() {
        assert_eq!(Error::EmptyCollection.to_string(), "the collection is empty");
        assert_eq!(
            Error::IndexOutOfRange { index: 7, len: 3 }.to_string(),
            "index 7 is out of range for length 3"
        );
        assert_eq!(
            Error::InvalidArgument("capacity must be at least one element").to_string(),
            "invalid argument: capacity must be at least one element"
        );
        assert_eq!(
            capacity_overflow().to_string(),
            "memory allocation failed because the computed capacity exceeded the collection's maximum"
        );

        let layout = Layout::from_size_align(32, 8).unwrap();
        assert_eq!(
            alloc_error(layout).to_string(),
            "memory allocation failed because the allocator refused 32 bytes aligned to 8"
        );
    }

    #[test]
    fn test_kind() {
        let layout = Layout::new::<u32>();
        match alloc_error(layout) {
            Error::Alloc(error) => {
                assert_eq!(error.kind(), TryReserveErrorKind::AllocError { layout })
            }
            other => panic!("unexpected error {other:?}"),
        }

        let overflow = Layout::array::<u64>(usize::MAX).unwrap_err();
        assert_eq!(TryReserveErrorKind::from(overflow), TryReserveErrorKind::CapacityOverflow);
    }
}
