//! Collections that report failure instead of aborting, and that rank their
//! elements with a caller-supplied comparator rather than the [`Ord`] trait.
//!
//! * [`GrowableBuffer`] is a contiguous array that doubles its capacity when
//!   full and hands every allocation failure back to the caller.
//! * [`BinaryHeap`] is a max-priority queue built on a `GrowableBuffer`. It
//!   stores borrowed `&T` handles, so payloads stay wherever the caller keeps
//!   them, and orders them with any [`Comparator`]: a closure, the
//!   [`Ord`]-backed [`OrdComparator`], a [`Reversed`] comparator, or a
//!   [`WithContext`] comparator carrying explicit state.
//!
//! ```
//! use heapvec::{BinaryHeap, Error, OrdComparator};
//!
//! let values = [5, 1, 8, 3, 9, 2];
//! let mut heap = BinaryHeap::with_capacity(1, OrdComparator::default())?;
//! for value in &values {
//!     heap.push(value)?;
//! }
//!
//! let mut sorted = Vec::new();
//! while let Ok(top) = heap.pop() {
//!     sorted.push(*top);
//! }
//! assert_eq!(sorted, [9, 8, 5, 3, 2, 1]);
//! # Ok::<(), Error>(())
//! ```
//!
//! # Features
//!
//! The crate is `no_std` (it needs `alloc`) unless the `std` feature is
//! enabled, which adds `std::error::Error` implementations. On nightly,
//! `allocator_api` swaps the stable [`Allocator`] stand-in for the real trait
//! and `error_in_core` implements `core::error::Error`; `nightly` enables both.
//! The `tracing` feature emits growth and failure diagnostics through the
//! [`tracing`](https://docs.rs/tracing) crate.

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![cfg_attr(feature = "allocator_api", feature(allocator_api))]
#![cfg_attr(feature = "error_in_core", feature(error_in_core))]
// documentation controls
#![cfg_attr(docsrs, feature(doc_auto_cfg, doc_cfg))]
#![deny(missing_docs)]
// linting controls
#![cfg_attr(
    test,
    allow(
        clippy::bool_assert_comparison,
        clippy::needless_range_loop,
        clippy::redundant_clone,
        clippy::useless_vec,
    )
)]

extern crate alloc;

#[macro_use]
mod polyfill;

pub mod collections;
pub mod comparator;

pub use collections::{BinaryHeap, Error, GrowableBuffer};
pub use comparator::{Comparator, OrdComparator, Reversed, WithContext};
pub use polyfill::{Allocator, Global};

#[cfg(test)]
mod testing;
