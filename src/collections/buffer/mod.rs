//! A contiguous, capacity-doubling buffer of fixed-size elements.
//!
//! [`GrowableBuffer`] is a deliberately small relative of `Vec`: it is created
//! with an explicit capacity, doubles that capacity whenever an append would
//! overflow it, and reports every allocation failure to its caller instead of
//! aborting. A failed operation never leaves the buffer half-modified.
//!
//! # Examples
//!
//! ```
//! use heapvec::GrowableBuffer;
//!
//! let mut buffer = GrowableBuffer::with_capacity(1)?;
//! buffer.push('a')?;
//! buffer.push('b')?;
//! buffer.push('c')?;
//!
//! assert_eq!(buffer.len(), 3);
//! assert_eq!(buffer.capacity(), 4);
//! assert_eq!(buffer.get(1), Ok(&'b'));
//! assert_eq!(buffer.pop(), Ok('c'));
//!
//! // Resizing below the length discards the tail.
//! buffer.set_capacity(1)?;
//! assert_eq!(buffer.as_slice(), ['a']);
//! # Ok::<(), heapvec::Error>(())
//! ```

use alloc::alloc::Layout;
use core::fmt;
use core::marker::PhantomData;
use core::mem;
use core::ptr::{self, NonNull};
use core::slice;

use super::{alloc_error, capacity_overflow, Error};
use crate::polyfill::{Allocator, Global};

#[cfg(test)]
mod tests;

/// The factor by which capacity is multiplied when an append finds the buffer full.
pub const GROWTH_FACTOR: usize = 2;

/// A contiguous growable buffer of `T`, allocated through `A`.
///
/// Length never exceeds capacity, and capacity is never zero. `T` must not be
/// a zero-sized type.
pub struct GrowableBuffer<T, A: Allocator = Global> {
    ptr: NonNull<T>,
    cap: usize,
    len: usize,
    alloc: A,
    marker: PhantomData<T>,
}

// SAFETY: the buffer owns its elements and its allocation outright.
unsafe impl<T: Send, A: Allocator + Send> Send for GrowableBuffer<T, A> {}
// SAFETY: shared access only ever hands out `&T` and `&A`.
unsafe impl<T: Sync, A: Allocator + Sync> Sync for GrowableBuffer<T, A> {}

impl<T> GrowableBuffer<T> {
    /// Creates an empty buffer with room for exactly `capacity` elements,
    /// allocated from the global allocator.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `capacity` is zero or `T` is zero-sized,
    /// and [`Error::Alloc`] if the memory cannot be obtained.
    pub fn with_capacity(capacity: usize) -> Result<Self, Error> {
        Self::with_capacity_in(capacity, Global)
    }
}

impl<T, A: Allocator> GrowableBuffer<T, A> {
    /// Creates an empty buffer with room for exactly `capacity` elements,
    /// allocated from `alloc`.
    ///
    /// # Errors
    ///
    /// As for [`with_capacity`](GrowableBuffer::with_capacity).
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Result<Self, Error> {
        if mem::size_of::<T>() == 0 {
            return Err(Error::InvalidArgument("element type must not be zero-sized"));
        }
        if capacity == 0 {
            return Err(Error::InvalidArgument("capacity must be at least one element"));
        }

        let layout = array_layout::<T>(capacity)?;
        let ptr = alloc.allocate(layout).map_err(|_| {
            debug!(capacity, "buffer allocation failed");
            alloc_error(layout)
        })?;

        Ok(GrowableBuffer { ptr: ptr.cast(), cap: capacity, len: 0, alloc, marker: PhantomData })
    }

    /// Returns the number of elements in the buffer.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the buffer holds no elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of elements the buffer can hold without reallocating.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Returns a reference to the underlying allocator.
    #[inline]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Appends `value` to the back of the buffer.
    ///
    /// A full buffer first has its capacity multiplied by [`GROWTH_FACTOR`].
    ///
    /// # Errors
    ///
    /// [`Error::Alloc`] if growing fails. The buffer is then unchanged and
    /// `value` is dropped.
    pub fn push(&mut self, value: T) -> Result<(), Error> {
        if self.len == self.cap {
            let new_cap = self.cap.checked_mul(GROWTH_FACTOR).ok_or_else(capacity_overflow)?;
            trace!(old_capacity = self.cap, new_capacity = new_cap, "growing buffer");
            self.reallocate(new_cap)?;
        }

        // SAFETY: len < cap, so the slot is inside the allocation and unused.
        unsafe { self.ptr.as_ptr().add(self.len).write(value) };
        self.len += 1;
        Ok(())
    }

    /// Removes the last element and returns it.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyCollection`] if the buffer is empty.
    pub fn pop(&mut self) -> Result<T, Error> {
        if self.len == 0 {
            return Err(Error::EmptyCollection);
        }
        self.len -= 1;
        // SAFETY: the slot at the old `len - 1` was initialized and is now
        //  outside the live range, so reading it out transfers ownership.
        Ok(unsafe { self.ptr.as_ptr().add(self.len).read() })
    }

    /// Returns a reference to the element at `index`.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfRange`] if `index >= self.len()`.
    pub fn get(&self, index: usize) -> Result<&T, Error> {
        let len = self.len;
        self.as_slice().get(index).ok_or(Error::IndexOutOfRange { index, len })
    }

    /// Returns a mutable reference to the element at `index`.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfRange`] if `index >= self.len()`.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T, Error> {
        let len = self.len;
        self.as_mut_slice().get_mut(index).ok_or(Error::IndexOutOfRange { index, len })
    }

    /// Extracts a slice containing the entire buffer.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the first `len` slots are initialized.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Extracts a mutable slice containing the entire buffer.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: the first `len` slots are initialized and uniquely borrowed.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Shortens the buffer to `len` elements, dropping the rest. Does nothing if
    /// the buffer is already that short. Capacity is unaffected.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        let remaining = self.len - len;
        // SAFETY: `len..self.len` are initialized; shrinking `self.len` first
        //  means a panicking destructor cannot cause a double drop.
        unsafe {
            let tail = ptr::slice_from_raw_parts_mut(self.ptr.as_ptr().add(len), remaining);
            self.len = len;
            ptr::drop_in_place(tail);
        }
    }

    /// Drops every element, keeping the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Resizes the allocation to hold exactly `new_capacity` elements.
    ///
    /// If `new_capacity` is less than the current length, the trailing elements
    /// that no longer fit are dropped.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `new_capacity` is zero, and [`Error::Alloc`]
    /// if the new allocation cannot be obtained. Either way the buffer keeps its
    /// previous allocation and every element.
    pub fn set_capacity(&mut self, new_capacity: usize) -> Result<(), Error> {
        if new_capacity == 0 {
            return Err(Error::InvalidArgument("capacity must be at least one element"));
        }
        if new_capacity == self.cap {
            return Ok(());
        }
        trace!(old_capacity = self.cap, new_capacity, len = self.len, "resizing buffer");

        if new_capacity >= self.len {
            return self.reallocate(new_capacity);
        }

        // Elements beyond the new capacity have to be dropped, but only once the
        // smaller block is secured, so this path cannot use `shrink`.
        let old_layout = array_layout::<T>(self.cap)?;
        let new_layout = array_layout::<T>(new_capacity)?;
        let new_ptr = self.alloc.allocate(new_layout).map_err(|_| {
            debug!(capacity = new_capacity, "buffer allocation failed");
            alloc_error(new_layout)
        })?;
        let new_ptr = new_ptr.cast::<T>();

        let old_ptr = self.ptr;
        let old_len = self.len;
        // SAFETY: the first `new_capacity` elements move bitwise into the new
        //  block, which cannot overlap the old one. The buffer is pointed at the
        //  new block before the leftover tail is dropped, and the old block is
        //  released with the layout it was allocated with.
        unsafe {
            ptr::copy_nonoverlapping(old_ptr.as_ptr(), new_ptr.as_ptr(), new_capacity);
            self.ptr = new_ptr;
            self.cap = new_capacity;
            self.len = new_capacity;

            let tail = ptr::slice_from_raw_parts_mut(
                old_ptr.as_ptr().add(new_capacity),
                old_len - new_capacity,
            );
            ptr::drop_in_place(tail);
            self.alloc.deallocate(old_ptr.cast(), old_layout);
        }
        Ok(())
    }

    /// Moves the live elements into an allocation of `new_cap` slots.
    ///
    /// Requires `new_cap >= self.len`.
    fn reallocate(&mut self, new_cap: usize) -> Result<(), Error> {
        debug_assert!(new_cap >= self.len);
        let old_layout = array_layout::<T>(self.cap)?;
        let new_layout = array_layout::<T>(new_cap)?;
        let old_ptr = self.ptr.cast::<u8>();

        // SAFETY: `old_ptr` was allocated by `self.alloc` with `old_layout`,
        //  and the size ordering each method requires is checked here.
        let result = unsafe {
            if new_cap > self.cap {
                self.alloc.grow(old_ptr, old_layout, new_layout)
            } else {
                self.alloc.shrink(old_ptr, old_layout, new_layout)
            }
        };

        match result {
            Ok(ptr) => {
                self.ptr = ptr.cast();
                self.cap = new_cap;
                Ok(())
            }
            Err(_) => {
                debug!(capacity = new_cap, "buffer reallocation failed");
                Err(alloc_error(new_layout))
            }
        }
    }
}

impl<T, A: Allocator> Drop for GrowableBuffer<T, A> {
    fn drop(&mut self) {
        self.clear();
        if let Ok(layout) = Layout::array::<T>(self.cap) {
            // SAFETY: the block was allocated by `self.alloc` with this layout,
            //  which was already validated when it was allocated.
            unsafe { self.alloc.deallocate(self.ptr.cast(), layout) }
        }
    }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for GrowableBuffer<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

#[inline]
fn array_layout<T>(capacity: usize) -> Result<Layout, Error> {
    Layout::array::<T>(capacity).map_err(|_| capacity_overflow())
}
