#![allow(unused_imports)]

#[macro_use]
mod definitions {
    use alloc::alloc::Layout;
    use cfg_if::cfg_if;
    use core::ptr::{self, NonNull};

    cfg_if! {
        if #[cfg(feature = "allocator_api")] {
            pub use alloc::alloc::{Allocator, Global};
        } else {
            /// Stable stand-in for the unstable `core::alloc::Allocator` trait.
            ///
            /// Only the methods the crate's collections need are provided. Every
            /// method has a default that goes through the global allocator, so an
            /// implementation only overrides what it wants to intercept (usually
            /// [`allocate`](Allocator::allocate)).
            ///
            /// Enabling the `allocator_api` feature replaces this trait with the
            /// real one.
            pub trait Allocator {
                /// Attempts to allocate a block of memory fitting `layout`.
                ///
                /// `layout` is never zero-sized when called from this crate.
                #[inline]
                fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, ()> {
                    // SAFETY: collections in this crate never request zero-sized
                    //  allocations, which is the only precondition of `alloc`.
                    let data = NonNull::new(unsafe { alloc::alloc::alloc(layout) }).ok_or(())?;
                    Ok(NonNull::slice_from_raw_parts(data, layout.size()))
                }

                /// Deallocates the memory referenced by `ptr`.
                ///
                /// # Safety
                ///
                /// `ptr` must denote a block currently allocated by this allocator
                /// with `layout`.
                #[inline]
                unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
                    if layout.size() != 0 {
                        unsafe { alloc::alloc::dealloc(ptr.as_ptr(), layout) }
                    }
                }

                /// Attempts to extend the block at `ptr` to `new_layout`.
                ///
                /// On failure the original block is left untouched.
                ///
                /// # Safety
                ///
                /// `ptr` must denote a block currently allocated by this allocator
                /// with `old_layout`, and `new_layout.size()` must not be smaller
                /// than `old_layout.size()`.
                unsafe fn grow(
                    &self,
                    ptr: NonNull<u8>,
                    old_layout: Layout,
                    new_layout: Layout,
                ) -> Result<NonNull<[u8]>, ()> {
                    debug_assert!(new_layout.size() >= old_layout.size());
                    let new_ptr = self.allocate(new_layout)?;
                    // SAFETY: both blocks are valid for `old_layout.size()` bytes
                    //  and cannot overlap, since the new one was just allocated.
                    unsafe {
                        ptr::copy_nonoverlapping(
                            ptr.as_ptr(),
                            new_ptr.cast::<u8>().as_ptr(),
                            old_layout.size(),
                        );
                        self.deallocate(ptr, old_layout);
                    }
                    Ok(new_ptr)
                }

                /// Attempts to shrink the block at `ptr` to `new_layout`.
                ///
                /// On failure the original block is left untouched.
                ///
                /// # Safety
                ///
                /// `ptr` must denote a block currently allocated by this allocator
                /// with `old_layout`, and `new_layout.size()` must not be larger
                /// than `old_layout.size()`.
                unsafe fn shrink(
                    &self,
                    ptr: NonNull<u8>,
                    old_layout: Layout,
                    new_layout: Layout,
                ) -> Result<NonNull<[u8]>, ()> {
                    debug_assert!(new_layout.size() <= old_layout.size());
                    let new_ptr = self.allocate(new_layout)?;
                    // SAFETY: both blocks are valid for `new_layout.size()` bytes
                    //  and cannot overlap.
                    unsafe {
                        ptr::copy_nonoverlapping(
                            ptr.as_ptr(),
                            new_ptr.cast::<u8>().as_ptr(),
                            new_layout.size(),
                        );
                        self.deallocate(ptr, old_layout);
                    }
                    Ok(new_ptr)
                }
            }

            /// The global memory allocator.
            #[derive(Copy, Clone, Debug, Default)]
            pub struct Global;

            impl Global {
                #[inline]
                unsafe fn realloc(
                    &self,
                    ptr: NonNull<u8>,
                    old_layout: Layout,
                    new_layout: Layout,
                ) -> Result<NonNull<[u8]>, ()> {
                    debug_assert_eq!(old_layout.align(), new_layout.align());
                    // SAFETY: the caller guarantees `ptr` was allocated with
                    //  `old_layout`; sizes are non-zero for this crate's buffers.
                    let raw = unsafe { alloc::alloc::realloc(ptr.as_ptr(), old_layout, new_layout.size()) };
                    let data = NonNull::new(raw).ok_or(())?;
                    Ok(NonNull::slice_from_raw_parts(data, new_layout.size()))
                }
            }

            // `realloc` can resize in place, which the copying defaults cannot.
            impl Allocator for Global {
                #[inline]
                unsafe fn grow(
                    &self,
                    ptr: NonNull<u8>,
                    old_layout: Layout,
                    new_layout: Layout,
                ) -> Result<NonNull<[u8]>, ()> {
                    unsafe { self.realloc(ptr, old_layout, new_layout) }
                }

                #[inline]
                unsafe fn shrink(
                    &self,
                    ptr: NonNull<u8>,
                    old_layout: Layout,
                    new_layout: Layout,
                ) -> Result<NonNull<[u8]>, ()> {
                    unsafe { self.realloc(ptr, old_layout, new_layout) }
                }
            }

            impl<A: Allocator + ?Sized> Allocator for &A {
                #[inline]
                fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, ()> {
                    (**self).allocate(layout)
                }

                #[inline]
                unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
                    unsafe { (**self).deallocate(ptr, layout) }
                }

                #[inline]
                unsafe fn grow(
                    &self,
                    ptr: NonNull<u8>,
                    old_layout: Layout,
                    new_layout: Layout,
                ) -> Result<NonNull<[u8]>, ()> {
                    unsafe { (**self).grow(ptr, old_layout, new_layout) }
                }

                #[inline]
                unsafe fn shrink(
                    &self,
                    ptr: NonNull<u8>,
                    old_layout: Layout,
                    new_layout: Layout,
                ) -> Result<NonNull<[u8]>, ()> {
                    unsafe { (**self).shrink(ptr, old_layout, new_layout) }
                }
            }
        }
    }

    cfg_if! {
        if #[cfg(feature = "tracing")] {
            macro_rules! trace {
                ($($arg:tt)+) => { tracing::trace!($($arg)+) };
            }

            macro_rules! debug {
                ($($arg:tt)+) => { tracing::debug!($($arg)+) };
            }
        } else {
            macro_rules! trace {
                ($($arg:tt)+) => {};
            }

            macro_rules! debug {
                ($($arg:tt)+) => {};
            }
        }
    }
}

pub use definitions::{Allocator, Global};
