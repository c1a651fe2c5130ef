//! A priority queue of borrowed handles, implemented with a binary heap.
//!
//! The heap never owns what it orders: it stores `&'a T` handles to data the
//! caller keeps, and it ranks them with a [`Comparator`] supplied on
//! construction rather than with `T`'s own [`Ord`]. The borrow guarantees
//! that every payload outlives every heap operation that may look at it.
//!
//! Pushing and popping take *O*(log(*n*)) comparisons; peeking is *O*(1);
//! removing an arbitrary element takes an *O*(*n*) search followed by
//! *O*(log(*n*)) repair.
//!
//! # Examples
//!
//! A small event queue, earliest deadline first:
//!
//! ```
//! use heapvec::{BinaryHeap, Error};
//!
//! struct Event {
//!     deadline: u64,
//!     name: &'static str,
//! }
//!
//! let events = [
//!     Event { deadline: 30, name: "flush" },
//!     Event { deadline: 10, name: "tick" },
//!     Event { deadline: 20, name: "poll" },
//! ];
//!
//! // Earlier deadlines outrank later ones.
//! let mut queue = BinaryHeap::with_capacity(2, |a: &Event, b: &Event| b.deadline.cmp(&a.deadline))?;
//! for event in &events {
//!     queue.push(event)?;
//! }
//!
//! assert_eq!(queue.count(), 3);
//! assert_eq!(queue.pop()?.name, "tick");
//! assert_eq!(queue.pop()?.name, "poll");
//!
//! // Events can be withdrawn before they fire.
//! assert_eq!(queue.remove("flush", |name, event| event.name == name).map(|e| e.deadline), Some(30));
//! assert!(queue.is_empty());
//! assert_eq!(queue.pop().err(), Some(Error::EmptyCollection));
//! # Ok::<(), Error>(())
//! ```

use core::cmp::Ordering;
use core::fmt;
use core::ops::{Deref, DerefMut};
use core::ptr;

use super::buffer::GrowableBuffer;
use super::{capacity_overflow, Error};
use crate::comparator::Comparator;
use crate::polyfill::{Allocator, Global};


/// Slot 0 holds a permanent null handle so that real elements start at 1.
const SENTINEL: usize = 0;
/// The slot holding the greatest element.
const ROOT: usize = 1;

/// A max-priority queue of `&'a T` handles, ordered by a [`Comparator`].
///
/// The handles live in a [`GrowableBuffer`] as an implicit complete binary
/// tree: slot `i` has its parent at `i / 2` and its children at `2 * i` and
/// `2 * i + 1`. Slot 0 is a sentinel and never holds an element. For every
/// element, the comparator never ranks it strictly above its parent.
///
/// It is a logic error for the comparator to change its opinion of two
/// handles while both are in the heap, except through
/// [`comparator_mut`](Self::comparator_mut). The resulting behavior is
/// unspecified but stays confined to the heap: no handle is ever lost,
/// duplicated or dereferenced after its borrow ends.
///
/// Elements of equal priority come out in no particular order.
pub struct BinaryHeap<'a, T: ?Sized, C, A: Allocator = Global> {
    slots: GrowableBuffer<Option<&'a T>, A>,
    comparator: C,
}

impl<'a, T: ?Sized, C: Comparator<T>> BinaryHeap<'a, T, C> {
    /// Creates an empty heap with room for `capacity_hint` elements before
    /// it first has to grow.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `capacity_hint` is zero, and
    /// [`Error::Alloc`] if the backing buffer cannot be allocated.
    ///
    /// # Examples
    ///
    /// ```
    /// use heapvec::{BinaryHeap, Error, OrdComparator};
    ///
    /// let heap = BinaryHeap::<u8, _>::with_capacity(16, OrdComparator::default())?;
    /// assert!(heap.capacity() >= 16);
    ///
    /// let zero = BinaryHeap::<u8, _>::with_capacity(0, OrdComparator::default());
    /// assert!(matches!(zero, Err(Error::InvalidArgument(_))));
    /// # Ok::<(), Error>(())
    /// ```
    pub fn with_capacity(capacity_hint: usize, comparator: C) -> Result<Self, Error> {
        Self::with_capacity_in(capacity_hint, comparator, Global)
    }
}

impl<'a, T: ?Sized, C: Comparator<T>, A: Allocator> BinaryHeap<'a, T, C, A> {
    /// Creates an empty heap whose buffer is allocated from `alloc`.
    ///
    /// # Errors
    ///
    /// As for [`with_capacity`](BinaryHeap::with_capacity). Anything allocated
    /// before the failure is released again.
    pub fn with_capacity_in(capacity_hint: usize, comparator: C, alloc: A) -> Result<Self, Error> {
        if capacity_hint == 0 {
            return Err(Error::InvalidArgument("capacity hint must be at least one element"));
        }
        let slot_count = capacity_hint.checked_add(1).ok_or_else(capacity_overflow)?;
        let mut slots = GrowableBuffer::with_capacity_in(slot_count, alloc)?;
        slots.push(None)?;
        Ok(BinaryHeap { slots, comparator })
    }

    /// Returns the number of elements in the heap.
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.slots.len() - 1
    }

    /// Returns the number of elements in the heap; an alias of
    /// [`count`](Self::count).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.count()
    }

    /// Returns `true` if the heap holds no elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Returns how many elements the heap can hold before it has to grow.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.capacity() - 1
    }

    /// Pushes a handle onto the heap.
    ///
    /// # Errors
    ///
    /// [`Error::Alloc`] if the heap was full and could not grow. The heap is
    /// then unchanged.
    ///
    /// # Time complexity
    ///
    /// *O*(log(*n*)) comparisons, plus a reallocation whenever the capacity
    /// doubles.
    pub fn push(&mut self, handle: &'a T) -> Result<(), Error> {
        self.slots.push(Some(handle))?;
        let last = self.count();
        self.sift_up(last);
        Ok(())
    }

    /// Returns the greatest handle without removing it.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyCollection`] if the heap is empty.
    pub fn peek(&self) -> Result<&'a T, Error> {
        match self.slots.get(ROOT) {
            Ok(slot) => Ok(occupied(*slot)),
            Err(_) => Err(Error::EmptyCollection),
        }
    }

    /// Removes the greatest handle and returns it.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyCollection`] if the heap is empty.
    ///
    /// # Time complexity
    ///
    /// *O*(log(*n*)) comparisons.
    pub fn pop(&mut self) -> Result<&'a T, Error> {
        if self.is_empty() {
            return Err(Error::EmptyCollection);
        }
        Ok(self.remove_at(ROOT))
    }

    /// Removes the first handle, in slot order, for which `is_equal(target,
    /// handle)` holds, and returns it. Returns `None`, leaving the heap as it
    /// was, if there is no such handle.
    ///
    /// Slot order is unrelated to priority, so with several matching handles
    /// it is unspecified which one is removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use heapvec::{BinaryHeap, OrdComparator};
    ///
    /// let values = [10, 10, 5];
    /// let mut heap = BinaryHeap::with_capacity(3, OrdComparator::default())?;
    /// for value in &values {
    ///     heap.push(value)?;
    /// }
    ///
    /// assert_eq!(heap.remove(&10, |target, value| target == value), Some(&10));
    /// assert_eq!(heap.count(), 2);
    /// assert_eq!(heap.peek(), Ok(&10));
    ///
    /// assert_eq!(heap.remove(&7, |target, value| target == value), None);
    /// assert_eq!(heap.count(), 2);
    /// # Ok::<(), heapvec::Error>(())
    /// ```
    ///
    /// # Time complexity
    ///
    /// *O*(*n*) calls to `is_equal`, then *O*(log(*n*)) comparisons.
    pub fn remove<Q, F>(&mut self, target: &Q, mut is_equal: F) -> Option<&'a T>
    where
        Q: ?Sized,
        F: FnMut(&Q, &T) -> bool,
    {
        let index = self.position(|handle| is_equal(target, handle))?;
        Some(self.remove_at(index))
    }

    /// Removes `handle` itself, as identified by its address rather than by
    /// value, and returns whether it was found.
    ///
    /// ```
    /// use heapvec::{BinaryHeap, OrdComparator};
    ///
    /// let (a, b) = (4, 4);
    /// let mut heap = BinaryHeap::with_capacity(2, OrdComparator::default())?;
    /// heap.push(&a)?;
    /// heap.push(&b)?;
    ///
    /// assert!(heap.remove_handle(&b));
    /// assert!(!heap.remove_handle(&b));
    /// assert!(std::ptr::eq(heap.peek()?, &a));
    /// # Ok::<(), heapvec::Error>(())
    /// ```
    pub fn remove_handle(&mut self, handle: &T) -> bool {
        match self.position(|candidate| ptr::eq(candidate, handle)) {
            Some(index) => {
                self.remove_at(index);
                true
            }
            None => false,
        }
    }

    /// Removes every handle, keeping the allocated capacity.
    pub fn clear(&mut self) {
        self.slots.truncate(ROOT);
    }

    /// Shrinks the capacity of the heap as much as possible.
    ///
    /// # Errors
    ///
    /// [`Error::Alloc`] if the allocator refuses the smaller block; the heap
    /// keeps its old capacity.
    pub fn shrink_to_fit(&mut self) -> Result<(), Error> {
        let len = self.slots.len();
        self.slots.set_capacity(len)
    }

    /// Borrows the comparator.
    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Mutably borrows the comparator. When the returned guard is dropped the
    /// heap is rebuilt, so the comparator (or the context it carries) may be
    /// changed in ways that reorder the elements.
    ///
    /// ```
    /// use heapvec::{BinaryHeap, WithContext};
    ///
    /// let keys = ['a', 'b', 'c'];
    /// let by_weight = WithContext::new([3, 2, 1], |a: &char, b: &char, weights: &[i32; 3]| {
    ///     let weight = |c: &char| weights[(*c as u8 - b'a') as usize];
    ///     weight(a).cmp(&weight(b))
    /// });
    ///
    /// let mut heap = BinaryHeap::with_capacity(3, by_weight)?;
    /// for key in &keys {
    ///     heap.push(key)?;
    /// }
    /// assert_eq!(heap.peek(), Ok(&'a'));
    ///
    /// heap.comparator_mut().context_mut()[2] = 9;
    /// assert_eq!(heap.peek(), Ok(&'c'));
    /// # Ok::<(), heapvec::Error>(())
    /// ```
    pub fn comparator_mut(&mut self) -> ComparatorMut<'_, 'a, T, C, A> {
        ComparatorMut(self)
    }

    /// Returns `true` if no element is ranked strictly above its parent.
    ///
    /// This always holds as long as the comparator is a consistent total
    /// preorder and no comparison has panicked.
    pub fn is_heap(&self) -> bool {
        let slots = self.slots.as_slice();
        (ROOT + 1..slots.len()).all(|child| {
            let parent = occupied(slots[child / 2]);
            self.comparator.compare(parent, occupied(slots[child])) != Ordering::Less
        })
    }

    /// Returns the slot of the first handle satisfying `predicate`.
    fn position<P>(&self, mut predicate: P) -> Option<usize>
    where
        P: FnMut(&'a T) -> bool,
    {
        self.slots.as_slice()[ROOT..]
            .iter()
            .position(|slot| predicate(occupied(*slot)))
            .map(|offset| offset + ROOT)
    }

    /// Removes the handle at slot `index` (which must hold an element) and
    /// restores heap order around the slot it vacated.
    fn remove_at(&mut self, index: usize) -> &'a T {
        let last = self.count();
        debug_assert!((ROOT..=last).contains(&index));

        self.slots.as_mut_slice().swap(index, last);
        let removed = match self.slots.pop() {
            Ok(slot) => occupied(slot),
            Err(_) => unreachable!("the sentinel keeps the buffer non-empty"),
        };

        if index != last {
            // The handle moved into `index` came from the bottom of the tree;
            // at most one of the two directions can move it.
            if self.sift_up(index) == index {
                self.sift_down(index);
            }
        }
        removed
    }

    /// Moves the handle at `pos` towards the root while it outranks its
    /// parent. Returns its final slot.
    fn sift_up(&mut self, pos: usize) -> usize {
        let comparator = &self.comparator;
        let mut hole = Hole::new(self.slots.as_mut_slice(), pos);

        while let Some(parent) = parent_of(hole.pos()) {
            if !comparator.outranks(hole.element(), hole.get(parent)) {
                break;
            }
            hole.move_to(parent);
        }

        hole.pos()
    }

    /// Moves the handle at `pos` towards the leaves while its greater child
    /// outranks it. Returns its final slot.
    fn sift_down(&mut self, pos: usize) -> usize {
        let comparator = &self.comparator;
        let mut hole = Hole::new(self.slots.as_mut_slice(), pos);

        while let Some(child) = greater_child(comparator, &hole) {
            if !comparator.outranks(hole.get(child), hole.element()) {
                break;
            }
            hole.move_to(child);
        }

        hole.pos()
    }

    /// Restores heap order over every slot, bottom-up.
    fn rebuild(&mut self) {
        trace!(count = self.count(), "rebuilding heap");
        let mut n = self.count() / 2;
        while n >= ROOT {
            self.sift_down(n);
            n -= 1;
        }
    }
}

impl<T: ?Sized + fmt::Debug, C, A: Allocator> fmt::Debug for BinaryHeap<'_, T, C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.slots.as_slice()[ROOT..].iter().flatten()).finish()
    }
}

/// Guard returned by [`BinaryHeap::comparator_mut`]; rebuilds the heap when
/// dropped.
pub struct ComparatorMut<'h, 'a, T: ?Sized, C: Comparator<T>, A: Allocator = Global>(
    &'h mut BinaryHeap<'a, T, C, A>,
);

impl<T: ?Sized, C: Comparator<T>, A: Allocator> Deref for ComparatorMut<'_, '_, T, C, A> {
    type Target = C;
    fn deref(&self) -> &C {
        &self.0.comparator
    }
}

impl<T: ?Sized, C: Comparator<T>, A: Allocator> DerefMut for ComparatorMut<'_, '_, T, C, A> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.0.comparator
    }
}

impl<T: ?Sized, C: Comparator<T>, A: Allocator> Drop for ComparatorMut<'_, '_, T, C, A> {
    fn drop(&mut self) {
        self.0.rebuild();
    }
}

/// Unwraps a slot that heap arithmetic guarantees is not the sentinel.
#[inline]
fn occupied<T: ?Sized>(slot: Option<&T>) -> &T {
    match slot {
        Some(handle) => handle,
        None => unreachable!("slot {SENTINEL} is never part of the tree"),
    }
}

#[inline]
fn parent_of(pos: usize) -> Option<usize> {
    if pos > ROOT {
        Some(pos / 2)
    } else {
        None
    }
}

/// Returns the child of the hole that ranks highest, preferring the second
/// child on ties, or `None` for a leaf.
#[inline]
fn greater_child<T: ?Sized, C: Comparator<T>>(comparator: &C, hole: &Hole<'_, '_, T>) -> Option<usize> {
    let first = 2 * hole.pos();
    if first >= hole.len() {
        return None;
    }
    let second = first + 1;
    if second >= hole.len() || comparator.outranks(hole.get(first), hole.get(second)) {
        Some(first)
    } else {
        Some(second)
    }
}

/// A slot whose handle has been lifted out while it is being sifted.
///
/// The slot at `pos` still holds a stale copy; dropping the hole writes the
/// lifted handle back into it, so a panicking comparator leaves every handle
/// in the heap exactly once.
struct Hole<'s, 'a, T: ?Sized> {
    slots: &'s mut [Option<&'a T>],
    element: &'a T,
    pos: usize,
}

impl<'s, 'a, T: ?Sized> Hole<'s, 'a, T> {
    #[inline]
    fn new(slots: &'s mut [Option<&'a T>], pos: usize) -> Self {
        let element = occupied(slots[pos]);
        Hole { slots, element, pos }
    }

    #[inline]
    fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns the lifted handle.
    #[inline]
    fn element(&self) -> &'a T {
        self.element
    }

    /// Returns the handle at `index`, which must not be the hole itself.
    #[inline]
    fn get(&self, index: usize) -> &'a T {
        debug_assert!(index != self.pos);
        occupied(self.slots[index])
    }

    /// Moves the handle at `index` into the hole, and the hole to `index`.
    #[inline]
    fn move_to(&mut self, index: usize) {
        debug_assert!(index != self.pos);
        self.slots[self.pos] = self.slots[index];
        self.pos = index;
    }
}

impl<T: ?Sized> Drop for Hole<'_, '_, T> {
    #[inline]
    fn drop(&mut self) {
        self.slots[self.pos] = Some(self.element);
    }
}
