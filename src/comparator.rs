//! Caller-supplied orderings for [`BinaryHeap`](crate::BinaryHeap).
//!
//! A heap never asks its elements how they compare; it asks a [`Comparator`]
//! that it was given on construction. Any `Fn(&T, &T) -> Ordering` closure is a
//! comparator, so auxiliary state can simply be captured. Where that state has
//! to stay reachable (and mutable) through the heap, wrap it in
//! [`WithContext`] instead.

use core::cmp::Ordering;
use core::fmt;
use core::marker::PhantomData;

/// A three-way comparison between an element arriving from outside a heap and
/// one already inside it.
///
/// Implementations must be a consistent total preorder: if they are not, heap
/// operations still behave safely, but the order in which elements come out is
/// unspecified.
pub trait Comparator<T: ?Sized> {
    /// Returns [`Greater`](Ordering::Greater) if `external` outranks `internal`,
    /// [`Less`](Ordering::Less) if it is outranked, and
    /// [`Equal`](Ordering::Equal) on equal priority.
    fn compare(&self, external: &T, internal: &T) -> Ordering;

    /// Returns `true` if `external` strictly outranks `internal`.
    #[inline]
    fn outranks(&self, external: &T, internal: &T) -> bool {
        self.compare(external, internal) == Ordering::Greater
    }
}

impl<T: ?Sized, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, external: &T, internal: &T) -> Ordering {
        self(external, internal)
    }
}

/// A zero-sized comparator that delegates to the [`Ord`] implementation of `T`,
/// which makes the heap behave like the standard library's.
pub struct OrdComparator<T: ?Sized + Ord>(PhantomData<fn(&T)>);

impl<T: ?Sized + Ord> Default for OrdComparator<T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<T: ?Sized + Ord> Clone for OrdComparator<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized + Ord> Copy for OrdComparator<T> {}

impl<T: ?Sized + Ord> fmt::Debug for OrdComparator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OrdComparator")
    }
}

impl<T: ?Sized + Ord> Comparator<T> for OrdComparator<T> {
    #[inline]
    fn compare(&self, external: &T, internal: &T) -> Ordering {
        external.cmp(internal)
    }
}

/// Reverses another comparator, turning a max-heap into a min-heap.
///
/// ```
/// use heapvec::{BinaryHeap, OrdComparator, Reversed};
///
/// let values = [3, 1, 2];
/// let mut heap = BinaryHeap::with_capacity(4, Reversed(OrdComparator::default()))?;
/// for value in &values {
///     heap.push(value)?;
/// }
/// assert_eq!(heap.pop(), Ok(&1));
/// # Ok::<(), heapvec::Error>(())
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Reversed<C>(pub C);

impl<T: ?Sized, C: Comparator<T>> Comparator<T> for Reversed<C> {
    #[inline]
    fn compare(&self, external: &T, internal: &T) -> Ordering {
        self.0.compare(internal, external)
    }
}

/// A comparator that carries an explicit, opaque context and passes it to
/// every comparison.
///
/// The context is reachable through the heap via
/// [`BinaryHeap::comparator`](crate::BinaryHeap::comparator) and, when it has
/// to change, [`BinaryHeap::comparator_mut`](crate::BinaryHeap::comparator_mut).
///
/// ```
/// use heapvec::{BinaryHeap, WithContext};
///
/// // Tasks are ranked by a priority table that lives outside the heap.
/// let tasks = [0usize, 1, 2];
/// let priorities = vec![5, 9, 1];
/// let by_priority = WithContext::new(priorities, |a: &usize, b: &usize, table: &Vec<i32>| {
///     table[*a].cmp(&table[*b])
/// });
///
/// let mut heap = BinaryHeap::with_capacity(3, by_priority)?;
/// for task in &tasks {
///     heap.push(task)?;
/// }
/// assert_eq!(heap.peek(), Ok(&1));
/// # Ok::<(), heapvec::Error>(())
/// ```
#[derive(Clone, Copy, Default)]
pub struct WithContext<X, F> {
    context: X,
    compare: F,
}

impl<X, F> WithContext<X, F> {
    /// Pairs `context` with the comparison function that consults it.
    pub fn new(context: X, compare: F) -> Self {
        WithContext { context, compare }
    }

    /// Borrows the context.
    pub fn context(&self) -> &X {
        &self.context
    }

    /// Mutably borrows the context.
    pub fn context_mut(&mut self) -> &mut X {
        &mut self.context
    }

    /// Discards the comparison function and returns the context.
    pub fn into_context(self) -> X {
        self.context
    }
}

impl<X: fmt::Debug, F> fmt::Debug for WithContext<X, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WithContext").field("context", &self.context).finish_non_exhaustive()
    }
}

impl<T: ?Sized, X, F> Comparator<T> for WithContext<X, F>
where
    F: Fn(&T, &T, &X) -> Ordering,
{
    #[inline]
    fn compare(&self, external: &T, internal: &T) -> Ordering {
        (self.compare)(external, internal, &self.context)
    }
}
