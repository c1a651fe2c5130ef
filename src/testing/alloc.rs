//! An allocator that succeeds a fixed number of times and then refuses.

use crate::polyfill::{Allocator, Global};
use std::alloc::Layout;
use std::cell::Cell;
use std::ptr::NonNull;

/// Hands out memory from [`Global`] until its budget of successful allocations
/// is spent, then fails every request until the budget is topped up.
///
/// Growing and shrinking go through `allocate` (the trait's copying defaults),
/// so they draw from the same budget.
#[derive(Debug, Default)]
pub struct FailingAllocator {
    budget: Cell<usize>,
    allocated: Cell<usize>,
    refused: Cell<usize>,
}

impl FailingAllocator {
    /// Creates an allocator that will satisfy `budget` requests.
    pub fn with_budget(budget: usize) -> Self {
        FailingAllocator { budget: Cell::new(budget), ..Default::default() }
    }

    /// Replaces the number of requests that will still be satisfied.
    pub fn set_budget(&self, budget: usize) {
        self.budget.set(budget);
    }

    /// Returns how many requests have been satisfied.
    pub fn allocated(&self) -> usize {
        self.allocated.get()
    }

    /// Returns how many requests have been refused.
    pub fn refused(&self) -> usize {
        self.refused.get()
    }
}

impl Allocator for FailingAllocator {
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, ()> {
        match self.budget.get() {
            0 => {
                self.refused.set(self.refused.get() + 1);
                Err(())
            }
            budget => {
                self.budget.set(budget - 1);
                self.allocated.set(self.allocated.get() + 1);
                Global.allocate(layout)
            }
        }
    }
}
