use super::*;
use crate::collections::{TryReserveError, TryReserveErrorKind};
use crate::test_helpers::test_rng;
use crate::testing::crash_test::{CrashTestDummy, Panic};
use rand::Rng;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::vec::Vec;

#[test]
fn test_with_capacity() {
    let buffer = GrowableBuffer::<u32>::with_capacity(8).unwrap();
    assert_eq!(buffer.len(), 0);
    assert!(buffer.is_empty());
    assert_eq!(buffer.capacity(), 8);
    assert_eq!(buffer.as_slice(), &[] as &[u32]);
}

#[test]
fn test_with_capacity_rejects_zero() {
    assert_eq!(
        GrowableBuffer::<u32>::with_capacity(0).unwrap_err(),
        Error::InvalidArgument("capacity must be at least one element")
    );
}

#[test]
fn test_with_capacity_rejects_zero_sized() {
    assert_eq!(
        GrowableBuffer::<()>::with_capacity(4).unwrap_err(),
        Error::InvalidArgument("element type must not be zero-sized")
    );
}

#[test]
fn test_with_capacity_overflow() {
    match GrowableBuffer::<u64>::with_capacity(usize::MAX) {
        Err(Error::Alloc(error)) => assert_eq!(error.kind(), TryReserveErrorKind::CapacityOverflow),
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn test_push_doubles_capacity() {
    let mut buffer = GrowableBuffer::with_capacity(1).unwrap();
    let mut capacities = Vec::new();
    for i in 0..9 {
        buffer.push(i).unwrap();
        capacities.push(buffer.capacity());
    }
    assert_eq!(capacities, [1, 2, 4, 4, 8, 8, 8, 8, 16]);
    assert_eq!(buffer.as_slice(), [0, 1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn test_pop() {
    let mut buffer = GrowableBuffer::with_capacity(2).unwrap();
    assert_eq!(buffer.pop(), Err(Error::EmptyCollection));

    buffer.push("first").unwrap();
    buffer.push("second").unwrap();
    assert_eq!(buffer.pop(), Ok("second"));
    assert_eq!(buffer.pop(), Ok("first"));
    assert_eq!(buffer.pop(), Err(Error::EmptyCollection));
    assert_eq!(buffer.capacity(), 2);
}

#[test]
fn test_get() {
    let mut buffer = GrowableBuffer::with_capacity(4).unwrap();
    buffer.push(10).unwrap();
    buffer.push(20).unwrap();

    assert_eq!(buffer.get(0), Ok(&10));
    assert_eq!(buffer.get(1), Ok(&20));
    // Within capacity but past the length is still out of range.
    assert_eq!(buffer.get(2), Err(Error::IndexOutOfRange { index: 2, len: 2 }));

    *buffer.get_mut(0).unwrap() += 5;
    assert_eq!(buffer.get(0), Ok(&15));
    assert_eq!(buffer.get_mut(9), Err(Error::IndexOutOfRange { index: 9, len: 2 }));
}

#[test]
fn test_set_capacity_grow_and_shrink() {
    let mut buffer = GrowableBuffer::with_capacity(2).unwrap();
    buffer.push(1u16).unwrap();
    buffer.push(2).unwrap();

    buffer.set_capacity(10).unwrap();
    assert_eq!(buffer.capacity(), 10);
    assert_eq!(buffer.as_slice(), [1, 2]);

    buffer.set_capacity(3).unwrap();
    assert_eq!(buffer.capacity(), 3);
    assert_eq!(buffer.as_slice(), [1, 2]);

    buffer.set_capacity(3).unwrap();
    assert_eq!(buffer.capacity(), 3);

    assert_eq!(
        buffer.set_capacity(0),
        Err(Error::InvalidArgument("capacity must be at least one element"))
    );
    assert_eq!(buffer.capacity(), 3);
}

#[test]
fn test_set_capacity_truncates() {
    let a = CrashTestDummy::new(0);
    let b = CrashTestDummy::new(1);
    let c = CrashTestDummy::new(2);

    let mut buffer = GrowableBuffer::with_capacity(4).unwrap();
    buffer.push(a.spawn(Panic::Never)).unwrap();
    buffer.push(b.spawn(Panic::Never)).unwrap();
    buffer.push(c.spawn(Panic::Never)).unwrap();

    buffer.set_capacity(1).unwrap();
    assert_eq!(buffer.len(), 1);
    assert_eq!(buffer.capacity(), 1);
    assert_eq!(buffer.get(0).unwrap().id(), 0);
    assert_eq!(a.dropped(), 0);
    assert_eq!(b.dropped(), 1);
    assert_eq!(c.dropped(), 1);

    // Appending after a truncating resize grows from the new capacity.
    buffer.push(b.spawn(Panic::Never)).unwrap();
    assert_eq!(buffer.capacity(), 2);
    assert_eq!(buffer.get(1).unwrap().id(), 1);

    drop(buffer);
    assert_eq!(a.dropped(), 1);
    assert_eq!(b.dropped(), 2);
    assert_eq!(c.dropped(), 1);
}

#[test]
fn test_truncate_and_clear() {
    let dummy = CrashTestDummy::new(0);
    let mut buffer = GrowableBuffer::with_capacity(2).unwrap();
    for _ in 0..5 {
        buffer.push(dummy.spawn(Panic::Never)).unwrap();
    }

    buffer.truncate(7);
    assert_eq!(buffer.len(), 5);
    assert_eq!(dummy.dropped(), 0);

    buffer.truncate(3);
    assert_eq!(buffer.len(), 3);
    assert_eq!(dummy.dropped(), 2);

    buffer.clear();
    assert!(buffer.is_empty());
    assert_eq!(buffer.capacity(), 8);
    assert_eq!(dummy.dropped(), 5);
}

#[test]
fn test_drop_drops_every_element() {
    let dummy = CrashTestDummy::new(0);
    let mut buffer = GrowableBuffer::with_capacity(3).unwrap();
    for _ in 0..7 {
        buffer.push(dummy.spawn(Panic::Never)).unwrap();
    }
    let popped = buffer.pop().unwrap();
    drop(buffer);
    assert_eq!(dummy.dropped(), 6);
    drop(popped);
    assert_eq!(dummy.dropped(), 7);
}

#[test]
fn test_truncate_panic_in_drop() {
    let a = CrashTestDummy::new(0);
    let b = CrashTestDummy::new(1);
    let c = CrashTestDummy::new(2);

    let mut buffer = GrowableBuffer::with_capacity(3).unwrap();
    buffer.push(a.spawn(Panic::Never)).unwrap();
    buffer.push(b.spawn(Panic::InDrop)).unwrap();
    buffer.push(c.spawn(Panic::Never)).unwrap();

    catch_unwind(AssertUnwindSafe(|| buffer.truncate(1))).unwrap_err();
    assert_eq!(buffer.len(), 1);
    assert_eq!(b.dropped(), 1);
    assert_eq!(c.dropped(), 1);

    drop(buffer);
    assert_eq!(a.dropped(), 1);
    assert_eq!(b.dropped(), 1);
    assert_eq!(c.dropped(), 1);
}

#[test]
fn test_debug() {
    let mut buffer = GrowableBuffer::with_capacity(2).unwrap();
    buffer.push(3).unwrap();
    buffer.push(1).unwrap();
    buffer.push(2).unwrap();
    assert_eq!(format!("{buffer:?}"), "[3, 1, 2]");
}

#[test]
fn test_random_against_vec() {
    let mut rng = test_rng();
    let mut buffer = GrowableBuffer::with_capacity(1).unwrap();
    let mut model = Vec::new();

    for _ in 0..2000 {
        match rng.gen_range(0..10) {
            0..=5 => {
                let value: u32 = rng.gen();
                buffer.push(value).unwrap();
                model.push(value);
            }
            6..=8 => assert_eq!(buffer.pop().ok(), model.pop()),
            _ => {
                let capacity = rng.gen_range(1..64);
                buffer.set_capacity(capacity).unwrap();
                model.truncate(capacity);
                assert_eq!(buffer.capacity(), capacity);
            }
        }
        assert!(buffer.len() <= buffer.capacity());
        assert_eq!(buffer.as_slice(), model.as_slice());
    }
}

#[cfg(not(feature = "allocator_api"))]
mod allocation_failure {
    use super::*;
    use crate::testing::alloc::FailingAllocator;

    fn refused<T>(result: Result<T, Error>) -> TryReserveError {
        match result {
            Err(Error::Alloc(error)) => error,
            Err(other) => panic!("unexpected error {other:?}"),
            Ok(_) => panic!("allocation unexpectedly succeeded"),
        }
    }

    #[test]
    fn test_create_fails() {
        let alloc = FailingAllocator::with_budget(0);
        let error = refused(GrowableBuffer::<u32, _>::with_capacity_in(4, &alloc));
        assert_eq!(
            error.kind(),
            TryReserveErrorKind::AllocError { layout: Layout::array::<u32>(4).unwrap() }
        );
        assert_eq!(alloc.refused(), 1);
    }

    #[test]
    fn test_push_failure_leaves_buffer_unchanged() {
        let alloc = FailingAllocator::with_budget(1);
        let mut buffer = GrowableBuffer::with_capacity_in(2, &alloc).unwrap();
        buffer.push(1u64).unwrap();
        buffer.push(2).unwrap();

        let error = refused(buffer.push(3));
        assert_eq!(
            error.kind(),
            TryReserveErrorKind::AllocError { layout: Layout::array::<u64>(4).unwrap() }
        );
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.capacity(), 2);
        assert_eq!(buffer.as_slice(), [1, 2]);

        alloc.set_budget(1);
        buffer.push(3).unwrap();
        assert_eq!(buffer.capacity(), 4);
        assert_eq!(buffer.as_slice(), [1, 2, 3]);
        assert_eq!(buffer.allocator().allocated(), 2);
    }

    #[test]
    fn test_rejected_value_is_dropped() {
        let alloc = FailingAllocator::with_budget(1);
        let dummy = CrashTestDummy::new(0);
        let mut buffer = GrowableBuffer::with_capacity_in(1, &alloc).unwrap();
        buffer.push(dummy.spawn(Panic::Never)).unwrap();

        refused(buffer.push(dummy.spawn(Panic::Never)));
        assert_eq!(dummy.dropped(), 1);
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_truncating_resize_failure_keeps_elements() {
        let alloc = FailingAllocator::with_budget(1);
        let dummy = CrashTestDummy::new(0);
        let mut buffer = GrowableBuffer::with_capacity_in(4, &alloc).unwrap();
        for _ in 0..4 {
            buffer.push(dummy.spawn(Panic::Never)).unwrap();
        }

        refused(buffer.set_capacity(2));
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.capacity(), 4);
        assert_eq!(dummy.dropped(), 0);

        refused(buffer.set_capacity(8));
        assert_eq!(buffer.capacity(), 4);

        alloc.set_budget(1);
        buffer.set_capacity(2).unwrap();
        assert_eq!(buffer.len(), 2);
        assert_eq!(dummy.dropped(), 2);
    }
}
