#[cfg(not(feature = "allocator_api"))]
pub mod alloc;
