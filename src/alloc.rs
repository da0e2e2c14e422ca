//! Allocation hooks for node storage.
//!
//! Every node owns two buffers at most (elements, and children when internal), each obtained
//! from the tree's [`NodeAlloc`] when the node is created and returned to it when the node is
//! discarded or the tree dropped.

use std::{
    alloc::{GlobalAlloc, Layout},
    ptr::NonNull,
};

/// Source of memory for node buffers.
pub trait NodeAlloc {
    /// Allocate a block for `layout`. Returns `None` if the memory is not available.
    ///
    /// The tree never asks for a zero-sized block.
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Return a block obtained from [`NodeAlloc::allocate`].
    /// # Safety
    ///
    /// `ptr` must have come from `allocate` on this allocator with the same `layout`,
    /// and must not have been released already.
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout);
}

impl<A: NodeAlloc + ?Sized> NodeAlloc for &A {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        (**self).allocate(layout)
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        (**self).release(ptr, layout);
    }
}

/// Allocates through [`std::alloc::alloc`], i.e. whatever the `#[global_allocator]` is.
#[derive(Clone, Copy, Debug, Default)]
pub struct Heap;

impl NodeAlloc for Heap {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        if layout.size() == 0 {
            return None;
        }
        NonNull::new(unsafe { std::alloc::alloc(layout) })
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        std::alloc::dealloc(ptr.as_ptr(), layout);
    }
}

/// Uses any [`GlobalAlloc`] for node storage, e.g. a capped or counting allocator.
///
/// ```
/// use ordered_btree::{AllocAdapter, BTree};
/// let alloc = AllocAdapter(std::alloc::System);
/// let mut tree = BTree::with_allocator(3, |a: &u32, b: &u32| a.cmp(b), &alloc).unwrap();
/// tree.insert(7).unwrap();
/// assert_eq!(tree.first(), Some(&7));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct AllocAdapter<A>(pub A);

impl<A: GlobalAlloc> NodeAlloc for AllocAdapter<A> {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        if layout.size() == 0 {
            return None;
        }
        NonNull::new(unsafe { self.0.alloc(layout) })
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        self.0.dealloc(ptr.as_ptr(), layout);
    }
}
