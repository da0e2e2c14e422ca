use crate::{
    alloc::NodeAlloc,
    error::{Error, Result},
};
use std::{
    alloc::Layout,
    fmt, mem,
    ops::{Deref, DerefMut},
    ptr,
    ptr::NonNull,
};

/// Basic vec, does not have own capacity or length, just a pointer to memory.
/// Kind-of cribbed from <https://doc.rust-lang.org/nomicon/vec/vec-final.html>.
struct BasicVec<T> {
    p: NonNull<T>,
}

unsafe impl<T: Send> Send for BasicVec<T> {}
unsafe impl<T: Sync> Sync for BasicVec<T> {}

impl<T> BasicVec<T> {
    fn dangling() -> Self {
        Self {
            p: NonNull::dangling(),
        }
    }

    /// Obtain memory for `cap` elements from `alloc`.
    fn allocate<A: NodeAlloc + ?Sized>(cap: usize, alloc: &A) -> Result<Self> {
        if cap == 0 || mem::size_of::<T>() == 0 {
            return Ok(Self::dangling());
        }
        let layout = Layout::array::<T>(cap).map_err(|_| Error::CapacityOverflow { cap })?;
        match alloc.allocate(layout) {
            Some(p) => Ok(Self { p: p.cast::<T>() }),
            None => {
                tracing::warn!(size = layout.size(), "node buffer allocation refused");
                Err(Error::Alloc {
                    size: layout.size(),
                })
            }
        }
    }

    /// Hand memory back to `alloc`.
    /// # Safety
    ///
    /// `cap` must be the capacity passed to `allocate`, and `alloc` the same allocator.
    unsafe fn release<A: NodeAlloc + ?Sized>(&mut self, cap: usize, alloc: &A) {
        if cap != 0 && mem::size_of::<T>() != 0 {
            if let Ok(layout) = Layout::array::<T>(cap) {
                alloc.release(self.p.cast::<u8>(), layout);
            }
        }
        self.p = NonNull::dangling();
    }

    /// Get mutable raw pointer to specified element.
    /// # Safety
    /// index must be < set capacity.
    #[inline]
    unsafe fn ix(&self, index: usize) -> *mut T {
        self.p.as_ptr().add(index)
    }

    /// # Safety
    ///
    /// ix must be < capacity, and the element must be unset.
    #[inline]
    unsafe fn set(&mut self, ix: usize, elem: T) {
        ptr::write(self.ix(ix), elem);
    }

    /// # Safety
    ///
    /// ix must be < capacity, and the element must have been set.
    #[inline]
    unsafe fn get(&mut self, ix: usize) -> T {
        ptr::read(self.ix(ix))
    }

    /// # Safety
    ///
    /// len must be <= capacity and 0..len elements must have been set.
    #[inline]
    unsafe fn slice(&self, len: usize) -> &[T] {
        std::slice::from_raw_parts(self.p.as_ptr(), len)
    }

    /// # Safety
    ///
    /// len must be <= capacity and 0..len elements must have been set.
    #[inline]
    unsafe fn slice_mut(&mut self, len: usize) -> &mut [T] {
        std::slice::from_raw_parts_mut(self.p.as_ptr(), len)
    }

    /// Move elements.
    /// # Safety
    ///
    /// The set status of the elements changes in the obvious way. from, to and len must be in range.
    unsafe fn move_self(&mut self, from: usize, to: usize, len: usize) {
        ptr::copy(self.ix(from), self.ix(to), len);
    }

    /// Move elements from another `BasicVec`.
    /// # Safety
    ///
    /// The set status of the elements changes in the obvious way. from, to and len must be in range.
    unsafe fn move_from(&mut self, from: usize, src: &mut Self, to: usize, len: usize) {
        ptr::copy_nonoverlapping(src.ix(from), self.ix(to), len);
    }
}

/// In debug mode or feature unsafe-optim not enabled, same as assert! otherwise does nothing.
#[cfg(any(debug_assertions, not(feature = "unsafe-optim")))]
macro_rules! safe_assert {
    ( $cond: expr ) => {
        assert!($cond)
    };
}

/// In debug mode or feature unsafe-optim not enabled, same as assert! otherwise does nothing.
#[cfg(all(not(debug_assertions), feature = "unsafe-optim"))]
macro_rules! safe_assert {
    ( $cond: expr ) => {};
}

pub(crate) use safe_assert;

/// Vec with a capacity fixed when it is created.
///
/// Memory comes from a [`NodeAlloc`] which the vec does not hold on to, so there is no `Drop`:
/// the owner must call [`FixedCapVec::free`] with the same allocator.
pub(crate) struct FixedCapVec<T> {
    len: usize,
    cap: usize,
    v: BasicVec<T>,
}

impl<T> FixedCapVec<T> {
    pub fn new<A: NodeAlloc + ?Sized>(cap: usize, alloc: &A) -> Result<Self> {
        let v = BasicVec::allocate(cap, alloc)?;
        Ok(Self { len: 0, cap, v })
    }

    /// Drop any remaining elements and release the memory.
    pub fn free<A: NodeAlloc + ?Sized>(&mut self, alloc: &A) {
        let len = self.len;
        self.len = 0;
        unsafe {
            ptr::drop_in_place(self.v.slice_mut(len));
            self.v.release(self.cap, alloc);
        }
        self.cap = 0;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn push(&mut self, value: T) {
        safe_assert!(self.len < self.cap);
        unsafe {
            self.v.set(self.len, value);
        }
        self.len += 1;
    }

    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            None
        } else {
            self.len -= 1;
            unsafe { Some(self.v.get(self.len)) }
        }
    }

    pub fn insert(&mut self, at: usize, value: T) {
        safe_assert!(at <= self.len && self.len < self.cap);
        unsafe {
            if at < self.len {
                self.v.move_self(at, at + 1, self.len - at);
            }
            self.v.set(at, value);
        }
        self.len += 1;
    }

    pub fn remove(&mut self, at: usize) -> T {
        safe_assert!(at < self.len);
        unsafe {
            let result = self.v.get(at);
            self.v.move_self(at + 1, at, self.len - at - 1);
            self.len -= 1;
            result
        }
    }

    /// Move `src[from..]` onto the end of `self`, leaving `src` with `from` elements.
    pub fn append_from(&mut self, src: &mut Self, from: usize) {
        safe_assert!(from <= src.len);
        let n = src.len - from;
        safe_assert!(self.len + n <= self.cap);
        unsafe {
            self.v.move_from(from, &mut src.v, self.len, n);
        }
        self.len += n;
        src.len = from;
    }

    /// Get reference to ith element.
    #[inline]
    pub fn ix(&self, ix: usize) -> &T {
        safe_assert!(ix < self.len);
        unsafe { &*self.v.ix(ix) }
    }

    /// Get mutable reference to ith element.
    #[inline]
    pub fn ixm(&mut self, ix: usize) -> &mut T {
        safe_assert!(ix < self.len);
        unsafe { &mut *self.v.ix(ix) }
    }
}

impl<T> Deref for FixedCapVec<T> {
    type Target = [T];
    #[inline]
    fn deref(&self) -> &[T] {
        unsafe { self.v.slice(self.len) }
    }
}

impl<T> DerefMut for FixedCapVec<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        unsafe { self.v.slice_mut(self.len) }
    }
}

impl<T> fmt::Debug for FixedCapVec<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}
