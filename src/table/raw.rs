//! Owned, manually sized storage for the table.
//!
//! A [`RawBuffer`] owns an allocation of `capacity` slots of `T` and nothing
//! else: it never knows how many slots are initialised and never drops a `T`.
//! Its owner is responsible for tracking the initialised prefix and for
//! dropping those values before the buffer is freed or reallocated.

use std::alloc::{self, Layout};
use std::marker::PhantomData;
use std::ptr::NonNull;

use super::Error;

pub(crate) struct RawBuffer<T> {
    /// `None` iff nothing is allocated. Zero-sized `T` never allocates and
    /// uses a dangling pointer once a capacity has been requested.
    ptr: Option<NonNull<T>>,
    cap: usize,
    _marker: PhantomData<T>,
}

// SAFETY: the buffer uniquely owns its slots, exactly like `Box<[T]>`.
unsafe impl<T: Send> Send for RawBuffer<T> {}
// SAFETY: shared access only hands out shared pointers to the slots.
unsafe impl<T: Sync> Sync for RawBuffer<T> {}

impl<T> RawBuffer<T> {
    const IS_ZST: bool = core::mem::size_of::<T>() == 0;

    pub(crate) const fn new() -> Self {
        Self {
            ptr: None,
            cap: 0,
            _marker: PhantomData,
        }
    }

    pub(crate) fn with_capacity(cap: usize) -> Result<Self, Error> {
        let mut buf = Self::new();
        if cap > 0 {
            // SAFETY: an empty buffer has no initialised slots to carry over.
            unsafe { buf.realloc(cap, 0)? };
        }
        Ok(buf)
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.cap
    }

    #[inline]
    pub(crate) fn is_allocated(&self) -> bool {
        self.ptr.is_some()
    }

    /// Pointer to slot 0. Dangling (but aligned) when nothing is allocated.
    #[inline]
    pub(crate) fn as_ptr(&self) -> *const T {
        match self.ptr {
            Some(ptr) => ptr.as_ptr(),
            None => NonNull::dangling().as_ptr(),
        }
    }

    #[inline]
    pub(crate) fn as_mut_ptr(&mut self) -> *mut T {
        match self.ptr {
            Some(ptr) => ptr.as_ptr(),
            None => NonNull::dangling().as_ptr(),
        }
    }

    fn layout(cap: usize) -> Result<Layout, Error> {
        let layout = Layout::array::<T>(cap).map_err(|_| Error::CapacityOverflow)?;
        if layout.size() > isize::MAX as usize {
            return Err(Error::CapacityOverflow);
        }
        Ok(layout)
    }

    /// Moves the first `len` slots into a fresh allocation of `new_cap` slots
    /// and frees the old one.
    ///
    /// On error nothing has changed: the old allocation and its contents are
    /// still in place.
    ///
    /// # Safety
    ///
    /// `len <= self.capacity()`, `len <= new_cap`, and exactly the first `len`
    /// slots are initialised.
    pub(crate) unsafe fn realloc(&mut self, new_cap: usize, len: usize) -> Result<(), Error> {
        debug_assert!(len <= self.cap && len <= new_cap);

        if Self::IS_ZST {
            self.ptr = if new_cap == 0 {
                None
            } else {
                Some(NonNull::dangling())
            };
            self.cap = new_cap;
            return Ok(());
        }

        let new_ptr = if new_cap == 0 {
            None
        } else {
            let layout = Self::layout(new_cap)?;
            // SAFETY: `layout` has non-zero size since `T` is not zero-sized and `new_cap > 0`.
            let raw = unsafe { alloc::alloc(layout) };
            let ptr = NonNull::new(raw.cast::<T>()).ok_or(Error::AllocFailed {
                bytes: layout.size(),
            })?;
            Some(ptr)
        };

        if let Some(old) = self.ptr {
            if let Some(new) = new_ptr {
                // SAFETY: both blocks hold at least `len` slots and are distinct
                // allocations. The moved-from slots are treated as
                // uninitialised from here on, which is a move.
                unsafe { core::ptr::copy_nonoverlapping(old.as_ptr(), new.as_ptr(), len) };
            }
            // SAFETY: `old` was allocated by us with the layout for `self.cap`.
            unsafe {
                alloc::dealloc(old.as_ptr().cast(), Self::layout(self.cap).unwrap_unchecked())
            };
        }

        self.ptr = new_ptr;
        self.cap = new_cap;
        Ok(())
    }

    /// Takes the allocation, leaving `self` unallocated with capacity 0.
    pub(crate) fn take(&mut self) -> Self {
        core::mem::replace(self, Self::new())
    }
}

impl<T> Drop for RawBuffer<T> {
    fn drop(&mut self) {
        if let Some(ptr) = self.ptr {
            if !Self::IS_ZST {
                // SAFETY: we allocated `ptr` with the layout for `self.cap`, and
                // that layout was valid when we created it.
                unsafe {
                    alloc::dealloc(ptr.as_ptr().cast(), Self::layout(self.cap).unwrap_unchecked())
                }
            }
        }
    }
}
