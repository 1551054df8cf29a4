//! Allocation helpers shared by the pointer types and the default policy.
//!
//! Values are placed on the heap with the global allocator and reclaimed with
//! the layout derived from the value itself, so the two halves of this module
//! are exact mirrors. Zero-sized values take the dangling-pointer path and are
//! never handed to the allocator.

use core::alloc::Layout;
use core::ptr::{self, NonNull};
use std::alloc::{alloc, dealloc, handle_alloc_error};

/// Moves `value` onto the heap and returns its address.
///
/// Allocation failure is surfaced through [`handle_alloc_error`]; the caller
/// never observes a null pointer.
pub(crate) fn allocate<T>(value: T) -> NonNull<T> {
    let layout = Layout::new::<T>();
    let raw = if layout.size() == 0 {
        NonNull::dangling().as_ptr()
    } else {
        // SAFETY: `layout` has non-zero size.
        unsafe { alloc(layout).cast::<T>() }
    };

    if raw.is_null() {
        handle_alloc_error(layout);
    }

    // SAFETY: `raw` is non-null and valid for writes of `T`.
    unsafe {
        ptr::write(raw, value);
        NonNull::new_unchecked(raw)
    }
}

/// Drops the pointed-to value in place and releases its storage.
///
/// The layout is recomputed from the value, so this is the one reclamation
/// path for plain values and slices alike: a fat pointer carries the length
/// that determines the slice's layout.
///
/// # Safety
///
/// `raw` must point to a live value previously placed on the heap by
/// [`allocate`] (or an allocation with the identical layout, such as a leaked
/// `Box`), and no other owner may use it afterwards.
pub(crate) unsafe fn destroy<T: ?Sized>(raw: NonNull<T>) {
    // Layout must be taken while the value is still alive.
    let layout = Layout::for_value(raw.as_ref());
    ptr::drop_in_place(raw.as_ptr());
    if layout.size() != 0 {
        dealloc(raw.as_ptr().cast::<u8>(), layout);
    }
}
