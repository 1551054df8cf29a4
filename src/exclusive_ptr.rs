//! Single-owner heap pointer.
//!
//! [`ExclusivePtr`] owns at most one heap value and hands that ownership on by
//! move only. There is deliberately no `Clone` impl, so duplicating an owner
//! is a compile error rather than a runtime bug, and the borrow checker
//! retires a moved-from binding entirely. The runtime notion of "moved-from"
//! still exists where it is observable: [`take`] and [`release`] leave a
//! handle in the empty state instead of consuming the binding, and [`swap`]
//! exchanges two handles in place.
//!
//! [`take`]: ExclusivePtr::take
//! [`release`]: ExclusivePtr::release
//! [`swap`]: ExclusivePtr::swap

use core::fmt;
use core::marker::PhantomData;
use core::mem;
use core::ptr::{self, NonNull};

use crate::heap;
use crate::reclaim::{DefaultReclaim, Reclaim};

/// Sole owner of a heap value, destroyed through a per-instance policy.
///
/// The handle is either empty or holds the one live claim on its value. On
/// drop, [`reset`], and overwrite by assignment the owned value (if any) is
/// passed to the policy exactly once.
///
/// ```
/// use custody::ExclusivePtr;
///
/// let mut first = ExclusivePtr::new(String::from("claim"));
/// let second = first.take();
/// assert!(first.is_null());
/// assert_eq!(second.as_ref().map(String::as_str), Some("claim"));
/// ```
///
/// Duplicating an owner is rejected at compile time:
///
/// ```compile_fail,E0277
/// use custody::ExclusivePtr;
///
/// let owner = ExclusivePtr::new(5u32);
/// let duplicate = <ExclusivePtr<u32> as Clone>::clone(&owner);
/// ```
///
/// [`reset`]: ExclusivePtr::reset
pub struct ExclusivePtr<T: ?Sized, P: Reclaim<T> = DefaultReclaim> {
    raw: Option<NonNull<T>>,
    policy: P,
    _marker: PhantomData<T>,
}

impl<T> ExclusivePtr<T> {
    /// Allocates `value` and claims it under the default policy.
    pub fn new(value: T) -> Self {
        Self::new_with(value, DefaultReclaim)
    }
}

impl<T, P: Reclaim<T>> ExclusivePtr<T, P> {
    /// Allocates `value` and claims it under `policy`.
    ///
    /// The address later handed to the policy comes from the global allocator
    /// with the value's own layout, so a policy may release it with
    /// [`Box::from_raw`].
    pub fn new_with(value: T, policy: P) -> Self {
        Self {
            raw: Some(heap::allocate(value)),
            policy,
            _marker: PhantomData,
        }
    }

    /// Replaces the owned value: destroys the previous one (if any) and
    /// claims a fresh allocation of `value`. The destruction policy is kept.
    pub fn reset_to(&mut self, value: T) {
        let fresh = heap::allocate(value);
        self.reset();
        self.raw = Some(fresh);
    }

    /// Current address, or null for an empty handle. Ownership is unaffected.
    #[inline]
    pub fn as_ptr(&self) -> *mut T {
        self.raw.map_or(ptr::null_mut(), NonNull::as_ptr)
    }
}

impl<T: ?Sized, P: Reclaim<T>> ExclusivePtr<T, P> {
    /// An empty handle owning nothing.
    pub fn empty() -> Self
    where
        P: Default,
    {
        Self {
            raw: None,
            policy: P::default(),
            _marker: PhantomData,
        }
    }

    /// Claims the allocation behind `raw`, which may be null for an empty
    /// handle. The default policy destroys it.
    ///
    /// # Safety
    ///
    /// A non-null `raw` must point to a live value this handle may destroy
    /// with its policy, and no other owner may release it.
    pub unsafe fn from_raw(raw: *mut T) -> Self
    where
        P: Default,
    {
        Self::from_raw_with(raw, P::default())
    }

    /// Claims the allocation behind `raw` under `policy`.
    ///
    /// # Safety
    ///
    /// Same contract as [`from_raw`](Self::from_raw): a non-null `raw` must be
    /// exclusively owned and reclaimable by `policy`.
    pub unsafe fn from_raw_with(raw: *mut T, policy: P) -> Self {
        Self {
            raw: NonNull::new(raw),
            policy,
            _marker: PhantomData,
        }
    }

    /// `true` when the handle owns nothing.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.raw.is_none()
    }

    /// Borrows the owned value, or `None` for an empty handle.
    #[inline]
    pub fn as_ref(&self) -> Option<&T> {
        // SAFETY: the value outlives `self`, which owns it exclusively.
        self.raw.map(|raw| unsafe { raw.as_ref() })
    }

    /// Mutably borrows the owned value, or `None` for an empty handle.
    #[inline]
    pub fn as_mut(&mut self) -> Option<&mut T> {
        // SAFETY: `&mut self` is the only path to the owned value.
        self.raw.map(|mut raw| unsafe { raw.as_mut() })
    }

    /// Borrows the owned value without checking for emptiness.
    ///
    /// # Safety
    ///
    /// The handle must be non-empty.
    ///
    /// # Panics
    ///
    /// Debug builds panic on an empty handle instead of proceeding.
    #[inline]
    #[track_caller]
    pub unsafe fn deref(&self) -> &T {
        match self.raw {
            Some(raw) => raw.as_ref(),
            None if cfg!(debug_assertions) => panic!("dereferenced an empty ExclusivePtr"),
            None => core::hint::unreachable_unchecked(),
        }
    }

    /// Mutably borrows the owned value without checking for emptiness.
    ///
    /// # Safety
    ///
    /// The handle must be non-empty.
    ///
    /// # Panics
    ///
    /// Debug builds panic on an empty handle instead of proceeding.
    #[inline]
    #[track_caller]
    pub unsafe fn deref_mut(&mut self) -> &mut T {
        match self.raw {
            Some(mut raw) => raw.as_mut(),
            None if cfg!(debug_assertions) => panic!("dereferenced an empty ExclusivePtr"),
            None => core::hint::unreachable_unchecked(),
        }
    }

    /// Relinquishes ownership and returns the raw address, leaving the handle
    /// empty. The caller takes over the value's eventual destruction; the
    /// policy stays behind for later adoptions.
    #[inline]
    #[must_use]
    pub fn release(&mut self) -> Option<NonNull<T>> {
        self.raw.take()
    }

    /// Destroys the owned value (if any) and leaves the handle empty.
    pub fn reset(&mut self) {
        if let Some(raw) = self.raw.take() {
            // SAFETY: `raw` was exclusively owned and is unreachable from now on.
            unsafe { self.policy.reclaim(raw) };
        }
    }

    /// Destroys the current value, then claims the allocation behind `raw`
    /// (null leaves the handle empty). The destruction policy is kept.
    ///
    /// # Safety
    ///
    /// Same contract as [`from_raw`](Self::from_raw).
    pub unsafe fn reset_raw(&mut self, raw: *mut T) {
        self.reset();
        self.raw = NonNull::new(raw);
    }

    /// Exchanges the owned values and policies of two handles.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Moves the handle's whole state out, leaving it empty.
    #[must_use]
    pub fn take(&mut self) -> Self
    where
        P: Default,
    {
        mem::replace(self, Self::empty())
    }
}

impl<E> ExclusivePtr<[E]> {
    /// Moves the elements of `vec` into one owned block under the default
    /// policy, which reclaims the whole block at once.
    pub fn from_vec(vec: Vec<E>) -> Self {
        // A boxed slice has the same layout `Layout::for_value` recomputes on
        // the way out.
        Self {
            raw: NonNull::new(Box::into_raw(vec.into_boxed_slice())),
            policy: DefaultReclaim,
            _marker: PhantomData,
        }
    }
}

impl<E, P: Reclaim<[E]>> ExclusivePtr<[E], P> {
    /// Number of owned elements; an empty handle owns zero.
    #[inline]
    pub fn len(&self) -> usize {
        self.as_ref().map_or(0, <[E]>::len)
    }

    /// `true` when the handle owns zero elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: ?Sized, P: Reclaim<T> + Default> Default for ExclusivePtr<T, P> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: ?Sized, P: Reclaim<T>> Drop for ExclusivePtr<T, P> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<T: ?Sized, P: Reclaim<T>> fmt::Debug for ExclusivePtr<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExclusivePtr")
            .field("raw", &self.raw)
            .finish_non_exhaustive()
    }
}

impl<T: ?Sized, P: Reclaim<T>> fmt::Pointer for ExclusivePtr<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.raw {
            Some(raw) => fmt::Pointer::fmt(&raw, f),
            None => f.write_str("0x0"),
        }
    }
}

// Ownership of the value and policy moves with the handle, so the handle is as
// thread-mobile as what it carries.
unsafe impl<T: ?Sized + Send, P: Reclaim<T> + Send> Send for ExclusivePtr<T, P> {}
unsafe impl<T: ?Sized + Sync, P: Reclaim<T> + Sync> Sync for ExclusivePtr<T, P> {}
