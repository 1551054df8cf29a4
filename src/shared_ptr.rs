//! Reference-counted heap pointer with a thread-safe owner count.
//!
//! Every [`SharedPtr`] lineage shares one control block holding an atomic
//! owner count. Cloning increments it, releasing decrements it, and the one
//! release that observes the count at exactly one destroys the value through
//! the instance's policy and frees the block. Decrement-and-observe is a
//! single read-modify-write, so two racing releasers can never both see
//! themselves last.
//!
//! Only the bookkeeping is thread-safe. Handles sharing a lineage may be
//! cloned and dropped from different threads freely, but one handle is still
//! one value: mutating the same `SharedPtr` instance from two threads is a
//! data race, same as for any `&mut`-based API.

use core::fmt;
use core::marker::PhantomData;
use core::mem;
use core::ptr::{self, NonNull};

use crate::heap;
use crate::reclaim::{DefaultReclaim, Reclaim};
use crate::sync::{fence, AtomicUsize, Ordering};

/// Control block shared by every handle of one lineage.
struct RefCount {
    owners: AtomicUsize,
}

/// A claim on one shared allocation: the value plus its control block.
///
/// Copied freely between handles; the atomic count is what tracks how many
/// copies are live.
struct Lineage<T: ?Sized> {
    raw: NonNull<T>,
    count: NonNull<RefCount>,
}

impl<T: ?Sized> Lineage<T> {
    /// Starts a fresh lineage over `raw` with a single owner.
    fn start(raw: NonNull<T>) -> Self {
        Self {
            raw,
            count: heap::allocate(RefCount {
                owners: AtomicUsize::new(1),
            }),
        }
    }
}

impl<T: ?Sized> Clone for Lineage<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Lineage<T> {}

/// Co-owning pointer to a heap value, destroyed through a per-instance policy
/// when the last owner lets go.
///
/// The policy is set at first construction and replicated into every clone,
/// so whichever handle turns out to release last holds a copy to destroy the
/// value with.
///
/// ```
/// use custody::SharedPtr;
///
/// let first = SharedPtr::new(5);
/// let second = first.clone();
/// assert_eq!(first.owner_count(), 2);
/// assert!(first.ptr_eq(&second));
/// drop(first);
/// assert_eq!(second.as_ref(), Some(&5));
/// assert_eq!(second.owner_count(), 1);
/// ```
pub struct SharedPtr<T: ?Sized, P: Reclaim<T> = DefaultReclaim> {
    lineage: Option<Lineage<T>>,
    policy: P,
    _marker: PhantomData<T>,
}

impl<T> SharedPtr<T> {
    /// Allocates `value` and starts a lineage with one owner under the
    /// default policy.
    pub fn new(value: T) -> Self {
        Self::new_with(value, DefaultReclaim)
    }
}

impl<T, P: Reclaim<T>> SharedPtr<T, P> {
    /// Allocates `value` and starts a lineage with one owner under `policy`.
    ///
    /// The address later handed to the policy comes from the global allocator
    /// with the value's own layout, so a policy may release it with
    /// [`Box::from_raw`].
    pub fn new_with(value: T, policy: P) -> Self {
        Self {
            lineage: Some(Lineage::start(heap::allocate(value))),
            policy,
            _marker: PhantomData,
        }
    }

    /// Replaces this handle's claim: releases the current lineage and claims
    /// a fresh single-owner lineage over a new allocation of `value`.
    ///
    /// Co-owners of the old lineage are unaffected; the destruction policy is
    /// kept.
    pub fn reset_to(&mut self, value: T) {
        let fresh = Lineage::start(heap::allocate(value));
        self.release();
        self.lineage = Some(fresh);
    }

    /// Current address, or null for an empty handle. Ownership is unaffected.
    #[inline]
    pub fn as_ptr(&self) -> *mut T {
        self.lineage.map_or(ptr::null_mut(), |lineage| lineage.raw.as_ptr())
    }
}

impl<T: ?Sized, P: Reclaim<T>> SharedPtr<T, P> {
    /// An empty handle owning nothing and belonging to no lineage.
    pub fn empty() -> Self
    where
        P: Default,
    {
        Self {
            lineage: None,
            policy: P::default(),
            _marker: PhantomData,
        }
    }

    /// Starts a lineage with one owner over the allocation behind `raw`,
    /// which may be null for an empty handle. The default policy destroys it.
    ///
    /// # Safety
    ///
    /// A non-null `raw` must point to a live value this lineage may destroy
    /// with its policy, and no owner outside the lineage may release it.
    pub unsafe fn from_raw(raw: *mut T) -> Self
    where
        P: Default,
    {
        Self::from_raw_with(raw, P::default())
    }

    /// Starts a lineage with one owner over the allocation behind `raw`,
    /// under `policy`.
    ///
    /// # Safety
    ///
    /// Same contract as [`from_raw`](Self::from_raw).
    pub unsafe fn from_raw_with(raw: *mut T, policy: P) -> Self {
        Self {
            lineage: NonNull::new(raw).map(Lineage::start),
            policy,
            _marker: PhantomData,
        }
    }

    /// `true` when the handle owns nothing.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.lineage.is_none()
    }

    /// Number of live handles in this handle's lineage; zero when empty.
    ///
    /// The count is a momentary observation: other threads holding co-owners
    /// may change it before the caller acts on it.
    pub fn owner_count(&self) -> usize {
        self.lineage.map_or(0, |lineage| {
            // SAFETY: the block outlives every co-owner, and self is one.
            unsafe { lineage.count.as_ref() }.owners.load(Ordering::Acquire)
        })
    }

    /// `true` when both handles share a lineage (or both are empty).
    ///
    /// Identity lives in the control block, not the value address: every
    /// zero-sized value sits at the same dangling address, while each lineage
    /// allocates its own block.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self.lineage, other.lineage) {
            (Some(a), Some(b)) => a.count == b.count,
            (None, None) => true,
            _ => false,
        }
    }

    /// Borrows the owned value, or `None` for an empty handle.
    #[inline]
    pub fn as_ref(&self) -> Option<&T> {
        // SAFETY: the value outlives the lineage, and self keeps it live.
        self.lineage.map(|lineage| unsafe { lineage.raw.as_ref() })
    }

    /// Mutably borrows the owned value when this handle is the lineage's sole
    /// owner, `None` otherwise.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        let lineage = self.lineage?;
        // SAFETY: see owner_count.
        if unsafe { lineage.count.as_ref() }.owners.load(Ordering::Acquire) == 1 {
            // SAFETY: a count of one means self is the only handle, and it is
            // exclusively borrowed for the returned lifetime.
            Some(unsafe { &mut *lineage.raw.as_ptr() })
        } else {
            None
        }
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
        match self.lineage {
            Some(lineage) => lineage.raw.as_ref(),
            None if cfg!(debug_assertions) => panic!("dereferenced an empty SharedPtr"),
            None => core::hint::unreachable_unchecked(),
        }
    }

    /// Mutably borrows the owned value without checking emptiness or owner
    /// count.
    ///
    /// # Safety
    ///
    /// The handle must be non-empty, and no other handle of the lineage may
    /// touch the value for the returned borrow's lifetime.
    ///
    /// # Panics
    ///
    /// Debug builds panic on an empty handle instead of proceeding.
    #[inline]
    #[track_caller]
    pub unsafe fn deref_mut(&mut self) -> &mut T {
        match self.lineage {
            Some(lineage) => &mut *lineage.raw.as_ptr(),
            None if cfg!(debug_assertions) => panic!("dereferenced an empty SharedPtr"),
            None => core::hint::unreachable_unchecked(),
        }
    }

    /// Releases the current lineage and leaves the handle empty.
    ///
    /// If this handle was the lineage's last owner, the value is destroyed
    /// through the policy and the control block is freed; otherwise the
    /// co-owners keep the value alive. Resetting an empty handle does
    /// nothing.
    pub fn reset(&mut self) {
        self.release();
    }

    /// Releases the current lineage, then starts a fresh single-owner lineage
    /// over the allocation behind `raw` (null leaves the handle empty). The
    /// destruction policy is kept.
    ///
    /// # Safety
    ///
    /// Same contract as [`from_raw`](Self::from_raw).
    pub unsafe fn reset_raw(&mut self, raw: *mut T) {
        self.release();
        self.lineage = NonNull::new(raw).map(Lineage::start);
    }

    /// Exchanges the lineages and policies of two handles.
    ///
    /// No count moves: each lineage keeps exactly the owners it had, they are
    /// just held by the other handle now.
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

    /// Drops this handle's claim on its lineage.
    ///
    /// The decrement and the observation of the old count are one atomic
    /// operation: only the caller that saw exactly one may reclaim, so the
    /// value and block are destroyed once no matter how releases interleave.
    fn release(&mut self) {
        if let Some(lineage) = self.lineage.take() {
            // SAFETY: the block outlives every co-owner, and self still is one.
            let count = unsafe { lineage.count.as_ref() };
            if count.owners.fetch_sub(1, Ordering::Release) == 1 {
                // Synchronizes with every earlier release's decrement before
                // the value is torn down.
                fence(Ordering::Acquire);
                // SAFETY: the count hit zero, so this call holds the one
                // remaining claim on the value and the block.
                unsafe {
                    self.policy.reclaim(lineage.raw);
                    heap::destroy(lineage.count);
                }
            }
        }
    }
}

impl<T: ?Sized, P: Reclaim<T> + Clone> Clone for SharedPtr<T, P> {
    fn clone(&self) -> Self {
        // The policy is replicated before the owner slot is claimed; an
        // unwinding policy clone must leave the count exact.
        let policy = self.policy.clone();
        if let Some(lineage) = self.lineage {
            // A new owner is derived from a live one, so the count is at
            // least one here and cannot concurrently reach zero; Relaxed
            // suffices.
            // SAFETY: see owner_count.
            unsafe { lineage.count.as_ref() }
                .owners
                .fetch_add(1, Ordering::Relaxed);
        }
        Self {
            lineage: self.lineage,
            policy,
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized, P: Reclaim<T> + Default> Default for SharedPtr<T, P> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: ?Sized, P: Reclaim<T>> Drop for SharedPtr<T, P> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T: ?Sized, P: Reclaim<T>> fmt::Debug for SharedPtr<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedPtr")
            .field("raw", &self.lineage.map(|lineage| lineage.raw))
            .field("owners", &self.owner_count())
            .finish_non_exhaustive()
    }
}

impl<T: ?Sized, P: Reclaim<T>> fmt::Pointer for SharedPtr<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lineage {
            Some(lineage) => fmt::Pointer::fmt(&lineage.raw, f),
            None => f.write_str("0x0"),
        }
    }
}

// A handle can carry the value to another thread and drop it there, so the
// value must be Send; co-owners on other threads can read it concurrently,
// so it must be Sync. The policy travels and is invoked with the handle.
unsafe impl<T: ?Sized + Send + Sync, P: Reclaim<T> + Send> Send for SharedPtr<T, P> {}
unsafe impl<T: ?Sized + Send + Sync, P: Reclaim<T> + Sync> Sync for SharedPtr<T, P> {}
