//! Destruction policies.
//!
//! A pointer type on its own only decides *when* the owned value dies; the
//! [`Reclaim`] policy it carries decides *how*. The default policy drops the
//! value and frees its heap storage, and any `FnMut(NonNull<T>)` closure can
//! stand in for it, so resources that are not plain heap values (pool slots,
//! foreign handles, values that must be logged on the way out) plug into the
//! same pointer types.

use core::ptr::NonNull;

use crate::heap;

/// Disposes of a value once its last owner is gone.
///
/// Implementations receive the raw address exactly once per owned value and
/// take over full responsibility for it.
pub trait Reclaim<T: ?Sized> {
    /// Destroys the value at `raw`.
    ///
    /// # Safety
    ///
    /// `raw` must point to a live value the caller owns, and the caller must
    /// not use the pointer again afterwards.
    unsafe fn reclaim(&mut self, raw: NonNull<T>);
}

/// Policy that drops the value in place and returns its storage to the global
/// allocator, the exact inverse of the pointer factories.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultReclaim;

impl<T: ?Sized> Reclaim<T> for DefaultReclaim {
    unsafe fn reclaim(&mut self, raw: NonNull<T>) {
        heap::destroy(raw);
    }
}

/// Any `FnMut(NonNull<T>)` closure is a policy.
///
/// ```
/// use core::ptr::NonNull;
/// use custody::ExclusivePtr;
///
/// let mut last = None;
/// {
///     let log = |raw: NonNull<u32>| {
///         last = Some(unsafe { *raw.as_ptr() });
///         unsafe { drop(Box::from_raw(raw.as_ptr())) };
///     };
///     let _guarded = ExclusivePtr::new_with(7u32, log);
/// }
/// assert_eq!(last, Some(7));
/// ```
impl<T: ?Sized, F: FnMut(NonNull<T>)> Reclaim<T> for F {
    unsafe fn reclaim(&mut self, raw: NonNull<T>) {
        self(raw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Probe(Rc<Cell<u32>>);

    impl Drop for Probe {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn default_policy_drops_and_frees() {
        let drops = Rc::new(Cell::new(0));
        let raw = heap::allocate(Probe(Rc::clone(&drops)));
        unsafe { DefaultReclaim.reclaim(raw) };
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn closures_are_policies() {
        let mut seen = None;
        let raw = heap::allocate(9i32);
        {
            let mut policy = |raw: NonNull<i32>| {
                seen = Some(unsafe { *raw.as_ptr() });
                unsafe { heap::destroy(raw) };
            };
            unsafe { policy.reclaim(raw) };
        }
        assert_eq!(seen, Some(9));
    }
}
