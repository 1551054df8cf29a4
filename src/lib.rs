//! # `custody` - Exclusive and Shared Ownership Handles
//!
//! A small ownership toolkit built around two complementary heap pointers:
//! [`ExclusivePtr`], a move-only single owner, and [`SharedPtr`], an
//! atomically reference-counted co-owner. Both are generic over the owned
//! value type and over a destruction policy invoked with the raw address once
//! the last claim on the value ends.
//!
//! ## Ownership Guarantees
//!
//! ### Exclusive ownership
//! - **No duplication**: `ExclusivePtr` has no `Clone` impl, so copying an
//!   owner is a compile-time error, not a runtime check.
//! - **Move empties the source**: where a transfer is observable at runtime
//!   ([`ExclusivePtr::take`], [`ExclusivePtr::release`], swaps), the source is
//!   left demonstrably empty.
//! - **Exactly-once destruction**: drop, [`ExclusivePtr::reset`], and
//!   overwrite each release the old value through the policy exactly once.
//!
//! ### Shared ownership
//! - **Counted claims**: every clone increments one atomic owner count;
//!   every release decrements it.
//! - **One reclaimer**: the decrement and the observation of the old count
//!   are a single read-modify-write, so exactly one releaser ever sees the
//!   count at one and tears the value down, however releases interleave
//!   across threads.
//! - **Publication**: the reclaiming thread synchronizes with every prior
//!   owner before the value is destroyed.
//!
//! ## Destruction Policies
//!
//! A policy is anything implementing [`Reclaim`], including any
//! `FnMut(NonNull<T>)` closure. [`DefaultReclaim`] drops the value in place
//! and returns its storage to the global allocator; custom policies cover
//! pool slots, foreign handles, or instrumented teardown. The policy rides
//! with the handle: shared handles replicate it into every clone so the last
//! owner, whichever it is, holds a copy.
//!
//! ## Example
//!
//! ```rust
//! use custody::{ExclusivePtr, SharedPtr};
//!
//! // Single owner: ownership moves, never copies.
//! let mut sole = ExclusivePtr::new(vec![1, 2, 3]);
//! sole.as_mut().unwrap().push(4);
//! let heir = sole.take();
//! assert!(sole.is_null());
//! assert_eq!(heir.as_ref().map(Vec::len), Some(4));
//!
//! // Co-owners: the value outlives all but the last.
//! let left = SharedPtr::new(String::from("shared"));
//! let right = left.clone();
//! assert_eq!(left.owner_count(), 2);
//! drop(left);
//! assert_eq!(right.as_ref().map(String::as_str), Some("shared"));
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::should_implement_trait)]

pub mod exclusive_ptr;
mod heap;
pub mod reclaim;
pub mod shared_ptr;
mod sync;

pub use exclusive_ptr::ExclusivePtr;
pub use reclaim::{DefaultReclaim, Reclaim};
pub use shared_ptr::SharedPtr;

// Compile-time assertions for memory layout claims.
const _: () = {
    use core::mem;

    // The empty state lives in the pointer's null niche; an exclusive handle
    // costs exactly the raw pointer it guards.
    assert!(mem::size_of::<ExclusivePtr<u64>>() == mem::size_of::<*mut u64>());
    assert!(mem::align_of::<ExclusivePtr<u64>>() == mem::align_of::<*mut u64>());

    // Slice handles stay fat-pointer sized, metadata included.
    assert!(mem::size_of::<ExclusivePtr<[u8]>>() == mem::size_of::<*mut [u8]>());

    // A shared handle is two words: the value and its control block.
    assert!(mem::size_of::<SharedPtr<u64>>() == 2 * mem::size_of::<usize>());

    // The default policy rides along for free.
    assert!(mem::size_of::<DefaultReclaim>() == 0);
};
