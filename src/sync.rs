//! Atomic primitives, switchable to `loom`'s checked models.
//!
//! Everything in the crate that touches an atomic goes through this module so
//! that building with `RUSTFLAGS="--cfg loom"` swaps in `loom`'s simulated
//! primitives for model checking (see `tests/loom.rs`).

cfg_if::cfg_if! {
    if #[cfg(loom)] {
        pub(crate) use loom::sync::atomic::{fence, AtomicUsize, Ordering};
    } else {
        pub(crate) use core::sync::atomic::{fence, AtomicUsize, Ordering};
    }
}
