//! Memo cells for lazily computed values
//!
//! A [`Memo`] holds a value that is computed on first access and reused for the
//! lifetime of its owner. Unlike a plain lazy value, a failed computation is
//! surfaced to the caller and *not* stored: the cell falls back to
//! [`MemoState::Unresolved`] so a later access may retry.
//!
//! ```
//! use prehook_core::memo::{Memo, MemoState};
//!
//! let memo: Memo<u32> = Memo::new();
//! assert_eq!(memo.state(), MemoState::Unresolved);
//!
//! let failed: Result<&u32, &str> = memo.get_or_try_init(|| Err("not yet"));
//! assert!(failed.is_err());
//! assert_eq!(memo.state(), MemoState::Unresolved);
//!
//! assert_eq!(memo.get_or_try_init(|| Ok::<_, &str>(7)), Ok(&7));
//! assert_eq!(memo.state(), MemoState::Resolved);
//! ```

use std::cell::{Cell, OnceCell};

/// Observable state of a [`Memo`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoState {
    /// Never computed, or the last computation failed
    Unresolved,
    /// Computation in progress on this thread
    Resolving,
    /// Value computed and cached permanently
    Resolved,
}

/// Single-threaded memo cell with failure-is-not-cached semantics
#[derive(Debug)]
pub struct Memo<T> {
    slot: OnceCell<T>,
    resolving: Cell<bool>,
}

impl<T> Memo<T> {
    /// Create an unresolved cell
    pub const fn new() -> Self {
        Self {
            slot: OnceCell::new(),
            resolving: Cell::new(false),
        }
    }

    /// Current state of the cell
    pub fn state(&self) -> MemoState {
        if self.slot.get().is_some() {
            MemoState::Resolved
        } else if self.resolving.get() {
            MemoState::Resolving
        } else {
            MemoState::Unresolved
        }
    }

    /// The cached value, if resolved
    pub fn get(&self) -> Option<&T> {
        self.slot.get()
    }

    /// Return the cached value or compute it with an infallible initializer
    pub fn get_or_init(&self, init: impl FnOnce() -> T) -> &T {
        match self.get_or_try_init(|| Ok::<T, std::convert::Infallible>(init())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Return the cached value or compute it
    ///
    /// On success the value is cached permanently. On failure the error is
    /// returned and nothing is cached.
    pub fn get_or_try_init<E>(&self, init: impl FnOnce() -> Result<T, E>) -> Result<&T, E> {
        if let Some(value) = self.slot.get() {
            return Ok(value);
        }

        self.resolving.set(true);
        let outcome = init();
        self.resolving.set(false);

        let value = outcome?;
        // A re-entrant initializer may have filled the slot first; the first value wins.
        Ok(self.slot.get_or_init(|| value))
    }
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self::new()
    }
}
