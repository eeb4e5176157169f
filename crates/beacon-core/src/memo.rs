//! Compute-once cell for derived values.
//!
//! A [`Memo`] is either [`MemoState::Uncomputed`] or
//! [`MemoState::Computed`]. The transition happens at most once, on first
//! access, and is never undone. Concurrent first accesses are serialized by
//! the underlying [`OnceLock`]: exactly one initializer runs and every reader
//! sees the value it published.

use std::fmt;
use std::sync::OnceLock;

/// Observable state of a [`Memo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoState<'a, T> {
    /// Nothing has been computed yet.
    Uncomputed,
    /// The value computed on first access.
    Computed(&'a T),
}

/// Lazily computed, immutable-once-set value.
pub struct Memo<T> {
    cell: OnceLock<T>,
}

impl<T> Memo<T> {
    /// Create an empty cell.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Return the cached value, running `compute` first if the cell is empty.
    ///
    /// `compute` runs at most once over the lifetime of the cell, even when
    /// several threads race on the first call.
    pub fn get_or_compute<F>(&self, compute: F) -> &T
    where
        F: FnOnce() -> T,
    {
        self.cell.get_or_init(compute)
    }

    /// Current state without triggering computation.
    #[must_use]
    pub fn state(&self) -> MemoState<'_, T> {
        self.cell
            .get()
            .map_or(MemoState::Uncomputed, MemoState::Computed)
    }

    /// Whether the value has been computed.
    #[must_use]
    pub fn is_computed(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for Memo<T> {
    fn clone(&self) -> Self {
        let cell = OnceLock::new();
        if let Some(value) = self.cell.get() {
            let _ = cell.set(value.clone());
        }
        Self { cell }
    }
}

impl<T: fmt::Debug> fmt::Debug for Memo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell.get() {
            Some(value) => f.debug_tuple("Computed").field(value).finish(),
            None => f.write_str("Uncomputed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_starts_uncomputed() {
        let memo: Memo<u32> = Memo::new();
        assert_eq!(memo.state(), MemoState::Uncomputed);
        assert!(!memo.is_computed());
    }

    #[test]
    fn test_computes_once() {
        let calls = AtomicUsize::new(0);
        let memo = Memo::new();

        let first = *memo.get_or_compute(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            7
        });
        let second = *memo.get_or_compute(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            8
        });

        assert_eq!(first, 7);
        assert_eq!(second, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(memo.state(), MemoState::Computed(&7));
    }

    #[test]
    fn test_concurrent_first_access_computes_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let memo = Arc::new(Memo::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let calls = Arc::clone(&calls);
                let memo = Arc::clone(&memo);
                std::thread::spawn(move || {
                    *memo.get_or_compute(|| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        std::thread::sleep(std::time::Duration::from_millis(5));
                        42_u64
                    })
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clone_keeps_computed_value() {
        let memo = Memo::new();
        memo.get_or_compute(|| 3.5_f64);
        let cloned = memo.clone();
        assert_eq!(cloned.state(), MemoState::Computed(&3.5));

        let empty: Memo<f64> = Memo::new();
        assert!(!empty.clone().is_computed());
    }

    #[test]
    fn test_debug_format() {
        let memo = Memo::new();
        assert_eq!(format!("{memo:?}"), "Uncomputed");
        memo.get_or_compute(|| 1);
        assert_eq!(format!("{memo:?}"), "Computed(1)");
    }
}
