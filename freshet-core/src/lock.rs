// Copyright 2026 Freshet contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The lock primitive every other component of the core shares.
//!
//! [`parking_lot::Mutex`] provides the non-reentrant, spinlock-class fast
//! path the core relies on: almost every guarded section is an O(1) field
//! read or write. There is no poisoning; a panic inside a guarded section is
//! a programmer error, and the lock is simply released on unwind.

pub use parking_lot::Mutex;

/// A value whose every access is serialized through a mutex.
///
/// All mutation of cross-thread shared state in this crate goes through
/// `Guarded::with_lock`. The closure runs with the lock held and must not
/// call back into anything that acquires the same `Guarded` - the underlying
/// mutex is not reentrant.
#[derive(Debug, Default)]
pub struct Guarded<T> {
    inner: Mutex<T>,
}

impl<T> Guarded<T> {
    /// Wraps `value` behind a fresh mutex.
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    /// Acquires the lock, runs `action` on the value, releases the lock.
    ///
    /// The lock is released even if `action` panics, and the panic
    /// propagates.
    pub fn with_lock<R>(&self, action: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.inner.lock();
        action(&mut guard)
    }

    /// Consumes the wrapper, returning the inner value.
    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

impl<T: Clone> Guarded<T> {
    /// Clones the current value under the lock.
    pub fn cloned(&self) -> T {
        self.with_lock(|v| v.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::Guarded;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn serializes_concurrent_mutation() {
        let counter = Arc::new(Guarded::new(0u64));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let counter = counter.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    counter.with_lock(|n| *n += 1);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(counter.with_lock(|n| *n), 8000);
    }

    #[test]
    fn releases_lock_on_panic() {
        let value = Arc::new(Guarded::new(1));
        let panicking = value.clone();
        let result = thread::spawn(move || {
            panicking.with_lock(|_| panic!("inside guarded section"));
        })
        .join();
        assert!(result.is_err());
        // The lock must be free again.
        assert_eq!(value.with_lock(|v| *v), 1);
    }
}
