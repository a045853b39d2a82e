//! Reentrant mutex with an observable lock count.

use std::{
    fmt,
    ops::Deref,
    sync::atomic::{AtomicUsize, Ordering},
};

use log::trace;

/// A mutex the owning thread may lock again without deadlocking.
///
/// Each [`ReentrantMutex::lock`] from the owner bumps the lock count and the
/// underlying lock is only released when the last guard is dropped. Guards are
/// `!Send`, so lock ownership can never be handed to another thread, and only the
/// owner can ever release it.
///
/// Because the lock is shared by re-entrant callers, guards only give `&T`. Put a
/// `RefCell` (or another cell) inside for mutation.
///
/// # Examples
/// ```
/// use voxel_core::core::sync::ReentrantMutex;
///
/// let mutex = ReentrantMutex::new(5);
/// let outer = mutex.lock();
/// let inner = mutex.lock();
/// assert_eq!(mutex.lock_count(), 2);
/// drop(inner);
/// assert!(mutex.is_owned_by_current_thread());
/// drop(outer);
/// assert!(!mutex.is_locked());
/// ```
pub struct ReentrantMutex<T: ?Sized> {
    count: AtomicUsize,
    inner: parking_lot::ReentrantMutex<T>,
}

impl<T> ReentrantMutex<T> {
    /// Wraps `value` in an unlocked mutex.
    pub fn new(value: T) -> Self {
        Self {
            count: AtomicUsize::new(0),
            inner: parking_lot::ReentrantMutex::new(value),
        }
    }

    /// Consumes the mutex and returns the protected value.
    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

impl<T: ?Sized> ReentrantMutex<T> {
    /// Acquires the lock, blocking while another thread owns it.
    ///
    /// Tries the non-blocking path first; same-thread re-entry never blocks.
    pub fn lock(&self) -> ReentrantGuard<'_, T> {
        let guard = match self.inner.try_lock() {
            Some(guard) => guard,
            None => {
                trace!("reentrant mutex contended, blocking");
                self.inner.lock()
            }
        };
        self.count.fetch_add(1, Ordering::AcqRel);
        ReentrantGuard {
            mutex: self,
            guard: Some(guard),
        }
    }

    /// Acquires the lock only if that does not require blocking.
    pub fn try_lock(&self) -> Option<ReentrantGuard<'_, T>> {
        let guard = self.inner.try_lock()?;
        self.count.fetch_add(1, Ordering::AcqRel);
        Some(ReentrantGuard {
            mutex: self,
            guard: Some(guard),
        })
    }

    /// Returns `true` if any thread holds the lock.
    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }

    /// Returns `true` if the calling thread holds the lock.
    pub fn is_owned_by_current_thread(&self) -> bool {
        self.inner.is_owned_by_current_thread()
    }

    /// Number of live guards held by the owner; `0` when unlocked.
    ///
    /// Only meaningful to the owning thread; other threads may observe a value
    /// that is already stale.
    pub fn lock_count(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }
}

impl<T: Default> Default for ReentrantMutex<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: ?Sized> fmt::Debug for ReentrantMutex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReentrantMutex")
            .field("locked", &self.is_locked())
            .field("count", &self.lock_count())
            .finish_non_exhaustive()
    }
}

/// Proof of holding a [`ReentrantMutex`]. Dropping it is the unlock.
pub struct ReentrantGuard<'a, T: ?Sized> {
    mutex: &'a ReentrantMutex<T>,
    guard: Option<parking_lot::ReentrantMutexGuard<'a, T>>,
}

impl<T: ?Sized> Deref for ReentrantGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match &self.guard {
            Some(guard) => &**guard,
            None => unreachable!("guard is only taken on drop"),
        }
    }
}

impl<T: ?Sized> Drop for ReentrantGuard<'_, T> {
    fn drop(&mut self) {
        // Decrement while the lock is still held.
        self.mutex.count.fetch_sub(1, Ordering::AcqRel);
        self.guard.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        sync::{mpsc, Arc},
        thread,
        time::Duration,
    };

    #[test]
    fn three_locks_two_unlocks_still_held() {
        let mutex = Arc::new(ReentrantMutex::new(()));
        let (tx, rx) = mpsc::channel();

        let first = mutex.lock();
        let second = mutex.lock();
        let third = mutex.lock();
        drop(third);
        drop(second);
        assert_eq!(mutex.lock_count(), 1);
        assert!(mutex.is_owned_by_current_thread());

        let other = Arc::clone(&mutex);
        let probe = thread::spawn(move || {
            tx.send(other.try_lock().is_some()).unwrap();
        });
        assert!(!rx.recv_timeout(Duration::from_secs(5)).unwrap());
        probe.join().unwrap();

        drop(first);
        assert_eq!(mutex.lock_count(), 0);
        let other = Arc::clone(&mutex);
        assert!(thread::spawn(move || other.try_lock().is_some()).join().unwrap());
    }

    #[test]
    fn blocked_thread_acquires_after_release() {
        let mutex = Arc::new(ReentrantMutex::new(std::cell::Cell::new(0)));
        let guard = mutex.lock();

        let other = Arc::clone(&mutex);
        let waiter = thread::spawn(move || {
            let guard = other.lock();
            guard.set(guard.get() + 1);
            other.lock_count()
        });

        thread::sleep(Duration::from_millis(20));
        assert_eq!(guard.get(), 0);
        drop(guard);

        assert_eq!(waiter.join().unwrap(), 1);
        assert_eq!(mutex.lock().get(), 1);
    }

    #[test]
    fn try_lock_reenters_on_owner() {
        let mutex = ReentrantMutex::new(7);
        let _outer = mutex.lock();
        let inner = mutex.try_lock().expect("owner re-enters without blocking");
        assert_eq!(*inner, 7);
        assert_eq!(mutex.lock_count(), 2);
    }
}
