//! Record store shared between threads.

use std::{cell::RefCell, sync::Arc};

use super::record_store::{Record, RecordStore};
use super::sync::{MutexError, ReentrantGuard, ReentrantMutex};
use crate::settings::Settings;

/// A thread-safe, reference-counted [`RecordStore`] guarded by a [`ReentrantMutex`].
///
/// Every convenience method takes the lock for its own duration. To make a sequence
/// of calls atomic, hold the lock with [`SharedStore::hold`] and keep calling the
/// same methods: the mutex is reentrant, so the calling thread never deadlocks on
/// itself while other threads wait.
///
/// # Examples
///
/// ## Atomic read-modify-write
/// ```
/// use voxel_core::core::SharedStore;
///
/// let config: SharedStore<()> = SharedStore::new();
/// config.set("max_users", Some("10"), None);
///
/// {
///     let _held = config.hold();
///     let next = config.get_int("max_users") + 5;
///     config.set("max_users", Some(&next.to_string()), None);
/// }
/// assert_eq!(config.get_int("max_users"), 15);
/// ```
///
/// ## Sharing Between Threads
/// ```
/// # use std::thread;
/// use voxel_core::core::SharedStore;
///
/// let bans: SharedStore<()> = SharedStore::new();
/// let writer = bans.clone();
///
/// thread::spawn(move || writer.set("10.0.0.1", Some("griefer"), None))
///     .join()
///     .unwrap();
/// assert_eq!(bans.get_str("10.0.0.1").as_deref(), Some("griefer"));
/// ```
pub struct SharedStore<D> {
    inner: Arc<ReentrantMutex<RefCell<RecordStore<D>>>>,
}

/// Lock held through [`SharedStore::hold`].
pub type StoreLock<'a, D> = ReentrantGuard<'a, RefCell<RecordStore<D>>>;

impl<D: Send + 'static> Default for SharedStore<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Send + 'static> SharedStore<D> {
    /// Creates an empty shared store.
    pub fn new() -> Self {
        Self::from_store(RecordStore::new())
    }

    /// Wraps an existing store.
    pub fn from_store(store: RecordStore<D>) -> Self {
        Self {
            inner: Arc::new(ReentrantMutex::new(RefCell::new(store))),
        }
    }

    /// Locks the store until the returned guard is dropped.
    ///
    /// # Returns
    /// A `!Send` guard. While it lives, other threads block on every method of this
    /// store and the holding thread can keep calling them.
    pub fn hold(&self) -> StoreLock<'_, D> {
        self.inner.lock()
    }

    /// Runs `f` with exclusive access to the underlying store.
    ///
    /// # Arguments
    /// * `f` - Closure given `&mut RecordStore` while the lock is held.
    ///
    /// # Returns
    /// Whatever `f` returns.
    ///
    /// # Panics
    /// Panics if `f` calls back into this same store; use [`SharedStore::hold`]
    /// when a sequence needs to re-enter.
    pub fn with<R>(&self, f: impl FnOnce(&mut RecordStore<D>) -> R) -> R {
        let guard = self.inner.lock();
        let mut store = guard.borrow_mut();
        f(&mut store)
    }

    /// Runs `f` with shared access to the underlying store.
    pub fn read<R>(&self, f: impl FnOnce(&RecordStore<D>) -> R) -> R {
        let guard = self.inner.lock();
        let store = guard.borrow();
        f(&store)
    }

    /// See [`RecordStore::set`].
    pub fn set(&self, name: &str, value: Option<&str>, data: Option<D>) {
        self.with(|store| store.set(name, value, data));
    }

    /// See [`RecordStore::remove`].
    pub fn remove(&self, name: &str) -> Option<Record<D>> {
        self.with(|store| store.remove(name))
    }

    /// Copy of the string value of `name`.
    pub fn get_str(&self, name: &str) -> Option<String> {
        self.read(|store| store.get_str(name).map(str::to_owned))
    }

    /// See [`RecordStore::get_int`].
    pub fn get_int(&self, name: &str) -> i64 {
        self.read(|store| store.get_int(name))
    }

    /// See [`RecordStore::get_float`].
    pub fn get_float(&self, name: &str) -> f64 {
        self.read(|store| store.get_float(name))
    }

    /// See [`RecordStore::get_bool`].
    pub fn get_bool(&self, name: &str) -> bool {
        self.read(|store| store.get_bool(name))
    }

    /// Returns `true` if a record called `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.read(|store| store.get(name).is_some())
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.read(RecordStore::len)
    }

    /// Returns `true` when the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.read(RecordStore::is_empty)
    }

    /// Record names in ascending hash order.
    pub fn names(&self) -> Vec<String> {
        self.read(|store| store.names().map(str::to_owned).collect())
    }

    /// `(name, value)` pairs in ascending hash order.
    pub fn entries(&self) -> Vec<(String, Option<String>)> {
        self.read(|store| {
            store
                .iter()
                .map(|r| (r.name().to_owned(), r.value().map(str::to_owned)))
                .collect()
        })
    }

    /// See [`RecordStore::free`].
    pub fn free(&self, free_data: bool) -> Vec<D> {
        self.with(|store| store.free(free_data))
    }

    /// Waits, bounded by `settings`, until no thread holds the store's lock.
    pub fn unlock_complete(&self, settings: &Settings) -> Result<u32, MutexError> {
        self.inner.unlock_complete(settings)
    }
}

impl<D: Clone + Send + 'static> SharedStore<D> {
    /// Copy of the payload attached to `name`.
    pub fn get_data(&self, name: &str) -> Option<D> {
        self.read(|store| store.get_data(name).cloned())
    }
}

impl<D> Clone for SharedStore<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn concurrent_increments_are_atomic_under_hold() {
        let store: SharedStore<()> = SharedStore::new();
        store.set("counter", Some("0"), None);

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        let _held = store.hold();
                        let next = store.get_int("counter") + 1;
                        store.set("counter", Some(&next.to_string()), None);
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(store.get_int("counter"), 800);
    }

    #[test]
    fn with_and_read_see_the_same_table() {
        let store = SharedStore::new();
        store.with(|s| {
            s.set("a", Some("1"), Some(10u16));
            s.set("b", None, Some(20));
        });
        assert_eq!(store.len(), 2);
        assert_eq!(store.get_data("b"), Some(20));
        assert!(store.contains("a"));
        assert_eq!(store.remove("a").and_then(|r| r.data().copied()), Some(10));
        assert_eq!(store.names(), vec!["b".to_owned()]);
    }

    #[test]
    fn unlock_complete_on_idle_store() {
        let store: SharedStore<()> = SharedStore::new();
        let settings = Settings {
            unlock_poll_interval_ms: 1,
            ..Settings::default()
        };
        assert_eq!(store.unlock_complete(&settings).unwrap(), 1);
    }
}
