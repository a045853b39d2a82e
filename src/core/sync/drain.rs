//! Force-drain recovery for a mutex whose holder is being shut down.
//!
//! A watcher [`Thread`](super::Thread) makes exactly one `try_lock` attempt per
//! run and reports it as its exit code. The caller keeps waiting for the watcher
//! and waking it again until an attempt succeeds, which proves that every guard
//! has been released.
//! Unlike a blind retry loop this is bounded by
//! [`Settings::unlock_complete_timeout`].

use std::{
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use log::{debug, warn};

use super::mutex::ReentrantMutex;
use super::thread::{ThreadBuilder, ThreadContext, ThreadError};
use crate::core::array::{ArrayError, Opaque, TypedArray};
use crate::settings::Settings;

const LOCK_ACQUIRED: i32 = 0;
const LOCK_BUSY: i32 = 1;
const MISSING_ARG: i32 = 2;

/// Errors from [`ReentrantMutex::unlock_complete`].
#[derive(Debug, thiserror::Error)]
pub enum MutexError {
    /// The calling thread holds the lock itself, so no watcher could ever take it.
    #[error("mutex is held by the calling thread")]
    HeldByCaller,
    /// The lock stayed busy for the whole bound.
    #[error("mutex still locked after {attempts} attempts over {waited:?}")]
    Timeout {
        /// Watcher runs performed.
        attempts: u32,
        /// Time spent before giving up.
        waited: Duration,
    },
    /// The watcher's argument array could not be built.
    #[error(transparent)]
    Args(#[from] ArrayError),
    /// The watcher thread could not be spawned or re-woken.
    #[error(transparent)]
    Thread(#[from] ThreadError),
}

impl<T: Send + 'static> ReentrantMutex<T> {
    /// Blocks until the mutex is observed free from another thread.
    ///
    /// Returns the number of watcher runs it took. Use this after asking a thread
    /// that may hold the lock to stop, before tearing down whatever the lock
    /// protects.
    pub fn unlock_complete(self: &Arc<Self>, settings: &Settings) -> Result<u32, MutexError> {
        if self.is_owned_by_current_thread() {
            return Err(MutexError::HeldByCaller);
        }

        let timeout = settings.unlock_complete_timeout();
        let poll = settings.unlock_poll_interval();
        let started = Instant::now();
        let deadline = started + timeout;

        let args = TypedArray::from_ptrs([Arc::clone(self) as Opaque])?;
        let mut watcher = ThreadBuilder::from_settings(settings)
            .name("unlock-watcher")
            .spawn(try_lock_once::<T>, args)?;

        let mut attempts = 1;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match watcher.wait_timeout(remaining) {
                Ok(LOCK_ACQUIRED) => {
                    debug!("mutex drained after {attempts} attempts");
                    return Ok(attempts);
                }
                Ok(_) => {}
                Err(ThreadError::Timeout(_)) => break,
                Err(err) => return Err(err.into()),
            }

            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep(poll.min(deadline - now));
            watcher.wake()?;
            attempts += 1;
        }

        let waited = started.elapsed();
        warn!("mutex still locked after {attempts} attempts over {waited:?}");
        Err(MutexError::Timeout { attempts, waited })
    }
}

fn try_lock_once<T: Send + 'static>(ctx: &ThreadContext) -> i32 {
    let Some(mutex) = ctx
        .args()
        .get_ptr(0)
        .and_then(|p| p.downcast::<ReentrantMutex<T>>().ok())
    else {
        return MISSING_ARG;
    };
    let acquired = mutex.try_lock().is_some();
    if acquired {
        LOCK_ACQUIRED
    } else {
        LOCK_BUSY
    }
}
