//! # Thread Wrapper
//!
//! An OS thread that remembers its entry function and argument array so it can be
//! re-spawned after it finishes, and that reports an integer exit code.
//!
//! ## Lifecycle
//! 1. [`Thread::create`] (or [`ThreadBuilder::spawn`]) starts the entry on a new
//!    OS thread. The state is [`ThreadState::Running`].
//! 2. The entry finishes by returning a code or by calling [`ThreadContext::exit`].
//! 3. [`Thread::stop`] raises the stop flag. The entry is expected to poll
//!    [`ThreadContext::should_stop`] at safe points and return; nothing is killed,
//!    so locks held by the entry are always released by their guards.
//! 4. [`Thread::wait`] blocks (bounded by the configured timeout) until the entry
//!    has finished, reaps the OS thread, and returns the exit code.
//! 5. [`Thread::wake`] runs a finished thread again with the same entry and args.
//!
//! A panicking entry is contained: it is logged and reported as exit code `-1`.

use std::{
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use log::{debug, error};
use parking_lot::{Condvar, Mutex};

use crate::core::array::{ArrayKind, TypedArray};
use crate::settings::Settings;

/// Exit code reported for an entry that panicked.
pub const PANIC_EXIT_CODE: i32 = -1;

/// Entry function shared by every run of a [`Thread`].
pub type ThreadEntry = Arc<dyn Fn(&ThreadContext) -> i32 + Send + Sync>;

/// Errors from [`Thread`] operations.
#[derive(Debug, thiserror::Error)]
pub enum ThreadError {
    /// The OS refused to spawn the thread.
    #[error("failed to spawn thread: {0}")]
    Spawn(#[from] std::io::Error),
    /// The thread did not finish within the wait bound.
    #[error("thread did not finish within {0:?}")]
    Timeout(Duration),
    /// `wake` was called while the previous run is still going.
    #[error("thread is still running")]
    StillRunning,
    /// `wait` was called on a thread that was already reaped.
    #[error("thread is not running")]
    NotRunning,
    /// Thread arguments must be a pointer-kind array.
    #[error("thread arguments must be a pointer array, got a {0} array")]
    InvalidArgs(ArrayKind),
}

/// Observable run state of a [`Thread`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ThreadState {
    /// The entry is executing.
    Running,
    /// A stop was requested but the entry has not returned yet.
    Stopping,
    /// The entry has finished.
    Stopped,
}

/// What a running entry sees of its own thread.
pub struct ThreadContext {
    args: Arc<TypedArray>,
    stop: Arc<AtomicBool>,
}

struct ThreadExit(i32);

impl ThreadContext {
    /// The pointer-kind argument array given at creation.
    pub fn args(&self) -> &TypedArray {
        &self.args
    }

    /// Returns `true` once [`Thread::stop`] has been called.
    pub fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Ends the entry immediately with `code`, unwinding its stack so every guard
    /// it holds is released.
    pub fn exit(&self, code: i32) -> ! {
        panic::resume_unwind(Box::new(ThreadExit(code)))
    }
}

#[derive(Default)]
struct Completion {
    code: Mutex<Option<i32>>,
    done: Condvar,
}

/// Configures and spawns a [`Thread`].
#[derive(Debug, Clone)]
pub struct ThreadBuilder {
    name: Option<String>,
    wait_timeout: Duration,
}

impl Default for ThreadBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreadBuilder {
    /// A builder using the default [`Settings`].
    pub fn new() -> Self {
        Self::from_settings(&Settings::default())
    }

    /// A builder whose wait bound comes from `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            name: None,
            wait_timeout: settings.thread_wait_timeout(),
        }
    }

    /// Names the OS thread.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Bound used by [`Thread::wait`].
    pub fn wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    /// Spawns `entry` with `args`, which must be a pointer-kind array.
    pub fn spawn<F>(self, entry: F, args: TypedArray) -> Result<Thread, ThreadError>
    where
        F: Fn(&ThreadContext) -> i32 + Send + Sync + 'static,
    {
        if args.kind() != ArrayKind::Ptr {
            return Err(ThreadError::InvalidArgs(args.kind()));
        }
        let mut thread = Thread {
            name: self.name,
            entry: Arc::new(entry),
            args: Arc::new(args),
            stop: Arc::new(AtomicBool::new(false)),
            completion: Arc::new(Completion::default()),
            handle: None,
            exit_code: None,
            wait_timeout: self.wait_timeout,
        };
        thread.start()?;
        Ok(thread)
    }
}

/// A re-runnable OS thread with an exit code.
pub struct Thread {
    name: Option<String>,
    entry: ThreadEntry,
    args: Arc<TypedArray>,
    stop: Arc<AtomicBool>,
    completion: Arc<Completion>,
    handle: Option<JoinHandle<()>>,
    exit_code: Option<i32>,
    wait_timeout: Duration,
}

impl Thread {
    /// Spawns `entry` with `args` using default settings.
    ///
    /// # Examples
    /// ```
    /// use voxel_core::core::array::{ArrayKind, TypedArray};
    /// use voxel_core::core::sync::Thread;
    ///
    /// let mut thread = Thread::create(|ctx| ctx.args().len() as i32, TypedArray::new(ArrayKind::Ptr)).unwrap();
    /// assert_eq!(thread.wait().unwrap(), 0);
    /// ```
    pub fn create<F>(entry: F, args: TypedArray) -> Result<Thread, ThreadError>
    where
        F: Fn(&ThreadContext) -> i32 + Send + Sync + 'static,
    {
        ThreadBuilder::new().spawn(entry, args)
    }

    /// Spawns `entry` with `args`, bounding [`Thread::wait`] by
    /// [`Settings::thread_wait_timeout`].
    ///
    /// # Arguments
    /// * `entry` - Function run on the new thread; its return value is the exit code.
    /// * `args` - Pointer-kind argument array handed to every run.
    /// * `settings` - Source of the wait bound.
    ///
    /// # Returns
    /// The running thread, or `ThreadError::InvalidArgs` / `ThreadError::Spawn`.
    pub fn create_with<F>(entry: F, args: TypedArray, settings: &Settings) -> Result<Thread, ThreadError>
    where
        F: Fn(&ThreadContext) -> i32 + Send + Sync + 'static,
    {
        ThreadBuilder::from_settings(settings).spawn(entry, args)
    }

    /// Returns a builder for a named or custom-timeout thread.
    pub fn builder() -> ThreadBuilder {
        ThreadBuilder::new()
    }

    fn start(&mut self) -> Result<(), ThreadError> {
        *self.completion.code.lock() = None;
        self.stop.store(false, Ordering::Release);
        self.exit_code = None;

        let entry = Arc::clone(&self.entry);
        let completion = Arc::clone(&self.completion);
        let context = ThreadContext {
            args: Arc::clone(&self.args),
            stop: Arc::clone(&self.stop),
        };
        let label = self.label().to_owned();

        let mut builder = thread::Builder::new();
        if let Some(name) = &self.name {
            builder = builder.name(name.clone());
        }
        let handle = builder.spawn(move || {
            let code = match panic::catch_unwind(AssertUnwindSafe(|| entry(&context))) {
                Ok(code) => code,
                Err(payload) => match payload.downcast::<ThreadExit>() {
                    Ok(exit) => exit.0,
                    Err(_) => {
                        error!("thread {label} panicked");
                        PANIC_EXIT_CODE
                    }
                },
            };
            debug!("thread {label} exited with {code}");
            *completion.code.lock() = Some(code);
            completion.done.notify_all();
        })?;

        debug!("thread {} spawned", self.label());
        self.handle = Some(handle);
        Ok(())
    }

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }

    fn finished(&self) -> bool {
        self.completion.code.lock().is_some()
    }

    /// Current run state.
    pub fn state(&self) -> ThreadState {
        if self.handle.is_none() || self.finished() {
            ThreadState::Stopped
        } else if self.stop.load(Ordering::Acquire) {
            ThreadState::Stopping
        } else {
            ThreadState::Running
        }
    }

    /// Exit code of the last reaped run.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Asks the entry to stop at its next [`ThreadContext::should_stop`] check.
    /// Does not wait.
    pub fn stop(&self) {
        debug!("thread {} asked to stop", self.label());
        self.stop.store(true, Ordering::Release);
    }

    /// Runs the entry again with the same args after the previous run finished.
    ///
    /// A finished but unreaped run is reaped first. Waking a thread that is still
    /// running is an error; a running thread that was never stopped is left alone.
    pub fn wake(&mut self) -> Result<(), ThreadError> {
        if self.handle.is_some() {
            if !self.finished() {
                return Err(ThreadError::StillRunning);
            }
            self.reap();
        }
        self.start()
    }

    /// Waits for the entry to finish using the configured bound.
    pub fn wait(&mut self) -> Result<i32, ThreadError> {
        self.wait_timeout(self.wait_timeout)
    }

    /// Waits at most `timeout` for the entry to finish, then reaps it.
    ///
    /// # Arguments
    /// * `timeout` - Longest time to block. The thread keeps running if it expires.
    ///
    /// # Returns
    /// The exit code, `ThreadError::Timeout` if the entry is still running, or
    /// `ThreadError::NotRunning` if the last run was already reaped.
    pub fn wait_timeout(&mut self, timeout: Duration) -> Result<i32, ThreadError> {
        if self.handle.is_none() {
            return Err(ThreadError::NotRunning);
        }

        let deadline = Instant::now() + timeout;
        {
            let mut code = self.completion.code.lock();
            while code.is_none() {
                if self.completion.done.wait_until(&mut code, deadline).timed_out() && code.is_none() {
                    return Err(ThreadError::Timeout(timeout));
                }
            }
        }

        Ok(self.reap())
    }

    fn reap(&mut self) -> i32 {
        if let Some(handle) = self.handle.take() {
            // The entry's panics are caught inside the thread.
            let _ = handle.join();
        }
        let code = self.completion.code.lock().unwrap_or(PANIC_EXIT_CODE);
        self.exit_code = Some(code);
        code
    }
}

impl Drop for Thread {
    fn drop(&mut self) {
        if self.handle.is_some() && !self.finished() {
            debug!("thread {} dropped while running, detaching", self.label());
            self.stop();
        }
    }
}
