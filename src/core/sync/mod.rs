//! # Synchronization
//!
//! Thread and lock primitives shared by every store in the engine:
//! - [`ReentrantMutex`]: a mutex its owning thread may re-lock, with an observable count
//! - [`Thread`]: a re-runnable OS thread with an exit code and a cooperative stop flag
//! - [`ReentrantMutex::unlock_complete`]: bounded force-drain of a mutex whose holder
//!   is shutting down
//!
//! None of these primitives kill threads. A thread asked to [`Thread::stop`] returns
//! at its next safe point, and unwinding releases every guard it holds.

mod drain;
mod mutex;
mod thread;

pub use drain::MutexError;
pub use mutex::{ReentrantGuard, ReentrantMutex};
pub use thread::{
    Thread, ThreadBuilder, ThreadContext, ThreadEntry, ThreadError, ThreadState, PANIC_EXIT_CODE,
};
