//! # Core Module
//!
//! The record-store and concurrency foundation every other subsystem is built on.
//!
//! ## Key Components
//! - [`list::OrderedList`]: arena-backed doubly-linked chain with comparator placement
//! - [`record_store::RecordStore`]: name/value/payload table kept in ascending hash order
//! - [`array::TypedArray`]: single-kind dynamic array with cross-kind coercion
//! - [`sync`]: reentrant mutex, re-runnable threads and bounded force-drain
//! - [`SharedStore`]: a record store paired with its own reentrant mutex
//!
//! The list, store and array are not thread-safe on their own. Anything touched from
//! more than one thread goes through a [`SharedStore`] (or its own
//! [`sync::ReentrantMutex`]).
//!
//! ## Usage
//! ```rust
//! use voxel_core::core::{array::split, SharedStore};
//!
//! let config: SharedStore<()> = SharedStore::new();
//! config.set("motd", Some("hello world"), None);
//!
//! let words = split(&config.get_str("motd").unwrap(), " ", false).unwrap();
//! assert_eq!(words.len(), 2);
//! ```

pub mod array;
pub mod list;
pub mod parse;
pub mod record_store;
pub mod shared_store;
pub mod sync;

pub use array::{ArrayKind, TypedArray};
pub use record_store::{Record, RecordStore};
pub use shared_store::SharedStore;
