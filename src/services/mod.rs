//! # Services
//!
//! The thin collaborators layered on the core: each pairs a record table with its
//! own reentrant mutex through [`SharedStore`](crate::core::SharedStore).
//!
//! - [`AuthStore`]: player privileges
//! - [`BanList`]: banned addresses
//! - [`CommandRegistry`]: name → handler dispatch over split argument vectors
//! - [`Console`]: the administrative console wiring all of the above together

pub mod auth;
pub mod bans;
pub mod commands;
pub mod console;

pub use auth::{AuthStore, Privileges};
pub use bans::BanList;
pub use commands::{Command, CommandError, CommandHandler, CommandRegistry};
pub use console::Console;
