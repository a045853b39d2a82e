#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Core
//!
//! The foundational library shared by the voxel sandbox's server and client:
//! record tables, tagged argument arrays and the thread/lock primitives that
//! protect them.
//!
//! ## Key Modules
//!
//! * `core` - ordered list, hash-ordered record store, tagged array and synchronization
//! * `services` - auth, ban list, command registry and the admin console built on `core`
//! * `settings` - serde-loaded timeouts for the synchronization primitives
//!
//! ## Architecture
//!
//! Everything above `core` is a thin wrapper: a [`core::RecordStore`] paired with
//! its own [`core::sync::ReentrantMutex`] (see [`core::SharedStore`]). Tables are
//! explicitly constructed and owned by whatever runs the session; there are no
//! process-wide singletons.
//!
//! ## Usage
//!
//! ```rust
//! use voxel_core::{services::Console, settings::Settings};
//!
//! let console = Console::new(Settings::default());
//! console.execute("set max_users 20").unwrap();
//! assert_eq!(console.config.get_int("max_users"), 20);
//! ```

use std::io::{self, BufRead, Write};

use log::{error, info};

pub mod core;
pub mod services;
pub mod settings;

use services::Console;
use settings::Settings;

/// Runs the admin console on stdin/stdout until end of input.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            error!("{err}; falling back to default settings");
            Settings::default()
        }
    };

    let console = Console::new(settings);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                error!("failed to read console input: {err}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let reply = match console.execute(&line) {
            Ok(output) => output,
            Err(err) => format!("error: {err}"),
        };
        if writeln!(stdout, "{reply}").is_err() {
            break;
        }
    }

    console.shutdown();
}
