//! # Voxel Core Console Entry Point
//!
//! Starts the administrative console on stdin/stdout. Logging follows `RUST_LOG`
//! and settings are read from the file named by `VOXEL_CORE_SETTINGS`.
//!
//! ## Usage
//!
//! ```bash
//! echo "set motd hello" | RUST_LOG=debug cargo run --release
//! ```

fn main() {
    voxel_core::run();
}
