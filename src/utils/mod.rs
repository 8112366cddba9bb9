//! Utility functions and helpers
//!
//! This module contains the atomic file-replacement and append helpers used by the
//! JSONL store.

pub mod atomic;

pub use atomic::{append_synced, atomic_write_with, cleanup_temp_file, temp_path_for};
