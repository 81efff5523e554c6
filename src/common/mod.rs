//! Shared filesystem utilities.

pub mod files;
pub mod temp;

pub use files::{copy_file_with_dirs, ensure_dir_exists, write_file_atomic};
pub use temp::{prepare_work_dir, remove_file_if_exists};
