//! Data models shared across the application.

mod enums;
mod files;

pub use enums::FileStatus;
pub use files::{
    dotted_lowercase_extension, is_supported_extension, FileEntry, SUPPORTED_EXTENSIONS,
};
