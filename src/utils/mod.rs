//! Cross-platform utility helpers.

pub mod fs;
