//! Shared runtime helpers for the menu store binaries.

pub mod utils;
