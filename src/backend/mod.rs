//! Backends that need no graphics API.

pub mod headless;
