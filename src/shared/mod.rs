//! Shared helpers

pub mod lock;
