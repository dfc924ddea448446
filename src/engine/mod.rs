//! Core engine modules for classboard.

pub mod assignments;
pub mod board;
pub mod clock;
pub mod config;
pub mod error;
pub mod input;
pub mod sessions;
pub mod types;
pub mod window;
