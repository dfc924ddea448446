//! Lifecycle classification for live sessions and assignments.
//!
//! Everything under [`engine`] is a pure function of `(entities, now)`.
//! Sample a [`engine::clock::Now`] once per render and pass it everywhere.

pub mod engine;
