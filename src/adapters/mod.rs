//! Adapter implementations for port traits.
//!
//! - `live/` — HTTP fetcher and S3 store
//! - `recording/` — Record interactions to cassettes
//! - `replaying/` — Replay interactions from cassettes

pub mod live;
pub mod recording;
pub mod replaying;
