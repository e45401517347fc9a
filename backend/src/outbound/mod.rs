//! Outbound adapters: persistence and media storage.

pub mod media;
pub mod persistence;
