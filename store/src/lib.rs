//! Cache and persistence core for GameScout.
//!
//! GameScout pulls a player's game library from the storefront catalog,
//! asks a generative model for ranked suggestions, and serves them from a
//! web UI. This crate is the embedded cache those collaborators call into:
//! profile, library and metadata caches with per-entity freshness windows,
//! an append-only recommendation cache, the feedback/status store, and a
//! one-time import of the legacy JSON status file.
//!
//! Route handlers, the login handshake and prompt construction live
//! elsewhere; they pass plain identifiers in and get plain records (or
//! `None` on a miss) back.

pub mod cache;
pub mod config;
