//! Per-website time accounting for a browser extension. Visits are folded into a ledger of
//! lifetime domain totals and per-day category splits, persisted as a single JSON document that
//! both the message host and the cli work on.
//!

pub mod cli;
pub mod config;
pub mod domain;
pub mod fs;
pub mod host;
pub mod ledger;
pub mod stats;
pub mod storage;
pub mod utils;
