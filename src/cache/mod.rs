//! Cache module for keeping raw API responses in memory
//!
//! This module provides a response cache keyed by request URL. Entries expire
//! after a fixed TTL and are removed by a background reaper task, so callers
//! never manage expiry themselves.

mod response_cache;

pub use response_cache::ResponseCache;
