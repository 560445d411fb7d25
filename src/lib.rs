//! Pokedex CLI Library
//!
//! This module exposes the cache, API client, commands, and REPL for use by the
//! binary and by integration tests.

pub mod cache;
pub mod cli;
pub mod commands;
pub mod data;
pub mod repl;
pub mod session;
