//! Core types, the store trait, and the bid-acceptance workflow for Adhok.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod accept;
pub mod award;
pub mod bid;
pub mod error;
pub mod gate;
pub mod guard;
pub mod identity;
pub mod notification;
pub mod project;
pub mod store;
pub mod tier;
pub mod user;

#[cfg(test)]
mod testing;

pub use error::{Error, ErrorKind, Result};
