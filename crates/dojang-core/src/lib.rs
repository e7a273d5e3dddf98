//! Core types and trait definitions for the Dojang club-management store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod belt;
pub mod error;
pub mod event;
pub mod matches;
pub mod notification;
pub mod payment;
pub mod promotion;
pub mod role;
pub mod stats;
pub mod store;
pub mod trainee;

pub use error::{Error, Result};
