//! Core types and trait definitions for Rapport.
//!
//! This crate is deliberately free of HTTP and database dependencies. It
//! defines the social graph and chat domain, the [`store::SocialStore`]
//! persistence abstraction, and the collaborator traits (object storage, user
//! cache) the engines consume.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod cache;
pub mod error;
pub mod message;
pub mod page;
pub mod relationship;
pub mod room;
pub mod storage;
pub mod store;
pub mod user;

pub use error::{Error, Result};
