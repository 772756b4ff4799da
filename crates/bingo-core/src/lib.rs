//! Core types and trait definitions for the bingo game coordinator.
//!
//! No HTTP or database dependencies here. The crate holds the domain model,
//! the pure game algorithms (card generation, draw picking, line detection),
//! and the [`store::GameStore`] abstraction.

// Store impls are written with `async fn`; the trait spells out `Send`.
#![allow(async_fn_in_trait)]

pub mod audit;
pub mod card;
pub mod error;
pub mod event;
pub mod identity;
pub mod pattern;
pub mod room;
pub mod session;
pub mod store;

pub use error::{Error, Result};
