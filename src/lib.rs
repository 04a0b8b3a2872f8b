//! An in-memory limit order matching engine for a single trading venue.
//!
//! Submissions enter through the [`engine::Engine`], which keeps resting
//! orders in a price-indexed [`book::Book`], matches crossing orders under
//! price-time priority, moves funds through an [`accounts::Ledger`]
//! atomically with each fill, and fans out [`events::Match`] and
//! [`events::Fill`] records to subscribers. A [`monitor::StateMonitor`] can
//! watch the status stream for operators.

pub mod accounts;
pub mod book;
pub mod engine;
pub mod errors;
pub mod events;
pub mod matcher;
pub mod monitor;
pub mod orders;
pub mod tree;
