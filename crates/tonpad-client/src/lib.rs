//! # tonpad-client
//! HTTP implementations of the tonpad provider traits.
//!
//! - [`toncenter`]: JSON-RPC balance, account state, seqno and BOC submission.
//! - [`access`]: endpoint discovery, static or through ton-access.
//! - [`tonapi`]: TON/USD rate and NFT/jetton counts.
//! - [`providers`]: the bundle built from a [`config::ClientConfig`].

pub mod access;
pub mod config;
mod http;
pub mod providers;
pub mod toncenter;
pub mod tonapi;

pub use config::{ClientConfig, EndpointMode};
pub use providers::Providers;

#[cfg(test)]
mod tests;
