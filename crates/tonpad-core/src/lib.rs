//! # tonpad-core
//! TON primitives for tonpad: cells and BOC serialization, addresses,
//! mnemonic keys, nanoton amounts, the wallet v4r2 contract and the provider
//! traits the wallet logic is written against.

pub mod address;
pub mod amount;
pub mod boc;
pub mod cell;
pub mod constants;
pub mod crypto;
pub mod error;
pub mod message;
pub mod mnemonic;
pub mod traits;
pub mod wallet_v4;
