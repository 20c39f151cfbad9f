//! Card balance synchronization client.
//!
//! Turns a photographed payment or transit card into a cached `CardData` record by way of a
//! remote recognition service, keeps that record's balance fresh, and falls back to locally
//! synthesized data when the service cannot be reached.

pub mod card;
pub mod config;
pub mod recognition;
pub mod utils;

pub use card::{CardEnvelope, CardSyncClient, Provenance};
pub use config::SyncConfig;
pub use recognition::{CardData, ImageHandle, Transaction};
