//! Card Synchronization Module
//!
//! This module holds the logic that turns a raw card image into a cached `CardData` record and
//! keeps that record current:
//!
//! - `orchestrator`: `CardSyncClient`, the entry point used by capture and display code.
//! - `transport`: the `CardTransport` seam and the deadline/cancellation helper.
//! - `repositories`: the single-slot card cache, file-backed or in memory.
//! - `fallback`: deterministic substitutes used when the service is unreachable.

/// Locally synthesized substitutes for failed calls
pub mod fallback;
/// Main coordinator for submit and refresh
pub mod orchestrator;
/// Card cache persistence
pub mod repositories;
/// Transport abstraction and deadlines
pub mod transport;

pub use orchestrator::*;
