//! Recognition service integration
//!
//! This module provides the client and wire types for talking to the remote card recognition
//! service: submitting a card image, refreshing the balance of a known card and probing health.

/// HTTP client for the recognition endpoints
mod client;
/// Type definitions for the service's data structures
mod types;

pub use client::RecognitionClient;
pub use types::*;
