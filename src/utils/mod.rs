//!
//! Utility module for card display.
//!
//! Re-exports formatting helpers used by the sync client's logging and by the CLI.
/// Formatting helpers for card numbers, amounts and timestamps
pub mod format;

pub use format::{format_amount, format_last_updated, mask_card_number};
