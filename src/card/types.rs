use crate::recognition::CardData;

use serde::{Deserialize, Serialize};

/// User-visible message when a refresh has nothing to work from.
pub const NO_CARD_DATA_MESSAGE: &str = "No card data found to refresh";

/// Where the data in an envelope came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
	/// Returned by the recognition service.
	Live,
	/// Synthesized locally because the service could not be reached.
	Fallback,
}

/// Uniform result returned by every client-facing operation.
///
/// Exactly one of `data` and `error` is populated, matching `success`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardEnvelope {
	pub success: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<CardData>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
	pub provenance: Provenance,
}

impl CardEnvelope {
	pub fn ok(data: CardData, provenance: Provenance) -> Self {
		Self {
			success: true,
			data: Some(data),
			error: None,
			provenance,
		}
	}

	pub fn failure(error: impl Into<String>, provenance: Provenance) -> Self {
		Self {
			success: false,
			data: None,
			error: Some(error.into()),
			provenance,
		}
	}

	pub fn is_fallback(&self) -> bool {
		self.provenance == Provenance::Fallback
	}
}

/// Failures of the local card cache
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

/// Errors raised while synthesizing a fallback refresh
#[derive(Debug, thiserror::Error)]
pub enum CardSyncError {
	#[error("{}", NO_CARD_DATA_MESSAGE)]
	NoCachedData,

	#[error("Cached balance is not a valid decimal: {0}")]
	InvalidBalance(String),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn envelope_serializes_only_the_populated_side() {
		let envelope = CardEnvelope::failure(NO_CARD_DATA_MESSAGE, Provenance::Fallback);
		let json = serde_json::to_value(&envelope).unwrap();

		assert_eq!(json["success"], false);
		assert_eq!(json["error"], NO_CARD_DATA_MESSAGE);
		assert_eq!(json["provenance"], "fallback");
		assert!(json.get("data").is_none());
	}

	#[test]
	fn no_cached_data_renders_user_message() {
		assert_eq!(CardSyncError::NoCachedData.to_string(), NO_CARD_DATA_MESSAGE);
	}
}
