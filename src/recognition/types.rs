//! Wire types shared with the card recognition service

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One ledger entry on a card.
///
/// `amount` is signed: negative values are debits, positive values are credits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
	/// Identifier, unique within the card's history.
	pub id: String,
	pub description: String,
	pub amount: f64,
	/// ISO-8601 timestamp.
	pub date: String,
}

/// The canonical record for one physical card.
///
/// The service speaks camelCase JSON, and the same shape is what gets persisted
/// in the local cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardData {
	/// Opaque identifier. Only ever displayed masked.
	pub card_number: String,
	/// Decimal-valued string, e.g. `"45.67"`.
	pub balance: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub card_type: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub card_holder: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub expiry_date: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub issuer: Option<String>,
	/// Most-recent-first.
	#[serde(default)]
	pub last_transactions: Vec<Transaction>,
}

/// Response body returned by both `/scan-card` and `/refresh-balance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteEnvelope {
	pub success: bool,
	#[serde(default)]
	pub data: Option<CardData>,
	#[serde(default)]
	pub error: Option<String>,
}

/// JSON body of a refresh request.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest<'a> {
	pub card_number: &'a str,
}

/// An image handed over by the capture collaborator.
#[derive(Debug, Clone)]
pub enum ImageHandle {
	/// Image stored on disk, e.g. a camera capture or a gallery pick.
	Path(PathBuf),
	/// Image already held in memory.
	Bytes(Vec<u8>),
}

impl ImageHandle {
	/// Load the raw image bytes.
	pub async fn read(&self) -> Result<Vec<u8>, TransportError> {
		match self {
			ImageHandle::Path(path) => tokio::fs::read(path).await.map_err(|e| {
				TransportError::Image(format!("Failed to read image {:?}: {}", path, e))
			}),
			ImageHandle::Bytes(bytes) => Ok(bytes.clone()),
		}
	}
}

/// Failures of a single call to the recognition service
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
	#[error("Request timed out")]
	Timeout,

	#[error("HTTP error: {0}")]
	HttpError(u16),

	#[error("Network error: {0}")]
	NetworkError(String),

	#[error("Invalid response: {0}")]
	InvalidResponse(String),

	#[error("Request cancelled")]
	Cancelled,

	#[error("Image error: {0}")]
	Image(String),
}

impl From<reqwest::Error> for TransportError {
	fn from(e: reqwest::Error) -> Self {
		if e.is_timeout() {
			TransportError::Timeout
		} else if e.is_decode() {
			TransportError::InvalidResponse(e.to_string())
		} else if let Some(status) = e.status() {
			TransportError::HttpError(status.as_u16())
		} else {
			TransportError::NetworkError(e.to_string())
		}
	}
}
