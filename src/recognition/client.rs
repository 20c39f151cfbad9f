//!
//! HTTP client for the card recognition service.
//!
//! This module provides an async client for the three endpoints the service exposes: image
//! recognition, balance refresh and a liveness probe. The client never touches the local cache
//! and never arms its own deadline; callers pass a cancellation token and own the timer.

use super::types::*;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Fixed metadata sent alongside every scanned image.
const SCAN_TYPE: &str = "balance_check";
const SCAN_QUALITY: &str = "high";
const IMAGE_FILE_NAME: &str = "card_image.jpg";
const IMAGE_MIME: &str = "image/jpeg";

/// Card recognition service client
#[derive(Clone)]
pub struct RecognitionClient {
	/// The underlying HTTP client.
	http_client: Client,
	/// Base URL of the service, e.g. `https://your-api-backend.com/api`.
	base_url: String,
}

impl RecognitionClient {
	/// Create a new recognition client.
	///
	/// # Arguments
	/// * `base_url` - The service base URL. A trailing slash is ignored.
	///
	/// # Returns
	/// A new `RecognitionClient`, or a `TransportError` if the HTTP client cannot be built.
	pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
		let http_client = Client::builder()
			.build()
			.map_err(|e| TransportError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

		Ok(Self {
			http_client,
			base_url: base_url.into().trim_end_matches('/').to_string(),
		})
	}

	fn endpoint(&self, path: &str) -> String {
		format!("{}/{}", self.base_url, path)
	}

	/// Submit a card image for recognition.
	///
	/// The image is sent as the multipart field `image` together with the fixed
	/// `scan_type` and `quality` fields.
	///
	/// # Errors
	/// `Image` if the image cannot be read, `HttpError` on a non-2xx status, `NetworkError` on
	/// transport failures, `InvalidResponse` if the body is not an envelope, and `Cancelled` if
	/// `cancel` fires first.
	pub async fn scan_card(
		&self,
		image: &ImageHandle,
		cancel: &CancellationToken,
	) -> Result<RemoteEnvelope, TransportError> {
		let bytes = image.read().await?;
		info!("Submitting card image for recognition ({} bytes)", bytes.len());

		let part = Part::bytes(bytes)
			.file_name(IMAGE_FILE_NAME)
			.mime_str(IMAGE_MIME)
			.map_err(|e| TransportError::Image(format!("Invalid image part: {}", e)))?;

		let form = Form::new()
			.part("image", part)
			.text("scan_type", SCAN_TYPE)
			.text("quality", SCAN_QUALITY);

		let request = self.http_client.post(self.endpoint("scan-card")).multipart(form);
		self.execute(request, cancel).await
	}

	/// Ask the service for the current balance of a known card.
	///
	/// # Errors
	/// Same taxonomy as [`RecognitionClient::scan_card`], minus `Image`.
	pub async fn refresh_balance(
		&self,
		card_number: &str,
		cancel: &CancellationToken,
	) -> Result<RemoteEnvelope, TransportError> {
		info!("Requesting balance refresh");

		let request = self
			.http_client
			.post(self.endpoint("refresh-balance"))
			.json(&RefreshRequest { card_number });
		self.execute(request, cancel).await
	}

	/// Probe `GET /health`.
	///
	/// # Returns
	/// `Ok(())` on a 2xx response.
	pub async fn check_health(&self, cancel: &CancellationToken) -> Result<(), TransportError> {
		let request = self.http_client.get(self.endpoint("health"));

		tokio::select! {
			biased;
			_ = cancel.cancelled() => Err(TransportError::Cancelled),
			response = request.send() => {
				let response = response?;
				debug!("Health probe answered with status {}", response.status());
				if response.status().is_success() {
					Ok(())
				} else {
					Err(TransportError::HttpError(response.status().as_u16()))
				}
			}
		}
	}

	/// Send a request and decode the envelope, racing against `cancel`.
	///
	/// Losing the race drops the in-flight request, which releases its connection.
	async fn execute(
		&self,
		request: reqwest::RequestBuilder,
		cancel: &CancellationToken,
	) -> Result<RemoteEnvelope, TransportError> {
		tokio::select! {
			biased;
			_ = cancel.cancelled() => {
				debug!("Request cancelled before completion");
				Err(TransportError::Cancelled)
			}
			result = Self::send(request) => result,
		}
	}

	async fn send(request: reqwest::RequestBuilder) -> Result<RemoteEnvelope, TransportError> {
		let response = request.send().await?;

		if !response.status().is_success() {
			return Err(TransportError::HttpError(response.status().as_u16()));
		}

		let body = response.text().await?;
		serde_json::from_str::<RemoteEnvelope>(&body)
			.map_err(|e| TransportError::InvalidResponse(format!("Failed to decode envelope: {}", e)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn endpoint_ignores_trailing_slash() {
		let client = RecognitionClient::new("http://localhost:8080/api/").unwrap();
		assert_eq!(client.endpoint("scan-card"), "http://localhost:8080/api/scan-card");
	}

	#[tokio::test]
	async fn cancelled_token_short_circuits_refresh() {
		// Port 9 (discard) on a non-routable address: the request would otherwise hang or fail.
		let client = RecognitionClient::new("http://10.255.255.1:9").unwrap();
		let cancel = CancellationToken::new();
		cancel.cancel();

		let result = client.refresh_balance("1234", &cancel).await;
		assert_eq!(result.unwrap_err(), TransportError::Cancelled);
	}
}
