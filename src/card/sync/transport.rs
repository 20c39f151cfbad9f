use crate::recognition::{ImageHandle, RecognitionClient, RemoteEnvelope, TransportError};

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Outbound calls the sync client makes against the recognition service
///
/// Implementations must stop work and return promptly once `cancel` fires. They never arm
/// deadlines themselves; see [`run_with_deadline`].
#[async_trait::async_trait]
pub trait CardTransport: Send + Sync {
	async fn submit_image(
		&self,
		image: &ImageHandle,
		cancel: &CancellationToken,
	) -> Result<RemoteEnvelope, TransportError>;

	async fn refresh_balance(
		&self,
		card_number: &str,
		cancel: &CancellationToken,
	) -> Result<RemoteEnvelope, TransportError>;

	async fn check_health(&self, cancel: &CancellationToken) -> Result<(), TransportError>;

	/// Get the name of this transport for logging
	fn name(&self) -> &'static str;
}

#[async_trait::async_trait]
impl CardTransport for RecognitionClient {
	async fn submit_image(
		&self,
		image: &ImageHandle,
		cancel: &CancellationToken,
	) -> Result<RemoteEnvelope, TransportError> {
		self.scan_card(image, cancel).await
	}

	async fn refresh_balance(
		&self,
		card_number: &str,
		cancel: &CancellationToken,
	) -> Result<RemoteEnvelope, TransportError> {
		RecognitionClient::refresh_balance(self, card_number, cancel).await
	}

	async fn check_health(&self, cancel: &CancellationToken) -> Result<(), TransportError> {
		RecognitionClient::check_health(self, cancel).await
	}

	fn name(&self) -> &'static str {
		"recognition-http"
	}
}

/// Run one transport call under a deadline.
///
/// A fresh token is handed to `call`. When `deadline` elapses first the token is cancelled,
/// the call future is dropped and the result is `Timeout`.
pub async fn run_with_deadline<T, F, Fut>(deadline: Duration, call: F) -> Result<T, TransportError>
where
	F: FnOnce(CancellationToken) -> Fut,
	Fut: Future<Output = Result<T, TransportError>>,
{
	let token = CancellationToken::new();
	let call = call(token.clone());
	tokio::pin!(call);

	tokio::select! {
		result = &mut call => result,
		_ = tokio::time::sleep(deadline) => {
			token.cancel();
			warn!("Transport call exceeded its {} ms deadline", deadline.as_millis());
			Err(TransportError::Timeout)
		}
	}
}
