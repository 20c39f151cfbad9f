#![allow(dead_code)]

use card_balance_sync::card::sync::repositories::{CardCacheRepository, InMemoryCardCacheRepository};
use card_balance_sync::card::sync::transport::CardTransport;
use card_balance_sync::recognition::{ImageHandle, RemoteEnvelope, TransportError};
use card_balance_sync::{CardData, CardSyncClient, SyncConfig, Transaction};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;

pub const CARD_NUMBER: &str = "1234567890123456";

/// Transport that fails every call the same way.
pub struct FailingTransport {
	pub error: TransportError,
	pub calls: AtomicUsize,
}

impl FailingTransport {
	pub fn new(error: TransportError) -> Self {
		Self {
			error,
			calls: AtomicUsize::new(0),
		}
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

#[async_trait::async_trait]
impl CardTransport for FailingTransport {
	async fn submit_image(
		&self,
		_image: &ImageHandle,
		_cancel: &CancellationToken,
	) -> Result<RemoteEnvelope, TransportError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		Err(self.error.clone())
	}

	async fn refresh_balance(
		&self,
		_card_number: &str,
		_cancel: &CancellationToken,
	) -> Result<RemoteEnvelope, TransportError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		Err(self.error.clone())
	}

	async fn check_health(&self, _cancel: &CancellationToken) -> Result<(), TransportError> {
		Err(self.error.clone())
	}

	fn name(&self) -> &'static str {
		"failing"
	}
}

/// Transport that answers every call with the same envelope.
pub struct StaticTransport {
	pub envelope: RemoteEnvelope,
}

#[async_trait::async_trait]
impl CardTransport for StaticTransport {
	async fn submit_image(
		&self,
		_image: &ImageHandle,
		_cancel: &CancellationToken,
	) -> Result<RemoteEnvelope, TransportError> {
		Ok(self.envelope.clone())
	}

	async fn refresh_balance(
		&self,
		_card_number: &str,
		_cancel: &CancellationToken,
	) -> Result<RemoteEnvelope, TransportError> {
		Ok(self.envelope.clone())
	}

	async fn check_health(&self, _cancel: &CancellationToken) -> Result<(), TransportError> {
		Ok(())
	}

	fn name(&self) -> &'static str {
		"static"
	}
}

/// Transport whose calls never complete on their own.
pub struct StalledTransport;

#[async_trait::async_trait]
impl CardTransport for StalledTransport {
	async fn submit_image(
		&self,
		_image: &ImageHandle,
		cancel: &CancellationToken,
	) -> Result<RemoteEnvelope, TransportError> {
		cancel.cancelled().await;
		Err(TransportError::Cancelled)
	}

	async fn refresh_balance(
		&self,
		_card_number: &str,
		cancel: &CancellationToken,
	) -> Result<RemoteEnvelope, TransportError> {
		cancel.cancelled().await;
		Err(TransportError::Cancelled)
	}

	async fn check_health(&self, cancel: &CancellationToken) -> Result<(), TransportError> {
		cancel.cancelled().await;
		Err(TransportError::Cancelled)
	}

	fn name(&self) -> &'static str {
		"stalled"
	}
}

pub fn test_config() -> SyncConfig {
	SyncConfig {
		fallback_seed: Some(7),
		..SyncConfig::default()
	}
}

pub fn client_with(
	transport: Arc<dyn CardTransport>,
	cache: Arc<InMemoryCardCacheRepository>,
) -> CardSyncClient {
	CardSyncClient::new(transport, cache as Arc<dyn CardCacheRepository>, &test_config())
}

pub fn transaction(id: &str, amount: f64) -> Transaction {
	Transaction {
		id: id.to_string(),
		description: format!("Entry {}", id),
		amount,
		date: "2025-06-01T10:00:00.000Z".to_string(),
	}
}

pub fn card(balance: &str, history: Vec<Transaction>) -> CardData {
	CardData {
		card_number: CARD_NUMBER.to_string(),
		balance: balance.to_string(),
		card_type: Some("Transit".to_string()),
		card_holder: Some("Ada Lovelace".to_string()),
		expiry_date: Some("01/30".to_string()),
		issuer: Some("Metro".to_string()),
		last_transactions: history,
	}
}
