//! Card sync orchestrator and collaborator-facing entry point.
//!
//! This module defines the `CardSyncClient`, which coordinates the transport, the local cache
//! and the fallback synthesizer. Every operation runs the same short state machine:
//!
//! - call the transport under the configured deadline
//! - on a live card, write it to the cache and return it
//! - on a transport failure, synthesize a substitute, write it to the cache and return it
//!
//! Transport failures never reach the caller. The one failure a caller does see is a refresh
//! with nothing cached to fall back on. Envelopes carry a `Provenance` tag so callers can tell
//! a live balance from a synthesized one.

use crate::card::sync::{
	fallback::FallbackSynthesizer,
	repositories::{CardCacheRepository, FileCardCacheRepository},
	transport::{CardTransport, run_with_deadline},
};
use crate::card::{CardEnvelope, CardSyncError, NO_CARD_DATA_MESSAGE, Provenance};
use crate::config::SyncConfig;
use crate::recognition::{CardData, ImageHandle, RecognitionClient, RemoteEnvelope, TransportError};
use crate::utils::mask_card_number;

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const DEFAULT_SCAN_ERROR: &str = "Failed to process card image";
const DEFAULT_REFRESH_ERROR: &str = "Failed to refresh balance";

/// What a 2xx response from the service amounted to.
enum RemoteOutcome {
	Card(CardData),
	/// The service answered but declined, e.g. an unreadable image.
	Rejected(Option<String>),
}

impl RemoteOutcome {
	fn from_envelope(envelope: RemoteEnvelope) -> Result<Self, TransportError> {
		match (envelope.success, envelope.data) {
			(true, Some(card)) => Ok(RemoteOutcome::Card(card)),
			(true, None) => Err(TransportError::InvalidResponse(
				"Successful response carried no card data".to_string(),
			)),
			(false, _) => Ok(RemoteOutcome::Rejected(envelope.error)),
		}
	}
}

/// Card data synchronization client
pub struct CardSyncClient {
	transport: Arc<dyn CardTransport>,
	cache: Arc<dyn CardCacheRepository>,
	fallback: FallbackSynthesizer,
	request_timeout: Duration,
	health_timeout: Duration,
}

impl CardSyncClient {
	/// Wire a client from explicit parts.
	///
	/// Deadlines, history cap and fallback seed are taken from `config`.
	pub fn new(
		transport: Arc<dyn CardTransport>,
		cache: Arc<dyn CardCacheRepository>,
		config: &SyncConfig,
	) -> Self {
		let fallback = match config.fallback_seed {
			Some(seed) => FallbackSynthesizer::with_seed(seed, config.history_cap),
			None => FallbackSynthesizer::from_entropy(config.history_cap),
		};

		Self {
			transport,
			cache,
			fallback,
			request_timeout: config.request_timeout,
			health_timeout: config.health_timeout,
		}
	}

	/// Client backed by the HTTP recognition service and the file cache in `config.data_dir`.
	pub fn from_config(config: &SyncConfig) -> Result<Self, TransportError> {
		let transport = RecognitionClient::new(config.api_base_url.clone())?;
		let cache = FileCardCacheRepository::new(config.data_dir.clone());

		info!(
			"Card sync client targeting {} with cache in {:?}",
			config.api_base_url, config.data_dir
		);
		Ok(Self::new(Arc::new(transport), Arc::new(cache), config))
	}

	/// Submit a card image and cache whatever card comes back.
	///
	/// Resolves with `success: true` on any transport failure, carrying the sentinel record
	/// tagged `Provenance::Fallback`. Only an explicit rejection by the service yields
	/// `success: false`.
	pub async fn submit_image(&self, image: ImageHandle) -> CardEnvelope {
		info!("Submitting card image via {}", self.transport.name());

		let image = &image;
		let result = run_with_deadline(self.request_timeout, |token| async move {
			self.transport.submit_image(image, &token).await
		})
		.await
		.and_then(RemoteOutcome::from_envelope);

		match result {
			Ok(RemoteOutcome::Card(card)) => {
				info!(
					"Recognised card {} with balance {}",
					mask_card_number(&card.card_number),
					card.balance
				);
				self.store(&card).await;
				CardEnvelope::ok(card, Provenance::Live)
			}
			Ok(RemoteOutcome::Rejected(reason)) => {
				warn!("Recognition service rejected the image: {:?}", reason);
				CardEnvelope::failure(
					reason.unwrap_or_else(|| DEFAULT_SCAN_ERROR.to_string()),
					Provenance::Live,
				)
			}
			Err(e) => {
				warn!("Image submission failed ({}), using fallback card", e);
				let card = self.fallback.sentinel_card(Utc::now());
				self.store(&card).await;
				CardEnvelope::ok(card, Provenance::Fallback)
			}
		}
	}

	/// Refresh the balance of a known card.
	///
	/// On transport failure the cached record for `card_number` is patched locally. Fails with
	/// "No card data found to refresh" when there is no such record; the cache is then left
	/// untouched.
	pub async fn refresh_balance(&self, card_number: &str) -> CardEnvelope {
		let masked = mask_card_number(card_number);
		info!("Refreshing balance for card {} via {}", masked, self.transport.name());

		let result = run_with_deadline(self.request_timeout, |token| async move {
			self.transport.refresh_balance(card_number, &token).await
		})
		.await
		.and_then(RemoteOutcome::from_envelope)
		.and_then(|outcome| match outcome {
			RemoteOutcome::Card(card) if card.card_number != card_number => {
				Err(TransportError::InvalidResponse(format!(
					"Refresh for card {} returned card {}",
					masked,
					mask_card_number(&card.card_number)
				)))
			}
			other => Ok(other),
		});

		match result {
			Ok(RemoteOutcome::Card(card)) => {
				let card = self.reconcile(card).await;
				info!("Refreshed card {} to balance {}", masked, card.balance);
				self.store(&card).await;
				CardEnvelope::ok(card, Provenance::Live)
			}
			Ok(RemoteOutcome::Rejected(reason)) => {
				warn!("Recognition service rejected the refresh: {:?}", reason);
				CardEnvelope::failure(
					reason.unwrap_or_else(|| DEFAULT_REFRESH_ERROR.to_string()),
					Provenance::Live,
				)
			}
			Err(e) => {
				warn!("Balance refresh failed ({}), using fallback refresh", e);
				self.fallback_refresh(card_number).await
			}
		}
	}

	/// The cached card, if any. Unreadable cache contents count as empty.
	pub async fn get_cached(&self) -> Option<CardData> {
		match self.cache.read().await {
			Ok(card) => card,
			Err(e) => {
				error!("Failed to retrieve card data: {}", e);
				None
			}
		}
	}

	/// Drop the cached card.
	pub async fn clear_cached(&self) {
		match self.cache.clear().await {
			Ok(()) => info!("Cleared cached card data"),
			Err(e) => error!("Failed to clear card data: {}", e),
		}
	}

	/// Whether the recognition service answers its liveness probe in time.
	pub async fn check_health(&self) -> bool {
		let result = run_with_deadline(self.health_timeout, |token| async move {
			self.transport.check_health(&token).await
		})
		.await;

		match result {
			Ok(()) => true,
			Err(e) => {
				warn!("API health check failed: {}", e);
				false
			}
		}
	}

	async fn fallback_refresh(&self, card_number: &str) -> CardEnvelope {
		let cached = self.get_cached().await;

		match self.fallback.refreshed_card(cached, card_number, Utc::now()) {
			Ok(card) => {
				self.store(&card).await;
				CardEnvelope::ok(card, Provenance::Fallback)
			}
			Err(CardSyncError::NoCachedData) => {
				warn!("No cached card to refresh from");
				CardEnvelope::failure(NO_CARD_DATA_MESSAGE, Provenance::Fallback)
			}
			Err(e) => {
				error!("Fallback refresh failed: {}", e);
				CardEnvelope::failure(e.to_string(), Provenance::Fallback)
			}
		}
	}

	/// Carry the cached history over when a live refresh returns none.
	async fn reconcile(&self, mut card: CardData) -> CardData {
		if !card.last_transactions.is_empty() {
			return card;
		}

		if let Some(cached) = self.get_cached().await {
			if cached.card_number == card.card_number && !cached.last_transactions.is_empty() {
				debug!(
					"Live refresh carried no history, keeping {} cached transactions",
					cached.last_transactions.len()
				);
				card.last_transactions = cached.last_transactions;
				card.last_transactions.truncate(self.fallback.history_cap());
			}
		}
		card
	}

	async fn store(&self, card: &CardData) {
		if let Err(e) = self.cache.write(card).await {
			error!("Failed to store card data: {}", e);
		}
	}
}
