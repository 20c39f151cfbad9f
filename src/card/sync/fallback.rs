//! Local substitutes for failed recognition calls.
//!
//! When the recognition service cannot be reached the sync client still needs something to hand
//! back. For an image submission that is a fixed sentinel record; for a refresh it is the cached
//! record with a nudged balance and a zero-amount "Balance Check" entry at the head of its
//! history. The only randomness is the balance delta, drawn from a seedable generator.

use crate::card::CardSyncError;
use crate::recognition::{CardData, Transaction};

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use std::sync::Mutex;
use tracing::{debug, info};

pub const SENTINEL_CARD_NUMBER: &str = "1234567890123456";
pub const SENTINEL_BALANCE: &str = "45.67";
pub const SENTINEL_CARD_TYPE: &str = "Gift Card";
pub const SENTINEL_CARD_HOLDER: &str = "Card Holder";
pub const SENTINEL_EXPIRY_DATE: &str = "12/25";
pub const SENTINEL_ISSUER: &str = "Sample Store";

pub const BALANCE_CHECK_DESCRIPTION: &str = "Balance Check";

/// Upper bound (exclusive) of the refresh delta, in cents.
const MAX_DELTA_CENTS: i64 = 1000;

/// Number of decimal places a synthesized balance is rendered with.
const BALANCE_SCALE: u32 = 2;

fn iso_timestamp(at: DateTime<Utc>) -> String {
	at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Produces fallback card data
pub struct FallbackSynthesizer {
	rng: Mutex<StdRng>,
	history_cap: usize,
}

impl FallbackSynthesizer {
	/// Create a synthesizer with a reproducible delta sequence.
	pub fn with_seed(seed: u64, history_cap: usize) -> Self {
		Self::from_rng(StdRng::seed_from_u64(seed), history_cap)
	}

	/// Create a synthesizer seeded from OS entropy.
	pub fn from_entropy(history_cap: usize) -> Self {
		Self::from_rng(StdRng::from_os_rng(), history_cap)
	}

	fn from_rng(rng: StdRng, history_cap: usize) -> Self {
		Self {
			rng: Mutex::new(rng),
			// Index 0 must always hold the newest entry
			history_cap: history_cap.max(1),
		}
	}

	pub fn history_cap(&self) -> usize {
		self.history_cap
	}

	/// The placeholder record returned when an image submission fails.
	///
	/// Every field except the transaction dates is fixed, so the record is recognisable.
	pub fn sentinel_card(&self, now: DateTime<Utc>) -> CardData {
		let mut last_transactions = vec![
			Transaction {
				id: "1".to_string(),
				description: "Purchase at Store #123".to_string(),
				amount: -15.99,
				date: iso_timestamp(now),
			},
			Transaction {
				id: "2".to_string(),
				description: "Card Reload".to_string(),
				amount: 50.00,
				date: iso_timestamp(now - Duration::days(1)),
			},
		];
		last_transactions.truncate(self.history_cap);

		info!("Using sentinel card data for failed image submission");

		CardData {
			card_number: SENTINEL_CARD_NUMBER.to_string(),
			balance: SENTINEL_BALANCE.to_string(),
			card_type: Some(SENTINEL_CARD_TYPE.to_string()),
			card_holder: Some(SENTINEL_CARD_HOLDER.to_string()),
			expiry_date: Some(SENTINEL_EXPIRY_DATE.to_string()),
			issuer: Some(SENTINEL_ISSUER.to_string()),
			last_transactions,
		}
	}

	/// Patch the cached record as if a refresh had succeeded.
	///
	/// # Errors
	/// `NoCachedData` if nothing is cached or the cache holds a different card, and
	/// `InvalidBalance` if the cached balance does not parse as a decimal.
	pub fn refreshed_card(
		&self,
		cached: Option<CardData>,
		card_number: &str,
		now: DateTime<Utc>,
	) -> Result<CardData, CardSyncError> {
		let mut card = match cached {
			Some(card) if card.card_number == card_number => card,
			Some(_) => {
				debug!("Cached card differs from the requested one, nothing to refresh");
				return Err(CardSyncError::NoCachedData);
			}
			None => return Err(CardSyncError::NoCachedData),
		};

		card.balance = self.nudge_balance(&card.balance)?;

		let entry = Transaction {
			id: Self::unique_id(&card.last_transactions, now),
			description: BALANCE_CHECK_DESCRIPTION.to_string(),
			amount: 0.0,
			date: iso_timestamp(now),
		};
		card.last_transactions.insert(0, entry);
		card.last_transactions.truncate(self.history_cap);

		info!(
			"Synthesized fallback refresh: balance {}, {} transactions",
			card.balance,
			card.last_transactions.len()
		);
		Ok(card)
	}

	/// `balance + delta` with `delta` in `[0, 10)`, rendered with two decimals.
	///
	/// Rounds towards positive infinity so the result never drops below `balance`.
	fn nudge_balance(&self, balance: &str) -> Result<String, CardSyncError> {
		let current = Decimal::from_str(balance.trim())
			.map_err(|_| CardSyncError::InvalidBalance(balance.to_string()))?;

		let cents = {
			let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
			rng.random_range(0..MAX_DELTA_CENTS)
		};
		let delta = Decimal::new(cents, BALANCE_SCALE);

		let mut next = current
			.checked_add(delta)
			.ok_or_else(|| CardSyncError::InvalidBalance(balance.to_string()))?
			.round_dp_with_strategy(BALANCE_SCALE, RoundingStrategy::ToPositiveInfinity);
		next.rescale(BALANCE_SCALE);
		// rescale is a no-op when the integer part leaves no room for the cents
		if next.scale() != BALANCE_SCALE {
			return Err(CardSyncError::InvalidBalance(balance.to_string()));
		}
		Ok(next.to_string())
	}

	fn unique_id(history: &[Transaction], now: DateTime<Utc>) -> String {
		let mut millis = now.timestamp_millis();
		while history.iter().any(|t| t.id == millis.to_string()) {
			millis += 1;
		}
		millis.to_string()
	}
}
