use crate::card::CacheError;
use crate::recognition::CardData;

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

/// Well-known storage key of the single cached record.
pub const STORAGE_KEY: &str = "yourbalance_card_data";

/// Repository for the most recently known card
///
/// Single slot with overwrite semantics: a write replaces whatever was stored.
#[async_trait::async_trait]
pub trait CardCacheRepository: Send + Sync {
	async fn read(&self) -> Result<Option<CardData>, CacheError>;
	async fn write(&self, card: &CardData) -> Result<(), CacheError>;
	async fn clear(&self) -> Result<(), CacheError>;
}

/// File-based implementation of CardCacheRepository
///
/// The record is stored as JSON under `<data_dir>/<STORAGE_KEY>.json`. Each write goes to its
/// own sibling temp file and is renamed into place, so a reader never sees a torn record and
/// the last rename wins. Writes and clears through one repository are also serialized.
pub struct FileCardCacheRepository {
	data_dir: PathBuf,
	write_lock: Mutex<()>,
	write_seq: AtomicU64,
}

impl FileCardCacheRepository {
	pub fn new(data_dir: PathBuf) -> Self {
		Self {
			data_dir,
			write_lock: Mutex::new(()),
			write_seq: AtomicU64::new(0),
		}
	}

	fn get_cache_filename(&self) -> PathBuf {
		self.data_dir.join(format!("{}.json", STORAGE_KEY))
	}

	/// Temp path unique to this write, even across processes sharing `data_dir`.
	fn get_temp_filename(&self) -> PathBuf {
		let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
		self.data_dir
			.join(format!("{}.json.{}.{}.tmp", STORAGE_KEY, std::process::id(), seq))
	}

	/// When the cached record was last written, if there is one.
	pub async fn last_modified(&self) -> Option<DateTime<Utc>> {
		let metadata = tokio::fs::metadata(self.get_cache_filename()).await.ok()?;
		metadata.modified().ok().map(DateTime::<Utc>::from)
	}
}

#[async_trait::async_trait]
impl CardCacheRepository for FileCardCacheRepository {
	async fn read(&self) -> Result<Option<CardData>, CacheError> {
		let filename = self.get_cache_filename();

		let content = match tokio::fs::read_to_string(&filename).await {
			Ok(content) => content,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
			Err(e) => return Err(e.into()),
		};

		let card: CardData = serde_json::from_str(&content)?;
		debug!("Loaded cached card data from {:?}", filename);
		Ok(Some(card))
	}

	async fn write(&self, card: &CardData) -> Result<(), CacheError> {
		tokio::fs::create_dir_all(&self.data_dir).await?;

		let content = serde_json::to_string_pretty(card)?;
		let temp = self.get_temp_filename();
		let filename = self.get_cache_filename();

		let _guard = self.write_lock.lock().await;
		tokio::fs::write(&temp, content).await?;
		if let Err(e) = tokio::fs::rename(&temp, &filename).await {
			let _ = tokio::fs::remove_file(&temp).await;
			return Err(e.into());
		}

		info!("Saved card data to {:?}", filename);
		Ok(())
	}

	async fn clear(&self) -> Result<(), CacheError> {
		let filename = self.get_cache_filename();
		let _guard = self.write_lock.lock().await;
		match tokio::fs::remove_file(&filename).await {
			Ok(()) => {
				info!("Removed cached card data {:?}", filename);
				Ok(())
			}
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(e.into()),
		}
	}
}

/// In-memory implementation of CardCacheRepository
///
/// Not durable. Meant for tests and for embedding where persistence is handled elsewhere.
#[derive(Default)]
pub struct InMemoryCardCacheRepository {
	slot: RwLock<Option<CardData>>,
}

impl InMemoryCardCacheRepository {
	pub fn new() -> Self {
		Self::default()
	}

	/// Start with `card` already cached.
	pub fn with_card(card: CardData) -> Self {
		Self {
			slot: RwLock::new(Some(card)),
		}
	}
}

#[async_trait::async_trait]
impl CardCacheRepository for InMemoryCardCacheRepository {
	async fn read(&self) -> Result<Option<CardData>, CacheError> {
		Ok(self.slot.read().await.clone())
	}

	async fn write(&self, card: &CardData) -> Result<(), CacheError> {
		*self.slot.write().await = Some(card.clone());
		Ok(())
	}

	async fn clear(&self) -> Result<(), CacheError> {
		*self.slot.write().await = None;
		Ok(())
	}
}
