use card_balance_sync::card::sync::repositories::FileCardCacheRepository;
use card_balance_sync::utils::{format_amount, format_last_updated, mask_card_number};
use card_balance_sync::{CardData, CardEnvelope, CardSyncClient, ImageHandle, SyncConfig};

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
	name = "card-balance",
	about = "Scan a payment or transit card and keep its balance up to date",
	long_about = None
)]
struct Cli {
	#[command(subcommand)]
	command: Command,
	/// Print envelopes as JSON instead of a summary
	#[clap(long)]
	json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Submit a card image for recognition
	Scan { image: PathBuf },
	/// Refresh the balance of a card, defaulting to the cached one
	Refresh { card_number: Option<String> },
	/// Show the cached card
	Show,
	/// Forget the cached card
	Clear,
	/// Probe the recognition service
	Health,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::from_default_env()
				.add_directive(tracing::Level::INFO.into()),
		)
		.with_target(false)
		.with_thread_ids(false)
		.with_thread_names(false)
		.with_file(false)
		.with_line_number(false)
		.with_timer(tracing_subscriber::fmt::time::time())
		.init();

	let cli = Cli::parse();
	let config = SyncConfig::from_env().context("Invalid configuration")?;
	let client = CardSyncClient::from_config(&config).context("Failed to create sync client")?;

	match cli.command {
		Command::Scan { image } => {
			let envelope = client.submit_image(ImageHandle::Path(image)).await;
			print_envelope(&envelope, cli.json)?;
		}
		Command::Refresh { card_number } => {
			let card_number = match card_number {
				Some(number) => number,
				None => match client.get_cached().await {
					Some(card) => card.card_number,
					None => anyhow::bail!("Please scan a card first to refresh the balance."),
				},
			};
			let envelope = client.refresh_balance(&card_number).await;
			print_envelope(&envelope, cli.json)?;
		}
		Command::Show => match client.get_cached().await {
			Some(card) => {
				let updated = FileCardCacheRepository::new(config.data_dir.clone())
					.last_modified()
					.await;
				if cli.json {
					println!("{}", serde_json::to_string_pretty(&card)?);
				} else {
					print_card(&card, updated);
				}
			}
			None => println!("No card scanned yet."),
		},
		Command::Clear => {
			client.clear_cached().await;
			println!("Cached card cleared.");
		}
		Command::Health => {
			let healthy = client.check_health().await;
			info!("Health probe finished");
			println!("{}", if healthy { "healthy" } else { "unreachable" });
			if !healthy {
				std::process::exit(1);
			}
		}
	}

	Ok(())
}

fn print_envelope(envelope: &CardEnvelope, json: bool) -> anyhow::Result<()> {
	if json {
		println!("{}", serde_json::to_string_pretty(envelope)?);
		return Ok(());
	}

	match (&envelope.data, &envelope.error) {
		(Some(card), _) => {
			if envelope.is_fallback() {
				println!("(offline: showing locally synthesized data)");
			}
			print_card(card, Some(Utc::now()));
		}
		(None, Some(error)) => println!("Failed: {}", error),
		(None, None) => println!("Failed"),
	}
	Ok(())
}

fn print_card(card: &CardData, updated: Option<DateTime<Utc>>) {
	println!("{}", mask_card_number(&card.card_number));
	println!("Balance: ${}", card.balance);
	for (label, value) in [
		("Type", &card.card_type),
		("Holder", &card.card_holder),
		("Expires", &card.expiry_date),
		("Issuer", &card.issuer),
	] {
		if let Some(value) = value {
			println!("{}: {}", label, value);
		}
	}
	println!("Last updated: {}", format_last_updated(updated, Utc::now()));

	if !card.last_transactions.is_empty() {
		println!("Recent transactions:");
		for transaction in &card.last_transactions {
			let date = DateTime::parse_from_rfc3339(&transaction.date)
				.map(|d| d.format("%Y-%m-%d").to_string())
				.unwrap_or_else(|_| transaction.date.clone());
			println!(
				"  {}  {:<30} {:>10}",
				date,
				transaction.description,
				format_amount(transaction.amount)
			);
		}
	}
}
