use chrono::{DateTime, Local, Utc};

/// Hide everything but the last four characters of a card number.
pub fn mask_card_number(card_number: &str) -> String {
	let chars: Vec<char> = card_number.chars().collect();
	let last_four: String = chars[chars.len().saturating_sub(4)..].iter().collect();
	format!("**** **** **** {}", last_four)
}

/// Render a signed amount the way the balance screen does: credits get a leading `+`,
/// debits are shown by magnitude.
pub fn format_amount(amount: f64) -> String {
	let sign = if amount > 0.0 { "+" } else { "" };
	format!("{}${:.2}", sign, amount.abs())
}

/// Human-readable age of the last update.
pub fn format_last_updated(updated: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
	let Some(updated) = updated else {
		return "Never".to_string();
	};

	let minutes = (now - updated).num_minutes();
	if minutes < 1 {
		"Just now".to_string()
	} else if minutes < 60 {
		format!("{}m ago", minutes)
	} else if minutes < 1440 {
		format!("{}h ago", minutes / 60)
	} else {
		updated.with_timezone(&Local).format("%Y-%m-%d").to_string()
	}
}
