//! Utilidades compartidas: reloj, normalización, formato de precios

/// Current Unix time in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Normalize a client email for deduplication.
///
/// The (business, email) pair is the natural key for appointments;
/// matching is case-insensitive and whitespace-trimmed.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Format a price for client-facing messages.
///
/// Whole amounts render without decimals (`$1000`), fractional amounts
/// with two (`$1234.50`).
pub fn format_price(amount: f64) -> String {
    if amount.fract().abs() < f64::EPSILON {
        format!("${:.0}", amount)
    } else {
        format!("${:.2}", amount)
    }
}
