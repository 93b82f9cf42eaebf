use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Human-readable booking code: WB + yyyymmdd + the last 4 hex characters of
/// the booking id, so the code stays tied to that exact booking.
pub fn generate(booking_id: Uuid, date_time: DateTime<Utc>) -> String {
    let date_part = date_time.format("%Y%m%d");
    let hex = booking_id.simple().to_string();
    let id_part = hex[hex.len() - 4..].to_uppercase();
    format!("WB{date_part}-{id_part}")
}
