//! Timestamp labels for conversation lists and message bubbles.

use chrono::{DateTime, Utc};

/// Label for `ts` as seen at `now`.
///
/// Same day gives the time (`3:05 PM`), the previous day gives `Yesterday`,
/// the last week gives the weekday name and anything older gives the full
/// date (`12 March 2024`). Timestamps ahead of `now` are shown as a time.
pub fn format_timestamp(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now.date_naive() - ts.date_naive()).num_days();
    match days {
        ..=0 => ts.format("%-I:%M %p").to_string(),
        1 => "Yesterday".to_string(),
        2..=6 => ts.format("%A").to_string(),
        _ => ts.format("%-d %B %Y").to_string(),
    }
}
