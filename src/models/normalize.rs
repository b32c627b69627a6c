//! Wait-time text normalization.
//!
//! The upstream feed reports wait times as free-form Dutch text
//! ("15 minuten", "geen wachttijd", "1 uur"). This module is the only
//! place where that text becomes a comparable integer.

/// Sentinel for "an hour or more" and for values the parser cannot trust.
///
/// Never a literal 70-minute measurement: the upstream display caps at
/// 60 minutes, so anything above that (or any mention of "uur") collapses
/// to this marker.
pub const SENTINEL_HOUR_OR_MORE: i32 = 70;

/// Upper bound for a wait reading taken at face value, in minutes.
pub const MAX_LITERAL_MINUTES: i32 = 60;

/// Normalize a free-text wait description into minutes.
///
/// Policy, applied in order:
/// 1. Missing, empty, or starting with "geen" (case-insensitive) -> 0.
/// 2. Mentions "uur" -> [`SENTINEL_HOUR_OR_MORE`].
/// 3. Otherwise the digit characters are extracted; values up to 60 are
///    kept as-is, anything larger or non-numeric becomes the sentinel.
pub fn normalize_wait(raw: Option<&str>) -> i32 {
    let text = match raw {
        Some(t) => t.trim(),
        None => return 0,
    };
    if text.is_empty() {
        return 0;
    }

    let lowered = text.to_lowercase();
    if lowered.starts_with("geen") {
        return 0;
    }
    if lowered.contains("uur") {
        return SENTINEL_HOUR_OR_MORE;
    }

    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.parse::<i32>() {
        Ok(minutes) if minutes <= MAX_LITERAL_MINUTES => minutes,
        _ => SENTINEL_HOUR_OR_MORE,
    }
}
