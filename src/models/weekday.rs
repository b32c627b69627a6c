//! Weekday numbering and office opening hours.
//!
//! The public contract of this crate uses 0=Sunday..6=Saturday, matching
//! the chart frontend. This differs from ISO-8601 and from chrono's
//! `num_days_from_monday`; conversions live here and nowhere else.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

/// Day of week with 0=Sunday..6=Saturday semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Weekday(u8);

impl Weekday {
    pub const SUNDAY: Weekday = Weekday(0);
    pub const MONDAY: Weekday = Weekday(1);
    pub const THURSDAY: Weekday = Weekday(4);
    pub const SATURDAY: Weekday = Weekday(6);

    /// Construct from the 0=Sunday numbering. Values above 6 are rejected.
    pub fn new(day: u8) -> Result<Self, InvalidWeekday> {
        if day <= 6 {
            Ok(Weekday(day))
        } else {
            Err(InvalidWeekday(day))
        }
    }

    /// Convert from any chrono date, remapping chrono's Sunday (6 days
    /// from Monday) to 0.
    pub fn from_date<D: Datelike>(date: &D) -> Self {
        Weekday(date.weekday().num_days_from_sunday() as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Office opening hours as `(open_hour, close_hour)`.
    ///
    /// Static domain knowledge, not derived from samples: closed on the
    /// weekend, extended hours on Thursday.
    pub fn opening_hours(self) -> (u8, u8) {
        match self.0 {
            0 | 6 => (0, 0),
            4 => (9, 20),
            _ => (9, 17),
        }
    }
}

/// Error for weekday values outside 0..=6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid weekday {0}, expected 0 (Sunday) to 6 (Saturday)")]
pub struct InvalidWeekday(pub u8);

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn rejects_out_of_range() {
        assert!(Weekday::new(6).is_ok());
        assert_eq!(Weekday::new(7), Err(InvalidWeekday(7)));
    }

    #[test]
    fn sunday_monday_boundary_from_chrono() {
        // 2024-06-02 is a Sunday, 2024-06-03 a Monday.
        let sunday = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        let monday = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        assert_eq!(Weekday::from_date(&sunday), Weekday::SUNDAY);
        assert_eq!(Weekday::from_date(&monday), Weekday::MONDAY);
    }

    #[test]
    fn opening_hours_table() {
        assert_eq!(Weekday::new(0).unwrap().opening_hours(), (0, 0));
        assert_eq!(Weekday::new(6).unwrap().opening_hours(), (0, 0));
        assert_eq!(Weekday::new(4).unwrap().opening_hours(), (9, 20));
        for day in [1u8, 2, 3, 5] {
            assert_eq!(Weekday::new(day).unwrap().opening_hours(), (9, 17));
        }
    }
}
