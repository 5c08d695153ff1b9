// ── Billing rules ──
//
// Sessions are charged a flat rate per started hour. Nothing here is
// stored; every figure is derived from the entry and exit times.

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

/// Pesos charged per started hour.
pub const RATE_PER_HOUR: u64 = 20;

pub const CURRENCY_SYMBOL: &str = "₱";

/// Short description of the rate shown next to time-out previews.
pub const RATE_HINT: &str = "₱20 per hour (rounded up)";

const MS_PER_HOUR: i64 = 3_600_000;
const MS_PER_MINUTE: i64 = 60_000;

/// Hours billed for an interval: the signed length rounded up to a whole
/// hour. `None` when either end is missing.
pub fn billed_hours(entry: Option<NaiveDateTime>, exit: Option<NaiveDateTime>) -> Option<i64> {
    let ms = (exit? - entry?).num_milliseconds();
    let whole = ms.div_euclid(MS_PER_HOUR);
    Some(if ms.rem_euclid(MS_PER_HOUR) > 0 {
        whole + 1
    } else {
        whole
    })
}

/// Amount owed for an interval. Never negative; zero when either end is
/// missing or the exit precedes the entry.
pub fn revenue(entry: Option<NaiveDateTime>, exit: Option<NaiveDateTime>) -> u64 {
    billed_hours(entry, exit)
        .and_then(|h| u64::try_from(h).ok())
        .map_or(0, |h| h.saturating_mul(RATE_PER_HOUR))
}

/// Elapsed time between entry and exit as shown to operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum DurationDisplay {
    /// One or both times missing.
    NotAvailable,
    /// Exit precedes entry.
    Invalid,
    Elapsed { hours: i64, minutes: i64 },
}

impl DurationDisplay {
    /// Total hours as a fraction, `None` unless elapsed.
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn as_hours(self) -> Option<f64> {
        match self {
            Self::Elapsed { hours, minutes } => Some(hours as f64 + minutes as f64 / 60.0),
            Self::NotAvailable | Self::Invalid => None,
        }
    }
}

impl fmt::Display for DurationDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAvailable => f.write_str("N/A"),
            Self::Invalid => f.write_str("Invalid"),
            Self::Elapsed { hours, minutes } if *hours > 0 => write!(f, "{hours}h {minutes}m"),
            Self::Elapsed { minutes, .. } => write!(f, "{minutes}m"),
        }
    }
}

/// Duration between entry and exit, truncated to whole minutes.
pub fn duration(entry: Option<NaiveDateTime>, exit: Option<NaiveDateTime>) -> DurationDisplay {
    let (Some(entry), Some(exit)) = (entry, exit) else {
        return DurationDisplay::NotAvailable;
    };
    let ms = (exit - entry).num_milliseconds();
    if ms < 0 {
        return DurationDisplay::Invalid;
    }
    let total_minutes = ms / MS_PER_MINUTE;
    DurationDisplay::Elapsed {
        hours: total_minutes / 60,
        minutes: total_minutes % 60,
    }
}

/// `₱60`
pub fn format_currency(amount: u64) -> String {
    format!("{CURRENCY_SYMBOL}{amount}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, NaiveDate};
    use pretty_assertions::assert_eq;

    use super::*;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(h, m, 0))
            .unwrap()
    }

    #[test]
    fn started_hours_round_up() {
        assert_eq!(billed_hours(Some(at(8, 0)), Some(at(10, 30))), Some(3));
        assert_eq!(billed_hours(Some(at(8, 0)), Some(at(10, 0))), Some(2));
        assert_eq!(billed_hours(Some(at(8, 0)), Some(at(8, 1))), Some(1));
        assert_eq!(billed_hours(Some(at(8, 0)), Some(at(8, 0))), Some(0));
        assert_eq!(billed_hours(None, Some(at(8, 0))), None);
    }

    #[test]
    fn revenue_is_rate_times_started_hours() {
        assert_eq!(revenue(Some(at(8, 0)), Some(at(10, 30))), 60);
        assert_eq!(revenue(Some(at(8, 0)), Some(at(8, 0))), 0);
        assert_eq!(revenue(Some(at(8, 0)), None), 0);
        assert_eq!(revenue(None, None), 0);
    }

    #[test]
    fn reversed_interval_is_free_and_invalid() {
        assert_eq!(revenue(Some(at(10, 0)), Some(at(8, 0))), 0);
        assert_eq!(duration(Some(at(10, 0)), Some(at(8, 0))), DurationDisplay::Invalid);
        assert_eq!(duration(Some(at(10, 0)), Some(at(8, 0))).to_string(), "Invalid");
    }

    #[test]
    fn revenue_never_decreases_as_exit_moves_later() {
        let entry = at(8, 0);
        let mut last = 0;
        for step in -120..=24 * 60 {
            let exit = entry + Duration::minutes(step);
            let r = revenue(Some(entry), Some(exit));
            assert!(r >= last, "revenue dropped at {step} minutes");
            last = r;
        }
    }

    #[test]
    fn duration_formats() {
        assert_eq!(duration(Some(at(8, 0)), Some(at(10, 30))).to_string(), "2h 30m");
        assert_eq!(duration(Some(at(8, 0)), Some(at(8, 45))).to_string(), "45m");
        assert_eq!(duration(Some(at(8, 0)), Some(at(8, 0))).to_string(), "0m");
        assert_eq!(duration(None, Some(at(8, 0))).to_string(), "N/A");
    }

    #[test]
    fn currency_uses_peso_sign() {
        assert_eq!(format_currency(60), "₱60");
        assert_eq!(format_currency(0), "₱0");
    }
}
