//! Utility functions used by Korra, and available when building custom reporters.

use lazy_static::lazy_static;
use num_format::{Locale, ToFormattedString};
use regex::Regex;
use std::time::Duration;

use crate::KorraError;

lazy_static! {
    // A full duration literal: one or more number+unit components, no sign.
    static ref DURATION: Regex =
        Regex::new(r"^(?:(?:\d+(?:\.\d*)?|\.\d+)(?:ns|us|µs|μs|ms|s|m|h))+$")
            .expect("failed to compile duration regex");
    // A single number+unit component of a duration literal.
    static ref DURATION_COMPONENT: Regex =
        Regex::new(r"(?P<whole>\d*)(?:\.(?P<fraction>\d*))?(?P<unit>ns|us|µs|μs|ms|s|m|h)")
            .expect("failed to compile duration component regex");
}

/// Number of nanoseconds in one unit of the given duration suffix.
fn unit_nanos(unit: &str) -> u128 {
    match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60 * 1_000_000_000,
        "h" => 60 * 60 * 1_000_000_000,
        _ => unreachable!(),
    }
}

/// Parse a duration literal such as `300ms`, `1.5s` or `2h45m`.
///
/// Valid units are "ns", "us" (or "µs"), "ms", "s", "m" and "h". Components can
/// be combined, largest first or not, and each may carry a decimal fraction. A
/// bare `0` is also accepted. Durations are never negative.
///
/// # Example
/// ```rust
/// use korra::util;
/// use std::time::Duration;
///
/// assert_eq!(util::parse_duration("100ms").unwrap(), Duration::from_millis(100));
/// assert_eq!(util::parse_duration("1h30m").unwrap(), Duration::from_secs(5_400));
/// assert_eq!(util::parse_duration("1.5s").unwrap(), Duration::from_millis(1_500));
///
/// // A unit is required for anything but zero.
/// assert!(util::parse_duration("100").is_err());
/// ```
pub fn parse_duration(value: &str) -> Result<Duration, KorraError> {
    let trimmed = value.trim();
    if trimmed == "0" {
        return Ok(Duration::from_nanos(0));
    }
    if !DURATION.is_match(trimmed) {
        return Err(KorraError::InvalidDuration {
            value: value.to_string(),
            detail: "expected a number followed by one of ns, us, µs, ms, s, m, h".to_string(),
        });
    }

    let mut nanos: u128 = 0;
    for component in DURATION_COMPONENT.captures_iter(trimmed) {
        let unit = unit_nanos(&component["unit"]);
        let whole = match component.name("whole").map(|m| m.as_str()) {
            Some("") | None => 0,
            Some(digits) => digits
                .parse::<u128>()
                .map_err(|e| KorraError::InvalidDuration {
                    value: value.to_string(),
                    detail: e.to_string(),
                })?,
        };
        nanos = whole
            .checked_mul(unit)
            .and_then(|n| n.checked_add(nanos))
            .ok_or_else(|| KorraError::InvalidDuration {
                value: value.to_string(),
                detail: "duration overflows".to_string(),
            })?;

        if let Some(fraction) = component.name("fraction") {
            // Only the digits that can still matter at nanosecond precision.
            let mut scale = unit;
            for digit in fraction.as_str().chars() {
                scale /= 10;
                if scale == 0 {
                    break;
                }
                nanos += u128::from(digit.to_digit(10).unwrap_or(0)) * scale;
            }
        }
    }
    trace!("parsed duration {:?} as {}ns", value, nanos);

    if nanos > u128::from(u64::MAX) {
        return Err(KorraError::InvalidDuration {
            value: value.to_string(),
            detail: "duration overflows".to_string(),
        });
    }
    Ok(Duration::from_nanos(nanos as u64))
}

// Render `value / unit` with the remainder as a decimal fraction, trailing zeros removed.
fn fraction(value: u128, unit: u128) -> String {
    let whole = value / unit;
    let remainder = value % unit;
    if remainder == 0 {
        return whole.to_string();
    }
    let width = (unit as f64).log10().round() as usize;
    let decimals = format!("{:0width$}", remainder, width = width);
    format!("{}.{}", whole, decimals.trim_end_matches('0'))
}

/// Format a duration the way [`parse_duration`] reads it.
///
/// Sub-second durations use the largest unit keeping the integer part
/// non-zero. Longer durations are broken into hours, minutes and seconds.
///
/// # Example
/// ```rust
/// use korra::util;
/// use std::time::Duration;
///
/// assert_eq!(util::format_duration(Duration::from_millis(100)), "100ms");
/// assert_eq!(util::format_duration(Duration::from_micros(1_500)), "1.5ms");
/// assert_eq!(util::format_duration(Duration::from_secs(90)), "1m30s");
/// assert_eq!(util::format_duration(Duration::from_nanos(0)), "0s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    if nanos == 0 {
        "0s".to_string()
    } else if nanos < 1_000 {
        format!("{}ns", nanos)
    } else if nanos < 1_000_000 {
        format!("{}µs", fraction(nanos, 1_000))
    } else if nanos < 1_000_000_000 {
        format!("{}ms", fraction(nanos, 1_000_000))
    } else {
        let seconds = duration.as_secs();
        let hours = seconds / 3_600;
        let minutes = (seconds % 3_600) / 60;
        let remaining = nanos % (60 * 1_000_000_000);
        let mut formatted = String::new();
        if hours > 0 {
            formatted.push_str(&format!("{}h", hours));
        }
        if hours > 0 || minutes > 0 {
            formatted.push_str(&format!("{}m", minutes));
        }
        formatted.push_str(&format!("{}s", fraction(remaining, 1_000_000_000)));
        formatted
    }
}

/// Format large number in locale appropriate style.
pub fn format_number<N: ToFormattedString>(number: N) -> String {
    number.to_formatted_string(&Locale::en)
}

/// Serialize a [`Duration`] as an integer number of nanoseconds.
///
/// Used with `#[serde(with = "korra::util::nanoseconds")]`, this is the one
/// encoding used for every duration Korra writes as JSON.
pub mod nanoseconds {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::convert::TryFrom;
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        serializer.serialize_u64(nanos)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Duration::from_nanos(u64::deserialize(deserializer)?))
    }
}
