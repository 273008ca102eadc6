//! Go-style duration strings (`30s`, `1m30s`, `1.5h`, `250ms`).

use std::fmt::Write;
use std::time::Duration;

use thiserror::Error;

/// Error returned for a malformed duration string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid duration {input:?}: {reason}")]
pub struct DurationParseError {
    input: String,
    reason: &'static str,
}

impl DurationParseError {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(NANOS_PER_MICRO),
        "ms" => Some(NANOS_PER_MILLI),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60 * NANOS_PER_SEC),
        "h" => Some(3600 * NANOS_PER_SEC),
        _ => None,
    }
}

/// Parse a duration string: a sequence of decimal numbers, each with an
/// optional fraction and a mandatory unit suffix. A bare `0` is also accepted.
/// Negative durations are rejected.
pub fn parse_duration(input: &str) -> Result<Duration, DurationParseError> {
    let s = input.trim();
    let s = s.strip_prefix('+').unwrap_or(s);

    if s.is_empty() {
        return Err(DurationParseError::new(input, "empty duration"));
    }
    if s.starts_with('-') {
        return Err(DurationParseError::new(input, "negative duration"));
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total: u128 = 0;
    let mut rest = s;

    while !rest.is_empty() {
        let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (int_digits, after_int) = rest.split_at(int_len);

        let (frac_digits, after_num) = match after_int.strip_prefix('.') {
            Some(after_dot) => {
                let frac_len = after_dot.bytes().take_while(u8::is_ascii_digit).count();
                after_dot.split_at(frac_len)
            }
            None => ("", after_int),
        };

        if int_digits.is_empty() && frac_digits.is_empty() {
            return Err(DurationParseError::new(input, "expected a number"));
        }

        let unit_len = after_num
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() || *c == '.')
            .map_or(after_num.len(), |(i, _)| i);
        let (unit, remainder) = after_num.split_at(unit_len);

        if unit.is_empty() {
            return Err(DurationParseError::new(input, "missing unit"));
        }
        let scale = unit_nanos(unit).ok_or_else(|| DurationParseError::new(input, "unknown unit"))?;

        let int_value: u128 = if int_digits.is_empty() {
            0
        } else {
            int_digits
                .parse()
                .map_err(|_| DurationParseError::new(input, "number out of range"))?
        };

        // Digits past nanosecond precision contribute nothing.
        let frac_digits = &frac_digits[..frac_digits.len().min(18)];
        let frac_nanos = if frac_digits.is_empty() {
            0
        } else {
            let numerator: u128 = frac_digits
                .parse()
                .map_err(|_| DurationParseError::new(input, "number out of range"))?;
            numerator * scale / 10u128.pow(frac_digits.len() as u32)
        };

        total = int_value
            .checked_mul(scale)
            .and_then(|v| v.checked_add(frac_nanos))
            .and_then(|v| v.checked_add(total))
            .ok_or_else(|| DurationParseError::new(input, "duration out of range"))?;

        rest = remainder;
    }

    let secs = u64::try_from(total / NANOS_PER_SEC)
        .map_err(|_| DurationParseError::new(input, "duration out of range"))?;
    Ok(Duration::new(secs, (total % NANOS_PER_SEC) as u32))
}

/// Render a duration in the same syntax [`parse_duration`] accepts.
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.subsec_nanos();
    if nanos != 0 {
        let total = duration.as_nanos();
        if total % NANOS_PER_MILLI == 0 {
            return format!("{}ms", total / NANOS_PER_MILLI);
        }
        if total % NANOS_PER_MICRO == 0 {
            return format!("{}us", total / NANOS_PER_MICRO);
        }
        return format!("{total}ns");
    }

    let secs = duration.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, secs / 60 % 60, secs % 60);

    let mut out = String::new();
    if hours > 0 {
        let _ = write!(out, "{hours}h");
    }
    if minutes > 0 {
        let _ = write!(out, "{minutes}m");
    }
    if seconds > 0 || out.is_empty() {
        let _ = write!(out, "{seconds}s");
    }
    out
}

/// Serde adapter storing a [`Duration`] as a Go-style string.
pub mod go_duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_duration(*duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}
