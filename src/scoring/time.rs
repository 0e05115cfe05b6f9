use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// A swim time as reported by the meet software.
///
/// Either a valid elapsed duration or one of the outcomes that carry no
/// time at all. Only `Valid` times take part in ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwimTime {
    Valid(Duration),
    Disqualified,
    NoShow,
    Scratch,
    NoTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid time '{value}': {reason}")]
pub struct TimeParseError {
    pub value: String,
    pub reason: String,
}

impl TimeParseError {
    fn new(value: &str, reason: impl Into<String>) -> Self {
        Self {
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl SwimTime {
    /// Parse a time token.
    ///
    /// Accepts `SS.ss`, `M:SS.ss` and `H:MM:SS.ss` (up to three fractional
    /// digits) plus the sentinel tokens used by meet exports: `DQ`, `DSQ`,
    /// `DNF`, `NS`, `DNS`, `NO SHOW`, `SCR`, `SCRATCH`, `NT`, `---`.
    /// Empty input and a zero duration mean no time was recorded.
    pub fn parse(s: &str) -> Result<Self, TimeParseError> {
        let s = s.trim();
        if let Some(sentinel) = Self::parse_sentinel(s) {
            return Ok(sentinel);
        }

        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() > 3 {
            return Err(TimeParseError::new(s, "too many ':' separators"));
        }

        let (leading, last) = parts.split_at(parts.len() - 1);
        let seconds_ms = parse_seconds(s, last[0])?;

        let mut units = Vec::with_capacity(leading.len());
        for part in leading {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(TimeParseError::new(s, format!("'{}' is not a number", part)));
            }
            let value: u64 = part
                .parse()
                .map_err(|_| TimeParseError::new(s, format!("'{}' is out of range", part)))?;
            units.push(value);
        }

        if !units.is_empty() && seconds_ms >= 60_000 {
            return Err(TimeParseError::new(s, "seconds must be below 60"));
        }
        if units.len() == 2 && units[1] >= 60 {
            return Err(TimeParseError::new(s, "minutes must be below 60"));
        }

        let total_ms = units
            .iter()
            .try_fold(0u64, |acc, &unit| acc.checked_mul(60)?.checked_add(unit))
            .and_then(|minutes| minutes.checked_mul(60_000))
            .and_then(|ms| ms.checked_add(seconds_ms))
            .ok_or_else(|| TimeParseError::new(s, "duration overflow"))?;

        if total_ms == 0 {
            Ok(SwimTime::NoTime)
        } else {
            Ok(SwimTime::Valid(Duration::from_millis(total_ms)))
        }
    }

    fn parse_sentinel(s: &str) -> Option<Self> {
        let upper = s.to_ascii_uppercase();
        match upper.as_str() {
            "DQ" | "DSQ" | "DNF" => Some(SwimTime::Disqualified),
            "NS" | "DNS" | "NO SHOW" => Some(SwimTime::NoShow),
            "SCR" | "SCRATCH" => Some(SwimTime::Scratch),
            "" | "NT" | "-" | "---" => Some(SwimTime::NoTime),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, SwimTime::Valid(_))
    }

    /// Elapsed seconds for valid times
    pub fn seconds(&self) -> Option<f64> {
        match self {
            SwimTime::Valid(d) => Some(d.as_secs_f64()),
            _ => None,
        }
    }

    pub fn duration(&self) -> Option<Duration> {
        match self {
            SwimTime::Valid(d) => Some(*d),
            _ => None,
        }
    }
}

/// Seconds component with optional fraction, in milliseconds.
fn parse_seconds(original: &str, part: &str) -> Result<u64, TimeParseError> {
    let (whole, fraction) = match part.split_once('.') {
        Some((w, f)) => (w, f),
        None => (part, ""),
    };

    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimeParseError::new(
            original,
            format!("'{}' is not a number", part),
        ));
    }
    if fraction.len() > 3 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimeParseError::new(
            original,
            format!("'{}' has an invalid fraction", part),
        ));
    }
    if part.contains('.') && fraction.is_empty() {
        return Err(TimeParseError::new(
            original,
            format!("'{}' has an empty fraction", part),
        ));
    }

    let whole: u64 = whole
        .parse()
        .map_err(|_| TimeParseError::new(original, format!("'{}' is out of range", part)))?;
    let mut fraction_ms: u64 = 0;
    for (i, digit) in fraction.bytes().enumerate() {
        fraction_ms += u64::from(digit - b'0') * 10u64.pow(2 - i as u32);
    }

    whole
        .checked_mul(1000)
        .and_then(|ms| ms.checked_add(fraction_ms))
        .ok_or_else(|| TimeParseError::new(original, "duration overflow"))
}

impl PartialOrd for SwimTime {
    /// Valid times order by duration and beat every sentinel.
    /// Two different sentinels have no order.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (SwimTime::Valid(a), SwimTime::Valid(b)) => Some(a.cmp(b)),
            (SwimTime::Valid(_), _) => Some(Ordering::Less),
            (_, SwimTime::Valid(_)) => Some(Ordering::Greater),
            (a, b) if a == b => Some(Ordering::Equal),
            _ => None,
        }
    }
}

impl fmt::Display for SwimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwimTime::Valid(d) => {
                let total_ms = d.as_millis();
                let hours = total_ms / 3_600_000;
                let minutes = (total_ms / 60_000) % 60;
                let seconds = (total_ms / 1000) % 60;
                let ms = total_ms % 1000;
                // Hundredths unless the source carried thousandths
                let fraction = if ms % 10 == 0 {
                    format!("{:02}", ms / 10)
                } else {
                    format!("{:03}", ms)
                };

                if hours > 0 {
                    write!(f, "{}:{:02}:{:02}.{}", hours, minutes, seconds, fraction)
                } else if minutes > 0 {
                    write!(f, "{}:{:02}.{}", minutes, seconds, fraction)
                } else {
                    write!(f, "{}.{}", seconds, fraction)
                }
            }
            SwimTime::Disqualified => write!(f, "DQ"),
            SwimTime::NoShow => write!(f, "NS"),
            SwimTime::Scratch => write!(f, "SCR"),
            SwimTime::NoTime => write!(f, "NT"),
        }
    }
}

impl Serialize for SwimTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SwimTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        SwimTime::parse(&raw).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid(ms: u64) -> SwimTime {
        SwimTime::Valid(Duration::from_millis(ms))
    }

    #[test]
    fn test_parse_seconds_only() {
        assert_eq!(SwimTime::parse("23.45").unwrap(), valid(23_450));
        assert_eq!(SwimTime::parse("28.5").unwrap(), valid(28_500));
        assert_eq!(SwimTime::parse("31").unwrap(), valid(31_000));
    }

    #[test]
    fn test_parse_minutes() {
        assert_eq!(SwimTime::parse("1:03.21").unwrap(), valid(63_210));
        assert_eq!(SwimTime::parse("2:03.45").unwrap(), valid(123_450));
    }

    #[test]
    fn test_parse_hours() {
        assert_eq!(SwimTime::parse("1:02:03.45").unwrap(), valid(3_723_450));
    }

    #[test]
    fn test_parse_thousandths() {
        assert_eq!(SwimTime::parse("28.505").unwrap(), valid(28_505));
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(SwimTime::parse("  59.99 ").unwrap(), valid(59_990));
    }

    #[test]
    fn test_parse_sentinels() {
        assert_eq!(SwimTime::parse("DQ").unwrap(), SwimTime::Disqualified);
        assert_eq!(SwimTime::parse("dq").unwrap(), SwimTime::Disqualified);
        assert_eq!(SwimTime::parse("DNF").unwrap(), SwimTime::Disqualified);
        assert_eq!(SwimTime::parse("NS").unwrap(), SwimTime::NoShow);
        assert_eq!(SwimTime::parse("DNS").unwrap(), SwimTime::NoShow);
        assert_eq!(SwimTime::parse("No Show").unwrap(), SwimTime::NoShow);
        assert_eq!(SwimTime::parse("SCR").unwrap(), SwimTime::Scratch);
        assert_eq!(SwimTime::parse("NT").unwrap(), SwimTime::NoTime);
        assert_eq!(SwimTime::parse("---").unwrap(), SwimTime::NoTime);
        assert_eq!(SwimTime::parse("").unwrap(), SwimTime::NoTime);
    }

    #[test]
    fn test_zero_time_is_no_time() {
        assert_eq!(SwimTime::parse("0").unwrap(), SwimTime::NoTime);
        assert_eq!(SwimTime::parse("0.00").unwrap(), SwimTime::NoTime);
        assert_eq!(SwimTime::parse("0:00.00").unwrap(), SwimTime::NoTime);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(SwimTime::parse("abc").is_err());
        assert!(SwimTime::parse("1:2:3:4").is_err());
        assert!(SwimTime::parse("-1.00").is_err());
        assert!(SwimTime::parse("12.").is_err());
        assert!(SwimTime::parse("12.3456").is_err());
        assert!(SwimTime::parse(":12.00").is_err());
    }

    #[test]
    fn test_parse_rejects_out_of_range_components() {
        assert!(SwimTime::parse("1:75.00").is_err());
        assert!(SwimTime::parse("1:60:00.00").is_err());
    }

    #[test]
    fn test_parse_huge_components_is_error() {
        let err = SwimTime::parse("400000000000000000:00:00.00").unwrap_err();
        assert_eq!(err.reason, "duration overflow");
        assert!(SwimTime::parse("99999999999999999999.00").is_err());
        assert!(SwimTime::parse("30000000000000000:00.00").is_err());
    }

    #[test]
    fn test_parse_error_names_token() {
        let err = SwimTime::parse("2x.11").unwrap_err();
        assert_eq!(err.value, "2x.11");
        assert!(err.to_string().contains("2x.11"));
    }

    #[test]
    fn test_ordering_follows_duration() {
        let pairs = [("28.50", "29.10"), ("59.99", "1:00.00"), ("1:03.21", "1:03.22")];
        for (fast, slow) in pairs {
            let a = SwimTime::parse(fast).unwrap();
            let b = SwimTime::parse(slow).unwrap();
            assert!(a < b, "{} should beat {}", fast, slow);
            assert!(b > a);
        }
        assert_eq!(
            SwimTime::parse("28.50").unwrap().partial_cmp(&SwimTime::parse("28.5").unwrap()),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_sentinels_slower_than_valid() {
        let slowest = SwimTime::parse("59:59.99").unwrap();
        for sentinel in [
            SwimTime::Disqualified,
            SwimTime::NoShow,
            SwimTime::Scratch,
            SwimTime::NoTime,
        ] {
            assert!(slowest < sentinel);
            assert!(sentinel > slowest);
        }
    }

    #[test]
    fn test_sentinels_do_not_rank_against_each_other() {
        assert_eq!(SwimTime::Disqualified.partial_cmp(&SwimTime::NoShow), None);
        assert_eq!(SwimTime::Scratch.partial_cmp(&SwimTime::NoTime), None);
        assert_eq!(
            SwimTime::NoShow.partial_cmp(&SwimTime::NoShow),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(valid(23_450).to_string(), "23.45");
        assert_eq!(valid(63_210).to_string(), "1:03.21");
        assert_eq!(valid(60_000).to_string(), "1:00.00");
        assert_eq!(valid(3_723_450).to_string(), "1:02:03.45");
        assert_eq!(valid(28_505).to_string(), "28.505");
        assert_eq!(SwimTime::Disqualified.to_string(), "DQ");
        assert_eq!(SwimTime::NoShow.to_string(), "NS");
        assert_eq!(SwimTime::Scratch.to_string(), "SCR");
        assert_eq!(SwimTime::NoTime.to_string(), "NT");
    }

    #[test]
    fn test_serde_as_string() {
        let time = SwimTime::parse("1:03.21").unwrap();
        let json = serde_json::to_string(&time).unwrap();
        assert_eq!(json, "\"1:03.21\"");
        let back: SwimTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, time);
        assert!(serde_json::from_str::<SwimTime>("\"bogus\"").is_err());
    }

    #[test]
    fn test_seconds() {
        assert!((valid(23_450).seconds().unwrap() - 23.45).abs() < 1e-9);
        assert_eq!(SwimTime::Disqualified.seconds(), None);
        assert!(valid(1).is_valid());
        assert!(!SwimTime::NoTime.is_valid());
    }
}
