//! Capture limit value object

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::error::CaptureLimitParseError;

/// Default hard stop for an open microphone capture (60 seconds)
pub const DEFAULT_CAPTURE_LIMIT_SECS: u64 = 60;

/// Longest capture limit accepted from config or the command line (1 hour)
pub const MAX_CAPTURE_LIMIT_SECS: u64 = 3600;

/// Upper bound on how long a single capture may stay open before it is
/// force-stopped. Parsed from strings like `30s`, `1m` or `2m30s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CaptureLimit {
    secs: u64,
}

impl CaptureLimit {
    pub const fn from_secs(secs: u64) -> Self {
        Self { secs }
    }

    pub const fn as_secs(&self) -> u64 {
        self.secs
    }

    pub const fn as_millis(&self) -> u64 {
        self.secs.saturating_mul(1000)
    }

    pub const fn as_std(&self) -> Duration {
        Duration::from_secs(self.secs)
    }
}

impl Default for CaptureLimit {
    fn default() -> Self {
        Self::from_secs(DEFAULT_CAPTURE_LIMIT_SECS)
    }
}

impl FromStr for CaptureLimit {
    type Err = CaptureLimitParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || CaptureLimitParseError { input: s.to_string() };
        let input = s.trim().to_ascii_lowercase();

        // At most one minutes group followed by at most one seconds group.
        let (minutes, rest) = match input.split_once('m') {
            Some((m, rest)) => (Some(m), rest),
            None => (None, input.as_str()),
        };
        let seconds = match rest {
            "" => None,
            r => Some(r.strip_suffix('s').ok_or_else(err)?),
        };
        if minutes.is_none() && seconds.is_none() {
            return Err(err());
        }

        let parse_part = |part: Option<&str>| -> Result<u64, CaptureLimitParseError> {
            match part {
                None => Ok(0),
                Some(p) if !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()) => {
                    p.parse().map_err(|_| err())
                }
                Some(_) => Err(err()),
            }
        };

        let minutes = parse_part(minutes)?;
        let seconds = parse_part(seconds)?;
        let total = minutes
            .checked_mul(60)
            .and_then(|m| m.checked_add(seconds))
            .ok_or_else(err)?;

        if total == 0 || total > MAX_CAPTURE_LIMIT_SECS {
            return Err(err());
        }
        Ok(Self::from_secs(total))
    }
}

impl fmt::Display for CaptureLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.secs / 60, self.secs % 60) {
            (0, s) => write!(f, "{}s", s),
            (m, 0) => write!(f, "{}m", m),
            (m, s) => write!(f, "{}m{}s", m, s),
        }
    }
}
