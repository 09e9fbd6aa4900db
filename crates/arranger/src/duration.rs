use crate::{
    constants::SECONDS_PER_MINUTE,
    error::{ArrangerError, Result},
};
use std::{fmt, str::FromStr};

/// Target song length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SongLength {
    pub minutes: u32,
    pub seconds: u32,
}

impl SongLength {
    pub fn new(minutes: u32, seconds: u32) -> Self {
        Self { minutes, seconds }
    }

    /// Parse `4:30`, `4m30s` (either half optional), or decimal minutes `4.5`.
    pub fn parse(input: &str) -> Result<Self> {
        let text = input.trim();
        let invalid = || ArrangerError::InvalidDuration(input.to_string());

        if let Some((minutes, seconds)) = text.split_once(':') {
            return Ok(Self::new(
                parse_digits(minutes).ok_or_else(invalid)?,
                parse_digits(seconds).ok_or_else(invalid)?,
            ));
        }

        if text.contains('m') || text.ends_with('s') {
            let (minutes, rest) = match text.split_once('m') {
                Some((minutes, rest)) => (parse_digits(minutes).ok_or_else(invalid)?, rest),
                None => (0, text),
            };
            let seconds = rest.strip_suffix('s').unwrap_or(rest);
            if seconds.is_empty() && rest.ends_with('s') {
                return Err(invalid());
            }
            let seconds = match seconds {
                "" => 0,
                digits => parse_digits(digits).ok_or_else(invalid)?,
            };
            return Ok(Self::new(minutes, seconds));
        }

        // decimal minutes
        let well_formed = !text.is_empty()
            && !text.starts_with('.')
            && !text.ends_with('.')
            && text.chars().all(|c| c.is_ascii_digit() || c == '.')
            && text.matches('.').count() <= 1;
        if !well_formed {
            return Err(invalid());
        }
        let value: f64 = text.parse().map_err(|_| invalid())?;
        let minutes = value.floor();
        if minutes > u32::MAX as f64 {
            return Err(invalid());
        }
        let seconds = ((value - minutes) * SECONDS_PER_MINUTE as f64).round() as u32;
        let minutes = minutes as u32;

        if seconds == SECONDS_PER_MINUTE {
            let minutes = minutes.checked_add(1).ok_or_else(invalid)?;
            Ok(Self::new(minutes, 0))
        } else {
            Ok(Self::new(minutes, seconds))
        }
    }

    pub fn total_seconds(&self) -> u64 {
        u64::from(self.minutes) * u64::from(SECONDS_PER_MINUTE) + u64::from(self.seconds)
    }

    /// Beats that fit in this length at `bpm` beats per minute; may be fractional
    pub fn total_beats(&self, bpm: f64) -> f64 {
        (self.total_seconds() as f64 * bpm) / SECONDS_PER_MINUTE as f64
    }
}

impl FromStr for SongLength {
    type Err = ArrangerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for SongLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.minutes, self.seconds)
    }
}

fn parse_digits(text: &str) -> Option<u32> {
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}
