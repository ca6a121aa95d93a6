use std::fmt;
use std::str::FromStr;

use super::error::ClipError;

/// A position in the source video, given on the command line as `hh-mm-ss`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClipTime {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl ClipTime {
    pub fn new(hours: u32, minutes: u32, seconds: u32) -> Self {
        Self {
            hours,
            minutes,
            seconds,
        }
    }
}

impl FromStr for ClipTime {
    type Err = ClipError;

    /// Parses `hh-mm-ss`. `hh:mm:ss` is accepted as well.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            ClipError::Validation(format!(
                "'{}' is not a valid time, expected format hh-mm-ss",
                s
            ))
        };

        let trimmed = s.trim();
        let separator = if trimmed.contains(':') { ':' } else { '-' };
        let parts: Vec<&str> = trimmed.split(separator).collect();
        if parts.len() != 3 {
            return Err(invalid());
        }

        let mut fields = [0u32; 3];
        for (field, part) in fields.iter_mut().zip(&parts) {
            if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
            *field = part.parse().map_err(|_| invalid())?;
        }

        let [hours, minutes, seconds] = fields;
        if minutes >= 60 || seconds >= 60 {
            return Err(invalid());
        }

        Ok(Self::new(hours, minutes, seconds))
    }
}

/// Formats as `HH:MM:SS`, the form ffmpeg expects for `-ss` / `-to`
impl fmt::Display for ClipTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds
        )
    }
}
