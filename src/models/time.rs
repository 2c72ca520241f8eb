//! Calendar-local date and wall-clock time value types.
//!
//! Dates stay `YYYY-MM-DD` strings end to end so that range queries are
//! lexical and never pass through a UTC conversion. Times are minutes since
//! midnight, printed as zero-padded `HH:MM`, or the `on-call` sentinel.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Wire form of an on-call booking.
pub const ON_CALL: &str = "on-call";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("Invalid time '{0}': expected HH:MM")]
    InvalidTime(String),

    #[error("Invalid appointment time '{0}': expected HH:MM or on-call")]
    InvalidAppointmentTime(String),

    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),
}

// ─── TimeOfDay ────────────────────────────────────────────────────────────────

/// Wall-clock time of day, stored as minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self(hour as u16 * 60 + minute as u16))
        } else {
            None
        }
    }

    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then_some(Self(minutes))
    }

    pub fn minutes_since_midnight(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u8 {
        (self.0 / 60) as u8
    }

    pub fn minute(self) -> u8 {
        (self.0 % 60) as u8
    }

    /// Shift forward, wrapping past midnight. Only the time of day moves.
    pub fn add_minutes_wrapping(self, minutes: u32) -> Self {
        let total = (self.0 as u32 + minutes % MINUTES_PER_DAY as u32) % MINUTES_PER_DAY as u32;
        Self(total as u16)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TimeParseError::InvalidTime(s.to_string());
        let bytes = s.as_bytes();
        if bytes.len() != 5 || bytes[2] != b':' {
            return Err(invalid());
        }
        let digits = [bytes[0], bytes[1], bytes[3], bytes[4]];
        if !digits.iter().all(u8::is_ascii_digit) {
            return Err(invalid());
        }
        let hour = (digits[0] - b'0') * 10 + (digits[1] - b'0');
        let minute = (digits[2] - b'0') * 10 + (digits[3] - b'0');
        Self::new(hour, minute).ok_or_else(invalid)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = TimeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

// ─── AppointmentTime ──────────────────────────────────────────────────────────

/// Either a concrete slot or an on-call booking. Never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AppointmentTime {
    At(TimeOfDay),
    OnCall,
}

impl AppointmentTime {
    pub fn is_on_call(&self) -> bool {
        matches!(self, Self::OnCall)
    }

    pub fn time_of_day(&self) -> Option<TimeOfDay> {
        match self {
            Self::At(t) => Some(*t),
            Self::OnCall => None,
        }
    }
}

impl From<TimeOfDay> for AppointmentTime {
    fn from(value: TimeOfDay) -> Self {
        Self::At(value)
    }
}

impl fmt::Display for AppointmentTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::At(t) => t.fmt(f),
            Self::OnCall => f.write_str(ON_CALL),
        }
    }
}

impl FromStr for AppointmentTime {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ON_CALL {
            return Ok(Self::OnCall);
        }
        s.parse::<TimeOfDay>()
            .map(Self::At)
            .map_err(|_| TimeParseError::InvalidAppointmentTime(s.to_string()))
    }
}

impl TryFrom<String> for AppointmentTime {
    type Error = TimeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AppointmentTime> for String {
    fn from(value: AppointmentTime) -> Self {
        value.to_string()
    }
}

// ─── Calendar dates ───────────────────────────────────────────────────────────

/// Validates a `YYYY-MM-DD` string and returns it in canonical form.
pub fn parse_calendar_date(s: &str) -> Result<NaiveDate, TimeParseError> {
    let trimmed = s.trim();
    // chrono accepts unpadded fields; lexical ordering needs the padded form.
    if trimmed.len() != 10 {
        return Err(TimeParseError::InvalidDate(s.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| TimeParseError::InvalidDate(s.to_string()))
}

pub fn format_calendar_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Today on the local calendar.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    #[test]
    fn parses_and_prints_padded_times() {
        assert_eq!(t("09:05").minutes_since_midnight(), 545);
        assert_eq!(t("00:00").to_string(), "00:00");
        assert_eq!(t("23:59").to_string(), "23:59");
    }

    #[test]
    fn rejects_malformed_times() {
        for bad in ["9:05", "24:00", "12:60", "12-30", "ab:cd", "", "12:300", " 12:30"] {
            assert!(bad.parse::<TimeOfDay>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn wraps_past_midnight() {
        assert_eq!(t("23:50").add_minutes_wrapping(30), t("00:20"));
        assert_eq!(t("10:00").add_minutes_wrapping(MINUTES_PER_DAY as u32), t("10:00"));
        assert_eq!(t("10:00").add_minutes_wrapping(u32::MAX), t("10:00").add_minutes_wrapping(u32::MAX % 1440));
    }

    #[test]
    fn appointment_time_on_call_sentinel() {
        let on_call: AppointmentTime = "on-call".parse().unwrap();
        assert!(on_call.is_on_call());
        assert_eq!(on_call.time_of_day(), None);
        assert_eq!(on_call.to_string(), ON_CALL);

        let slot: AppointmentTime = "14:30".parse().unwrap();
        assert_eq!(slot.time_of_day(), Some(t("14:30")));
        assert!("On-Call".parse::<AppointmentTime>().is_err());
    }

    #[test]
    fn appointment_time_serde_is_plain_string() {
        let json = serde_json::to_string(&AppointmentTime::At(t("08:15"))).unwrap();
        assert_eq!(json, "\"08:15\"");
        let parsed: AppointmentTime = serde_json::from_str("\"on-call\"").unwrap();
        assert_eq!(parsed, AppointmentTime::OnCall);
        assert!(serde_json::from_str::<AppointmentTime>("\"8am\"").is_err());
    }

    #[test]
    fn calendar_dates_must_be_padded() {
        let date = parse_calendar_date("2025-06-01").unwrap();
        assert_eq!(format_calendar_date(date), "2025-06-01");
        assert!(parse_calendar_date("2025-6-1").is_err());
        assert!(parse_calendar_date("2025-02-30").is_err());
        assert!(parse_calendar_date("").is_err());
    }
}
