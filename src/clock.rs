//! Clock modes and the 12/24-hour arithmetic shared by the parser, the
//! allowed-time map and display formatting.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// How hours are displayed and entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ClockMode {
    #[serde(rename = "12h")]
    TwelveHour,
    #[default]
    #[serde(rename = "24h")]
    TwentyFourHour,
}

impl FromStr for ClockMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "12h" => Ok(ClockMode::TwelveHour),
            "24h" => Ok(ClockMode::TwentyFourHour),
            _ => Err(Error::InvalidMode(s.to_string())),
        }
    }
}

impl Display for ClockMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClockMode::TwelveHour => write!(f, "12h"),
            ClockMode::TwentyFourHour => write!(f, "24h"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    /// The meridiem a raw 0-23 hour falls in.
    pub fn of_hour(hour: u32) -> Self {
        if hour < 12 {
            Meridiem::Am
        } else {
            Meridiem::Pm
        }
    }

    pub fn is_pm(&self) -> bool {
        matches!(self, Meridiem::Pm)
    }
}

impl FromStr for Meridiem {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "am" => Ok(Meridiem::Am),
            "pm" => Ok(Meridiem::Pm),
            _ => Err(Error::Context(format!("Not a meridiem: {}", s))),
        }
    }
}

impl Display for Meridiem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Meridiem::Am => write!(f, "am"),
            Meridiem::Pm => write!(f, "pm"),
        }
    }
}

/// An hour as shown to the user. `meridiem` is only set in 12-hour mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayHour {
    pub hour: u32,
    pub meridiem: Option<Meridiem>,
}

impl DisplayHour {
    pub fn is_pm(&self) -> bool {
        self.meridiem.map(|m| m.is_pm()).unwrap_or(false)
    }
}

/// Zero-pads to two characters. Values of 100 and above are left as they are.
pub fn two_digits(n: u32) -> String {
    format!("{:02}", n)
}

/// The displayed hour for a raw 0-23 hour.
pub fn convert_hours_for_mode(raw_hour: u32, mode: ClockMode) -> DisplayHour {
    match mode {
        ClockMode::TwentyFourHour => DisplayHour {
            hour: raw_hour,
            meridiem: None,
        },
        ClockMode::TwelveHour => DisplayHour {
            hour: twelve_hour_display(raw_hour),
            meridiem: Some(Meridiem::of_hour(raw_hour)),
        },
    }
}

/// 0 -> 12, 13..=23 -> hour - 12, everything else unchanged.
pub fn twelve_hour_display(raw_hour: u32) -> u32 {
    match raw_hour {
        0 => 12,
        h if h > 12 => h - 12,
        h => h,
    }
}

/// Inverse of the 12-hour display mapping.
pub fn to_24_hour(display_hour: u32, meridiem: Meridiem) -> u32 {
    match (display_hour, meridiem) {
        (12, Meridiem::Am) => 0,
        (12, Meridiem::Pm) => 12,
        (h, Meridiem::Pm) => h + 12,
        (h, Meridiem::Am) => h,
    }
}

/// `HH:MM` in 24-hour mode, `H:MM am|pm` in 12-hour mode.
pub fn format_display(value: &NaiveDateTime, mode: ClockMode) -> String {
    let display = convert_hours_for_mode(value.hour(), mode);
    match display.meridiem {
        Some(meridiem) => format!("{}:{} {}", display.hour, two_digits(value.minute()), meridiem),
        None => format!("{}:{}", two_digits(value.hour()), two_digits(value.minute())),
    }
}

pub fn truncate_to_minute(value: NaiveDateTime) -> NaiveDateTime {
    value
        - Duration::seconds(value.second() as i64)
        - Duration::nanoseconds(value.nanosecond() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_two_digits() {
        assert_eq!(two_digits(0), "00");
        assert_eq!(two_digits(7), "07");
        assert_eq!(two_digits(42), "42");
        assert_eq!(two_digits(123), "123");
    }

    #[test]
    fn test_convert_hours_24h() {
        let display = convert_hours_for_mode(17, ClockMode::TwentyFourHour);
        assert_eq!(display.hour, 17);
        assert_eq!(display.meridiem, None);
        assert!(!display.is_pm());
    }

    #[test]
    fn test_convert_hours_12h() {
        let cases = [
            (0, 12, Meridiem::Am),
            (1, 1, Meridiem::Am),
            (11, 11, Meridiem::Am),
            (12, 12, Meridiem::Pm),
            (13, 1, Meridiem::Pm),
            (23, 11, Meridiem::Pm),
        ];
        for (raw, hour, meridiem) in cases {
            let display = convert_hours_for_mode(raw, ClockMode::TwelveHour);
            assert_eq!(display.hour, hour, "raw hour {}", raw);
            assert_eq!(display.meridiem, Some(meridiem), "raw hour {}", raw);
        }
    }

    #[test]
    fn test_to_24_hour_inverts_display() {
        for raw in 0..24 {
            let display = convert_hours_for_mode(raw, ClockMode::TwelveHour);
            assert_eq!(to_24_hour(display.hour, display.meridiem.unwrap()), raw);
        }
    }

    #[test]
    fn test_format_display() {
        assert_eq!(format_display(&at(9, 5), ClockMode::TwentyFourHour), "09:05");
        assert_eq!(format_display(&at(0, 0), ClockMode::TwentyFourHour), "00:00");
        assert_eq!(format_display(&at(9, 5), ClockMode::TwelveHour), "9:05 am");
        assert_eq!(format_display(&at(0, 30), ClockMode::TwelveHour), "12:30 am");
        assert_eq!(format_display(&at(12, 0), ClockMode::TwelveHour), "12:00 pm");
        assert_eq!(format_display(&at(23, 59), ClockMode::TwelveHour), "11:59 pm");
    }

    #[test]
    fn test_truncate_to_minute() {
        let value = NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_milli_opt(10, 20, 33, 750)
            .unwrap();
        assert_eq!(truncate_to_minute(value), at(10, 20));
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("12h".parse::<ClockMode>().unwrap(), ClockMode::TwelveHour);
        assert_eq!("24H".parse::<ClockMode>().unwrap(), ClockMode::TwentyFourHour);
        assert!("36h".parse::<ClockMode>().is_err());
    }

    #[test]
    fn test_mode_serde() {
        let mode: ClockMode = serde_json::from_str("\"12h\"").unwrap();
        assert_eq!(mode, ClockMode::TwelveHour);
        assert_eq!(
            serde_json::to_string(&ClockMode::TwentyFourHour).unwrap(),
            "\"24h\""
        );
    }
}
