//! Free-text time entry parsing.
//!
//! Parses whatever a user typed into a time input into an hour/minute pair.
//! The caller provides the clock mode, which only affects hour clamping.
//!
//! # Supported Formats
//!
//! - **Hour only**: `"5"`, `"17"` (minutes default to 0)
//! - **Colon separated**: `"9:45"`, `"17:05"`
//! - **Concatenated digits**: `"0945"`, `"1705"` (split into 2-digit groups)
//! - **Meridiem suffix**: any of the above with `am`/`pm` anywhere, in any case:
//!   `"9:45am"`, `"5 PM"`, `"130pm"`
//!
//! Out-of-range numbers are clamped rather than rejected. `12am` and `12pm`
//! are not special-cased: the meridiem only adjusts hours that are
//! inconsistent with it.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use regex::Regex;
use thiserror::Error;

use crate::clock::{ClockMode, Meridiem};

/// An hour/minute pair produced by the parser.
///
/// `hour` is clamped to `0..=24` but not folded into a single day: `24`
/// rolls over into the following day once anchored on a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
}

impl ClockTime {
    /// The instant `hour:minute` past midnight of `date`, seconds zeroed.
    /// Only fails when the rollover would pass the last representable date.
    pub fn on(&self, date: NaiveDate) -> Result<NaiveDateTime, ParseError> {
        let offset = Duration::try_hours(self.hour as i64)
            .and_then(|hours| hours.checked_add(&Duration::minutes(self.minute as i64)));
        date.and_hms_opt(0, 0, 0)
            .zip(offset)
            .and_then(|(midnight, offset)| midnight.checked_add_signed(offset))
            .ok_or(ParseError::OutOfRange(self.hour))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Not a number: {0:?}")]
    NotANumber(String),

    #[error("Missing minutes in {0:?}")]
    MissingMinutes(String),

    #[error("Hour {0} is past the last representable date")]
    OutOfRange(u32),
}

/// Parse a free-text time.
///
/// Returns `Ok(None)` for empty input. Both `Ok(None)` and `Err(_)` mean the
/// committed value should be cleared.
pub fn parse(input: &str, mode: ClockMode) -> Result<Option<ClockTime>, ParseError> {
    if input.is_empty() {
        return Ok(None);
    }

    let (rest, meridiem) = extract_meridiem(input);
    let rest = rest.trim();

    let (hours, minutes) = split_hours_minutes(rest)?;
    let mut hours = coerce(hours)?;
    let mut minutes = coerce(minutes)?;

    match meridiem {
        Some(Meridiem::Pm) if hours < 12 => hours += 12,
        Some(Meridiem::Am) if hours > 12 => hours -= 12,
        _ => {}
    }

    // The 12-hour branch only lifts low hours; everything else is capped.
    if mode == ClockMode::TwelveHour && hours < 1 {
        hours = 1;
    } else if hours > 24 {
        hours = 24;
    } else if hours < 0 {
        hours = 0;
    }

    minutes = minutes.clamp(0, 59);

    Ok(Some(ClockTime {
        hour: hours as u32,
        minute: minutes as u32,
    }))
}

/// Parse a free-text time and anchor it on `date`.
pub fn parse_on(
    input: &str,
    mode: ClockMode,
    date: NaiveDate,
) -> Result<Option<NaiveDateTime>, ParseError> {
    match parse(input, mode)? {
        Some(time) => time.on(date).map(Some),
        None => Ok(None),
    }
}

/// Removes the first `am`/`pm` occurrence, wherever it is.
fn extract_meridiem(input: &str) -> (String, Option<Meridiem>) {
    let found = Regex::new(r"(?i)am|pm")
        .ok()
        .and_then(|re| re.find(input).map(|m| m.range()));

    match found {
        Some(range) => {
            let meridiem: Option<Meridiem> = input[range.clone()].parse().ok();
            let mut rest = String::with_capacity(input.len());
            rest.push_str(&input[..range.start]);
            rest.push_str(&input[range.end..]);
            (rest, meridiem)
        }
        None => (input.to_string(), None),
    }
}

fn split_hours_minutes(rest: &str) -> Result<(&str, &str), ParseError> {
    if rest.chars().count() <= 2 {
        return Ok((rest, ""));
    }

    if rest.contains(':') {
        let mut parts = rest.split(':');
        let hours = parts.next().unwrap_or("");
        let minutes = parts.next().unwrap_or("");
        return Ok((hours, minutes));
    }

    let pieces = split_digit_pairs(rest);
    match (pieces.first(), pieces.get(1)) {
        (Some(hours), Some(minutes)) => Ok((*hours, *minutes)),
        _ => Err(ParseError::MissingMinutes(rest.to_string())),
    }
}

/// Splits around every 2-digit group, keeping the groups and any non-empty
/// text between them: `"0930"` -> `["09", "30"]`, `"130"` -> `["13", "0"]`.
fn split_digit_pairs(input: &str) -> Vec<&str> {
    let Ok(re) = Regex::new(r"\d\d") else {
        return vec![input];
    };

    let mut pieces = Vec::new();
    let mut last = 0;
    for m in re.find_iter(input) {
        if m.start() > last {
            pieces.push(&input[last..m.start()]);
        }
        pieces.push(m.as_str());
        last = m.end();
    }
    if last < input.len() {
        pieces.push(&input[last..]);
    }
    pieces
}

/// Blank parts count as 0.
fn coerce(part: &str) -> Result<i64, ParseError> {
    let part = part.trim();
    if part.is_empty() {
        return Ok(0);
    }
    part.parse::<i64>()
        .map_err(|_| ParseError::NotANumber(part.to_string()))
}
