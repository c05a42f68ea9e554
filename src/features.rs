use std::fmt;

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};

use crate::dataset::{DateCell, RawGame};

pub const SERVE_WON: &str = "WON";
pub const SERVE_LOST: &str = "LOST";

// Serial of the nonexistent 1900-02-29 in the 1900 date system.
const LEAP_BUG_SERIAL: u64 = 60;

// Largest serial a spreadsheet date can hold (9999-12-31).
const MAX_SERIAL: f64 = 2_958_465.0;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Calendar month bucket, ordered chronologically and shown as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One game observation with the derived analysis columns.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRow {
    pub match_date: Option<NaiveDate>,
    pub month: Option<YearMonth>,
    pub tournament_id: String,
    pub tournament_name: String,
    pub match_id: String,
    pub surface: String,
    pub serve_outcome: String,
    pub held_serve: bool,
    pub is_service_game: bool,
}

impl GameRow {
    pub fn from_raw(raw: &RawGame) -> Self {
        let match_date = parse_match_date(&raw.match_date);
        Self {
            match_date,
            month: match_date.map(YearMonth::from),
            tournament_id: raw.tournament_id.clone(),
            tournament_name: raw.tournament_name.clone(),
            match_id: raw.match_id.clone(),
            surface: raw.surface.clone(),
            serve_outcome: raw.won_serve.clone(),
            held_serve: is_hold(&raw.won_serve),
            is_service_game: is_service_outcome(&raw.won_serve),
        }
    }
}

pub fn derive_rows(raw: &[RawGame]) -> Vec<GameRow> {
    raw.iter().map(GameRow::from_raw).collect()
}

pub fn is_hold(outcome: &str) -> bool {
    outcome == SERVE_WON
}

pub fn is_service_outcome(outcome: &str) -> bool {
    outcome == SERVE_WON || outcome == SERVE_LOST
}

/// Coerces a raw date cell into a calendar date. Anything that cannot be
/// read as a date becomes `None`.
pub fn parse_match_date(cell: &DateCell) -> Option<NaiveDate> {
    match cell {
        DateCell::Serial(serial) => date_from_serial(*serial),
        DateCell::Text(raw) => parse_date_text(raw),
        DateCell::Empty => None,
    }
}

/// Spreadsheet day number to date (1900 date system). The time of day is
/// truncated.
///
/// The 1900 system counts a 1900-02-29 that never existed (serial 60).
/// Serials below it count from 1899-12-31, and serial 60 has no date.
pub fn date_from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..=MAX_SERIAL).contains(&serial) {
        return None;
    }
    let days = serial.trunc() as u64;
    let epoch = match days {
        ..LEAP_BUG_SERIAL => NaiveDate::from_ymd_opt(1899, 12, 31)?,
        LEAP_BUG_SERIAL => return None,
        _ => NaiveDate::from_ymd_opt(1899, 12, 30)?,
    };
    epoch.checked_add_days(Days::new(days))
}

fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if raw.len() == 8 && raw.bytes().all(|b| b.is_ascii_digit()) {
        let year = raw[..4].parse().ok()?;
        let month = raw[4..6].parse().ok()?;
        let day = raw[6..].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }

    // Dates exported as plain numbers keep their serial form.
    raw.parse::<f64>().ok().and_then(date_from_serial)
}
