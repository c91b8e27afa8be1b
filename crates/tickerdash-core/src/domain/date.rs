use std::fmt::{Display, Formatter};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::macros::format_description;
use time::{Date, Month, OffsetDateTime};

use crate::ValidationError;

/// Calendar date of a trading session, serialized as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TradingDate(Date);

impl TradingDate {
    pub fn today() -> Self {
        Self(OffsetDateTime::now_utc().date())
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let format = format_description!("[year]-[month]-[day]");
        Date::parse(input.trim(), format)
            .map(Self)
            .map_err(|_| ValidationError::InvalidDate {
                value: input.to_owned(),
            })
    }

    pub fn from_ymd(year: i32, month: u8, day: u8) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidDate {
            value: format!("{year:04}-{month:02}-{day:02}"),
        };
        let month = Month::try_from(month).map_err(|_| invalid())?;
        Date::from_calendar_date(year, month, day)
            .map(Self)
            .map_err(|_| invalid())
    }

    pub const fn from_date(date: Date) -> Self {
        Self(date)
    }

    pub const fn into_inner(self) -> Date {
        self.0
    }

    pub fn next_day(self) -> Option<Self> {
        self.0.next_day().map(Self)
    }

    /// Same calendar day one year earlier; Feb 29 maps to Feb 28.
    pub fn one_year_earlier(self) -> Self {
        let year = self.0.year() - 1;
        self.0
            .replace_year(year)
            .or_else(|_| Date::from_calendar_date(year, Month::February, 28))
            .map(Self)
            .unwrap_or(self)
    }

    pub fn format_iso(self) -> String {
        format!(
            "{:04}-{:02}-{:02}",
            self.0.year(),
            u8::from(self.0.month()),
            self.0.day()
        )
    }
}

impl Display for TradingDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_iso())
    }
}

impl Serialize for TradingDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_iso())
    }
}

impl<'de> Deserialize<'de> for TradingDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}

/// Inclusive date window for a history request.
///
/// Construction never fails. An inverted range (`start > end`) is a legal
/// value that simply selects no trading days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: TradingDate,
    pub end: TradingDate,
}

impl DateRange {
    pub const fn new(start: TradingDate, end: TradingDate) -> Self {
        Self { start, end }
    }

    /// The default window: one year back from `today`, ending on `today`.
    pub fn default_for(today: TradingDate) -> Self {
        Self::new(today.one_year_earlier(), today)
    }

    pub fn trailing_year() -> Self {
        Self::default_for(TradingDate::today())
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, date: TradingDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every calendar day in the range, oldest first. Empty when inverted.
    pub fn days(&self) -> impl Iterator<Item = TradingDate> {
        let end = self.end;
        let first = (!self.is_inverted()).then_some(self.start);
        std::iter::successors(first, move |day| day.next_day().filter(|next| *next <= end))
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::trailing_year()
    }
}
