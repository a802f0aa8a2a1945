//! Day-precise time management, with a focus on edge cases
//!
//! Dates are `YYYY-MM-DD`, not number of seconds. Billing only ever needs
//! to move around month boundaries, so the interface is built around
//! jumping from one month to the next and finding the end of a month.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use std::fmt;

use crate::lib::parse;

/// A date with day-precision
///
/// Values built through `Date::from` or `Date::parse_iso` have a year in
/// the range 1000..=9999. The billing helpers (`last_of_month`, `due_after`)
/// accept any year and never fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date {
    year: u16,
    month: Month,
    day: u8,
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month.number(), self.day)
    }
}

/// Twelve months in the year, identified by their 3-letter abbreviations
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, PartialOrd, Ord, Hash)]
pub enum Month {
    Jan = 0,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    /// Month from its calendar number (`1` is `Jan`, `12` is `Dec`)
    pub fn from_number(n: usize) -> Option<Self> {
        if n == 0 {
            None
        } else {
            Self::from_usize(n - 1)
        }
    }

    /// Calendar number of the month, in `1..=12`
    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    /// Month directly preceding the current one with wrapping
    pub fn prev(self) -> Self {
        Self::from_usize((self as usize + 11) % 12).unwrap_or(Month::Dec)
    }

    /// Number of days in this month of the given year
    pub fn count(self, year: u16) -> u8 {
        use Month::*;
        match self {
            Jan | Mar | May | Jul | Aug | Oct | Dec => 31,
            Apr | Jun | Sep | Nov => 30,
            Feb => if is_leap(year) { 29 } else { 28 },
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Ways in which a date taken from user input can be wrong
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DateError {
    /// year is outside of 1000..=9999
    UnsupportedYear(usize),
    /// Feb 29 of a non-leap year
    NotBissextile(usize),
    /// Feb 30 or Feb 31 or 31st day of a 30-day month
    MonthTooShort(Month, usize),
    /// day outside of 1..=31
    InvalidDay(usize),
    /// month outside of 1..=12
    InvalidMonth(usize),
    /// text is not of the form `YYYY-MM-DD`
    Malformed(String),
}

impl Date {
    /// Validate year-month-day into date
    pub fn from(year: usize, month: Month, day: usize) -> Result<Self, DateError> {
        if !(1000..=9999).contains(&year) {
            Err(DateError::UnsupportedYear(year))
        } else if day == 0 || day > 31 {
            Err(DateError::InvalidDay(day))
        } else if day <= month.count(year as u16) as usize {
            Ok(Self { year: year as u16, month, day: day as u8 })
        } else if day >= 30 {
            Err(DateError::MonthTooShort(month, day))
        } else {
            Err(DateError::NotBissextile(year))
        }
    }

    /// Read a strict `YYYY-MM-DD` date (`2024-02-29`)
    pub fn parse_iso(text: &str) -> Result<Self, DateError> {
        let (year, month, day) =
            parse::iso_date(text).ok_or_else(|| DateError::Malformed(text.to_string()))?;
        let month = Month::from_number(month).ok_or(DateError::InvalidMonth(month))?;
        Self::from(year, month, day)
    }

    /// First day of the given month
    pub fn first_of(year: u16, month: Month) -> Self {
        Self { year, month, day: 1 }
    }

    /// Last calendar day of the given month
    ///
    /// Obtained as the day before the first day of the following month.
    pub fn last_of_month(year: u16, month: Month) -> Self {
        Self::first_of(year, month).jump_month(1).prev()
    }

    /// Payment deadline for work billed in the given month:
    /// the 10th of the following month
    pub fn due_after(year: u16, month: Month) -> Self {
        Self { day: 10, ..Self::first_of(year, month).jump_month(1) }
    }

    pub fn prev(self) -> Self {
        if self.day == 1 {
            if self.month == Month::Jan {
                Self { year: self.year - 1, month: Month::Dec, day: 31 }
            } else {
                let month = self.month.prev();
                Self { month, day: month.count(self.year), ..self }
            }
        } else {
            Self { day: self.day - 1, ..self }
        }
    }

    /// `count` months before/after current date
    ///
    /// Day will be truncated to fit in the new month:
    /// adding one month to `2000-01-31` makes it `2000-02-29`
    pub fn jump_month(self, count: isize) -> Self {
        let (year, month) = {
            let mut year = self.year as isize;
            let mut month = self.month as isize + count;
            while month < 0 {
                month += 12;
                year -= 1;
            }
            while month >= 12 {
                month -= 12;
                year += 1;
            }
            (year as u16, Month::from_isize(month).unwrap_or(Month::Jan))
        };
        Self {
            year,
            month,
            day: self.day.min(month.count(year)),
        }
    }

    /// Day-first rendition (`31/03/2024`) used on printed documents
    pub fn dmy(self) -> Dmy {
        Dmy(self)
    }
}

/// Display adapter for `DD/MM/YYYY`
#[derive(Debug, Clone, Copy)]
pub struct Dmy(Date);

impl fmt::Display for Dmy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}/{:04}", self.0.day, self.0.month.number(), self.0.year)
    }
}

fn is_leap(year: u16) -> bool {
    if year % 400 == 0 {
        true
    } else if year % 100 == 0 {
        false
    } else {
        year % 4 == 0
    }
}

impl fmt::Display for DateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use DateError::*;
        match self {
            UnsupportedYear(y) => write!(f, "{} is outside of the supported range for years", y),
            NotBissextile(y) => write!(f, "{} is not bissextile, Feb 29 does not exist", y),
            MonthTooShort(m, d) => write!(
                f,
                "{} is a short month, it does not have a {}th day",
                m, d,
            ),
            InvalidDay(d) => write!(f, "{} is not a valid day", d),
            InvalidMonth(m) => write!(f, "{} is not a valid month", m),
            Malformed(s) => write!(f, "'{}' is not a date", s),
        }
    }
}

impl DateError {
    /// What message to show to help fix the date error
    pub fn fix_hint(&self) -> String {
        use DateError::*;
        match self {
            UnsupportedYear(_) => "year should be between 1000 and 9999 inclusive".to_string(),
            NotBissextile(y) => format!("did you mean {y}-02-28 or {y}-03-01 ?", y = y),
            MonthTooShort(m, d) => format!("{} is only {} days long", m,
                if *m == Month::Feb { 28.max(d - 1) } else { 30 }
            ),
            InvalidDay(d) => format!("{} is not in the range 1 ..= 31", d),
            InvalidMonth(m) => format!("{} is not in the range 1 ..= 12", m),
            Malformed(_) => "write dates as YYYY-MM-DD, e.g. 2024-03-31".to_string(),
        }
    }
}
