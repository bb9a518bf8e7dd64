//! Inclusive date windows for statements.

use serde::Serialize;
use time::{Date, Duration, Month};

use crate::{Error, transaction::Transaction};

/// An inclusive range of calendar dates that selects which transactions
/// appear on a statement.
///
/// A missing bound leaves that side of the window open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatementWindow {
    start: Option<Date>,
    end: Option<Date>,
}

impl StatementWindow {
    /// A window that includes every date.
    pub const UNBOUNDED: StatementWindow = StatementWindow {
        start: None,
        end: None,
    };

    /// Create a window from `start` to `end`, both inclusive.
    ///
    /// # Errors
    /// Returns [Error::InvalidWindow] if `start` is after `end`.
    pub fn new(start: Option<Date>, end: Option<Date>) -> Result<Self, Error> {
        if let (Some(start), Some(end)) = (start, end)
            && start > end
        {
            return Err(Error::InvalidWindow { start, end });
        }

        Ok(Self { start, end })
    }

    /// The first day of the window, if bounded.
    pub fn start(&self) -> Option<Date> {
        self.start
    }

    /// The last day of the window, if bounded.
    pub fn end(&self) -> Option<Date> {
        self.end
    }

    /// Whether `date` falls on or between the bounds.
    pub fn contains(&self, date: Date) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }

    /// A short human readable description, e.g. "5 Jan 2025 - 31 Jan 2025".
    pub fn label(&self) -> String {
        let start = self.start.map_or_else(|| "…".to_owned(), format_date_label);
        let end = self.end.map_or_else(|| "…".to_owned(), format_date_label);

        format!("{start} - {end}")
    }
}

/// Anything with a calendar date that a window can select on.
pub trait Dated {
    /// The calendar date of the item.
    fn date(&self) -> Date;
}

impl Dated for Transaction {
    fn date(&self) -> Date {
        self.date
    }
}

impl<T: Dated> Dated for &T {
    fn date(&self) -> Date {
        (**self).date()
    }
}

/// Select the items dated within `window`, keeping their order.
pub fn filter_window<'a, T: Dated>(items: &'a [T], window: &StatementWindow) -> Vec<&'a T> {
    items
        .iter()
        .filter(|item| window.contains(item.date()))
        .collect()
}

/// Calendar periods that a statement window can be snapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum WindowPreset {
    /// Monday to Sunday.
    Week,
    /// The 1st to the 14th, or the 15th to the end of the month.
    Fortnight,
    /// A calendar month.
    Month,
    /// January to March, April to June, etc.
    Quarter,
    /// January to June, or July to December.
    HalfYear,
    /// A calendar year.
    Year,
}

/// The closed window of kind `preset` that contains `anchor_date`.
///
/// # Errors
/// Returns [Error::WindowOutOfRange] if the window would start before
/// the first or end after the last date [Date] supports.
pub fn compute_window(preset: WindowPreset, anchor_date: Date) -> Result<StatementWindow, Error> {
    let year = anchor_date.year();
    let month = anchor_date.month();

    let (start, end) = match preset {
        WindowPreset::Week => {
            let days_since_monday = anchor_date.weekday().number_days_from_monday() as i64;
            let start = anchor_date
                .checked_sub(Duration::days(days_since_monday))
                .ok_or(Error::WindowOutOfRange(anchor_date))?;
            let end = start
                .checked_add(Duration::days(6))
                .ok_or(Error::WindowOutOfRange(anchor_date))?;
            (start, end)
        }
        WindowPreset::Fortnight if anchor_date.day() <= 14 => {
            (calendar_date(year, month, 1), calendar_date(year, month, 14))
        }
        WindowPreset::Fortnight => (calendar_date(year, month, 15), month_end(year, month)),
        WindowPreset::Month => (calendar_date(year, month, 1), month_end(year, month)),
        WindowPreset::Quarter => months_containing(year, month, 3),
        WindowPreset::HalfYear => months_containing(year, month, 6),
        WindowPreset::Year => months_containing(year, month, 12),
    };

    Ok(StatementWindow {
        start: Some(start),
        end: Some(end),
    })
}

const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// The block of `span` months, aligned to the start of the year, that
/// contains `month`.
fn months_containing(year: i32, month: Month, span: usize) -> (Date, Date) {
    let index = month as usize - 1;
    let first = index - index % span;
    let last = first + span - 1;

    (
        calendar_date(year, MONTHS[first], 1),
        month_end(year, MONTHS[last]),
    )
}

fn month_end(year: i32, month: Month) -> Date {
    calendar_date(year, month, last_day_of_month(year, month))
}

fn last_day_of_month(year: i32, month: Month) -> u8 {
    match month {
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February if time::util::is_leap_year(year) => 29,
        Month::February => 28,
        _ => 31,
    }
}

// Callers only pass days that exist in the given month.
fn calendar_date(year: i32, month: Month, day: u8) -> Date {
    Date::from_calendar_date(year, month, day).expect("invalid calendar date")
}

fn format_date_label(date: Date) -> String {
    let month = date.month().to_string();

    format!("{} {} {}", date.day(), &month[..3], date.year())
}
