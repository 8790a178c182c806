use loghours_error::{ErrorKind, LogError, Result};

/// Month of the fiscal year, April through March.
///
/// Each month owns two adjacent columns in a worksheet: one for the work
/// description and one for the hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Month {
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
    January,
    February,
    March,
}

/// 1-based column indices for a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthColumns {
    pub description: usize,
    pub hours: usize,
}

impl Month {
    /// All months in fiscal-year (column) order.
    pub const ALL: [Month; 12] = [
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
        Month::January,
        Month::February,
        Month::March,
    ];

    /// Parse a full month name, ignoring case.
    ///
    /// The error message echoes the input as given.
    pub fn parse(input: &str) -> Result<Self> {
        let lower = input.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.lowercase_name() == lower)
            .ok_or_else(|| {
                LogError::new(format!(
                    "Month '{input}' not recognized. Please use a full month name, e.g. May."
                ))
                .with_kind(ErrorKind::UnrecognizedMonth)
            })
    }

    pub const fn lowercase_name(&self) -> &'static str {
        match self {
            Month::April => "april",
            Month::May => "may",
            Month::June => "june",
            Month::July => "july",
            Month::August => "august",
            Month::September => "september",
            Month::October => "october",
            Month::November => "november",
            Month::December => "december",
            Month::January => "january",
            Month::February => "february",
            Month::March => "march",
        }
    }

    pub const fn capitalized(&self) -> &'static str {
        match self {
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
        }
    }

    pub const fn columns(&self) -> MonthColumns {
        // Column 1 holds row labels, months follow in pairs.
        let offset = *self as usize;
        MonthColumns {
            description: 2 + offset * 2,
            hours: 3 + offset * 2,
        }
    }
}
