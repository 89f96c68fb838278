//! Month grid computation for the calendar screen.
//!
//! A month is always laid out on 42 cells (6 weeks of 7 days, weeks starting
//! on Sunday). Days of the surrounding months pad the first and last rows.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::Serialize;

use crate::domain::error::DomainError;

pub const DAYS_PER_WEEK: usize = 7;
pub const WEEKS_PER_GRID: usize = 6;
pub const GRID_CELLS: usize = DAYS_PER_WEEK * WEEKS_PER_GRID;

const MONTH_NAMES_FR: [&str; 12] = [
    "janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
];

pub const WEEKDAY_HEADERS_FR: [&str; DAYS_PER_WEEK] = ["Dim", "Lun", "Mar", "Mer", "Jeu", "Ven", "Sam"];

/// A displayable month. Construction guarantees that every date of its
/// 42-cell grid exists in chrono's calendar range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CalendarMonth {
    year: i32,
    month: u32,
    #[serde(skip)]
    first: NaiveDate,
    #[serde(skip)]
    len: u32,
}

impl CalendarMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, DomainError> {
        let invalid = || DomainError::validation(format!("invalid month: {}-{}", year, month));
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let next_first = first.checked_add_months(Months::new(1)).ok_or_else(invalid)?;
        let len = (next_first - first).num_days() as u32;

        let offset = first.weekday().num_days_from_sunday() as i64;
        first
            .checked_sub_signed(Duration::days(offset))
            .ok_or_else(invalid)?;
        first
            .checked_add_signed(Duration::days(GRID_CELLS as i64 - 1 - offset))
            .ok_or_else(invalid)?;

        Ok(Self {
            year,
            month,
            first,
            len,
        })
    }

    pub fn of(date: NaiveDate) -> Result<Self, DomainError> {
        Self::new(date.year(), date.month())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.first + Duration::days(self.len as i64 - 1)
    }

    pub fn len_days(&self) -> u32 {
        self.len
    }

    /// `None` past the end of the representable calendar.
    pub fn next(&self) -> Option<Self> {
        if self.month == 12 {
            Self::new(self.year.checked_add(1)?, 1).ok()
        } else {
            Self::new(self.year, self.month + 1).ok()
        }
    }

    pub fn previous(&self) -> Option<Self> {
        if self.month == 1 {
            Self::new(self.year.checked_sub(1)?, 12).ok()
        } else {
            Self::new(self.year, self.month - 1).ok()
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Number of leading cells taken by the previous month (Sunday = 0).
    pub fn first_weekday_offset(&self) -> usize {
        self.first.weekday().num_days_from_sunday() as usize
    }

    /// French label, e.g. `mars 2024`.
    pub fn title(&self) -> String {
        format!("{} {}", MONTH_NAMES_FR[(self.month - 1) as usize], self.year)
    }
}

impl fmt::Display for CalendarMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for CalendarMonth {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::validation(format!("expected YYYY-MM, got {:?}", s));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MonthPosition {
    Previous,
    Current,
    Next,
}

/// Display class of a day cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CellClass {
    Muted,
    Selected,
    TodayWithAppointments,
    Today,
    HasAppointments,
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellColors {
    pub background: &'static str,
    pub text: &'static str,
}

impl CellClass {
    pub fn colors(self) -> CellColors {
        let (background, text) = match self {
            CellClass::Muted => ("transparent", "#D3D3D3"),
            CellClass::Selected => ("#ADD8E6", "#000000"),
            CellClass::TodayWithAppointments => ("#4CAF50", "#FFFFFF"),
            CellClass::Today => ("#FFEB3B", "#000000"),
            CellClass::HasAppointments => ("#FF6B35", "#FFFFFF"),
            CellClass::Plain => ("#FFFFFF", "#000000"),
        };
        CellColors { background, text }
    }
}

/// Facts about one cell that the classification rules look at.
#[derive(Debug, Clone, Copy)]
pub struct CellContext {
    pub date: NaiveDate,
    pub position: MonthPosition,
    pub selected: NaiveDate,
    pub today: NaiveDate,
    pub has_appointments: bool,
}

struct CellRule {
    class: CellClass,
    applies: fn(&CellContext) -> bool,
}

// Ordered by precedence: the first matching rule wins.
const CELL_RULES: [CellRule; 5] = [
    CellRule {
        class: CellClass::Muted,
        applies: |c| c.position != MonthPosition::Current,
    },
    CellRule {
        class: CellClass::Selected,
        applies: |c| c.date == c.selected,
    },
    CellRule {
        class: CellClass::TodayWithAppointments,
        applies: |c| c.date == c.today && c.has_appointments,
    },
    CellRule {
        class: CellClass::Today,
        applies: |c| c.date == c.today,
    },
    CellRule {
        class: CellClass::HasAppointments,
        applies: |c| c.has_appointments,
    },
];

pub fn classify(context: &CellContext) -> CellClass {
    CELL_RULES
        .iter()
        .find(|rule| (rule.applies)(context))
        .map(|rule| rule.class)
        .unwrap_or(CellClass::Plain)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarCell {
    pub index: usize,
    pub date: NaiveDate,
    pub position: MonthPosition,
    pub has_appointments: bool,
    pub class: CellClass,
}

impl CalendarCell {
    pub fn row(&self) -> usize {
        self.index / DAYS_PER_WEEK
    }

    pub fn column(&self) -> usize {
        self.index % DAYS_PER_WEEK
    }

    pub fn day(&self) -> u32 {
        self.date.day()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarGrid {
    pub month: CalendarMonth,
    pub cells: Vec<CalendarCell>,
}

impl CalendarGrid {
    /// Lays out `month` and classifies every cell.
    pub fn build(
        month: CalendarMonth,
        selected: NaiveDate,
        today: NaiveDate,
        appointment_dates: &HashSet<NaiveDate>,
    ) -> Self {
        let offset = month.first_weekday_offset();
        let len = month.len_days() as usize;
        let first = month.first_day();

        let cells = (0..GRID_CELLS)
            .map(|index| {
                let position = if index < offset {
                    MonthPosition::Previous
                } else if index < offset + len {
                    MonthPosition::Current
                } else {
                    MonthPosition::Next
                };
                // Representable: CalendarMonth::new checked the whole window.
                let date = first + Duration::days(index as i64 - offset as i64);
                let has_appointments = appointment_dates.contains(&date);
                let class = classify(&CellContext {
                    date,
                    position,
                    selected,
                    today,
                    has_appointments,
                });
                CalendarCell {
                    index,
                    date,
                    position,
                    has_appointments,
                    class,
                }
            })
            .collect();

        Self { month, cells }
    }

    pub fn weeks(&self) -> impl Iterator<Item = &[CalendarCell]> {
        self.cells.chunks(DAYS_PER_WEEK)
    }

    pub fn cell(&self, date: NaiveDate) -> Option<&CalendarCell> {
        self.cells.iter().find(|cell| cell.date == date)
    }
}
