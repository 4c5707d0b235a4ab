//! A strip of calendar days, used to pick the day whose tasks are displayed

use chrono::{Datelike, Duration, Local, NaiveDate};

use crate::config::{CALENDAR_SPAN_DAYS, DAYS_PER_PAGE};
use crate::task::DayOfWeek;

const MONTHS_SHORT: [&str; 12] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];

/// A day of the strip
#[derive(Clone, Debug, PartialEq)]
pub struct CalendarDay {
    date: NaiveDate,
    iso: String,
    label: String,
    is_today: bool,
}

impl CalendarDay {
    /// `offset` is the number of days between `today` and this day
    fn new(today: NaiveDate, offset: usize) -> Self {
        let date = today + Duration::days(offset as i64);
        let label = match offset {
            0 => "Today".to_string(),
            1 => "Tomorrow".to_string(),
            _ => DayOfWeek::of(date).display_name().to_string(),
        };

        Self {
            date,
            iso: date.format("%Y-%m-%d").to_string(),
            label,
            is_today: offset == 0,
        }
    }

    pub fn date(&self) -> NaiveDate     { self.date     }
    /// The `YYYY-MM-DD` form of this date
    pub fn iso(&self) -> &str           { &self.iso     }
    pub fn label(&self) -> &str         { &self.label   }
    pub fn is_today(&self) -> bool      { self.is_today }
    pub fn day_number(&self) -> u32     { self.date.day() }
    pub fn month_short(&self) -> &'static str {
        MONTHS_SHORT[self.date.month0() as usize]
    }
    pub fn weekday(&self) -> DayOfWeek  { DayOfWeek::of(self.date) }
}


/// A fixed window of consecutive days starting today, displayed one week at a time.
///
/// The days never change once the strip is built, only the selection and the displayed week do.
#[derive(Clone, Debug)]
pub struct DayStrip {
    days: Vec<CalendarDay>,
    selected: usize,
    week_offset: usize,
}

impl DayStrip {
    /// Build a strip that starts on the current local date
    pub fn today() -> Self {
        Self::starting(Local::now().date_naive())
    }

    /// Build a strip that starts on `today`. The first day is selected
    pub fn starting(today: NaiveDate) -> Self {
        let days = (0..CALENDAR_SPAN_DAYS)
            .map(|offset| CalendarDay::new(today, offset))
            .collect();
        Self { days, selected: 0, week_offset: 0 }
    }

    pub fn days(&self) -> &[CalendarDay] {
        &self.days
    }

    pub fn selected(&self) -> &CalendarDay {
        &self.days[self.selected]
    }

    /// Select the day matching `date`. Returns `false` (and changes nothing) in case this date is not part of the strip
    pub fn select(&mut self, date: NaiveDate) -> bool {
        match self.days.iter().position(|d| d.date == date) {
            None => {
                log::debug!("{} is not part of the calendar strip", date);
                false
            },
            Some(index) => {
                self.selected = index;
                true
            }
        }
    }

    /// The days of the currently displayed week
    pub fn visible_days(&self) -> &[CalendarDay] {
        let start = (self.week_offset * DAYS_PER_PAGE).min(self.days.len());
        let end = (start + DAYS_PER_PAGE).min(self.days.len());
        &self.days[start..end]
    }

    pub fn week_offset(&self) -> usize {
        self.week_offset
    }

    pub fn can_go_prev(&self) -> bool {
        self.week_offset > 0
    }

    pub fn can_go_next(&self) -> bool {
        (self.week_offset + 1) * DAYS_PER_PAGE < self.days.len()
    }

    /// Display the week that contains the selected day
    pub fn show_selected_week(&mut self) {
        self.week_offset = self.selected / DAYS_PER_PAGE;
    }

    pub fn prev_week(&mut self) {
        if self.can_go_prev() {
            self.week_offset -= 1;
        }
    }

    pub fn next_week(&mut self) {
        if self.can_go_next() {
            self.week_offset += 1;
        }
    }
}
