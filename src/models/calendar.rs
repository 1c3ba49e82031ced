//! Weekly calendar: days and time slots.
//!
//! A time slot is one teaching period on one weekday. Times are minutes
//! since midnight; the period index is the slot's position in the day.

use serde::{Deserialize, Serialize};
use std::fmt;

/// School day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    /// Monday through Friday.
    pub const WEEKDAYS: [Day; 5] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
    ];

    /// Short uppercase label used in move signatures.
    pub fn code(self) -> &'static str {
        match self {
            Day::Monday => "MON",
            Day::Tuesday => "TUE",
            Day::Wednesday => "WED",
            Day::Thursday => "THU",
            Day::Friday => "FRI",
            Day::Saturday => "SAT",
            Day::Sunday => "SUN",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One teaching period on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Weekday.
    pub day: Day,
    /// Start (minutes since midnight).
    pub start_min: u32,
    /// End (minutes since midnight).
    pub end_min: u32,
    /// Period index within the day (0-based).
    pub period: u32,
}

impl TimeSlot {
    /// Creates a time slot.
    pub fn new(day: Day, start_min: u32, end_min: u32, period: u32) -> Self {
        Self {
            day,
            start_min,
            end_min,
            period,
        }
    }

    /// Duration in minutes.
    #[inline]
    pub fn duration_min(&self) -> u32 {
        self.end_min.saturating_sub(self.start_min)
    }

    /// Builds a regular weekly grid.
    ///
    /// Every day in `days` gets `periods` consecutive slots of
    /// `period_min` minutes separated by `break_min`, starting at
    /// `first_start_min`.
    pub fn weekly_grid(
        days: &[Day],
        periods: u32,
        first_start_min: u32,
        period_min: u32,
        break_min: u32,
    ) -> Vec<TimeSlot> {
        let mut slots = Vec::with_capacity(days.len() * periods as usize);
        for &day in days {
            for period in 0..periods {
                let start = first_start_min + period * (period_min + break_min);
                slots.push(TimeSlot::new(day, start, start + period_min, period));
            }
        }
        slots
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:02}:{:02}-{:02}:{:02} (P{})",
            self.day,
            self.start_min / 60,
            self.start_min % 60,
            self.end_min / 60,
            self.end_min % 60,
            self.period
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekly_grid() {
        // 5 days × 8 periods of 45 min with 5 min breaks from 08:00
        let grid = TimeSlot::weekly_grid(&Day::WEEKDAYS, 8, 480, 45, 5);
        assert_eq!(grid.len(), 40);
        assert_eq!(grid[0], TimeSlot::new(Day::Monday, 480, 525, 0));
        assert_eq!(grid[1].start_min, 530);
        assert_eq!(grid[8].day, Day::Tuesday);
        assert_eq!(grid[8].period, 0);
        assert_eq!(grid[39].period, 7);
    }

    #[test]
    fn test_display() {
        let slot = TimeSlot::new(Day::Wednesday, 8 * 60 + 50, 9 * 60 + 35, 1);
        assert_eq!(slot.to_string(), "WED 08:50-09:35 (P1)");
        assert_eq!(slot.duration_min(), 45);
    }
}
