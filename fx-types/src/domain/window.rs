//! Inclusive calendar date window.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::DomainError;

/// An inclusive `[start, end]` range of calendar days.
///
/// Construction guarantees `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct DateWindow {
    #[schema(value_type = String, example = "2024-01-01")]
    start: NaiveDate,
    #[schema(value_type = String, example = "2024-01-03")]
    end: NaiveDate,
}

impl DateWindow {
    /// Creates a window, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        if start > end {
            return Err(DomainError::InvalidRange(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// A window covering a single day.
    pub fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days in the window, both ends included.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Iterates every day of the window in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }
}

impl std::fmt::Display for DateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_window_creation() {
        let window = DateWindow::new(d(2024, 1, 1), d(2024, 1, 3)).unwrap();
        assert_eq!(window.len_days(), 3);
        assert!(window.contains(d(2024, 1, 2)));
        assert!(!window.contains(d(2024, 1, 4)));
    }

    #[test]
    fn test_reversed_window_fails() {
        let result = DateWindow::new(d(2024, 1, 3), d(2024, 1, 1));
        assert!(matches!(result, Err(DomainError::InvalidRange(_))));
    }

    #[test]
    fn test_days_iteration() {
        let window = DateWindow::new(d(2023, 12, 30), d(2024, 1, 2)).unwrap();
        let days: Vec<_> = window.days().collect();
        assert_eq!(days.len(), 4);
        assert_eq!(days[0], d(2023, 12, 30));
        assert_eq!(days[3], d(2024, 1, 2));
    }

    #[test]
    fn test_window_display() {
        assert_eq!(
            DateWindow::single(d(2024, 2, 29)).to_string(),
            "2024-02-29..2024-02-29"
        );
    }
}
