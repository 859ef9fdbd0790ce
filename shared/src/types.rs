//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Pagination parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
        }
    }
}

/// Paginated response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

impl PaginationMeta {
    pub fn new(page: u32, per_page: u32, total_items: u64) -> Self {
        let total_pages = if per_page == 0 {
            0
        } else {
            ((total_items + per_page as u64 - 1) / per_page as u64) as u32
        };
        Self {
            page,
            per_page,
            total_items,
            total_pages,
        }
    }
}

/// Inclusive calendar-day range for queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DateRange {
    pub start: chrono::NaiveDate,
    pub end: chrono::NaiveDate,
}

impl DateRange {
    pub fn new(start: chrono::NaiveDate, end: chrono::NaiveDate) -> Self {
        Self { start, end }
    }

    /// Number of calendar days covered, inclusive of both endpoints.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Inclusive lower timestamp bound (midnight UTC of the start day).
    pub fn start_bound(&self) -> chrono::DateTime<chrono::Utc> {
        self.start.and_time(chrono::NaiveTime::MIN).and_utc()
    }

    /// Exclusive upper timestamp bound (midnight UTC of the day after the
    /// end day).
    pub fn end_bound(&self) -> chrono::DateTime<chrono::Utc> {
        (self.end + chrono::Days::new(1))
            .and_time(chrono::NaiveTime::MIN)
            .and_utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_pagination_meta_rounds_up() {
        let meta = PaginationMeta::new(1, 10, 25);
        assert_eq!(meta.total_pages, 3);
    }

    #[test]
    fn test_pagination_meta_exact_pages() {
        let meta = PaginationMeta::new(2, 10, 30);
        assert_eq!(meta.total_pages, 3);
    }

    #[test]
    fn test_date_range_single_day() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(DateRange::new(day, day).num_days(), 1);
    }

    #[test]
    fn test_date_range_week() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(DateRange::new(start, end).num_days(), 7);
    }

    #[test]
    fn test_date_range_bounds_cover_whole_end_day() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let range = DateRange::new(day, day);
        assert_eq!(range.start_bound().to_rfc3339(), "2024-03-31T00:00:00+00:00");
        assert_eq!(range.end_bound().to_rfc3339(), "2024-04-01T00:00:00+00:00");
    }
}
