// ==========================================
// 面粉厂排产系统 - 日历提供者
// ==========================================
// 职责: 按日期给出 is_weekend / is_ramadan / is_hajj
// 说明: 伊斯兰历节期为近似表，表外年份视为无节期
// ==========================================

use crate::domain::CalendarFlags;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::HashMap;

// ==========================================
// Trait: CalendarProvider
// ==========================================
pub trait CalendarProvider: Send + Sync {
    fn flags(&self, date: NaiveDate) -> CalendarFlags;
}

/// 斋月起始日 (year, month, day)
const RAMADAN_STARTS: [(i32, u32, u32); 10] = [
    (2020, 4, 24),
    (2021, 4, 13),
    (2022, 4, 2),
    (2023, 3, 23),
    (2024, 3, 11),
    (2025, 3, 1),
    (2026, 2, 18),
    (2027, 2, 7),
    (2028, 1, 27),
    (2029, 1, 15),
];

/// 斋月长度（天）
const RAMADAN_DAYS: i64 = 30;

/// 朝觐季所在月份 (year, month)
const HAJJ_MONTHS: [(i32, u32); 10] = [
    (2020, 7),
    (2021, 7),
    (2022, 7),
    (2023, 6),
    (2024, 6),
    (2025, 6),
    (2026, 5),
    (2027, 5),
    (2028, 5),
    (2029, 4),
];

// ==========================================
// SaudiCalendar - 沙特日历
// ==========================================
// 周末: 2022-01-01 之前为周五+周六，之后为周六+周日
pub struct SaudiCalendar {
    weekend_switch: NaiveDate,
}

impl SaudiCalendar {
    pub fn new() -> Self {
        Self {
            weekend_switch: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or(NaiveDate::MIN),
        }
    }

    fn is_weekend(&self, date: NaiveDate) -> bool {
        let weekday = date.weekday();
        if date < self.weekend_switch {
            matches!(weekday, Weekday::Fri | Weekday::Sat)
        } else {
            matches!(weekday, Weekday::Sat | Weekday::Sun)
        }
    }

    fn is_ramadan(&self, date: NaiveDate) -> bool {
        RAMADAN_STARTS
            .iter()
            .filter(|(year, _, _)| *year == date.year())
            .filter_map(|(year, month, day)| NaiveDate::from_ymd_opt(*year, *month, *day))
            .any(|start| date >= start && date < start + Duration::days(RAMADAN_DAYS))
    }

    fn is_hajj(&self, date: NaiveDate) -> bool {
        HAJJ_MONTHS
            .iter()
            .any(|(year, month)| *year == date.year() && *month == date.month())
    }
}

impl Default for SaudiCalendar {
    fn default() -> Self {
        Self::new()
    }
}

impl CalendarProvider for SaudiCalendar {
    fn flags(&self, date: NaiveDate) -> CalendarFlags {
        CalendarFlags {
            is_weekend: self.is_weekend(date),
            is_ramadan: self.is_ramadan(date),
            is_hajj: self.is_hajj(date),
        }
    }
}

// ==========================================
// TableCalendar - 显式日历表
// ==========================================
// 来源: time_dimension 输入；表外日期回退到 SaudiCalendar
pub struct TableCalendar {
    table: HashMap<NaiveDate, CalendarFlags>,
    fallback: SaudiCalendar,
}

impl TableCalendar {
    pub fn new(rows: Vec<(NaiveDate, CalendarFlags)>) -> Self {
        Self {
            table: rows.into_iter().collect(),
            fallback: SaudiCalendar::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl CalendarProvider for TableCalendar {
    fn flags(&self, date: NaiveDate) -> CalendarFlags {
        self.table
            .get(&date)
            .copied()
            .unwrap_or_else(|| self.fallback.flags(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_weekend_switch_2022() {
        let cal = SaudiCalendar::new();
        // 2021-12-31 周五
        assert!(cal.flags(d(2021, 12, 31)).is_weekend);
        // 2021-12-26 周日 (旧规则非周末)
        assert!(!cal.flags(d(2021, 12, 26)).is_weekend);
        // 2022-01-02 周日 (新规则周末)
        assert!(cal.flags(d(2022, 1, 2)).is_weekend);
        // 2022-01-07 周五 (新规则工作日)
        assert!(!cal.flags(d(2022, 1, 7)).is_weekend);
    }

    #[test]
    fn test_ramadan_window_is_thirty_days() {
        let cal = SaudiCalendar::new();
        assert!(!cal.flags(d(2026, 2, 17)).is_ramadan);
        assert!(cal.flags(d(2026, 2, 18)).is_ramadan);
        assert!(cal.flags(d(2026, 3, 19)).is_ramadan);
        assert!(!cal.flags(d(2026, 3, 20)).is_ramadan);
    }

    #[test]
    fn test_hajj_month() {
        let cal = SaudiCalendar::new();
        assert!(cal.flags(d(2026, 5, 10)).is_hajj);
        assert!(!cal.flags(d(2026, 6, 1)).is_hajj);
        // 表外年份
        assert!(!cal.flags(d(2035, 5, 10)).is_hajj);
    }

    #[test]
    fn test_table_calendar_overrides_and_falls_back() {
        let override_flags = CalendarFlags {
            is_weekend: false,
            is_ramadan: true,
            is_hajj: false,
        };
        let cal = TableCalendar::new(vec![(d(2026, 1, 5), override_flags)]);
        assert_eq!(cal.flags(d(2026, 1, 5)), override_flags);
        // 2026-01-10 周六，回退到沙特日历
        assert!(cal.flags(d(2026, 1, 10)).is_weekend);
    }
}
