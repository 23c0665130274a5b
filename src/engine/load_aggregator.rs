// ==========================================
// 面粉厂排产系统 - 机组负荷汇总
// ==========================================
// 输入: 单元排产条目 + 可用小时
// 输出: scheduled / overload / utilization
// ==========================================

use crate::domain::{MillLoad, ScheduleEntry, Utilization};
use chrono::NaiveDate;

pub struct LoadAggregator;

impl LoadAggregator {
    pub fn new() -> Self {
        Self
    }

    /// 计算单个 (date, mill) 负荷
    ///
    /// - overload_hours = scheduled − available（负值为剩余产能）
    /// - available > 0: utilization = scheduled / available × 100
    /// - available == 0 且 (scheduled > 0 或 required > 0): Undefined
    /// - 两者都为 0: 0
    pub fn compute(
        &self,
        date: NaiveDate,
        mill_id: &str,
        entries: &[ScheduleEntry],
        available_hours: f64,
        required_hours: f64,
    ) -> MillLoad {
        let available_hours = available_hours.max(0.0);
        let scheduled_hours: f64 = entries
            .iter()
            .filter(|e| e.date == date && e.mill_id == mill_id)
            .map(|e| e.duration_hours)
            .sum();

        let utilization_pct = if available_hours > 0.0 {
            Utilization::Percent(scheduled_hours / available_hours * 100.0)
        } else if scheduled_hours > 0.0 || required_hours > 0.0 {
            Utilization::Undefined
        } else {
            Utilization::Percent(0.0)
        };

        MillLoad {
            date,
            mill_id: mill_id.to_string(),
            scheduled_hours,
            available_hours,
            overload_hours: scheduled_hours - available_hours,
            utilization_pct,
            required_hours,
        }
    }
}

impl Default for LoadAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
    }

    fn entry(duration: f64) -> ScheduleEntry {
        ScheduleEntry {
            date: date(),
            mill_id: "M1".to_string(),
            recipe_id: "R1".to_string(),
            start_hour: 0.0,
            end_hour: duration,
            duration_hours: duration,
            changeover_hours: 0.0,
            tons_produced: duration * 10.0,
        }
    }

    #[test]
    fn test_partial_utilization() {
        let load = LoadAggregator::new().compute(date(), "M1", &[entry(5.0), entry(3.0)], 20.0, 8.0);
        assert_eq!(load.scheduled_hours, 8.0);
        assert_eq!(load.overload_hours, -12.0);
        assert_eq!(load.utilization_pct, Utilization::Percent(40.0));
    }

    #[test]
    fn test_zero_available_with_demand_is_undefined() {
        let load = LoadAggregator::new().compute(date(), "M1", &[], 0.0, 4.5);
        assert_eq!(load.overload_hours, 0.0);
        assert!(load.utilization_pct.is_undefined());
    }

    #[test]
    fn test_zero_available_with_scheduled_hours_is_undefined() {
        let load = LoadAggregator::new().compute(date(), "M1", &[entry(2.0)], 0.0, 0.0);
        assert_eq!(load.overload_hours, 2.0);
        assert!(load.utilization_pct.is_undefined());
    }

    #[test]
    fn test_zero_available_without_demand_is_zero() {
        let load = LoadAggregator::new().compute(date(), "M1", &[], 0.0, 0.0);
        assert_eq!(load.utilization_pct, Utilization::Percent(0.0));
    }
}
