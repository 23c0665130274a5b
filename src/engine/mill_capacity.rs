// ==========================================
// 面粉厂排产系统 - 机组产能提供者
// ==========================================
// 职责: 给出 (date, mill) 可用小时，已扣除检修与周末
// ==========================================

use crate::domain::{Mill, MillCapacity};
use crate::engine::calendar::CalendarProvider;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

// ==========================================
// Trait: MillCapacityProvider
// ==========================================
pub trait MillCapacityProvider: Send + Sync {
    /// None 表示无记录（调用方按 0 小时处理并告警）
    fn capacity(&self, date: NaiveDate, mill_id: &str) -> Option<MillCapacity>;
}

// ==========================================
// TableCapacityProvider - 已导入的产能表
// ==========================================
pub struct TableCapacityProvider {
    table: HashMap<(NaiveDate, String), MillCapacity>,
}

impl TableCapacityProvider {
    /// 重复 (date, mill_id) 以后出现的行为准
    pub fn new(rows: Vec<MillCapacity>) -> Self {
        let mut table = HashMap::with_capacity(rows.len());
        for row in rows {
            let key = (row.date, row.mill_id.clone());
            if table.insert(key, row).is_some() {
                debug!("产能表存在重复 (date, mill_id)，以后出现的行为准");
            }
        }
        Self { table }
    }
}

impl MillCapacityProvider for TableCapacityProvider {
    fn capacity(&self, date: NaiveDate, mill_id: &str) -> Option<MillCapacity> {
        self.table.get(&(date, mill_id.to_string())).cloned()
    }
}

// ==========================================
// StandardCapacityProvider - 按主数据推导
// ==========================================
// 规则: hours_per_day；周末停产；检修日停产 (is_maintenance=true)
pub struct StandardCapacityProvider {
    hours: HashMap<String, f64>,
    calendar: Arc<dyn CalendarProvider>,
    maintenance: HashSet<(String, NaiveDate)>,
}

impl StandardCapacityProvider {
    pub fn new(
        mills: &[Mill],
        calendar: Arc<dyn CalendarProvider>,
        maintenance_days: Vec<(String, NaiveDate)>,
    ) -> Self {
        Self {
            hours: mills
                .iter()
                .map(|m| (m.mill_id.clone(), m.hours_per_day))
                .collect(),
            calendar,
            maintenance: maintenance_days.into_iter().collect(),
        }
    }
}

impl MillCapacityProvider for StandardCapacityProvider {
    fn capacity(&self, date: NaiveDate, mill_id: &str) -> Option<MillCapacity> {
        let hours = *self.hours.get(mill_id)?;

        if self.maintenance.contains(&(mill_id.to_string(), date)) {
            return Some(MillCapacity::zero(date, mill_id, true));
        }
        if self.calendar.flags(date).is_weekend {
            return Some(MillCapacity::zero(date, mill_id, false));
        }

        Some(MillCapacity {
            date,
            mill_id: mill_id.to_string(),
            available_hours: hours,
            is_maintenance: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::calendar::SaudiCalendar;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, day).unwrap()
    }

    fn mills() -> Vec<Mill> {
        vec![Mill {
            mill_id: "M1".to_string(),
            name: "Dammam Mill".to_string(),
            hours_per_day: 20.0,
            daily_capacity_tons: Some(1350.0),
        }]
    }

    #[test]
    fn test_standard_capacity_weekday_weekend_maintenance() {
        let provider = StandardCapacityProvider::new(
            &mills(),
            Arc::new(SaudiCalendar::new()),
            vec![("M1".to_string(), d(6))],
        );

        // 2026-01-05 周一
        let monday = provider.capacity(d(5), "M1").unwrap();
        assert_eq!(monday.available_hours, 20.0);
        assert!(!monday.is_maintenance);

        // 2026-01-06 检修
        let maintenance = provider.capacity(d(6), "M1").unwrap();
        assert_eq!(maintenance.available_hours, 0.0);
        assert!(maintenance.is_maintenance);

        // 2026-01-10 周六
        let saturday = provider.capacity(d(10), "M1").unwrap();
        assert_eq!(saturday.available_hours, 0.0);
        assert!(!saturday.is_maintenance);

        assert!(provider.capacity(d(5), "M9").is_none());
    }

    #[test]
    fn test_table_capacity_last_row_wins() {
        let provider = TableCapacityProvider::new(vec![
            MillCapacity {
                date: d(5),
                mill_id: "M1".to_string(),
                available_hours: 20.0,
                is_maintenance: false,
            },
            MillCapacity {
                date: d(5),
                mill_id: "M1".to_string(),
                available_hours: 12.0,
                is_maintenance: false,
            },
        ]);
        assert_eq!(provider.capacity(d(5), "M1").unwrap().available_hours, 12.0);
        assert!(provider.capacity(d(6), "M1").is_none());
    }
}
