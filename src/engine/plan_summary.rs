// ==========================================
// 面粉厂排产系统 - 周期汇总
// ==========================================
// 职责: 排产条目按 (周期, 机组, 配方) 汇总小时/吨位/批次数
// ==========================================

use crate::domain::{MillRecipePlan, PeriodGranularity, ScheduleEntry};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

pub struct PlanSummarizer {
    granularity: PeriodGranularity,
}

impl PlanSummarizer {
    pub fn new(granularity: PeriodGranularity) -> Self {
        Self { granularity }
    }

    /// 周期标签
    ///
    /// - Day: YYYY-MM-DD
    /// - Week: ISO 周 YYYY-Www
    /// - Month: YYYY-MM
    /// - Year: YYYY
    pub fn period_label(&self, date: NaiveDate) -> String {
        match self.granularity {
            PeriodGranularity::Day => date.format("%Y-%m-%d").to_string(),
            PeriodGranularity::Week => {
                let week = date.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            PeriodGranularity::Month => date.format("%Y-%m").to_string(),
            PeriodGranularity::Year => date.year().to_string(),
        }
    }

    /// 汇总（按 周期、机组、配方 字典序输出）
    pub fn summarize(&self, entries: &[ScheduleEntry]) -> Vec<MillRecipePlan> {
        let mut groups: BTreeMap<(String, String, String), MillRecipePlan> = BTreeMap::new();

        for entry in entries {
            let period = self.period_label(entry.date);
            let key = (period.clone(), entry.mill_id.clone(), entry.recipe_id.clone());
            let plan = groups.entry(key).or_insert_with(|| MillRecipePlan {
                period,
                mill_id: entry.mill_id.clone(),
                recipe_id: entry.recipe_id.clone(),
                production_hours: 0.0,
                changeover_hours: 0.0,
                tons_produced: 0.0,
                run_count: 0,
            });
            plan.production_hours += entry.duration_hours;
            plan.changeover_hours += entry.changeover_hours;
            plan.tons_produced += entry.tons_produced;
            plan.run_count += 1;
        }

        groups.into_values().collect()
    }
}
