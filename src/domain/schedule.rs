// ==========================================
// 面粉厂排产系统 - 排产结果领域模型
// ==========================================
// 职责: 小时级排产条目、机组负荷、周期汇总
// 红线: 同一 (date, mill) 内按 start_hour 有序且互不重叠
// ==========================================

use crate::domain::types::Utilization;
use chrono::NaiveDate;
use serde::Serialize;

// ==========================================
// ScheduleEntry - 排产条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleEntry {
    pub date: NaiveDate,
    pub mill_id: String,
    pub recipe_id: String,
    pub start_hour: f64,
    pub end_hour: f64,
    pub duration_hours: f64,
    pub changeover_hours: f64, // 开工前的换产时间
    pub tons_produced: f64,
}

// ==========================================
// MillLoad - 机组日负荷
// ==========================================
// 纯派生: ScheduleEntry + MillCapacity，无独立状态
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MillLoad {
    pub date: NaiveDate,
    pub mill_id: String,
    pub scheduled_hours: f64,
    pub available_hours: f64,
    pub overload_hours: f64, // 负值表示剩余产能
    pub utilization_pct: Utilization,
    pub required_hours: f64, // 独立覆盖当日全部需求所需小时
}

// ==========================================
// MillRecipePlan - 周期汇总（机组 × 配方）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MillRecipePlan {
    pub period: String,
    pub mill_id: String,
    pub recipe_id: String,
    pub production_hours: f64,
    pub changeover_hours: f64,
    pub tons_produced: f64,
    pub run_count: usize,
}
