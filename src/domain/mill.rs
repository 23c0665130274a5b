// ==========================================
// 面粉厂排产系统 - 机组领域模型
// ==========================================
// 职责: 机组主数据、配方产能矩阵、每日可用小时
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Mill - 机组主数据
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mill {
    pub mill_id: String,
    pub name: String,
    pub hours_per_day: f64,
    pub daily_capacity_tons: Option<f64>,
}

// ==========================================
// MillRecipeRate - 机组配方产能（吨/小时）
// ==========================================
// 红线: tons_per_hour > 0，装载时校验
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MillRecipeRate {
    pub mill_id: String,
    pub recipe_id: String,
    pub tons_per_hour: f64,
}

// ==========================================
// MillCapacity - 机组日可用小时
// ==========================================
// 外部输入，已扣除检修与周末
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MillCapacity {
    pub date: NaiveDate,
    pub mill_id: String,
    pub available_hours: f64,
    pub is_maintenance: bool,
}

impl MillCapacity {
    /// 零产能（检修/停产）
    pub fn zero(date: NaiveDate, mill_id: &str, is_maintenance: bool) -> Self {
        Self {
            date,
            mill_id: mill_id.to_string(),
            available_hours: 0.0,
            is_maintenance,
        }
    }

    /// 有效可用小时（负值按 0 处理）
    pub fn effective_hours(&self) -> f64 {
        self.available_hours.max(0.0)
    }
}
