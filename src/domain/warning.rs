// ==========================================
// 面粉厂排产系统 - 数据质量告警
// ==========================================
// 职责: 单元级失败的统一载体（不中断批次）
// 红线: 被跳过的需求必须上报，不能静默丢弃
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// WarningKind - 告警类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningKind {
    MissingThroughputRate, // 机组无法生产该配方
    MissingEligibility,    // 面粉大类无准入配方，需求丢失
    MissingCapacity,       // 机组当日无可用小时记录
    UnknownSku,            // 预测中的 SKU 不在主数据中
    AllocationDrift,       // 配比和偏离 1.0，已重新归一化
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningKind::MissingThroughputRate => write!(f, "MISSING_THROUGHPUT_RATE"),
            WarningKind::MissingEligibility => write!(f, "MISSING_ELIGIBILITY"),
            WarningKind::MissingCapacity => write!(f, "MISSING_CAPACITY"),
            WarningKind::UnknownSku => write!(f, "UNKNOWN_SKU"),
            WarningKind::AllocationDrift => write!(f, "ALLOCATION_DRIFT"),
        }
    }
}

// ==========================================
// PlanWarning - 告警明细
// ==========================================
// scope: 机组ID / 面粉大类 / SKU，视 kind 而定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanWarning {
    pub date: NaiveDate,
    pub kind: WarningKind,
    pub scope: String,
    pub subject: Option<String>, // 被跳过的配方等
    pub lost_tons: f64,          // 因跳过而未覆盖的吨位
    pub message: String,
}

impl PlanWarning {
    pub fn new(date: NaiveDate, kind: WarningKind, scope: &str, message: String) -> Self {
        Self {
            date,
            kind,
            scope: scope.to_string(),
            subject: None,
            lost_tons: 0.0,
            message,
        }
    }

    pub fn with_subject(mut self, subject: &str) -> Self {
        self.subject = Some(subject.to_string());
        self
    }

    pub fn with_lost_tons(mut self, lost_tons: f64) -> Self {
        self.lost_tons = lost_tons;
        self
    }
}
