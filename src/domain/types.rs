// ==========================================
// 面粉厂排产系统 - 领域类型定义
// ==========================================
// 职责: 日历标志、日历事件、利用率、汇总粒度
// ==========================================

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

// ==========================================
// 日历标志 (Calendar Flags)
// ==========================================
// 由 CalendarProvider 按日期提供
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarFlags {
    pub is_weekend: bool,
    pub is_ramadan: bool,
    pub is_hajj: bool,
}

impl CalendarFlags {
    /// 判断某个日历事件在当日是否生效
    pub fn matches(&self, event: CalendarEvent) -> bool {
        match event {
            CalendarEvent::Always => true,
            CalendarEvent::Weekend => self.is_weekend,
            CalendarEvent::Ramadan => self.is_ramadan,
            CalendarEvent::Hajj => self.is_hajj,
        }
    }
}

// ==========================================
// 日历事件 (Calendar Event)
// ==========================================
// 季节性配比调整规则的触发条件
// 序列化格式: SCREAMING_SNAKE_CASE (与 config_kv 一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalendarEvent {
    Always,  // 无条件
    Weekend, // 周末
    Ramadan, // 斋月
    Hajj,    // 朝觐季
}

impl fmt::Display for CalendarEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarEvent::Always => write!(f, "ALWAYS"),
            CalendarEvent::Weekend => write!(f, "WEEKEND"),
            CalendarEvent::Ramadan => write!(f, "RAMADAN"),
            CalendarEvent::Hajj => write!(f, "HAJJ"),
        }
    }
}

// ==========================================
// 利用率 (Utilization)
// ==========================================
// available_hours == 0 且有排产/需求时无法计算百分比，使用 Undefined 哨兵
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Utilization {
    Percent(f64),
    Undefined,
}

impl Utilization {
    /// 百分比数值（Undefined 返回 None，用于落库 NULL）
    pub fn as_percent(&self) -> Option<f64> {
        match self {
            Utilization::Percent(v) => Some(*v),
            Utilization::Undefined => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Utilization::Undefined)
    }
}

impl fmt::Display for Utilization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Utilization::Percent(v) => write!(f, "{}", v),
            Utilization::Undefined => write!(f, "UNDEFINED"),
        }
    }
}

impl Serialize for Utilization {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Utilization::Percent(v) => serializer.serialize_f64(*v),
            Utilization::Undefined => serializer.serialize_str("UNDEFINED"),
        }
    }
}

// ==========================================
// 汇总粒度 (Period Granularity)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodGranularity {
    Day,
    Week,
    Month,
    Year,
}

impl fmt::Display for PeriodGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodGranularity::Day => write!(f, "DAY"),
            PeriodGranularity::Week => write!(f, "WEEK"),
            PeriodGranularity::Month => write!(f, "MONTH"),
            PeriodGranularity::Year => write!(f, "YEAR"),
        }
    }
}

impl PeriodGranularity {
    /// 从字符串解析（大小写不敏感）
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "DAY" | "DAILY" => Some(PeriodGranularity::Day),
            "WEEK" | "WEEKLY" => Some(PeriodGranularity::Week),
            "MONTH" | "MONTHLY" => Some(PeriodGranularity::Month),
            "YEAR" | "YEARLY" => Some(PeriodGranularity::Year),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_match_events() {
        let flags = CalendarFlags {
            is_weekend: false,
            is_ramadan: true,
            is_hajj: false,
        };
        assert!(flags.matches(CalendarEvent::Always));
        assert!(flags.matches(CalendarEvent::Ramadan));
        assert!(!flags.matches(CalendarEvent::Hajj));
        assert!(!flags.matches(CalendarEvent::Weekend));
    }

    #[test]
    fn test_utilization_serialization() {
        let defined = serde_json::to_string(&Utilization::Percent(50.0)).unwrap();
        let undefined = serde_json::to_string(&Utilization::Undefined).unwrap();
        assert_eq!(defined, "50.0");
        assert_eq!(undefined, "\"UNDEFINED\"");
    }

    #[test]
    fn test_period_granularity_parse() {
        assert_eq!(PeriodGranularity::parse("month"), Some(PeriodGranularity::Month));
        assert_eq!(PeriodGranularity::parse(" Weekly "), Some(PeriodGranularity::Week));
        assert_eq!(PeriodGranularity::parse("quarter"), None);
    }
}
