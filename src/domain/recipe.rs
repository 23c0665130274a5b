// ==========================================
// 面粉厂排产系统 - 配方领域模型
// ==========================================
// 职责: 面粉大类 → 配方 准入表、季节性调整规则、每日配比
// ==========================================

use crate::domain::types::{CalendarEvent, CalendarFlags};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// RecipeEligibility - 配方准入（静态配置）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeEligibility {
    pub flour_type: String,
    pub recipe_id: String,
    pub default_allocation_pct: f64, // [0, 1]
}

// ==========================================
// RecipeMixEntry - 每日配比
// ==========================================
// 红线: 同一 (date, flour_type) 下 allocation_pct 之和 = 1.0 ± 1e-6
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeMixEntry {
    pub date: NaiveDate,
    pub flour_type: String,
    pub recipe_id: String,
    pub allocation_pct: f64,
}

// ==========================================
// SeasonalShiftRule - 季节性配比调整规则
// ==========================================
// 规则是数据不是代码: (触发事件, 面粉大类集合) → (目标配方, 加成)
// 按声明顺序累加，最后统一归一化一次
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalShiftRule {
    pub event: CalendarEvent,
    pub flour_types: Vec<String>,
    pub recipe_id: String,
    pub bonus: f64,
}

impl SeasonalShiftRule {
    /// 判断规则对 (日历标志, 面粉大类) 是否生效
    ///
    /// flour_types 为空表示适用所有面粉大类
    pub fn applies_to(&self, flags: &CalendarFlags, flour_type: &str) -> bool {
        flags.matches(self.event)
            && (self.flour_types.is_empty() || self.flour_types.iter().any(|f| f == flour_type))
    }

    /// 默认规则集
    ///
    /// - 斋月: Superior/Patent 向 R2 倾斜 +0.15
    /// - 朝觐季: Bakery 向 R2 倾斜 +0.10
    pub fn default_rules() -> Vec<SeasonalShiftRule> {
        vec![
            SeasonalShiftRule {
                event: CalendarEvent::Ramadan,
                flour_types: vec!["Superior".to_string(), "Patent".to_string()],
                recipe_id: "R2".to_string(),
                bonus: 0.15,
            },
            SeasonalShiftRule {
                event: CalendarEvent::Hajj,
                flour_types: vec!["Bakery".to_string()],
                recipe_id: "R2".to_string(),
                bonus: 0.10,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_applies_to_listed_flour_only() {
        let rule = &SeasonalShiftRule::default_rules()[0];
        let ramadan = CalendarFlags {
            is_ramadan: true,
            ..CalendarFlags::default()
        };
        assert!(rule.applies_to(&ramadan, "Superior"));
        assert!(!rule.applies_to(&ramadan, "Bakery"));
        assert!(!rule.applies_to(&CalendarFlags::default(), "Superior"));
    }

    #[test]
    fn test_rule_with_empty_flour_list_applies_to_all() {
        let rule = SeasonalShiftRule {
            event: CalendarEvent::Weekend,
            flour_types: vec![],
            recipe_id: "R4".to_string(),
            bonus: 0.05,
        };
        let weekend = CalendarFlags {
            is_weekend: true,
            ..CalendarFlags::default()
        };
        assert!(rule.applies_to(&weekend, "Brown"));
    }

    #[test]
    fn test_rule_json_shape() {
        let json = r#"{"event":"HAJJ","flour_types":["Bakery"],"recipe_id":"R2","bonus":0.1}"#;
        let rule: SeasonalShiftRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.event, CalendarEvent::Hajj);
        assert_eq!(rule.recipe_id, "R2");
    }
}
