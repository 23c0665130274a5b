// ==========================================
// 面粉厂排产系统 - 配方配比分配器
// ==========================================
// 输入: 日期 + 日历标志 + 静态准入表 + 季节性调整规则
// 输出: 每个 (date, flour_type) 下各准入配方的 allocation_pct
// 红线: 同组配比和 = 1.0 ± 1e-6
// ==========================================

use crate::config::MasterData;
use crate::domain::{CalendarFlags, RecipeEligibility, RecipeMixEntry, SeasonalShiftRule};
use chrono::NaiveDate;
use tracing::trace;

// ==========================================
// RecipeMixAllocator
// ==========================================
pub struct RecipeMixAllocator {
    rules: Vec<SeasonalShiftRule>,
}

impl RecipeMixAllocator {
    /// 构造函数
    ///
    /// # 参数
    /// - rules: 季节性调整规则（按声明顺序应用）
    pub fn new(rules: Vec<SeasonalShiftRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[SeasonalShiftRule] {
        &self.rules
    }

    /// 计算单个 (date, flour_type) 的配比
    ///
    /// 步骤:
    /// 1) 以 default_allocation_pct 为初值
    /// 2) 按声明顺序累加所有命中规则的加成（目标配方必须已准入）
    /// 3) 负值截断为 0，统一归一化一次
    ///
    /// 单一准入配方恒为 1.0；准入为空返回空列表
    pub fn allocate(
        &self,
        date: NaiveDate,
        flour_type: &str,
        flags: &CalendarFlags,
        eligible: &[RecipeEligibility],
    ) -> Vec<RecipeMixEntry> {
        if eligible.is_empty() {
            return Vec::new();
        }

        if eligible.len() == 1 {
            return vec![RecipeMixEntry {
                date,
                flour_type: flour_type.to_string(),
                recipe_id: eligible[0].recipe_id.clone(),
                allocation_pct: 1.0,
            }];
        }

        let mut shares: Vec<f64> = eligible.iter().map(|e| e.default_allocation_pct).collect();

        for rule in self.rules.iter().filter(|r| r.applies_to(flags, flour_type)) {
            if let Some(i) = eligible.iter().position(|e| e.recipe_id == rule.recipe_id) {
                shares[i] += rule.bonus;
                trace!(
                    %date,
                    flour_type,
                    recipe_id = %rule.recipe_id,
                    event = %rule.event,
                    bonus = rule.bonus,
                    "季节性规则命中"
                );
            }
        }

        let shares = normalize_shares(&shares);

        eligible
            .iter()
            .zip(shares)
            .map(|(e, pct)| RecipeMixEntry {
                date,
                flour_type: flour_type.to_string(),
                recipe_id: e.recipe_id.clone(),
                allocation_pct: pct,
            })
            .collect()
    }

    /// 计算某日所有面粉大类的配比（面粉大类字典序，配方按声明顺序）
    pub fn allocate_day(
        &self,
        date: NaiveDate,
        flags: &CalendarFlags,
        master: &MasterData,
    ) -> Vec<RecipeMixEntry> {
        master
            .flour_types()
            .into_iter()
            .flat_map(|flour_type| {
                self.allocate(date, flour_type, flags, master.eligible_recipes(flour_type))
            })
            .collect()
    }
}

/// 份额归一化
///
/// - 负值截断为 0
/// - 总和为 0 时均分
pub fn normalize_shares(shares: &[f64]) -> Vec<f64> {
    if shares.is_empty() {
        return Vec::new();
    }

    let clamped: Vec<f64> = shares.iter().map(|s| s.max(0.0)).collect();
    let total: f64 = clamped.iter().sum();

    if total <= 0.0 || !total.is_finite() {
        let equal = 1.0 / clamped.len() as f64;
        return vec![equal; clamped.len()];
    }

    clamped.iter().map(|s| s / total).collect()
}
