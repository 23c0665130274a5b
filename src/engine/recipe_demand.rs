// ==========================================
// 面粉厂排产系统 - 配方需求计算
// ==========================================
// 输入: 当日大类需求 + 当日配比
// 输出: 配方需求明细 + 配方日合计（排产器输入）
// 红线: 无准入配方的正需求必须上报，不能静默丢弃
// ==========================================

use crate::domain::{
    FlourDemand, PlanWarning, RecipeDemand, RecipeDemandTotal, RecipeMixEntry, WarningKind,
};
use crate::engine::recipe_mix::normalize_shares;
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::{debug, warn};

// ==========================================
// RecipeDemandOutput - 单日计算结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct RecipeDemandOutput {
    pub recipe_demand: Vec<RecipeDemand>,
    pub totals: Vec<RecipeDemandTotal>, // 按首次出现的配方顺序
    pub warnings: Vec<PlanWarning>,
}

// ==========================================
// RecipeDemandCalculator
// ==========================================
pub struct RecipeDemandCalculator {
    tolerance: f64,
}

impl RecipeDemandCalculator {
    /// 构造函数
    ///
    /// # 参数
    /// - tolerance: 配比和偏离 1.0 的容差，超出则重新归一化并告警
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// 计算单日配方需求
    ///
    /// 同一 flour_type 的多行大类需求先合并；配方合计按配方首次出现顺序输出
    pub fn compute(
        &self,
        date: NaiveDate,
        flour_demand: &[FlourDemand],
        mix: &[RecipeMixEntry],
    ) -> RecipeDemandOutput {
        let mut output = RecipeDemandOutput::default();
        let mut total_index: HashMap<String, usize> = HashMap::new();

        for FlourDemand {
            flour_type,
            required_tons,
            ..
        } in merge_flour_demand(date, flour_demand)
        {
            let entries: Vec<&RecipeMixEntry> = mix
                .iter()
                .filter(|m| m.date == date && m.flour_type == flour_type)
                .collect();

            if entries.is_empty() {
                if required_tons > 0.0 {
                    warn!(
                        %date,
                        flour_type = %flour_type,
                        lost_tons = required_tons,
                        "面粉大类无准入配方，需求丢失"
                    );
                    output.warnings.push(
                        PlanWarning::new(
                            date,
                            WarningKind::MissingEligibility,
                            &flour_type,
                            format!(
                                "MISSING_ELIGIBILITY: flour_type={} 无准入配方, 丢失 {:.3} 吨",
                                flour_type, required_tons
                            ),
                        )
                        .with_lost_tons(required_tons),
                    );
                } else {
                    debug!(%date, flour_type = %flour_type, "零需求且无准入配方，跳过");
                }
                continue;
            }

            // 防御性归一化（仅浮点漂移）
            let raw: Vec<f64> = entries.iter().map(|e| e.allocation_pct).collect();
            let pct_sum: f64 = raw.iter().sum();
            let shares = if (pct_sum - 1.0).abs() > self.tolerance {
                warn!(%date, flour_type = %flour_type, pct_sum, "配比和偏离 1.0，重新归一化");
                output.warnings.push(PlanWarning::new(
                    date,
                    WarningKind::AllocationDrift,
                    &flour_type,
                    format!("ALLOCATION_DRIFT: 配比和 {:.9}，已重新归一化", pct_sum),
                ));
                normalize_shares(&raw)
            } else {
                raw
            };

            for (entry, pct) in entries.iter().zip(shares) {
                let tons = required_tons * pct;
                output.recipe_demand.push(RecipeDemand {
                    date,
                    recipe_id: entry.recipe_id.clone(),
                    flour_type: flour_type.clone(),
                    recipe_required_tons: tons,
                });

                match total_index.get(&entry.recipe_id) {
                    Some(&i) => output.totals[i].required_tons += tons,
                    None => {
                        total_index.insert(entry.recipe_id.clone(), output.totals.len());
                        output.totals.push(RecipeDemandTotal {
                            date,
                            recipe_id: entry.recipe_id.clone(),
                            required_tons: tons,
                        });
                    }
                }
            }
        }

        output
    }
}

/// 合并同日同大类需求（保持首次出现顺序，负吨位按 0 计）
pub fn merge_flour_demand(date: NaiveDate, flour_demand: &[FlourDemand]) -> Vec<FlourDemand> {
    let mut merged: Vec<FlourDemand> = Vec::new();
    for row in flour_demand.iter().filter(|r| r.date == date) {
        let tons = row.required_tons.max(0.0);
        match merged.iter_mut().find(|m| m.flour_type == row.flour_type) {
            Some(existing) => existing.required_tons += tons,
            None => merged.push(FlourDemand {
                date,
                flour_type: row.flour_type.clone(),
                required_tons: tons,
            }),
        }
    }
    merged
}
