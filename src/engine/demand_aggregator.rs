// ==========================================
// 面粉厂排产系统 - 需求汇总
// ==========================================
// 输入: SKU 日预测 + SKU 主数据
// 输出: (date, flour_type) 大类需求
// 说明: 预测器为外部能力接口，不假设统计方法
// ==========================================

use crate::config::MasterData;
use crate::domain::{FlourDemand, PlanWarning, SkuForecast, WarningKind};
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::{debug, warn};

// ==========================================
// Trait: DemandForecaster
// ==========================================
pub trait DemandForecaster: Send + Sync {
    /// 返回 [start, end] 内的 SKU 日需求
    fn forecast(&self, start: NaiveDate, end: NaiveDate) -> Vec<SkuForecast>;
}

// ==========================================
// StaticForecast - 已导入的预测表
// ==========================================
pub struct StaticForecast {
    rows: Vec<SkuForecast>,
}

impl StaticForecast {
    pub fn new(rows: Vec<SkuForecast>) -> Self {
        Self { rows }
    }
}

impl DemandForecaster for StaticForecast {
    fn forecast(&self, start: NaiveDate, end: NaiveDate) -> Vec<SkuForecast> {
        self.rows
            .iter()
            .filter(|r| r.date >= start && r.date <= end)
            .cloned()
            .collect()
    }
}

// ==========================================
// DemandAggregator - SKU → 面粉大类
// ==========================================
pub struct DemandAggregator;

impl DemandAggregator {
    pub fn new() -> Self {
        Self
    }

    /// 按 (date, flour_type) 汇总吨位
    ///
    /// 规则:
    /// - 保持首次出现顺序（确定性）
    /// - 负吨位按 0 计
    /// - 未知 SKU 产生 UNKNOWN_SKU 告警并丢弃该行
    pub fn aggregate(
        &self,
        forecasts: &[SkuForecast],
        master: &MasterData,
    ) -> (Vec<FlourDemand>, Vec<PlanWarning>) {
        let mut demands: Vec<FlourDemand> = Vec::new();
        let mut index: HashMap<(NaiveDate, String), usize> = HashMap::new();
        let mut warnings = Vec::new();

        for row in forecasts {
            let Some(sku) = master.sku(&row.sku_id) else {
                warn!(date = %row.date, sku_id = %row.sku_id, "SKU 不在主数据中，需求丢弃");
                warnings.push(
                    PlanWarning::new(
                        row.date,
                        WarningKind::UnknownSku,
                        &row.sku_id,
                        format!("UNKNOWN_SKU: sku_id={} 不在 sku_master 中", row.sku_id),
                    )
                    .with_lost_tons(row.demand_tons.max(0.0)),
                );
                continue;
            };

            let tons = row.demand_tons.max(0.0);
            let key = (row.date, sku.flour_type.clone());
            match index.get(&key) {
                Some(&i) => demands[i].required_tons += tons,
                None => {
                    index.insert(key, demands.len());
                    demands.push(FlourDemand {
                        date: row.date,
                        flour_type: sku.flour_type.clone(),
                        required_tons: tons,
                    });
                }
            }
        }

        debug!(
            forecast_rows = forecasts.len(),
            flour_rows = demands.len(),
            "SKU 需求汇总完成"
        );

        (demands, warnings)
    }

    /// 通过预测器汇总 [start, end] 内需求
    pub fn aggregate_from(
        &self,
        forecaster: &dyn DemandForecaster,
        master: &MasterData,
        start: NaiveDate,
        end: NaiveDate,
    ) -> (Vec<FlourDemand>, Vec<PlanWarning>) {
        let forecasts = forecaster.forecast(start, end);
        self.aggregate(&forecasts, master)
    }
}

impl Default for DemandAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Mill, RecipeEligibility, SkuMaster};

    fn master() -> MasterData {
        MasterData::new(
            vec![Mill {
                mill_id: "M1".to_string(),
                name: "Dammam Mill".to_string(),
                hours_per_day: 20.0,
                daily_capacity_tons: None,
            }],
            vec![],
            vec![RecipeEligibility {
                flour_type: "Superior".to_string(),
                recipe_id: "R1".to_string(),
                default_allocation_pct: 1.0,
            }],
            vec![
                SkuMaster {
                    sku_id: "SKU001".to_string(),
                    sku_name: None,
                    flour_type: "Superior".to_string(),
                },
                SkuMaster {
                    sku_id: "SKU002".to_string(),
                    sku_name: None,
                    flour_type: "Superior".to_string(),
                },
                SkuMaster {
                    sku_id: "SKU004".to_string(),
                    sku_name: None,
                    flour_type: "Bakery".to_string(),
                },
            ],
        )
        .unwrap()
    }

    fn fc(day: u32, sku: &str, tons: f64) -> SkuForecast {
        SkuForecast {
            date: NaiveDate::from_ymd_opt(2026, 1, day).unwrap(),
            sku_id: sku.to_string(),
            demand_tons: tons,
        }
    }

    #[test]
    fn test_aggregate_by_flour_type() {
        let rows = vec![
            fc(5, "SKU001", 35.0),
            fc(5, "SKU004", 30.0),
            fc(5, "SKU002", 25.0),
            fc(6, "SKU001", 10.0),
        ];
        let (demands, warnings) = DemandAggregator::new().aggregate(&rows, &master());

        assert!(warnings.is_empty());
        assert_eq!(demands.len(), 3);
        assert_eq!(demands[0].flour_type, "Superior");
        assert_eq!(demands[0].required_tons, 60.0);
        assert_eq!(demands[1].flour_type, "Bakery");
        assert_eq!(demands[2].required_tons, 10.0);
    }

    #[test]
    fn test_unknown_sku_and_negative_tons() {
        let rows = vec![fc(5, "SKU999", 12.0), fc(5, "SKU001", -3.0)];
        let (demands, warnings) = DemandAggregator::new().aggregate(&rows, &master());

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::UnknownSku);
        assert_eq!(warnings[0].lost_tons, 12.0);
        assert_eq!(demands.len(), 1);
        assert_eq!(demands[0].required_tons, 0.0);
    }

    #[test]
    fn test_static_forecast_filters_range() {
        let forecaster = StaticForecast::new(vec![fc(4, "SKU001", 1.0), fc(5, "SKU001", 2.0)]);
        let day = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let rows = forecaster.forecast(day, day);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].demand_tons, 2.0);
    }
}
