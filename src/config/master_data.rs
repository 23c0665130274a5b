// ==========================================
// 面粉厂排产系统 - 静态主数据
// ==========================================
// 职责: 机组清单、配方产能矩阵、配方准入表、SKU 主数据
// 红线: 装载即校验；校验失败则整个批次失败
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::domain::{Mill, MillRecipeRate, RecipeEligibility, SkuMaster};
use std::collections::{HashMap, HashSet};
use tracing::debug;

// ==========================================
// MasterData - 已校验的静态主数据
// ==========================================
#[derive(Debug, Clone)]
pub struct MasterData {
    mills: Vec<Mill>,
    rates: HashMap<(String, String), f64>,
    eligibility: HashMap<String, Vec<RecipeEligibility>>,
    skus: HashMap<String, SkuMaster>,
}

impl MasterData {
    /// 装载并校验主数据
    ///
    /// # 校验规则
    /// - 机组清单/准入表不可为空
    /// - 主键不可重复: mill_id / (mill_id, recipe_id) / (flour_type, recipe_id) / sku_id
    /// - tons_per_hour 必须为正数
    /// - default_allocation_pct ∈ [0, 1]
    /// - 产能表引用的机组必须存在
    pub fn new(
        mills: Vec<Mill>,
        rates: Vec<MillRecipeRate>,
        eligibility: Vec<RecipeEligibility>,
        skus: Vec<SkuMaster>,
    ) -> ConfigResult<Self> {
        if mills.is_empty() {
            return Err(ConfigError::EmptyTable("mill_master".to_string()));
        }
        if eligibility.is_empty() {
            return Err(ConfigError::EmptyTable("recipe_eligibility".to_string()));
        }

        // 1. 机组
        let mut mill_ids = HashSet::new();
        for mill in &mills {
            if !mill_ids.insert(mill.mill_id.clone()) {
                return Err(ConfigError::DuplicateKey {
                    table: "mill_master".to_string(),
                    key: mill.mill_id.clone(),
                });
            }
            if !mill.hours_per_day.is_finite() || mill.hours_per_day < 0.0 {
                return Err(ConfigError::InvalidMillHours {
                    mill_id: mill.mill_id.clone(),
                    hours: mill.hours_per_day,
                });
            }
        }

        // 2. 产能矩阵
        let mut rate_map = HashMap::with_capacity(rates.len());
        for rate in rates {
            if !mill_ids.contains(&rate.mill_id) {
                return Err(ConfigError::UnknownMill {
                    table: "mill_recipe_rate".to_string(),
                    mill_id: rate.mill_id,
                });
            }
            if !rate.tons_per_hour.is_finite() || rate.tons_per_hour <= 0.0 {
                return Err(ConfigError::NonPositiveRate {
                    mill_id: rate.mill_id,
                    recipe_id: rate.recipe_id,
                    tons_per_hour: rate.tons_per_hour,
                });
            }
            let key = (rate.mill_id.clone(), rate.recipe_id.clone());
            if rate_map.insert(key, rate.tons_per_hour).is_some() {
                return Err(ConfigError::DuplicateKey {
                    table: "mill_recipe_rate".to_string(),
                    key: format!("{}/{}", rate.mill_id, rate.recipe_id),
                });
            }
        }

        // 3. 配方准入（保持声明顺序）
        let mut eligibility_map: HashMap<String, Vec<RecipeEligibility>> = HashMap::new();
        for entry in eligibility {
            if !entry.default_allocation_pct.is_finite()
                || !(0.0..=1.0).contains(&entry.default_allocation_pct)
            {
                return Err(ConfigError::AllocationOutOfRange {
                    flour_type: entry.flour_type,
                    recipe_id: entry.recipe_id,
                    pct: entry.default_allocation_pct,
                });
            }
            let recipes = eligibility_map.entry(entry.flour_type.clone()).or_default();
            if recipes.iter().any(|e| e.recipe_id == entry.recipe_id) {
                return Err(ConfigError::DuplicateKey {
                    table: "recipe_eligibility".to_string(),
                    key: format!("{}/{}", entry.flour_type, entry.recipe_id),
                });
            }
            recipes.push(entry);
        }

        // 4. SKU 主数据
        let mut sku_map = HashMap::with_capacity(skus.len());
        for sku in skus {
            let sku_id = sku.sku_id.clone();
            if sku_map.insert(sku_id.clone(), sku).is_some() {
                return Err(ConfigError::DuplicateKey {
                    table: "sku_master".to_string(),
                    key: sku_id,
                });
            }
        }

        debug!(
            mills = mills.len(),
            rates = rate_map.len(),
            flour_types = eligibility_map.len(),
            skus = sku_map.len(),
            "主数据校验通过"
        );

        Ok(Self {
            mills,
            rates: rate_map,
            eligibility: eligibility_map,
            skus: sku_map,
        })
    }

    /// 机组清单（保持主数据顺序）
    pub fn mills(&self) -> &[Mill] {
        &self.mills
    }

    /// 查询 (机组, 配方) 产能，吨/小时
    pub fn tons_per_hour(&self, mill_id: &str, recipe_id: &str) -> Option<f64> {
        self.rates
            .get(&(mill_id.to_string(), recipe_id.to_string()))
            .copied()
    }

    /// 查询面粉大类的准入配方（声明顺序）
    pub fn eligible_recipes(&self, flour_type: &str) -> &[RecipeEligibility] {
        self.eligibility
            .get(flour_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 所有面粉大类（字典序，保证遍历确定性）
    pub fn flour_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.eligibility.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn sku(&self, sku_id: &str) -> Option<&SkuMaster> {
        self.skus.get(sku_id)
    }

    pub fn has_skus(&self) -> bool {
        !self.skus.is_empty()
    }
}
