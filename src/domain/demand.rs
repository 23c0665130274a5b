// ==========================================
// 面粉厂排产系统 - 需求领域模型
// ==========================================
// 数据流: SKU 预测 → 面粉大类需求 → 配方需求
// 红线: 需求行一经生成不可变，重算时整段替换
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// SkuMaster - SKU 主数据
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuMaster {
    pub sku_id: String,
    pub sku_name: Option<String>,
    pub flour_type: String, // 所属面粉大类
}

// ==========================================
// SkuForecast - SKU 日需求预测
// ==========================================
// 外部预测器的输出契约，不假设具体统计方法
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuForecast {
    pub date: NaiveDate,
    pub sku_id: String,
    pub demand_tons: f64,
}

// ==========================================
// FlourDemand - 面粉大类需求
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlourDemand {
    pub date: NaiveDate,
    pub flour_type: String,
    pub required_tons: f64,
}

// ==========================================
// RecipeDemand - 配方需求（按面粉大类拆分）
// ==========================================
// recipe_required_tons = FlourDemand.required_tons × allocation_pct
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDemand {
    pub date: NaiveDate,
    pub recipe_id: String,
    pub flour_type: String,
    pub recipe_required_tons: f64,
}

// ==========================================
// RecipeDemandTotal - 配方日需求合计
// ==========================================
// 同日同配方跨面粉大类合计，排产器的直接输入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDemandTotal {
    pub date: NaiveDate,
    pub recipe_id: String,
    pub required_tons: f64,
}
