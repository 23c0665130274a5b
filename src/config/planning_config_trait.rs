// ==========================================
// 面粉厂排产系统 - 排产配置读取 Trait
// ==========================================
// 职责: 定义排产引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::error::ConfigResult;
use crate::domain::SeasonalShiftRule;
use async_trait::async_trait;
use chrono::NaiveDate;

/// 默认换产时间（小时）
pub const DEFAULT_CHANGEOVER_HOURS: f64 = 0.5;

/// 默认配比和容差
pub const DEFAULT_ALLOCATION_TOLERANCE: f64 = 1e-6;

// ==========================================
// PlanningConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait PlanningConfigReader: Send + Sync {
    /// 获取配方切换的换产时间（小时）
    ///
    /// # 默认值
    /// - 0.5
    async fn get_changeover_hours(&self) -> ConfigResult<f64>;

    /// 获取配比和的容差
    ///
    /// # 默认值
    /// - 1e-6
    async fn get_allocation_tolerance(&self) -> ConfigResult<f64>;

    /// 获取季节性配比调整规则（声明顺序）
    ///
    /// # 默认值
    /// - SeasonalShiftRule::default_rules()
    async fn get_seasonal_shift_rules(&self) -> ConfigResult<Vec<SeasonalShiftRule>>;

    /// 获取排产并行线程数（0 = rayon 默认）
    async fn get_worker_threads(&self) -> ConfigResult<usize>;

    /// 获取检修日列表 (mill_id, date)
    ///
    /// # 默认值
    /// - 空
    async fn get_maintenance_days(&self) -> ConfigResult<Vec<(String, NaiveDate)>>;
}

// ==========================================
// PlanningParameters - 单次批次的配置快照
// ==========================================
// 批次开始时一次性读取，排产过程中只读
#[derive(Debug, Clone)]
pub struct PlanningParameters {
    pub changeover_hours: f64,
    pub allocation_tolerance: f64,
    pub shift_rules: Vec<SeasonalShiftRule>,
    pub worker_threads: usize,
    pub maintenance_days: Vec<(String, NaiveDate)>,
}

impl Default for PlanningParameters {
    fn default() -> Self {
        Self {
            changeover_hours: DEFAULT_CHANGEOVER_HOURS,
            allocation_tolerance: DEFAULT_ALLOCATION_TOLERANCE,
            shift_rules: SeasonalShiftRule::default_rules(),
            worker_threads: 0,
            maintenance_days: Vec::new(),
        }
    }
}

impl PlanningParameters {
    /// 从配置读取器加载快照
    pub async fn load<C: PlanningConfigReader + ?Sized>(reader: &C) -> ConfigResult<Self> {
        Ok(Self {
            changeover_hours: reader.get_changeover_hours().await?,
            allocation_tolerance: reader.get_allocation_tolerance().await?,
            shift_rules: reader.get_seasonal_shift_rules().await?,
            worker_threads: reader.get_worker_threads().await?,
            maintenance_days: reader.get_maintenance_days().await?,
        })
    }
}
