// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use chrono::NaiveDate;
use flour_mill_aps::config::{ConfigResult, PlanningConfigReader};
use flour_mill_aps::domain::SeasonalShiftRule;

/// Mock 配置结构
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub changeover_hours: f64,
    pub allocation_tolerance: f64,
    pub shift_rules: Vec<SeasonalShiftRule>,
    pub worker_threads: usize,
    pub maintenance_days: Vec<(String, NaiveDate)>,
}

impl MockConfig {
    /// 创建默认配置
    pub fn default() -> Self {
        Self {
            changeover_hours: 0.5,
            allocation_tolerance: 1e-6,
            shift_rules: SeasonalShiftRule::default_rules(),
            worker_threads: 0,
            maintenance_days: Vec::new(),
        }
    }

    pub fn with_worker_threads(threads: usize) -> Self {
        let mut config = Self::default();
        config.worker_threads = threads;
        config
    }

    pub fn with_maintenance(days: &[(&str, NaiveDate)]) -> Self {
        let mut config = Self::default();
        config.maintenance_days = days.iter().map(|(m, d)| (m.to_string(), *d)).collect();
        config
    }

    pub fn without_shift_rules() -> Self {
        let mut config = Self::default();
        config.shift_rules = Vec::new();
        config
    }
}

#[async_trait]
impl PlanningConfigReader for MockConfig {
    async fn get_changeover_hours(&self) -> ConfigResult<f64> {
        Ok(self.changeover_hours)
    }

    async fn get_allocation_tolerance(&self) -> ConfigResult<f64> {
        Ok(self.allocation_tolerance)
    }

    async fn get_seasonal_shift_rules(&self) -> ConfigResult<Vec<SeasonalShiftRule>> {
        Ok(self.shift_rules.clone())
    }

    async fn get_worker_threads(&self) -> ConfigResult<usize> {
        Ok(self.worker_threads)
    }

    async fn get_maintenance_days(&self) -> ConfigResult<Vec<(String, NaiveDate)>> {
        Ok(self.maintenance_days.clone())
    }
}
