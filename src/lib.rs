// ==========================================
// 面粉厂排产系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + rayon
// 系统定位: 离线批处理（配方分配 + 机组小时级排产）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 配置层 - 主数据校验与 config_kv 参数
pub mod config;

// 引擎层 - 排产规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 导出层 - CSV 结果
pub mod exporter;

// 数据仓储层 - 数据访问
pub mod repository;

// 应用层 - 批次组装
pub mod app;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    CalendarEvent, CalendarFlags, FlourDemand, Mill, MillCapacity, MillLoad, MillRecipeRate,
    PeriodGranularity, PlanWarning, RecipeDemand, RecipeDemandTotal, RecipeEligibility,
    RecipeMixEntry, ScheduleEntry, SeasonalShiftRule, Utilization, WarningKind,
};

// 配置
pub use config::{ConfigManager, MasterData, PlanningConfigReader, PlanningParameters};

// 引擎
pub use engine::{
    LoadAggregator, MillScheduler, PlanResult, PlanningError, PlanningInputs,
    PlanningOrchestrator, RecipeDemandCalculator, RecipeMixAllocator,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "面粉厂排产系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
