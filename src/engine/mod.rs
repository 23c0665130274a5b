// ==========================================
// 面粉厂排产系统 - 引擎层
// ==========================================
// 职责: 日历 → 配比 → 配方需求 → 机组排产 → 负荷 → 汇总
// 红线: Engine 不拼 SQL, 不读文件; 被跳过的需求必须输出告警
// ==========================================

pub mod calendar;
pub mod demand_aggregator;
pub mod error;
pub mod load_aggregator;
pub mod mill_capacity;
pub mod mill_scheduler;
pub mod orchestrator;
pub mod plan_summary;
pub mod recipe_demand;
pub mod recipe_mix;

// 重导出核心引擎
pub use calendar::{CalendarProvider, SaudiCalendar, TableCalendar};
pub use demand_aggregator::{DemandAggregator, DemandForecaster, StaticForecast};
pub use error::{PlanningError, PlanningResult};
pub use load_aggregator::LoadAggregator;
pub use mill_capacity::{MillCapacityProvider, StandardCapacityProvider, TableCapacityProvider};
pub use mill_scheduler::{MillScheduler, RecipeShortfall, UnitScheduleResult};
pub use orchestrator::{
    plan_with_parameters, PlanResult, PlanRunSummary, PlanningInputs, PlanningOrchestrator,
};
pub use plan_summary::PlanSummarizer;
pub use recipe_demand::{merge_flour_demand, RecipeDemandCalculator, RecipeDemandOutput};
pub use recipe_mix::{normalize_shares, RecipeMixAllocator};
