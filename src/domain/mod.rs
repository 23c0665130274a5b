// ==========================================
// 面粉厂排产系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod demand;
pub mod mill;
pub mod recipe;
pub mod schedule;
pub mod types;
pub mod warning;

// 重导出核心类型
pub use demand::{FlourDemand, RecipeDemand, RecipeDemandTotal, SkuForecast, SkuMaster};
pub use mill::{Mill, MillCapacity, MillRecipeRate};
pub use recipe::{RecipeEligibility, RecipeMixEntry, SeasonalShiftRule};
pub use schedule::{MillLoad, MillRecipePlan, ScheduleEntry};
pub use types::{CalendarEvent, CalendarFlags, PeriodGranularity, Utilization};
pub use warning::{PlanWarning, WarningKind};
