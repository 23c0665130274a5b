// ==========================================
// 面粉厂排产系统 - 配置层
// ==========================================
// 职责: 静态主数据校验 + 可调参数读取
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod error;
pub mod master_data;
pub mod planning_config_trait;

// 重导出核心配置类型
pub use config_manager::{config_keys, ConfigManager};
pub use error::{ConfigError, ConfigResult};
pub use master_data::MasterData;
pub use planning_config_trait::{PlanningConfigReader, PlanningParameters};
