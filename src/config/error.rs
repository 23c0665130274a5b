// ==========================================
// 面粉厂排产系统 - 配置层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 静态配置结构性错误在装载时拒绝，不在排产中途发现
// ==========================================

use thiserror::Error;

/// 配置层错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    // ===== 静态主数据错误 =====
    #[error("主数据表为空: {0}")]
    EmptyTable(String),

    #[error("主键重复 (表 {table}): {key}")]
    DuplicateKey { table: String, key: String },

    #[error("产能必须为正数 (mill_id={mill_id}, recipe_id={recipe_id}): {tons_per_hour}")]
    NonPositiveRate {
        mill_id: String,
        recipe_id: String,
        tons_per_hour: f64,
    },

    #[error("默认配比超出范围 [0, 1] (flour_type={flour_type}, recipe_id={recipe_id}): {pct}")]
    AllocationOutOfRange {
        flour_type: String,
        recipe_id: String,
        pct: f64,
    },

    #[error("引用了未知机组 (表 {table}): {mill_id}")]
    UnknownMill { table: String, mill_id: String },

    #[error("机组小时数非法 (mill_id={mill_id}): {hours}")]
    InvalidMillHours { mill_id: String, hours: f64 },

    // ===== config_kv 错误 =====
    #[error("配置读取失败 (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for ConfigError {
    fn from(err: rusqlite::Error) -> Self {
        ConfigError::ConfigReadError {
            key: "*".to_string(),
            message: err.to_string(),
        }
    }
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
