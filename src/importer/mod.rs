// ==========================================
// 面粉厂排产系统 - 导入层
// ==========================================
// 职责: 外部数据文件 → 主数据 / 需求 / 产能 / 日历
// 支持: Excel, CSV
// ==========================================

pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod planning_importer;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use field_mapper::{parse_date_text, FieldMapper};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRecord, UniversalFileParser};
pub use planning_importer::{ImportedPlanningData, PlanningDataImporter};
