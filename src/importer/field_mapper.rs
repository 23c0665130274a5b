// ==========================================
// 面粉厂排产系统 - 字段映射器实现
// ==========================================
// 职责: 原始行 → 领域记录（列别名 + 类型转换）
// 约定: 表头已统一小写；行号从 2 开始（第 1 行为表头）
// ==========================================

use crate::domain::{
    CalendarFlags, FlourDemand, Mill, MillCapacity, MillRecipeRate, RecipeEligibility,
    SkuForecast, SkuMaster,
};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRecord;
use chrono::{Duration, NaiveDate};

// ===== 列别名 =====
const DATE: &[&str] = &["date", "plan_date"];
const MILL_ID: &[&str] = &["mill_id"];
const RECIPE_ID: &[&str] = &["recipe_id"];
const FLOUR_TYPE: &[&str] = &["flour_type"];
const SKU_ID: &[&str] = &["sku_id"];
const HOURS_PER_DAY: &[&str] = &["hours_per_day"];
const TONS_PER_HOUR: &[&str] = &["tons_per_hour", "tph"];
const ALLOCATION_PCT: &[&str] = &["default_allocation_pct", "allocation_pct"];
const REQUIRED_TONS: &[&str] = &["required_tons", "demand_tons"];
const FORECAST_TONS: &[&str] = &["forecast_tons", "demand_tons"];
const AVAILABLE_HOURS: &[&str] = &["available_hours"];

// Excel 序列日期起点（1900 日期系统）
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

pub struct FieldMapper {
    table: String,
}

impl FieldMapper {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    // ==========================================
    // 基础取值
    // ==========================================

    /// 提取字符串字段（空串视为 None），按别名顺序尝试
    pub fn get_string(&self, row: &RawRecord, aliases: &[&str]) -> Option<String> {
        for alias in aliases {
            if let Some(v) = row.get(*alias) {
                let trimmed = v.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
        None
    }

    /// 提取必填字符串
    ///
    /// 列不存在 → MissingColumn；列存在但为空 → TypeConversionError
    pub fn require_string(
        &self,
        row: &RawRecord,
        aliases: &[&str],
        row_number: usize,
    ) -> ImportResult<String> {
        if let Some(v) = self.get_string(row, aliases) {
            return Ok(v);
        }
        if !aliases.iter().any(|a| row.contains_key(*a)) {
            return Err(ImportError::MissingColumn {
                table: self.table.clone(),
                column: aliases.join("|"),
            });
        }
        Err(ImportError::TypeConversionError {
            table: self.table.clone(),
            row: row_number,
            field: aliases[0].to_string(),
            message: "必填字段为空".to_string(),
        })
    }

    /// 解析浮点数
    pub fn parse_f64(
        &self,
        row: &RawRecord,
        aliases: &[&str],
        row_number: usize,
    ) -> ImportResult<Option<f64>> {
        match self.get_string(row, aliases) {
            None => Ok(None),
            Some(value) => value
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Some)
                .ok_or_else(|| ImportError::TypeConversionError {
                    table: self.table.clone(),
                    row: row_number,
                    field: aliases[0].to_string(),
                    message: format!("无法解析为浮点数: {}", value),
                }),
        }
    }

    pub fn require_f64(
        &self,
        row: &RawRecord,
        aliases: &[&str],
        row_number: usize,
    ) -> ImportResult<f64> {
        let raw = self.require_string(row, aliases, row_number)?;
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ImportError::TypeConversionError {
                table: self.table.clone(),
                row: row_number,
                field: aliases[0].to_string(),
                message: format!("无法解析为浮点数: {}", raw),
            })
    }

    /// 解析日期
    ///
    /// 支持: YYYY-MM-DD / YYYYMMDD / 时间戳前缀 (YYYY-MM-DD HH:MM:SS, YYYY-MM-DDTHH:MM:SS)
    ///       / Excel 序列日期
    pub fn require_date(
        &self,
        row: &RawRecord,
        aliases: &[&str],
        row_number: usize,
    ) -> ImportResult<NaiveDate> {
        let value = self.require_string(row, aliases, row_number)?;
        parse_date_text(&value).ok_or_else(|| ImportError::DateFormatError {
            table: self.table.clone(),
            row: row_number,
            field: aliases[0].to_string(),
            value: value.clone(),
        })
    }

    /// 解析布尔（1/0/true/false/yes/no，不区分大小写）
    pub fn parse_bool(
        &self,
        row: &RawRecord,
        aliases: &[&str],
        row_number: usize,
    ) -> ImportResult<Option<bool>> {
        match self.get_string(row, aliases) {
            None => Ok(None),
            Some(value) => match value.to_lowercase().as_str() {
                "1" | "1.0" | "true" | "yes" | "y" => Ok(Some(true)),
                "0" | "0.0" | "false" | "no" | "n" => Ok(Some(false)),
                _ => Err(ImportError::TypeConversionError {
                    table: self.table.clone(),
                    row: row_number,
                    field: aliases[0].to_string(),
                    message: format!("无法解析为布尔值: {}", value),
                }),
            },
        }
    }

    // ==========================================
    // 表映射
    // ==========================================

    pub fn map_mill(&self, row: &RawRecord, row_number: usize) -> ImportResult<Mill> {
        let mill_id = self.require_string(row, MILL_ID, row_number)?;
        Ok(Mill {
            name: self
                .get_string(row, &["mill_name", "name"])
                .unwrap_or_else(|| mill_id.clone()),
            hours_per_day: self.require_f64(row, HOURS_PER_DAY, row_number)?,
            daily_capacity_tons: self.parse_f64(row, &["daily_capacity_tons"], row_number)?,
            mill_id,
        })
    }

    pub fn map_rate(&self, row: &RawRecord, row_number: usize) -> ImportResult<MillRecipeRate> {
        Ok(MillRecipeRate {
            mill_id: self.require_string(row, MILL_ID, row_number)?,
            recipe_id: self.require_string(row, RECIPE_ID, row_number)?,
            tons_per_hour: self.require_f64(row, TONS_PER_HOUR, row_number)?,
        })
    }

    /// 配方主表行: (recipe_id, tons_per_hour)，适用于所有机组
    pub fn map_recipe_rate(
        &self,
        row: &RawRecord,
        row_number: usize,
    ) -> ImportResult<(String, f64)> {
        Ok((
            self.require_string(row, RECIPE_ID, row_number)?,
            self.require_f64(row, TONS_PER_HOUR, row_number)?,
        ))
    }

    pub fn map_eligibility(
        &self,
        row: &RawRecord,
        row_number: usize,
    ) -> ImportResult<RecipeEligibility> {
        Ok(RecipeEligibility {
            flour_type: self.require_string(row, FLOUR_TYPE, row_number)?,
            recipe_id: self.require_string(row, RECIPE_ID, row_number)?,
            default_allocation_pct: self.require_f64(row, ALLOCATION_PCT, row_number)?,
        })
    }

    pub fn map_flour_demand(&self, row: &RawRecord, row_number: usize) -> ImportResult<FlourDemand> {
        Ok(FlourDemand {
            date: self.require_date(row, DATE, row_number)?,
            flour_type: self.require_string(row, FLOUR_TYPE, row_number)?,
            required_tons: self.require_f64(row, REQUIRED_TONS, row_number)?,
        })
    }

    pub fn map_sku(&self, row: &RawRecord, row_number: usize) -> ImportResult<SkuMaster> {
        Ok(SkuMaster {
            sku_id: self.require_string(row, SKU_ID, row_number)?,
            sku_name: self.get_string(row, &["sku_name"]),
            flour_type: self.require_string(row, FLOUR_TYPE, row_number)?,
        })
    }

    pub fn map_forecast(&self, row: &RawRecord, row_number: usize) -> ImportResult<SkuForecast> {
        Ok(SkuForecast {
            date: self.require_date(row, DATE, row_number)?,
            sku_id: self.require_string(row, SKU_ID, row_number)?,
            demand_tons: self.require_f64(row, FORECAST_TONS, row_number)?,
        })
    }

    pub fn map_capacity(&self, row: &RawRecord, row_number: usize) -> ImportResult<MillCapacity> {
        Ok(MillCapacity {
            date: self.require_date(row, DATE, row_number)?,
            mill_id: self.require_string(row, MILL_ID, row_number)?,
            available_hours: self.require_f64(row, AVAILABLE_HOURS, row_number)?,
            is_maintenance: self
                .parse_bool(row, &["is_maintenance"], row_number)?
                .unwrap_or(false),
        })
    }

    /// 时间维度行: 缺失的标志列按 false 处理
    pub fn map_calendar(
        &self,
        row: &RawRecord,
        row_number: usize,
    ) -> ImportResult<(NaiveDate, CalendarFlags)> {
        let date = self.require_date(row, DATE, row_number)?;
        let flags = CalendarFlags {
            is_weekend: self
                .parse_bool(row, &["is_weekend"], row_number)?
                .unwrap_or(false),
            is_ramadan: self
                .parse_bool(row, &["is_ramadan"], row_number)?
                .unwrap_or(false),
            is_hajj: self.parse_bool(row, &["is_hajj"], row_number)?.unwrap_or(false),
        };
        Ok((date, flags))
    }
}

/// 日期文本解析（导入与命令行共用）
pub fn parse_date_text(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y%m%d") {
        return Some(d);
    }
    // 时间戳前缀
    if let Some(prefix) = value.get(..10) {
        if let Ok(d) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            return Some(d);
        }
    }
    // Excel 序列日期（如 46027 或 46027.0）
    if let Ok(serial) = value.parse::<f64>() {
        if (1.0..2_958_466.0).contains(&serial) {
            let (y, m, d) = EXCEL_EPOCH;
            return NaiveDate::from_ymd_opt(y, m, d)
                .and_then(|epoch| epoch.checked_add_signed(Duration::days(serial.floor() as i64)));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn row(pairs: &[(&str, &str)]) -> RawRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_date_formats() {
        assert_eq!(parse_date_text("2026-01-05"), Some(d(2026, 1, 5)));
        assert_eq!(parse_date_text("20260105"), Some(d(2026, 1, 5)));
        assert_eq!(parse_date_text("2026-01-05 00:00:00"), Some(d(2026, 1, 5)));
        assert_eq!(parse_date_text("2026-01-05T08:30:00"), Some(d(2026, 1, 5)));
        // 46027 = 2026-01-05
        assert_eq!(parse_date_text("46027"), Some(d(2026, 1, 5)));
        assert_eq!(parse_date_text("not-a-date"), None);
    }

    #[test]
    fn test_allocation_pct_alias() {
        let mapper = FieldMapper::new("recipe_allocation");
        let r = row(&[
            ("flour_type", "Superior"),
            ("recipe_id", "R1"),
            ("allocation_pct", "0.6"),
        ]);
        let elig = mapper.map_eligibility(&r, 2).unwrap();
        assert_eq!(elig.default_allocation_pct, 0.6);
    }

    #[test]
    fn test_missing_column_vs_empty_cell() {
        let mapper = FieldMapper::new("mill_master");

        let missing = mapper.map_mill(&row(&[("mill_id", "M1")]), 2);
        assert!(matches!(missing, Err(ImportError::MissingColumn { .. })));

        let empty = mapper.map_mill(&row(&[("mill_id", "M1"), ("hours_per_day", "")]), 3);
        assert!(matches!(
            empty,
            Err(ImportError::TypeConversionError { row: 3, .. })
        ));
    }

    #[test]
    fn test_calendar_flags_booleans() {
        let mapper = FieldMapper::new("time_dimension");
        let r = row(&[
            ("date", "2026-02-20"),
            ("is_weekend", "True"),
            ("is_ramadan", "1"),
            ("is_hajj", "no"),
        ]);
        let (date, flags) = mapper.map_calendar(&r, 2).unwrap();
        assert_eq!(date, d(2026, 2, 20));
        assert!(flags.is_weekend);
        assert!(flags.is_ramadan);
        assert!(!flags.is_hajj);
    }

    #[test]
    fn test_invalid_number() {
        let mapper = FieldMapper::new("mill_recipe_rate");
        let r = row(&[("mill_id", "M1"), ("recipe_id", "R1"), ("tons_per_hour", "fast")]);
        assert!(mapper.map_rate(&r, 2).is_err());
    }
}
