// ==========================================
// 面粉厂排产系统 - 排产结果数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 生命周期: 重算 [start, end] 时整段替换（先删后插，单事务）
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::{FlourDemand, MillLoad, RecipeDemand, RecipeMixEntry, ScheduleEntry, Utilization};
use crate::engine::PlanResult;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use tracing::info;

/// 按日期范围整段替换的表
const RANGE_TABLES: &[&str] = &[
    "flour_demand",
    "recipe_mix",
    "recipe_demand",
    "schedule_entry",
    "mill_load",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// 整段替换统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceSummary {
    pub deleted: usize,
    pub inserted: usize,
}

// ==========================================
// PlanRepository - 排产结果仓储
// ==========================================
pub struct PlanRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PlanRepository {
    /// 创建新的 PlanRepository 实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 按数据库路径打开
    pub fn open(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self::new(Arc::new(Mutex::new(conn))))
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 整段替换 [start_date, end_date] 的全部派生数据
    ///
    /// 单事务: 任一步失败则回滚，旧数据保持不变
    pub fn replace_range(&self, result: &PlanResult) -> RepositoryResult<ReplaceSummary> {
        let start = result.start_date.format(DATE_FORMAT).to_string();
        let end = result.end_date.format(DATE_FORMAT).to_string();

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let mut summary = ReplaceSummary::default();

        // 1. 删除范围内旧数据
        for table in RANGE_TABLES {
            summary.deleted += tx.execute(
                &format!(
                    "DELETE FROM {} WHERE plan_date >= ?1 AND plan_date <= ?2",
                    table
                ),
                params![&start, &end],
            )?;
        }

        // 2. 插入新数据
        {
            let mut stmt = tx.prepare(
                "INSERT INTO flour_demand (plan_date, flour_type, required_tons) VALUES (?1, ?2, ?3)",
            )?;
            for row in &result.flour_demand {
                summary.inserted += stmt.execute(params![
                    row.date.format(DATE_FORMAT).to_string(),
                    &row.flour_type,
                    row.required_tons,
                ])?;
            }

            let mut stmt = tx.prepare(
                r#"INSERT INTO recipe_mix (plan_date, flour_type, recipe_id, allocation_pct)
                   VALUES (?1, ?2, ?3, ?4)"#,
            )?;
            for row in &result.recipe_mix {
                summary.inserted += stmt.execute(params![
                    row.date.format(DATE_FORMAT).to_string(),
                    &row.flour_type,
                    &row.recipe_id,
                    row.allocation_pct,
                ])?;
            }

            let mut stmt = tx.prepare(
                r#"INSERT INTO recipe_demand (plan_date, recipe_id, flour_type, recipe_required_tons)
                   VALUES (?1, ?2, ?3, ?4)"#,
            )?;
            for row in &result.recipe_demand {
                summary.inserted += stmt.execute(params![
                    row.date.format(DATE_FORMAT).to_string(),
                    &row.recipe_id,
                    &row.flour_type,
                    row.recipe_required_tons,
                ])?;
            }

            let mut stmt = tx.prepare(
                r#"INSERT INTO schedule_entry (
                    plan_date, mill_id, seq_no, recipe_id, start_hour, end_hour,
                    duration_hours, changeover_hours, tons_produced
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"#,
            )?;
            let mut seq_no: i64 = 0;
            let mut prev_unit: Option<(NaiveDate, &str)> = None;
            for row in &result.schedule {
                let unit = (row.date, row.mill_id.as_str());
                seq_no = if prev_unit == Some(unit) { seq_no + 1 } else { 1 };
                prev_unit = Some(unit);

                summary.inserted += stmt.execute(params![
                    row.date.format(DATE_FORMAT).to_string(),
                    &row.mill_id,
                    seq_no,
                    &row.recipe_id,
                    row.start_hour,
                    row.end_hour,
                    row.duration_hours,
                    row.changeover_hours,
                    row.tons_produced,
                ])?;
            }

            let mut stmt = tx.prepare(
                r#"INSERT INTO mill_load (
                    plan_date, mill_id, scheduled_hours, available_hours,
                    overload_hours, utilization_pct, required_hours
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
            )?;
            for row in &result.loads {
                summary.inserted += stmt.execute(params![
                    row.date.format(DATE_FORMAT).to_string(),
                    &row.mill_id,
                    row.scheduled_hours,
                    row.available_hours,
                    row.overload_hours,
                    row.utilization_pct.as_percent(), // NULL = UNDEFINED
                    row.required_hours,
                ])?;
            }
        }

        tx.commit()?;

        info!(
            run_id = %result.run_id,
            start = %start,
            end = %end,
            deleted = summary.deleted,
            inserted = summary.inserted,
            "排产结果整段替换完成"
        );

        Ok(summary)
    }

    /// 查询范围内排产条目（按 日期、机组、序号）
    pub fn find_schedule(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<ScheduleEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT plan_date, mill_id, recipe_id, start_hour, end_hour,
                      duration_hours, changeover_hours, tons_produced
               FROM schedule_entry
               WHERE plan_date >= ?1 AND plan_date <= ?2
               ORDER BY plan_date, mill_id, seq_no"#,
        )?;

        let rows = stmt
            .query_map(params![fmt(start), fmt(end)], |row| {
                Ok(ScheduleEntry {
                    date: parse_date_col(row, 0)?,
                    mill_id: row.get(1)?,
                    recipe_id: row.get(2)?,
                    start_hour: row.get(3)?,
                    end_hour: row.get(4)?,
                    duration_hours: row.get(5)?,
                    changeover_hours: row.get(6)?,
                    tons_produced: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// 查询范围内机组负荷（按 日期、机组）
    pub fn find_loads(&self, start: NaiveDate, end: NaiveDate) -> RepositoryResult<Vec<MillLoad>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT plan_date, mill_id, scheduled_hours, available_hours,
                      overload_hours, utilization_pct, required_hours
               FROM mill_load
               WHERE plan_date >= ?1 AND plan_date <= ?2
               ORDER BY plan_date, mill_id"#,
        )?;

        let rows = stmt
            .query_map(params![fmt(start), fmt(end)], |row| {
                let utilization: Option<f64> = row.get(5)?;
                Ok(MillLoad {
                    date: parse_date_col(row, 0)?,
                    mill_id: row.get(1)?,
                    scheduled_hours: row.get(2)?,
                    available_hours: row.get(3)?,
                    overload_hours: row.get(4)?,
                    utilization_pct: utilization
                        .map(Utilization::Percent)
                        .unwrap_or(Utilization::Undefined),
                    required_hours: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// 查询范围内配方需求明细
    pub fn find_recipe_demand(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<RecipeDemand>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT plan_date, recipe_id, flour_type, recipe_required_tons
               FROM recipe_demand
               WHERE plan_date >= ?1 AND plan_date <= ?2
               ORDER BY plan_date, recipe_id, flour_type"#,
        )?;

        let rows = stmt
            .query_map(params![fmt(start), fmt(end)], |row| {
                Ok(RecipeDemand {
                    date: parse_date_col(row, 0)?,
                    recipe_id: row.get(1)?,
                    flour_type: row.get(2)?,
                    recipe_required_tons: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// 查询范围内配比
    pub fn find_recipe_mix(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<RecipeMixEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT plan_date, flour_type, recipe_id, allocation_pct
               FROM recipe_mix
               WHERE plan_date >= ?1 AND plan_date <= ?2
               ORDER BY plan_date, flour_type, recipe_id"#,
        )?;

        let rows = stmt
            .query_map(params![fmt(start), fmt(end)], |row| {
                Ok(RecipeMixEntry {
                    date: parse_date_col(row, 0)?,
                    flour_type: row.get(1)?,
                    recipe_id: row.get(2)?,
                    allocation_pct: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// 查询范围内大类需求
    pub fn find_flour_demand(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<FlourDemand>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT plan_date, flour_type, required_tons
               FROM flour_demand
               WHERE plan_date >= ?1 AND plan_date <= ?2
               ORDER BY plan_date, flour_type"#,
        )?;

        let rows = stmt
            .query_map(params![fmt(start), fmt(end)], |row| {
                Ok(FlourDemand {
                    date: parse_date_col(row, 0)?,
                    flour_type: row.get(1)?,
                    required_tons: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}

fn fmt(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// 读取 TEXT 日期列
pub(crate) fn parse_date_col(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let text: String = row.get(idx)?;
    NaiveDate::parse_from_str(&text, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
