// ==========================================
// 面粉厂排产系统 - 排产批次记录仓储
// ==========================================
// 职责: plan_run 表（每次批次一行: 范围、计数、告警、配置快照）
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::PlanWarning;
use crate::engine::PlanResult;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::plan_repo::parse_date_col;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// plan_run 行
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRunRecord {
    pub run_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: NaiveDateTime,
    pub schedule_entry_count: i64,
    pub warning_count: i64,
    pub total_tons_produced: f64,
    pub config_snapshot_json: Option<String>,
    pub warnings: Vec<PlanWarning>,
}

// ==========================================
// PlanRunRepository
// ==========================================
pub struct PlanRunRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PlanRunRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 记录一次批次
    ///
    /// # 参数
    /// - result: 批次结果
    /// - config_snapshot_json: 批次开始时的配置快照
    pub fn insert(
        &self,
        result: &PlanResult,
        config_snapshot_json: Option<&str>,
    ) -> RepositoryResult<()> {
        let summary = result.summary();
        let warnings_json = serde_json::to_string(&result.warnings)?;
        let created_at = chrono::Local::now().naive_local();

        let conn = self.get_conn()?;
        conn.execute(
            r#"INSERT INTO plan_run (
                run_id, start_date, end_date, created_at,
                schedule_entry_count, warning_count, total_tons_produced,
                config_snapshot_json, warnings_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"#,
            params![
                &result.run_id,
                result.start_date.format("%Y-%m-%d").to_string(),
                result.end_date.format("%Y-%m-%d").to_string(),
                created_at.format(DATETIME_FORMAT).to_string(),
                summary.schedule_entry_count as i64,
                summary.warning_count as i64,
                summary.total_tons_produced,
                config_snapshot_json,
                warnings_json,
            ],
        )?;

        Ok(())
    }

    /// 按 run_id 查询
    pub fn find_by_id(&self, run_id: &str) -> RepositoryResult<Option<PlanRunRecord>> {
        let conn = self.get_conn()?;
        let raw = conn
            .query_row(
                &format!("{} WHERE run_id = ?1", SELECT_RUN),
                params![run_id],
                map_run_row,
            )
            .optional()?;

        raw.map(decode_warnings).transpose()
    }

    /// 最近一次批次（created_at 降序，同秒按 rowid）
    pub fn find_latest(&self) -> RepositoryResult<Option<PlanRunRecord>> {
        let conn = self.get_conn()?;
        let raw = conn
            .query_row(
                &format!("{} ORDER BY created_at DESC, rowid DESC LIMIT 1", SELECT_RUN),
                [],
                map_run_row,
            )
            .optional()?;

        raw.map(decode_warnings).transpose()
    }
}

const SELECT_RUN: &str = r#"SELECT run_id, start_date, end_date, created_at,
       schedule_entry_count, warning_count, total_tons_produced,
       config_snapshot_json, warnings_json
FROM plan_run"#;

fn map_run_row(row: &rusqlite::Row) -> rusqlite::Result<(PlanRunRecord, String)> {
    let created_at: String = row.get(3)?;
    let record = PlanRunRecord {
        run_id: row.get(0)?,
        start_date: parse_date_col(row, 1)?,
        end_date: parse_date_col(row, 2)?,
        created_at: NaiveDateTime::parse_from_str(&created_at, DATETIME_FORMAT).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?,
        schedule_entry_count: row.get(4)?,
        warning_count: row.get(5)?,
        total_tons_produced: row.get(6)?,
        config_snapshot_json: row.get(7)?,
        warnings: Vec::new(),
    };
    Ok((record, row.get(8)?))
}

fn decode_warnings((mut record, json): (PlanRunRecord, String)) -> RepositoryResult<PlanRunRecord> {
    record.warnings = serde_json::from_str(&json).map_err(|e| RepositoryError::FieldValueError {
        field: "warnings_json".to_string(),
        message: e.to_string(),
    })?;
    Ok(record)
}
