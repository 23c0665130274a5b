// ==========================================
// 面粉厂排产系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 幂等建表（CREATE TABLE IF NOT EXISTS）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化全部表结构（幂等）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS flour_demand (
            plan_date TEXT NOT NULL,
            flour_type TEXT NOT NULL,
            required_tons REAL NOT NULL,
            PRIMARY KEY (plan_date, flour_type)
        );

        CREATE TABLE IF NOT EXISTS recipe_mix (
            plan_date TEXT NOT NULL,
            flour_type TEXT NOT NULL,
            recipe_id TEXT NOT NULL,
            allocation_pct REAL NOT NULL,
            PRIMARY KEY (plan_date, flour_type, recipe_id)
        );

        CREATE TABLE IF NOT EXISTS recipe_demand (
            plan_date TEXT NOT NULL,
            recipe_id TEXT NOT NULL,
            flour_type TEXT NOT NULL,
            recipe_required_tons REAL NOT NULL,
            PRIMARY KEY (plan_date, recipe_id, flour_type)
        );

        CREATE TABLE IF NOT EXISTS schedule_entry (
            plan_date TEXT NOT NULL,
            mill_id TEXT NOT NULL,
            seq_no INTEGER NOT NULL,
            recipe_id TEXT NOT NULL,
            start_hour REAL NOT NULL,
            end_hour REAL NOT NULL,
            duration_hours REAL NOT NULL,
            changeover_hours REAL NOT NULL,
            tons_produced REAL NOT NULL,
            PRIMARY KEY (plan_date, mill_id, seq_no)
        );

        CREATE TABLE IF NOT EXISTS mill_load (
            plan_date TEXT NOT NULL,
            mill_id TEXT NOT NULL,
            scheduled_hours REAL NOT NULL,
            available_hours REAL NOT NULL,
            overload_hours REAL NOT NULL,
            utilization_pct REAL,
            required_hours REAL NOT NULL,
            PRIMARY KEY (plan_date, mill_id)
        );

        CREATE TABLE IF NOT EXISTS plan_run (
            run_id TEXT PRIMARY KEY,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            created_at TEXT NOT NULL,
            schedule_entry_count INTEGER NOT NULL,
            warning_count INTEGER NOT NULL,
            total_tons_produced REAL NOT NULL,
            config_snapshot_json TEXT,
            warnings_json TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_schedule_entry_mill ON schedule_entry(mill_id, plan_date);
        CREATE INDEX IF NOT EXISTS idx_plan_run_created ON plan_run(created_at);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
