// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、主数据与输入文件生成
// ==========================================

#![allow(dead_code)]

use chrono::NaiveDate;
use flour_mill_aps::config::MasterData;
use flour_mill_aps::db::{init_schema, open_sqlite_connection};
use flour_mill_aps::domain::{Mill, MillRecipeRate, RecipeDemandTotal, RecipeEligibility};
use rusqlite::Connection;
use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开测试数据库连接
pub fn open_test_connection(db_path: &str) -> Result<Connection, Box<dyn Error>> {
    Ok(open_sqlite_connection(db_path)?)
}

/// 共享连接（仓储 / ConfigManager 使用）
pub fn shared_connection(db_path: &str) -> Result<Arc<Mutex<Connection>>, Box<dyn Error>> {
    Ok(Arc::new(Mutex::new(open_test_connection(db_path)?)))
}

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

// ==========================================
// 主数据
// ==========================================

pub fn mill(mill_id: &str, hours_per_day: f64) -> Mill {
    Mill {
        mill_id: mill_id.to_string(),
        name: format!("{} Mill", mill_id),
        hours_per_day,
        daily_capacity_tons: None,
    }
}

pub fn rate(mill_id: &str, recipe_id: &str, tons_per_hour: f64) -> MillRecipeRate {
    MillRecipeRate {
        mill_id: mill_id.to_string(),
        recipe_id: recipe_id.to_string(),
        tons_per_hour,
    }
}

pub fn elig(flour_type: &str, recipe_id: &str, pct: f64) -> RecipeEligibility {
    RecipeEligibility {
        flour_type: flour_type.to_string(),
        recipe_id: recipe_id.to_string(),
        default_allocation_pct: pct,
    }
}

/// 标准配方准入表（五个面粉大类）
pub fn standard_eligibility() -> Vec<RecipeEligibility> {
    vec![
        elig("Superior", "R1", 0.6),
        elig("Superior", "R2", 0.4),
        elig("Bakery", "R2", 0.5),
        elig("Bakery", "R4", 0.5),
        elig("Patent", "R2", 0.7),
        elig("Patent", "R5", 0.3),
        elig("Brown", "R3", 1.0),
        elig("Superior Brown", "R3", 1.0),
    ]
}

/// 标准配方速率（吨/小时）
pub const RECIPE_TPH: &[(&str, f64)] = &[
    ("R1", 10.5),
    ("R2", 12.0),
    ("R3", 8.5),
    ("R4", 11.0),
    ("R5", 9.5),
];

/// 三个机组，M3 不能生产 R5
pub fn standard_master() -> MasterData {
    let mills = vec![mill("M1", 8.0), mill("M2", 8.0), mill("M3", 8.0)];
    let mut rates = Vec::new();
    for m in ["M1", "M2", "M3"] {
        for (recipe_id, tph) in RECIPE_TPH {
            if m == "M3" && *recipe_id == "R5" {
                continue;
            }
            rates.push(rate(m, recipe_id, *tph));
        }
    }
    MasterData::new(mills, rates, standard_eligibility(), Vec::new()).unwrap()
}

/// 单机组主数据（给定配方速率）
pub fn single_mill_master(rates: &[(&str, f64)]) -> MasterData {
    MasterData::new(
        vec![mill("M1", 20.0)],
        rates.iter().map(|(r, tph)| rate("M1", r, *tph)).collect(),
        vec![elig("Superior", "R1", 1.0)],
        Vec::new(),
    )
    .unwrap()
}

pub fn demand_total(date: NaiveDate, recipe_id: &str, tons: f64) -> RecipeDemandTotal {
    RecipeDemandTotal {
        date,
        recipe_id: recipe_id.to_string(),
        required_tons: tons,
    }
}

// ==========================================
// 输入文件
// ==========================================

pub fn write_file(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

/// 写出标准输入目录
///
/// 日期范围 2026-02-16 ~ 2026-02-22:
/// - 2026-02-18 起为斋月
/// - 2026-02-21/22 为周末（无产能）
pub fn write_standard_dataset(dir: &Path) {
    write_file(
        dir,
        "mill_master.csv",
        "mill_id,mill_name,region,hours_per_day,daily_capacity_tons\n\
         M1,Dammam Mill,Eastern Region,8,1350\n\
         M2,Medina Mill,Medina,8,1200\n\
         M3,Al-Kharj Mill,Central Region,8,600\n",
    );

    let mut rates = String::from("mill_id,recipe_id,tons_per_hour\n");
    for m in ["M1", "M2", "M3"] {
        for (recipe_id, tph) in RECIPE_TPH {
            if m == "M3" && *recipe_id == "R5" {
                continue;
            }
            rates.push_str(&format!("{},{},{}\n", m, recipe_id, tph));
        }
    }
    write_file(dir, "mill_recipe_rate.csv", &rates);

    write_file(
        dir,
        "recipe_allocation.csv",
        "flour_type,recipe_id,allocation_pct,notes\n\
         Superior,R1,0.60,Primary recipe for Superior\n\
         Superior,R2,0.40,Alternative recipe\n\
         Bakery,R2,0.50,Primary recipe\n\
         Bakery,R4,0.50,Alternative recipe\n\
         Patent,R2,0.70,Primary recipe\n\
         Patent,R5,0.30,Premium alternative\n\
         Brown,R3,1.00,Only recipe\n\
         Superior Brown,R3,1.00,Only recipe\n",
    );

    let mut demand = String::from("date,flour_type,required_tons\n");
    for day in 16..=22 {
        let scale = 1.0 + (day - 16) as f64 * 0.1;
        demand.push_str(&format!("2026-02-{},Superior,{:.1}\n", day, 60.0 * scale));
        demand.push_str(&format!("2026-02-{},Bakery,{:.1}\n", day, 40.0 * scale));
        demand.push_str(&format!("2026-02-{},Patent,{:.1}\n", day, 25.0 * scale));
        demand.push_str(&format!("2026-02-{},Brown,{:.1}\n", day, 15.0 * scale));
    }
    write_file(dir, "flour_demand.csv", &demand);
}
