// ==========================================
// 排产结果仓储集成测试
// ==========================================
// 覆盖: 整段替换只影响范围内 / 重复替换幂等 / 批次记录
// ==========================================

mod test_helpers;

use flour_mill_aps::config::PlanningParameters;
use flour_mill_aps::domain::{FlourDemand, Utilization};
use flour_mill_aps::engine::{plan_with_parameters, PlanResult, PlanningInputs, SaudiCalendar};
use flour_mill_aps::logging;
use flour_mill_aps::repository::{PlanRepository, PlanRunRepository};
use std::sync::Arc;
use test_helpers::{create_test_db, d, shared_connection, standard_master};

fn inputs_with_scale(scale: f64) -> PlanningInputs {
    let mut flour_demand = Vec::new();
    for day in 1..=10 {
        let date = d(2026, 3, day);
        for (flour_type, tons) in [("Superior", 80.0), ("Bakery", 50.0), ("Brown", 20.0)] {
            flour_demand.push(FlourDemand {
                date,
                flour_type: flour_type.to_string(),
                required_tons: tons * scale,
            });
        }
    }
    PlanningInputs {
        master: standard_master(),
        flour_demand,
        calendar: Arc::new(SaudiCalendar::new()),
        capacity: None,
        input_warnings: Vec::new(),
    }
}

fn plan(inputs: &PlanningInputs, start_day: u32, end_day: u32) -> PlanResult {
    plan_with_parameters(
        inputs,
        d(2026, 3, start_day),
        d(2026, 3, end_day),
        &PlanningParameters::default(),
    )
    .unwrap()
}

#[test]
fn test_replace_range_round_trip() {
    println!("\n=== 测试：整段写入后读回 ===");
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    let repo = PlanRepository::new(shared_connection(&db_path).unwrap());

    let result = plan(&inputs_with_scale(1.0), 2, 6);
    let summary = repo.replace_range(&result).unwrap();
    assert_eq!(summary.deleted, 0);
    assert!(summary.inserted > 0);

    let schedule = repo.find_schedule(d(2026, 3, 2), d(2026, 3, 6)).unwrap();
    assert_eq!(schedule, result.schedule);

    let loads = repo.find_loads(d(2026, 3, 2), d(2026, 3, 6)).unwrap();
    assert_eq!(loads, result.loads);

    let flour = repo.find_flour_demand(d(2026, 3, 2), d(2026, 3, 6)).unwrap();
    assert_eq!(flour.len(), result.flour_demand.len());

    let mix = repo.find_recipe_mix(d(2026, 3, 2), d(2026, 3, 6)).unwrap();
    assert_eq!(mix.len(), result.recipe_mix.len());

    let recipe_demand = repo.find_recipe_demand(d(2026, 3, 2), d(2026, 3, 6)).unwrap();
    assert_eq!(recipe_demand.len(), result.recipe_demand.len());

    println!("✓ {} 条排产、{} 条负荷读回一致", schedule.len(), loads.len());
}

#[test]
fn test_replace_range_only_touches_requested_dates() {
    println!("\n=== 测试：整段替换只影响范围内日期 ===");
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    let repo = PlanRepository::new(shared_connection(&db_path).unwrap());

    let full = plan(&inputs_with_scale(1.0), 1, 10);
    repo.replace_range(&full).unwrap();

    // 3/3 ~ 3/4 以双倍需求重算
    let partial = plan(&inputs_with_scale(2.0), 3, 4);
    let summary = repo.replace_range(&partial).unwrap();
    assert!(summary.deleted > 0);

    let before = repo.find_schedule(d(2026, 3, 1), d(2026, 3, 2)).unwrap();
    let expected_before: Vec<_> = full
        .schedule
        .iter()
        .filter(|e| e.date <= d(2026, 3, 2))
        .cloned()
        .collect();
    assert_eq!(before, expected_before);

    let after = repo.find_schedule(d(2026, 3, 5), d(2026, 3, 10)).unwrap();
    let expected_after: Vec<_> = full
        .schedule
        .iter()
        .filter(|e| e.date >= d(2026, 3, 5))
        .cloned()
        .collect();
    assert_eq!(after, expected_after);

    let inside = repo.find_schedule(d(2026, 3, 3), d(2026, 3, 4)).unwrap();
    assert_eq!(inside, partial.schedule);

    let flour = repo.find_flour_demand(d(2026, 3, 3), d(2026, 3, 3)).unwrap();
    let superior = flour.iter().find(|f| f.flour_type == "Superior").unwrap();
    assert!((superior.required_tons - 160.0).abs() < 1e-9);

    println!("✓ 范围外数据未变，范围内为新结果");
}

#[test]
fn test_replace_range_is_idempotent() {
    println!("\n=== 测试：重复替换幂等 ===");
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    let repo = PlanRepository::new(shared_connection(&db_path).unwrap());

    let result = plan(&inputs_with_scale(1.0), 1, 7);
    let first = repo.replace_range(&result).unwrap();
    let second = repo.replace_range(&result).unwrap();

    assert_eq!(second.deleted, first.inserted);
    assert_eq!(second.inserted, first.inserted);

    let schedule = repo.find_schedule(d(2026, 3, 1), d(2026, 3, 7)).unwrap();
    assert_eq!(schedule, result.schedule);

    // 周末负荷以 NULL 存储，读回为 UNDEFINED
    let loads = repo.find_loads(d(2026, 3, 7), d(2026, 3, 7)).unwrap();
    assert_eq!(loads.len(), 3);
    assert!(loads
        .iter()
        .all(|l| l.utilization_pct == Utilization::Undefined));

    println!("✓ 第二次替换删除 {} 行，插入 {} 行", second.deleted, second.inserted);
}

#[test]
fn test_plan_run_records_latest_batch() {
    println!("\n=== 测试：批次记录 ===");
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    let run_repo = PlanRunRepository::new(shared_connection(&db_path).unwrap());

    assert!(run_repo.find_latest().unwrap().is_none());

    let first = plan(&inputs_with_scale(1.0), 1, 3);
    let second = plan(&inputs_with_scale(1.5), 2, 4);
    run_repo.insert(&first, None).unwrap();
    run_repo
        .insert(&second, Some(r#"{"changeover_hours":"0.5"}"#))
        .unwrap();

    let latest = run_repo.find_latest().unwrap().unwrap();
    assert_eq!(latest.run_id, second.run_id);
    assert_eq!(latest.start_date, d(2026, 3, 2));
    assert_eq!(latest.end_date, d(2026, 3, 4));
    assert_eq!(latest.schedule_entry_count, second.schedule.len() as i64);
    assert_eq!(latest.warnings, second.warnings);
    assert_eq!(
        latest.config_snapshot_json.as_deref(),
        Some(r#"{"changeover_hours":"0.5"}"#)
    );

    let by_id = run_repo.find_by_id(&first.run_id).unwrap().unwrap();
    assert_eq!(by_id.warning_count, first.warnings.len() as i64);
    assert!(by_id.config_snapshot_json.is_none());

    assert!(run_repo.find_by_id("no-such-run").unwrap().is_none());

    println!("✓ 最近批次为 {}", latest.run_id);
}
