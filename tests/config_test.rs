// ==========================================
// 配置层集成测试
// ==========================================
// 覆盖: config_kv 缺省值 / 覆写 / 非法值 / 主数据校验
// ==========================================

mod test_helpers;

use flour_mill_aps::config::{
    config_keys, ConfigError, ConfigManager, MasterData, PlanningConfigReader, PlanningParameters,
};
use flour_mill_aps::domain::{CalendarEvent, SeasonalShiftRule};
use test_helpers::{create_test_db, d, elig, mill, rate, shared_connection};

#[tokio::test]
async fn test_defaults_when_config_kv_empty() {
    println!("\n=== 测试：config_kv 为空时使用缺省值 ===");

    let (_temp_file, db_path) = create_test_db().unwrap();
    let manager = ConfigManager::new(&db_path).unwrap();

    let params = PlanningParameters::load(&manager).await.unwrap();
    assert!((params.changeover_hours - 0.5).abs() < 1e-12);
    assert!((params.allocation_tolerance - 1e-6).abs() < 1e-12);
    assert_eq!(params.shift_rules, SeasonalShiftRule::default_rules());
    assert_eq!(params.worker_threads, 0);
    assert!(params.maintenance_days.is_empty());

    println!("✓ 缺省参数正确");
}

#[tokio::test]
async fn test_overrides_are_read_back() {
    println!("\n=== 测试：覆写后读取 ===");

    let (_temp_file, db_path) = create_test_db().unwrap();
    let manager = ConfigManager::from_connection(shared_connection(&db_path).unwrap()).unwrap();

    manager
        .set_config_value(config_keys::CHANGEOVER_HOURS, "0.75")
        .unwrap();
    manager
        .set_config_value(config_keys::WORKER_THREADS, "4")
        .unwrap();
    manager
        .set_config_value(
            config_keys::MAINTENANCE_DAYS,
            "M1:2026-03-02, M3:2026-03-05",
        )
        .unwrap();
    manager
        .set_config_value(
            config_keys::SEASONAL_SHIFT_RULES,
            r#"[{"event":"WEEKEND","flour_types":[],"recipe_id":"R3","bonus":0.2}]"#,
        )
        .unwrap();
    // 再次写入覆盖旧值
    manager
        .set_config_value(config_keys::CHANGEOVER_HOURS, "1.0")
        .unwrap();

    assert!((manager.get_changeover_hours().await.unwrap() - 1.0).abs() < 1e-12);
    assert_eq!(manager.get_worker_threads().await.unwrap(), 4);

    let days = manager.get_maintenance_days().await.unwrap();
    assert_eq!(
        days,
        vec![
            ("M1".to_string(), d(2026, 3, 2)),
            ("M3".to_string(), d(2026, 3, 5)),
        ]
    );

    let rules = manager.get_seasonal_shift_rules().await.unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].event, CalendarEvent::Weekend);
    assert!(rules[0].flour_types.is_empty());

    let snapshot = manager.get_config_snapshot().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&snapshot).unwrap();
    assert_eq!(parsed["changeover_hours"], "1.0");
    assert_eq!(parsed["worker_threads"], "4");

    println!("✓ 覆写值生效，快照包含全部键");
}

#[tokio::test]
async fn test_malformed_values_are_rejected() {
    println!("\n=== 测试：非法配置值报错 ===");

    let (_temp_file, db_path) = create_test_db().unwrap();
    let manager = ConfigManager::new(&db_path).unwrap();

    manager
        .set_config_value(config_keys::CHANGEOVER_HOURS, "half an hour")
        .unwrap();
    let err = manager.get_changeover_hours().await.unwrap_err();
    assert!(matches!(err, ConfigError::ConfigValueError { .. }));

    manager
        .set_config_value(config_keys::CHANGEOVER_HOURS, "-0.5")
        .unwrap();
    assert!(manager.get_changeover_hours().await.is_err());

    manager
        .set_config_value(config_keys::WORKER_THREADS, "-1")
        .unwrap();
    assert!(manager.get_worker_threads().await.is_err());

    manager
        .set_config_value(config_keys::MAINTENANCE_DAYS, "M1-2026-03-02")
        .unwrap();
    assert!(manager.get_maintenance_days().await.is_err());

    manager
        .set_config_value(config_keys::SEASONAL_SHIFT_RULES, "{not json")
        .unwrap();
    assert!(manager.get_seasonal_shift_rules().await.is_err());

    // 任一参数非法则整体加载失败
    assert!(PlanningParameters::load(&manager).await.is_err());

    println!("✓ 非法值均被拒绝");
}

#[test]
fn test_master_data_validation() {
    println!("\n=== 测试：主数据装载校验 ===");

    // 正常
    let ok = MasterData::new(
        vec![mill("M1", 8.0), mill("M2", 8.0)],
        vec![rate("M1", "R1", 10.5), rate("M2", "R1", 9.0)],
        vec![elig("Superior", "R1", 1.0)],
        Vec::new(),
    )
    .unwrap();
    let mill_ids: Vec<&str> = ok.mills().iter().map(|m| m.mill_id.as_str()).collect();
    assert_eq!(mill_ids, vec!["M1", "M2"]);
    assert_eq!(ok.tons_per_hour("M2", "R1"), Some(9.0));
    assert_eq!(ok.tons_per_hour("M2", "R5"), None);

    // 重复机组
    let err = MasterData::new(
        vec![mill("M1", 8.0), mill("M1", 8.0)],
        Vec::new(),
        vec![elig("Superior", "R1", 1.0)],
        Vec::new(),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateKey { .. }));

    // 非正产能
    let err = MasterData::new(
        vec![mill("M1", 8.0)],
        vec![rate("M1", "R1", 0.0)],
        vec![elig("Superior", "R1", 1.0)],
        Vec::new(),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::NonPositiveRate { .. }));

    // 产能表引用未知机组
    let err = MasterData::new(
        vec![mill("M1", 8.0)],
        vec![rate("M9", "R1", 10.0)],
        vec![elig("Superior", "R1", 1.0)],
        Vec::new(),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::UnknownMill { .. }));

    // 配比越界
    let err = MasterData::new(
        vec![mill("M1", 8.0)],
        Vec::new(),
        vec![elig("Superior", "R1", 1.2)],
        Vec::new(),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::AllocationOutOfRange { .. }));

    println!("✓ 主数据校验规则生效");
}
