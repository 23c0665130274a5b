// ==========================================
// 面粉厂排产系统 - 机组小时级排产引擎
// ==========================================
// 职责: 单日单机组，把配方日需求贪心装入可用小时
// 输入: 当日配方需求合计（只读共享）+ 机组可用小时 + 产能矩阵
// 输出: 按 start_hour 有序、互不重叠的排产条目 + 跳过原因
// ==========================================
// 红线:
// - 需求按吨位降序稳定排序，同吨位保持汇总顺序
// - 配方切换插入换产时间；换产后必须有生产小时
// - 单元内严格顺序执行，不可并行
// ==========================================

use crate::config::MasterData;
use crate::domain::{PlanWarning, RecipeDemandTotal, ScheduleEntry, WarningKind};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// 判定吨位已完全覆盖的容差
const TONS_EPSILON: f64 = 1e-9;

// ==========================================
// 结果类型
// ==========================================

/// 未完全覆盖的配方需求
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeShortfall {
    pub date: NaiveDate,
    pub mill_id: String,
    pub recipe_id: String,
    pub required_tons: f64,
    pub scheduled_tons: f64,
    pub reason: String,
}

/// 单日单机组排产结果
#[derive(Debug, Clone, Default)]
pub struct UnitScheduleResult {
    pub entries: Vec<ScheduleEntry>,
    pub shortfalls: Vec<RecipeShortfall>,
    pub warnings: Vec<PlanWarning>,
    pub required_hours: f64, // 该机组独立覆盖当日全部需求所需小时
}

impl UnitScheduleResult {
    pub fn scheduled_hours(&self) -> f64 {
        self.entries.iter().map(|e| e.duration_hours).sum()
    }
}

// ==========================================
// UnitCursor - 单元内顺序状态
// ==========================================
// 每步由上一步的 cursor 推导，单元之间不共享
#[derive(Debug, Clone, Copy)]
struct UnitCursor<'a> {
    current_hour: f64,
    prev_recipe: Option<&'a str>,
}

impl<'a> UnitCursor<'a> {
    fn start() -> Self {
        Self {
            current_hour: 0.0,
            prev_recipe: None,
        }
    }

    /// 上一配方不同则需要换产
    fn changeover_for(&self, recipe_id: &str, changeover_hours: f64) -> f64 {
        match self.prev_recipe {
            Some(prev) if prev != recipe_id => changeover_hours,
            _ => 0.0,
        }
    }

    fn advance(self, changeover: f64, actual_hours: f64, recipe_id: &'a str) -> Self {
        Self {
            current_hour: self.current_hour + changeover + actual_hours,
            prev_recipe: Some(recipe_id),
        }
    }
}

// ==========================================
// MillScheduler - 机组排产引擎
// ==========================================
pub struct MillScheduler {
    changeover_hours: f64,
}

impl MillScheduler {
    /// 构造函数
    ///
    /// # 参数
    /// - changeover_hours: 配方切换的换产时间（小时）
    pub fn new(changeover_hours: f64) -> Self {
        Self { changeover_hours }
    }

    pub fn changeover_hours(&self) -> f64 {
        self.changeover_hours
    }

    /// 排产（单日单机组）
    ///
    /// 规则：
    /// 1) 需求按 required_tons 降序稳定排序
    /// 2) 产能缺失的配方跳过，不影响 cursor；停产单元不告警
    /// 3) 换产时间已用尽可用小时则停止
    /// 4) actual_hours = min(所需小时, 剩余小时)；<= 0 则跳过且不推进 cursor
    /// 5) 可用小时用尽即停止
    ///
    /// # 参数
    /// - `date`: 排产日期
    /// - `mill_id`: 机组
    /// - `available_hours`: 可用小时（<= 0 视为停产）
    /// - `demand`: 当日配方需求合计（汇总顺序）
    /// - `master`: 主数据（产能矩阵）
    #[instrument(skip(self, demand, master), fields(demand_rows = demand.len()))]
    pub fn schedule_unit(
        &self,
        date: NaiveDate,
        mill_id: &str,
        available_hours: f64,
        demand: &[RecipeDemandTotal],
        master: &MasterData,
    ) -> UnitScheduleResult {
        let mut result = UnitScheduleResult::default();

        // 1. 稳定排序（同吨位保持汇总顺序）
        let mut rows: Vec<&RecipeDemandTotal> = demand.iter().collect();
        rows.sort_by(|a, b| b.required_tons.total_cmp(&a.required_tons));

        // 2. 产能查询（缺失则整行跳过；停产单元不告警）
        //    单元告警不计损失吨位，损失由编排器按 (日期, 配方) 统一计算
        let mut rates: Vec<Option<f64>> = Vec::with_capacity(rows.len());
        for row in &rows {
            let rate = master.tons_per_hour(mill_id, &row.recipe_id);
            match rate {
                Some(tph) => result.required_hours += row.required_tons.max(0.0) / tph,
                None if row.required_tons > 0.0 && available_hours > 0.0 => {
                    warn!(
                        %date,
                        mill_id,
                        recipe_id = %row.recipe_id,
                        "机组无该配方产能，跳过"
                    );
                    result.warnings.push(
                        PlanWarning::new(
                            date,
                            WarningKind::MissingThroughputRate,
                            mill_id,
                            format!(
                                "MISSING_THROUGHPUT_RATE: mill_id={} 无法生产 recipe_id={}",
                                mill_id, row.recipe_id
                            ),
                        )
                        .with_subject(&row.recipe_id),
                    );
                }
                None => {}
            }
            rates.push(rate);
        }

        // 3. 贪心填充
        if available_hours > 0.0 {
            let mut cursor = UnitCursor::start();

            for (row, rate) in rows.iter().zip(&rates) {
                let Some(tons_per_hour) = *rate else {
                    continue;
                };

                let hours_needed = row.required_tons / tons_per_hour;
                let changeover = cursor.changeover_for(&row.recipe_id, self.changeover_hours);

                if cursor.current_hour + changeover >= available_hours {
                    break;
                }

                let remaining = available_hours - cursor.current_hour - changeover;
                let actual_hours = hours_needed.min(remaining);
                if actual_hours <= 0.0 {
                    continue;
                }

                let start_hour = cursor.current_hour + changeover;
                result.entries.push(ScheduleEntry {
                    date,
                    mill_id: mill_id.to_string(),
                    recipe_id: row.recipe_id.clone(),
                    start_hour,
                    end_hour: start_hour + actual_hours,
                    duration_hours: actual_hours,
                    changeover_hours: changeover,
                    tons_produced: actual_hours * tons_per_hour,
                });

                cursor = cursor.advance(changeover, actual_hours, &row.recipe_id);
                if cursor.current_hour >= available_hours {
                    break;
                }
            }
        }

        // 4. 未完全覆盖的需求
        let mut produced: HashMap<&str, f64> = HashMap::new();
        for entry in &result.entries {
            *produced.entry(entry.recipe_id.as_str()).or_insert(0.0) += entry.tons_produced;
        }
        for (row, rate) in rows.iter().zip(&rates) {
            if row.required_tons <= 0.0 {
                continue;
            }
            let scheduled = produced.get(row.recipe_id.as_str()).copied().unwrap_or(0.0);
            if scheduled + TONS_EPSILON >= row.required_tons {
                continue;
            }
            let reason = if rate.is_none() {
                "MISSING_THROUGHPUT_RATE"
            } else if available_hours <= 0.0 {
                "NO_AVAILABLE_HOURS"
            } else if scheduled > 0.0 {
                "PARTIAL_CAPACITY"
            } else {
                "CAPACITY_EXHAUSTED"
            };
            result.shortfalls.push(RecipeShortfall {
                date,
                mill_id: mill_id.to_string(),
                recipe_id: row.recipe_id.clone(),
                required_tons: row.required_tons,
                scheduled_tons: scheduled,
                reason: reason.to_string(),
            });
        }

        debug!(
            %date,
            mill_id,
            entries = result.entries.len(),
            scheduled_hours = result.scheduled_hours(),
            shortfalls = result.shortfalls.len(),
            "机组排产完成"
        );

        result
    }
}

impl Default for MillScheduler {
    fn default() -> Self {
        Self::new(crate::config::planning_config_trait::DEFAULT_CHANGEOVER_HOURS)
    }
}
