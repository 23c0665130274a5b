// ==========================================
// 面粉厂排产系统 - 排产编排器
// ==========================================
// 计算主流程（数据严格向下流动）:
//   日历 → 配比 → 配方需求(每日一次, 只读共享) → 机组排产(日期×机组 并行) → 负荷
// ==========================================
// 红线:
// - 当日配方需求在任何机组单元开始前计算完成，之后不可变
// - 单元之间无共享可变状态；单元内严格顺序
// - 单元级失败不影响其他单元
// ==========================================

use crate::config::{MasterData, PlanningConfigReader, PlanningParameters};
use crate::domain::{
    FlourDemand, Mill, MillLoad, PlanWarning, RecipeDemand, RecipeDemandTotal, RecipeMixEntry,
    ScheduleEntry, WarningKind,
};
use crate::engine::calendar::CalendarProvider;
use crate::engine::demand_aggregator::{DemandAggregator, DemandForecaster};
use crate::engine::error::{PlanningError, PlanningResult};
use crate::engine::load_aggregator::LoadAggregator;
use crate::engine::mill_capacity::{MillCapacityProvider, StandardCapacityProvider};
use crate::engine::mill_scheduler::{MillScheduler, RecipeShortfall};
use crate::engine::recipe_demand::{merge_flour_demand, RecipeDemandCalculator};
use crate::engine::recipe_mix::RecipeMixAllocator;
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};

// ==========================================
// PlanningInputs - 批次输入
// ==========================================
pub struct PlanningInputs {
    pub master: MasterData,
    pub flour_demand: Vec<FlourDemand>,
    pub calendar: Arc<dyn CalendarProvider>,
    /// None 时按主数据 + 日历 + 检修配置推导
    pub capacity: Option<Arc<dyn MillCapacityProvider>>,
    /// 输入阶段产生的告警（如未知 SKU）
    pub input_warnings: Vec<PlanWarning>,
}

impl PlanningInputs {
    /// 由外部预测器构造输入（SKU → 面粉大类）
    pub fn from_forecast(
        master: MasterData,
        forecaster: &dyn DemandForecaster,
        start: NaiveDate,
        end: NaiveDate,
        calendar: Arc<dyn CalendarProvider>,
        capacity: Option<Arc<dyn MillCapacityProvider>>,
    ) -> Self {
        let (flour_demand, input_warnings) =
            DemandAggregator::new().aggregate_from(forecaster, &master, start, end);
        Self {
            master,
            flour_demand,
            calendar,
            capacity,
            input_warnings,
        }
    }
}

// ==========================================
// PlanResult - 批次结果
// ==========================================
#[derive(Debug, Clone)]
pub struct PlanResult {
    pub run_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub flour_demand: Vec<FlourDemand>,
    pub recipe_mix: Vec<RecipeMixEntry>,
    pub recipe_demand: Vec<RecipeDemand>,
    pub recipe_totals: Vec<RecipeDemandTotal>,
    pub schedule: Vec<ScheduleEntry>, // (date, 机组主数据顺序, start_hour)
    pub loads: Vec<MillLoad>,
    pub shortfalls: Vec<RecipeShortfall>,
    pub warnings: Vec<PlanWarning>,
}

/// 批次摘要（用于 plan_run 记录与日志）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanRunSummary {
    pub days: usize,
    pub schedule_entry_count: usize,
    pub load_count: usize,
    pub warning_count: usize,
    pub warnings_by_kind: BTreeMap<WarningKind, usize>,
    pub total_tons_produced: f64,
    pub total_lost_tons: f64,
}

impl PlanResult {
    pub fn summary(&self) -> PlanRunSummary {
        let mut warnings_by_kind = BTreeMap::new();
        for w in &self.warnings {
            *warnings_by_kind.entry(w.kind).or_insert(0) += 1;
        }

        PlanRunSummary {
            days: (self.end_date - self.start_date).num_days() as usize + 1,
            schedule_entry_count: self.schedule.len(),
            load_count: self.loads.len(),
            warning_count: self.warnings.len(),
            warnings_by_kind,
            total_tons_produced: self.schedule.iter().map(|e| e.tons_produced).sum(),
            total_lost_tons: self.warnings.iter().map(|w| w.lost_tons).sum(),
        }
    }

    /// 某 (date, mill) 的排产条目（有序）
    pub fn entries_for(&self, date: NaiveDate, mill_id: &str) -> Vec<&ScheduleEntry> {
        self.schedule
            .iter()
            .filter(|e| e.date == date && e.mill_id == mill_id)
            .collect()
    }

    pub fn load_for(&self, date: NaiveDate, mill_id: &str) -> Option<&MillLoad> {
        self.loads
            .iter()
            .find(|l| l.date == date && l.mill_id == mill_id)
    }
}

// ==========================================
// 内部: 单日共享需求 / 单元结果
// ==========================================
struct DayDemand {
    date: NaiveDate,
    totals: Vec<RecipeDemandTotal>,
}

/// 损失吨位只计入全部机组都无产能的配方，每个 (日期, 配方) 计一次，
/// 记在该日该配方的第一条缺产能告警上
fn attribute_lost_tons(warnings: &mut [PlanWarning], days: &[DayDemand], master: &MasterData) {
    let mut lost: HashMap<(NaiveDate, String), f64> = HashMap::new();
    for day in days {
        for total in &day.totals {
            let producible = master
                .mills()
                .iter()
                .any(|m| master.tons_per_hour(&m.mill_id, &total.recipe_id).is_some());
            if total.required_tons > 0.0 && !producible {
                lost.insert((day.date, total.recipe_id.clone()), total.required_tons);
            }
        }
    }

    for warning in warnings
        .iter_mut()
        .filter(|w| w.kind == WarningKind::MissingThroughputRate)
    {
        let Some(recipe_id) = warning.subject.clone() else {
            continue;
        };
        if let Some(tons) = lost.remove(&(warning.date, recipe_id)) {
            warn!(date = %warning.date, tons, "配方无任何机组产能，需求损失");
            warning.lost_tons = tons;
        }
    }
}

struct UnitOutcome {
    entries: Vec<ScheduleEntry>,
    load: MillLoad,
    shortfalls: Vec<RecipeShortfall>,
    warnings: Vec<PlanWarning>,
}

// ==========================================
// PlanningOrchestrator - 排产编排器
// ==========================================
pub struct PlanningOrchestrator<C>
where
    C: PlanningConfigReader,
{
    config: Arc<C>,
}

impl<C> PlanningOrchestrator<C>
where
    C: PlanningConfigReader,
{
    /// 创建新的编排器实例
    ///
    /// # 参数
    /// - config: 配置读取器
    pub fn new(config: Arc<C>) -> Self {
        Self { config }
    }

    /// 执行 [start, end] 的完整排产
    ///
    /// 配置在批次开始时一次性读取
    pub async fn run(
        &self,
        inputs: &PlanningInputs,
        start: NaiveDate,
        end: NaiveDate,
    ) -> PlanningResult<PlanResult> {
        if start > end {
            return Err(PlanningError::InvalidDateRange { start, end });
        }

        let params = PlanningParameters::load(self.config.as_ref()).await?;
        plan_with_parameters(inputs, start, end, &params)
    }
}

/// 同步排产核心（给定参数快照）
pub fn plan_with_parameters(
    inputs: &PlanningInputs,
    start: NaiveDate,
    end: NaiveDate,
    params: &PlanningParameters,
) -> PlanningResult<PlanResult> {
    if start > end {
        return Err(PlanningError::InvalidDateRange { start, end });
    }

    let run_id = uuid::Uuid::new_v4().to_string();
    let master = &inputs.master;
    let dates: Vec<NaiveDate> = start.iter_days().take_while(|d| *d <= end).collect();

    info!(
        run_id = %run_id,
        %start,
        %end,
        days = dates.len(),
        mills = master.mills().len(),
        changeover_hours = params.changeover_hours,
        rules = params.shift_rules.len(),
        "开始排产批次"
    );

    let allocator = RecipeMixAllocator::new(params.shift_rules.clone());
    let calculator = RecipeDemandCalculator::new(params.allocation_tolerance);
    let scheduler = MillScheduler::new(params.changeover_hours);
    let load_aggregator = LoadAggregator::new();

    let capacity: Arc<dyn MillCapacityProvider> = match &inputs.capacity {
        Some(provider) => provider.clone(),
        None => Arc::new(StandardCapacityProvider::new(
            master.mills(),
            inputs.calendar.clone(),
            params.maintenance_days.clone(),
        )),
    };

    // ==========================================
    // 步骤1: 按日分组大类需求
    // ==========================================
    let mut demand_by_date: HashMap<NaiveDate, Vec<FlourDemand>> = HashMap::new();
    for row in inputs
        .flour_demand
        .iter()
        .filter(|r| r.date >= start && r.date <= end)
    {
        demand_by_date.entry(row.date).or_default().push(row.clone());
    }

    let mut warnings: Vec<PlanWarning> = inputs
        .input_warnings
        .iter()
        .filter(|w| w.date >= start && w.date <= end)
        .cloned()
        .collect();

    // ==========================================
    // 步骤2: 配比 + 配方需求（每日一次，之后只读）
    // ==========================================
    let mut flour_demand = Vec::new();
    let mut recipe_mix = Vec::new();
    let mut recipe_demand = Vec::new();
    let mut days: Vec<DayDemand> = Vec::with_capacity(dates.len());

    for &date in &dates {
        let flags = inputs.calendar.flags(date);
        let day_flour = demand_by_date
            .remove(&date)
            .map(|rows| merge_flour_demand(date, &rows))
            .unwrap_or_default();
        let mix = allocator.allocate_day(date, &flags, master);
        let output = calculator.compute(date, &day_flour, &mix);

        debug!(
            %date,
            is_weekend = flags.is_weekend,
            is_ramadan = flags.is_ramadan,
            is_hajj = flags.is_hajj,
            flour_rows = day_flour.len(),
            recipes = output.totals.len(),
            "当日配方需求计算完成"
        );

        flour_demand.extend(day_flour);
        recipe_mix.extend(mix);
        recipe_demand.extend(output.recipe_demand);
        warnings.extend(output.warnings);
        days.push(DayDemand {
            date,
            totals: output.totals,
        });
    }

    // ==========================================
    // 步骤3: 日期 × 机组 并行排产
    // ==========================================
    let units: Vec<(&DayDemand, &Mill)> = days
        .iter()
        .flat_map(|day| master.mills().iter().map(move |mill| (day, mill)))
        .collect();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(params.worker_threads)
        .build()
        .map_err(|e| PlanningError::WorkerPool(e.to_string()))?;

    let outcomes: Vec<UnitOutcome> = pool.install(|| {
        units
            .par_iter()
            .map(|(day, mill)| {
                schedule_one_unit(
                    day,
                    mill,
                    master,
                    capacity.as_ref(),
                    &scheduler,
                    &load_aggregator,
                )
            })
            .collect()
    });

    // ==========================================
    // 步骤4: 按单元顺序合并（确定性）
    // ==========================================
    let mut schedule = Vec::new();
    let mut loads = Vec::with_capacity(outcomes.len());
    let mut shortfalls = Vec::new();
    for outcome in outcomes {
        schedule.extend(outcome.entries);
        loads.push(outcome.load);
        shortfalls.extend(outcome.shortfalls);
        warnings.extend(outcome.warnings);
    }
    attribute_lost_tons(&mut warnings, &days, master);

    let recipe_totals = days.into_iter().flat_map(|d| d.totals).collect();

    let result = PlanResult {
        run_id,
        start_date: start,
        end_date: end,
        flour_demand,
        recipe_mix,
        recipe_demand,
        recipe_totals,
        schedule,
        loads,
        shortfalls,
        warnings,
    };

    let summary = result.summary();
    if summary.warning_count > 0 {
        warn!(
            run_id = %result.run_id,
            warning_count = summary.warning_count,
            lost_tons = summary.total_lost_tons,
            "排产批次存在数据质量告警"
        );
    }
    info!(
        run_id = %result.run_id,
        entries = summary.schedule_entry_count,
        loads = summary.load_count,
        tons = summary.total_tons_produced,
        "排产批次完成"
    );

    Ok(result)
}

/// 单个 (date, mill) 单元: 可用小时 → 排产 → 负荷
fn schedule_one_unit(
    day: &DayDemand,
    mill: &Mill,
    master: &MasterData,
    capacity: &dyn MillCapacityProvider,
    scheduler: &MillScheduler,
    load_aggregator: &LoadAggregator,
) -> UnitOutcome {
    let mut warnings = Vec::new();

    let available_hours = match capacity.capacity(day.date, &mill.mill_id) {
        Some(c) => c.effective_hours(),
        None => {
            warn!(date = %day.date, mill_id = %mill.mill_id, "机组当日无产能记录，按 0 小时处理");
            warnings.push(PlanWarning::new(
                day.date,
                WarningKind::MissingCapacity,
                &mill.mill_id,
                format!(
                    "MISSING_CAPACITY: mill_id={} 当日无产能记录，按 0 小时处理",
                    mill.mill_id
                ),
            ));
            0.0
        }
    };

    let unit = scheduler.schedule_unit(
        day.date,
        &mill.mill_id,
        available_hours,
        &day.totals,
        master,
    );

    let load = load_aggregator.compute(
        day.date,
        &mill.mill_id,
        &unit.entries,
        available_hours,
        unit.required_hours,
    );

    warnings.extend(unit.warnings);

    UnitOutcome {
        entries: unit.entries,
        load,
        shortfalls: unit.shortfalls,
        warnings,
    }
}
