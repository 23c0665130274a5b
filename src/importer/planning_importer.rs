// ==========================================
// 面粉厂排产系统 - 排产输入导入器
// ==========================================
// 职责: 数据目录 → 主数据 + 需求 + 产能 + 日历
// 支持: 按文件名主干定位 .csv / .xlsx / .xls
// ==========================================
// 文件清单:
//   必需: mill_master, recipe_eligibility (或 recipe_allocation),
//         mill_recipe_rate (或 recipe_master，按配方适用于所有机组),
//         flour_demand 或 (sku_master + sku_forecast)
//   可选: mill_capacity, time_dimension
// ==========================================

use crate::config::MasterData;
use crate::domain::{
    CalendarFlags, FlourDemand, MillCapacity, MillRecipeRate, PlanWarning, SkuForecast, SkuMaster,
};
use crate::engine::calendar::{CalendarProvider, SaudiCalendar, TableCalendar};
use crate::engine::demand_aggregator::DemandAggregator;
use crate::engine::mill_capacity::{MillCapacityProvider, TableCapacityProvider};
use crate::engine::orchestrator::PlanningInputs;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::{RawRecord, UniversalFileParser};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

const SUPPORTED_EXTENSIONS: &[&str] = &["csv", "xlsx", "xls"];

// ==========================================
// ImportedPlanningData - 导入结果
// ==========================================
#[derive(Debug, Clone)]
pub struct ImportedPlanningData {
    pub master: MasterData,
    pub flour_demand: Vec<FlourDemand>,
    pub sku_forecast: Vec<SkuForecast>, // 仅 SKU 预测路径非空
    pub capacity_rows: Vec<MillCapacity>,
    pub calendar_rows: Vec<(NaiveDate, CalendarFlags)>,
    pub warnings: Vec<PlanWarning>,
    pub source_files: Vec<PathBuf>,
}

impl ImportedPlanningData {
    /// 转换为编排器输入
    ///
    /// - 有 time_dimension: TableCalendar（缺失日期回落到 SaudiCalendar）
    /// - 有 mill_capacity: TableCapacityProvider；否则由编排器按主数据推导
    pub fn into_inputs(self) -> PlanningInputs {
        let calendar: Arc<dyn CalendarProvider> = if self.calendar_rows.is_empty() {
            Arc::new(SaudiCalendar::new())
        } else {
            Arc::new(TableCalendar::new(self.calendar_rows))
        };

        let capacity: Option<Arc<dyn MillCapacityProvider>> = if self.capacity_rows.is_empty() {
            None
        } else {
            Some(Arc::new(TableCapacityProvider::new(self.capacity_rows)))
        };

        PlanningInputs {
            master: self.master,
            flour_demand: self.flour_demand,
            calendar,
            capacity,
            input_warnings: self.warnings,
        }
    }
}

// ==========================================
// PlanningDataImporter - 目录导入器
// ==========================================
pub struct PlanningDataImporter {
    data_dir: PathBuf,
    parser: UniversalFileParser,
}

impl PlanningDataImporter {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            parser: UniversalFileParser,
        }
    }

    /// 按主干名定位文件（按别名顺序，再按扩展名顺序）
    pub fn locate(&self, stems: &[&str]) -> Option<PathBuf> {
        stems.iter().find_map(|stem| {
            SUPPORTED_EXTENSIONS
                .iter()
                .map(|ext| self.data_dir.join(format!("{}.{}", stem, ext)))
                .find(|p| p.is_file())
        })
    }

    /// 导入全部排产输入
    pub fn import(&self) -> ImportResult<ImportedPlanningData> {
        if !self.data_dir.is_dir() {
            return Err(ImportError::FileNotFound(self.data_dir.display().to_string()));
        }

        info!(data_dir = %self.data_dir.display(), "开始导入排产输入");
        let mut source_files = Vec::new();

        // ==========================================
        // 1. 主数据
        // ==========================================
        let mills = self.read_required(&["mill_master"], &mut source_files, |m, r, n| {
            m.map_mill(r, n)
        })?;

        let eligibility = self.read_required(
            &["recipe_eligibility", "recipe_allocation"],
            &mut source_files,
            |m, r, n| m.map_eligibility(r, n),
        )?;

        let rates = match self.read_optional(&["mill_recipe_rate"], &mut source_files, |m, r, n| {
            m.map_rate(r, n)
        })? {
            Some(rates) => rates,
            None => {
                let recipe_rates = self.read_required(
                    &["recipe_master"],
                    &mut source_files,
                    |m, r, n| m.map_recipe_rate(r, n),
                )?;
                expand_recipe_rates(&mills, recipe_rates)
            }
        };

        let skus: Vec<SkuMaster> = self
            .read_optional(&["sku_master"], &mut source_files, |m, r, n| m.map_sku(r, n))?
            .unwrap_or_default();

        let master = MasterData::new(mills, rates, eligibility, skus)?;

        // ==========================================
        // 2. 需求（面粉大类 或 SKU 预测）
        // ==========================================
        let mut warnings = Vec::new();
        let mut sku_forecast = Vec::new();
        let flour_demand = match self.read_optional(
            &["flour_demand"],
            &mut source_files,
            |m, r, n| m.map_flour_demand(r, n),
        )? {
            Some(rows) => rows,
            None => {
                if !master.has_skus() {
                    return Err(ImportError::MissingTable(
                        "flour_demand 或 sku_master + sku_forecast".to_string(),
                    ));
                }
                sku_forecast = self.read_required(
                    &["sku_forecast"],
                    &mut source_files,
                    |m, r, n| m.map_forecast(r, n),
                )?;
                let (rows, aggregate_warnings) =
                    DemandAggregator::new().aggregate(&sku_forecast, &master);
                warnings.extend(aggregate_warnings);
                rows
            }
        };

        // ==========================================
        // 3. 可选: 产能 / 日历
        // ==========================================
        let capacity_rows = self
            .read_optional(&["mill_capacity"], &mut source_files, |m, r, n| {
                m.map_capacity(r, n)
            })?
            .unwrap_or_default();

        let calendar_rows = self
            .read_optional(&["time_dimension"], &mut source_files, |m, r, n| {
                m.map_calendar(r, n)
            })?
            .unwrap_or_default();

        info!(
            mills = master.mills().len(),
            flour_types = master.flour_types().len(),
            flour_demand_rows = flour_demand.len(),
            sku_forecast_rows = sku_forecast.len(),
            capacity_rows = capacity_rows.len(),
            calendar_rows = calendar_rows.len(),
            files = source_files.len(),
            "排产输入导入完成"
        );

        Ok(ImportedPlanningData {
            master,
            flour_demand,
            sku_forecast,
            capacity_rows,
            calendar_rows,
            warnings,
            source_files,
        })
    }

    // ==========================================
    // 内部: 读表
    // ==========================================

    fn read_required<T, F>(
        &self,
        stems: &[&str],
        source_files: &mut Vec<PathBuf>,
        map: F,
    ) -> ImportResult<Vec<T>>
    where
        F: Fn(&FieldMapper, &RawRecord, usize) -> ImportResult<T>,
    {
        self.read_optional(stems, source_files, map)?
            .ok_or_else(|| ImportError::MissingTable(stems.join(" | ")))
    }

    fn read_optional<T, F>(
        &self,
        stems: &[&str],
        source_files: &mut Vec<PathBuf>,
        map: F,
    ) -> ImportResult<Option<Vec<T>>>
    where
        F: Fn(&FieldMapper, &RawRecord, usize) -> ImportResult<T>,
    {
        let Some(path) = self.locate(stems) else {
            debug!(stems = ?stems, "数据表文件不存在");
            return Ok(None);
        };

        let table = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(stems[0])
            .to_string();
        let mapper = FieldMapper::new(&table);

        let records = self.parser.parse(&path)?;
        let rows = records
            .iter()
            .enumerate()
            .map(|(idx, record)| map(&mapper, record, idx + 2))
            .collect::<ImportResult<Vec<T>>>()?;

        debug!(table = %table, rows = rows.len(), path = %path.display(), "数据表读取完成");
        source_files.push(path);
        Ok(Some(rows))
    }
}

/// 配方主表 → 机组配方产能（每个机组同一速率）
///
/// 同一配方多行时取第一行；速率不一致时告警
fn expand_recipe_rates(
    mills: &[crate::domain::Mill],
    recipe_rates: Vec<(String, f64)>,
) -> Vec<MillRecipeRate> {
    let mut order: Vec<(String, f64)> = Vec::new();
    let mut seen: HashMap<String, f64> = HashMap::new();

    for (recipe_id, tph) in recipe_rates {
        match seen.get(&recipe_id) {
            Some(&first) => {
                if (first - tph).abs() > f64::EPSILON {
                    warn!(
                        recipe_id = %recipe_id,
                        first_tph = first,
                        ignored_tph = tph,
                        "配方主表同一配方速率不一致，取第一行"
                    );
                }
            }
            None => {
                seen.insert(recipe_id.clone(), tph);
                order.push((recipe_id, tph));
            }
        }
    }

    mills
        .iter()
        .flat_map(|mill| {
            order.iter().map(move |(recipe_id, tph)| MillRecipeRate {
                mill_id: mill.mill_id.clone(),
                recipe_id: recipe_id.clone(),
                tons_per_hour: *tph,
            })
        })
        .collect()
}
