use rust_decimal::Decimal;
use serde::Serialize;

use super::entities::WeightConfig;
use crate::models::UpsertAction;

/// 设置权重结果
#[derive(Debug, Clone, Serialize)]
pub struct SetWeightResponse {
    pub config: WeightConfig,
    pub action: UpsertAction,
    // 写入后剩余可分配百分比
    pub available: Decimal,
}

/// 科目权重汇总
#[derive(Debug, Clone, Serialize)]
pub struct WeightSummary {
    pub subject_id: i64,
    pub configs: Vec<WeightConfig>,
    pub assigned_total: Decimal,
    pub available: Decimal,
}
