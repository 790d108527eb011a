use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// 科目权重配置：某评价类型占期末成绩的百分比
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightConfig {
    pub id: i64,
    pub subject_id: i64,
    pub evaluation_type_id: i64,
    pub percentage: Decimal,
    pub active: bool,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
