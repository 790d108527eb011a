use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::entities::EvaluationDetails;

/// 创建评价请求
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEvaluationRequest {
    pub subject_id: i64,
    pub term_id: i64,
    pub evaluation_type_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub weight_percentage: Decimal,
    #[serde(default)]
    pub published: bool,
    pub details: EvaluationDetails,
    // 为 true 时检查学期的评价登记窗口；历史数据导入时保持 false
    #[serde(default)]
    pub enforce_deadlines: bool,
    // 判断窗口所用的日期，缺省为当天
    pub as_of: Option<NaiveDate>,
}
