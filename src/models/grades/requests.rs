use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::evaluations::entities::EvaluationRef;

/// 登记成绩请求，按 (评价, 学生) 写入或覆盖
#[derive(Debug, Clone, Deserialize)]
pub struct RecordGradeRequest {
    pub evaluation: EvaluationRef,
    pub student_id: i64,
    pub raw_score: Decimal,
    #[serde(default)]
    pub late: bool,
    // 为 true 时检查学期的成绩登记窗口
    #[serde(default)]
    pub enforce_deadlines: bool,
    pub as_of: Option<NaiveDate>,
}

/// 计算完成、待写入的成绩
#[derive(Debug, Clone)]
pub struct GradeWrite {
    pub evaluation: EvaluationRef,
    pub student_id: i64,
    pub raw_score: Decimal,
    pub late: bool,
    pub penalty_percentage: Decimal,
    pub final_score: Decimal,
    pub finalized: bool,
}
