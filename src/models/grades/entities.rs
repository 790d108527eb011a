use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::evaluations::entities::EvaluationRef;

// 成绩记录，每个 (评价, 学生) 唯一
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeRecord {
    pub id: i64,
    pub evaluation: EvaluationRef,
    pub student_id: i64,
    pub raw_score: Decimal,
    // 是否迟交
    pub late: bool,
    pub penalty_percentage: Decimal,
    // 由 raw_score 与 penalty_percentage 推导
    pub final_score: Decimal,
    // 未定稿的成绩不参与汇总
    pub finalized: bool,
    pub graded_at: chrono::DateTime<chrono::Utc>,
}
