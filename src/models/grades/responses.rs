use rust_decimal::Decimal;
use serde::Serialize;

use super::entities::GradeRecord;
use crate::models::UpsertAction;

/// 登记成绩结果
#[derive(Debug, Clone, Serialize)]
pub struct RecordGradeResponse {
    pub grade: GradeRecord,
    pub action: UpsertAction,
    // 迟交被拒：成绩已保存但未定稿
    pub late_rejected: bool,
    // final / max_score × 100
    pub percentage: Decimal,
    pub is_passing: bool,
}
