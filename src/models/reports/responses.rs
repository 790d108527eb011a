use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::averages::entities::{AnnualAverage, TermAverage};
use crate::models::evaluations::entities::EvaluationRef;

/// 学期报表
#[derive(Debug, Clone, Serialize)]
pub struct TermReport {
    pub term_id: i64,
    pub subject_id: Option<i64>,
    pub course_id: Option<i64>,
    pub total: i64,
    pub passed: i64,
    pub failed: i64,
    pub pass_rate: Decimal,
    pub general_average: Decimal,
    pub average_attendance: Decimal,
    pub rows: Vec<TermAverage>,
}

/// 单个评价的成绩统计（仅统计已定稿成绩）
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationStats {
    pub evaluation: EvaluationRef,
    pub count: i64,
    pub mean: Option<Decimal>,
    pub max: Option<Decimal>,
    pub min: Option<Decimal>,
    pub passed: i64,
    pub failed: i64,
}

/// 学年对比中的单学期明细
#[derive(Debug, Clone, Serialize)]
pub struct TermBreakdown {
    pub term_id: i64,
    pub number: i32,
    pub final_average: Option<Decimal>,
    pub attendance_pct: Option<Decimal>,
    pub passed: Option<bool>,
}

/// 学年对比行
#[derive(Debug, Clone, Serialize)]
pub struct AnnualComparisonRow {
    pub annual: AnnualAverage,
    pub terms: Vec<TermBreakdown>,
}
