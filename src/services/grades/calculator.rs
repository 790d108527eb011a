//! 成绩最终分计算（纯函数）
//!
//! `final = max(0, raw − raw × penalty / 100)`，精确小数运算，保留两位。

use rust_decimal::Decimal;

use crate::errors::{AggregatorError, GradeError};
use crate::models::evaluations::entities::Evaluation;
use crate::models::grades::entities::GradeRecord;
use crate::utils::{normalize, percent_of, validate_percentage, validate_score};

/// 计算后的分数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredGrade {
    pub penalty_percentage: Decimal,
    pub final_score: Decimal,
}

pub fn final_score(raw_score: Decimal, penalty_percentage: Decimal) -> Result<Decimal, GradeError> {
    if validate_percentage(penalty_percentage).is_err() {
        return Err(GradeError::PenaltyOutOfRange {
            penalty: penalty_percentage,
        });
    }

    let penalized = raw_score - percent_of(raw_score, penalty_percentage);
    Ok(normalize(penalized.max(Decimal::ZERO)))
}

/// 确定罚分百分比
///
/// `late_penalty` 为 None 表示评价不接受迟交，此时迟交标记会被拒绝。
pub fn resolve_penalty(late: bool, late_penalty: Option<Decimal>) -> Result<Decimal, GradeError> {
    match (late, late_penalty) {
        (false, _) => Ok(normalize(Decimal::ZERO)),
        (true, Some(penalty)) => Ok(normalize(penalty)),
        (true, None) => Err(GradeError::LateDeliveryRejected),
    }
}

/// 按评价的满分与迟交策略计算一次成绩
pub fn score_grade(
    evaluation: &Evaluation,
    raw_score: Decimal,
    late: bool,
) -> Result<ScoredGrade, GradeError> {
    let max_score = evaluation.max_score();
    if validate_score(raw_score, max_score).is_err() {
        return Err(GradeError::ScoreOutOfRange {
            score: raw_score,
            max_score,
        });
    }

    let penalty_percentage = resolve_penalty(late, evaluation.late_penalty())?;
    Ok(ScoredGrade {
        penalty_percentage,
        final_score: final_score(raw_score, penalty_percentage)?,
    })
}

/// 重新推导已存储成绩的最终分，与存储值不一致或数值越界时视为损坏
pub fn verify_stored_grade(grade: &GradeRecord) -> Result<Decimal, AggregatorError> {
    let corrupt = |detail: String| {
        AggregatorError::corrupt_grade(format!(
            "成绩 {} ({}, 学生 {}) 已损坏: {detail}",
            grade.id, grade.evaluation, grade.student_id
        ))
    };

    if grade.raw_score.is_sign_negative() && !grade.raw_score.is_zero() {
        return Err(corrupt(format!("原始分为负数 {}", grade.raw_score)));
    }

    let expected = final_score(grade.raw_score, grade.penalty_percentage)
        .map_err(|e| corrupt(e.to_string()))?;
    if expected != normalize(grade.final_score) {
        return Err(corrupt(format!(
            "存储的最终分 {} 与推导值 {expected} 不一致",
            grade.final_score
        )));
    }

    Ok(expected)
}
