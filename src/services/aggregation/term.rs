//! 学期平均计算（纯函数）

use rust_decimal::Decimal;

use super::lookup::GradeBook;
use crate::errors::{AggregatorError, Result};
use crate::models::attendance::entities::AttendanceRecord;
use crate::models::averages::entities::TermAverageFields;
use crate::models::evaluations::entities::Evaluation;
use crate::models::terms::entities::Term;
use crate::services::grades::verify_stored_grade;
use crate::utils::{HUNDRED, normalize, percent_of};

/// 计算一个 (学生, 科目, 学期) 的学期平均
///
/// `evaluations` 为空时返回 `None`（跳过，不写入）。
/// 无成绩或未定稿的评价不计入分子和分母；已计权重为 0 时平均分为 0。
pub fn compute_term_average(
    term: &Term,
    evaluations: &[Evaluation],
    grades: &GradeBook,
    student_id: i64,
    attendance: &[AttendanceRecord],
) -> Result<Option<TermAverageFields>> {
    if evaluations.is_empty() {
        return Ok(None);
    }

    let mut sum_weighted = Decimal::ZERO;
    let mut sum_weight = Decimal::ZERO;

    for evaluation in evaluations {
        let Some(grade) = grades.get(evaluation.reference(), student_id) else {
            continue;
        };
        if !grade.finalized {
            continue;
        }

        let final_score = verify_stored_grade(grade)?;
        if final_score > evaluation.max_score() {
            return Err(AggregatorError::corrupt_grade(format!(
                "成绩 {} 的最终分 {final_score} 超过 {} 的满分 {}",
                grade.id,
                evaluation.reference(),
                evaluation.max_score()
            )));
        }

        sum_weighted += percent_of(final_score, evaluation.weight_percentage);
        sum_weight += evaluation.weight_percentage;
    }

    // 及格判定使用未舍入的值，只有持久化字段才规范到两位小数
    let raw_average = if sum_weight > Decimal::ZERO {
        sum_weighted / sum_weight * HUNDRED
    } else {
        Decimal::ZERO
    };
    let evaluation_average = normalize(raw_average);

    let in_term: Vec<_> = attendance
        .iter()
        .filter(|record| term.contains(record.date))
        .collect();
    let classes_total = in_term.len();
    let classes_present = in_term.iter().filter(|record| record.present).count();
    let raw_attendance = if classes_total > 0 {
        Decimal::from(classes_present) / Decimal::from(classes_total) * HUNDRED
    } else {
        Decimal::ZERO
    };
    let attendance_pct = normalize(raw_attendance);

    let passed = raw_attendance >= term.min_attendance_pct && raw_average >= term.min_pass_score;

    Ok(Some(TermAverageFields {
        evaluation_average,
        final_average: evaluation_average,
        classes_total: i32::try_from(classes_total).unwrap_or(i32::MAX),
        classes_present: i32::try_from(classes_present).unwrap_or(i32::MAX),
        attendance_pct,
        passed,
    }))
}
