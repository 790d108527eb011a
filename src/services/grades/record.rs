use chrono::Utc;
use tracing::{debug, warn};

use super::GradeService;
use super::calculator::score_grade;
use crate::errors::{AggregatorError, GradeError, Result};
use crate::models::grades::{
    requests::{GradeWrite, RecordGradeRequest},
    responses::RecordGradeResponse,
};
use crate::utils::{normalize, ratio_pct};

/// 登记成绩
///
/// 迟交被拒时成绩仍然保存，但标记为未定稿，不参与汇总。
pub async fn record_grade(
    service: &GradeService,
    req: RecordGradeRequest,
) -> Result<RecordGradeResponse> {
    let storage = &service.storage;

    let Some(evaluation) = storage.get_evaluation(req.evaluation).await? else {
        return Err(AggregatorError::not_found(format!(
            "评价 {} 不存在",
            req.evaluation
        )));
    };
    if storage.get_student(req.student_id).await?.is_none() {
        return Err(AggregatorError::not_found(format!(
            "学生 {} 不存在",
            req.student_id
        )));
    }

    if req.enforce_deadlines {
        let today = req.as_of.unwrap_or_else(|| Utc::now().date_naive());
        let Some(term) = storage.get_term(evaluation.term_id).await? else {
            return Err(AggregatorError::not_found(format!(
                "学期 {} 不存在",
                evaluation.term_id
            )));
        };
        if !term.can_register_grades(today) {
            return Err(AggregatorError::validation(format!(
                "学期 {} 当前不允许登记成绩 (状态: {}, 截止: {})",
                term.id, term.state, term.grade_deadline
            )));
        }
    }

    let raw_score = normalize(req.raw_score);
    let (write, late_rejected) = match score_grade(&evaluation, raw_score, req.late) {
        Ok(scored) => (
            GradeWrite {
                evaluation: req.evaluation,
                student_id: req.student_id,
                raw_score,
                late: req.late,
                penalty_percentage: scored.penalty_percentage,
                final_score: scored.final_score,
                finalized: true,
            },
            false,
        ),
        Err(GradeError::LateDeliveryRejected) => {
            warn!(
                "Late delivery rejected for {} (student {}), storing grade as not finalized",
                req.evaluation, req.student_id
            );
            (
                GradeWrite {
                    evaluation: req.evaluation,
                    student_id: req.student_id,
                    raw_score,
                    late: true,
                    penalty_percentage: normalize(rust_decimal::Decimal::ZERO),
                    final_score: raw_score,
                    finalized: false,
                },
                true,
            )
        }
        Err(e) => return Err(e.into()),
    };

    let (grade, action) = storage.upsert_grade(write).await?;
    debug!(
        "Grade {} {:?}: final score {}",
        grade.id, action, grade.final_score
    );

    Ok(RecordGradeResponse {
        percentage: ratio_pct(grade.final_score, evaluation.max_score()),
        is_passing: grade.finalized && grade.final_score >= evaluation.min_pass_score(),
        grade,
        action,
        late_rejected,
    })
}
