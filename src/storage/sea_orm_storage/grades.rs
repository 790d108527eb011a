//! 成绩存储操作

use super::{IN_CHUNK, SeaOrmStorage, db_error};
use crate::entity::grades::{ActiveModel, Column, Entity as Grades};
use crate::errors::Result;
use crate::models::{
    UpsertAction,
    evaluations::entities::{EvaluationKind, EvaluationRef},
    grades::{entities::GradeRecord, requests::GradeWrite},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, Set,
};

/// 按评价种类分组后构造 (kind = ? AND evaluation_id IN (...)) OR ... 条件
fn evaluation_condition(evaluations: &[EvaluationRef]) -> Condition {
    let mut condition = Condition::any();
    for kind in [EvaluationKind::Deliverable, EvaluationKind::Participation] {
        let ids: Vec<i64> = evaluations
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.id)
            .collect();
        if !ids.is_empty() {
            condition = condition.add(
                Condition::all()
                    .add(Column::EvaluationKind.eq(kind.to_string()))
                    .add(Column::EvaluationId.is_in(ids)),
            );
        }
    }
    condition
}

pub(super) async fn grade_of<C: ConnectionTrait>(
    db: &C,
    evaluation: EvaluationRef,
    student_id: i64,
) -> Result<Option<GradeRecord>> {
    let result = Grades::find()
        .filter(Column::EvaluationKind.eq(evaluation.kind.to_string()))
        .filter(Column::EvaluationId.eq(evaluation.id))
        .filter(Column::StudentId.eq(student_id))
        .one(db)
        .await
        .map_err(db_error("查询成绩失败"))?;

    result.map(|m| m.into_grade()).transpose()
}

/// 批量读取成绩
pub(super) async fn grades_for<C: ConnectionTrait>(
    db: &C,
    evaluations: &[EvaluationRef],
    student_ids: &[i64],
) -> Result<Vec<GradeRecord>> {
    if evaluations.is_empty() || student_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut result = Vec::new();
    for evaluation_chunk in evaluations.chunks(IN_CHUNK) {
        let condition = evaluation_condition(evaluation_chunk);
        for student_chunk in student_ids.chunks(IN_CHUNK) {
            let rows = Grades::find()
                .filter(condition.clone())
                .filter(Column::StudentId.is_in(student_chunk.to_vec()))
                .all(db)
                .await
                .map_err(db_error("批量查询成绩失败"))?;

            for row in rows {
                result.push(row.into_grade()?);
            }
        }
    }

    Ok(result)
}

/// 某个评价的全部成绩
pub(super) async fn grades_of_evaluation<C: ConnectionTrait>(
    db: &C,
    evaluation: EvaluationRef,
) -> Result<Vec<GradeRecord>> {
    let rows = Grades::find()
        .filter(Column::EvaluationKind.eq(evaluation.kind.to_string()))
        .filter(Column::EvaluationId.eq(evaluation.id))
        .order_by_asc(Column::StudentId)
        .all(db)
        .await
        .map_err(db_error("查询评价成绩失败"))?;

    rows.into_iter().map(|m| m.into_grade()).collect()
}

impl SeaOrmStorage {
    /// 按 (评价, 学生) 写入或覆盖成绩
    pub async fn upsert_grade_impl(&self, grade: GradeWrite) -> Result<(GradeRecord, UpsertAction)> {
        let now = chrono::Utc::now().timestamp();

        let existing = Grades::find()
            .filter(Column::EvaluationKind.eq(grade.evaluation.kind.to_string()))
            .filter(Column::EvaluationId.eq(grade.evaluation.id))
            .filter(Column::StudentId.eq(grade.student_id))
            .one(&self.db)
            .await
            .map_err(db_error("查询成绩失败"))?;

        let (model, action) = match existing {
            Some(model) => {
                let mut active = model.into_active_model();
                active.raw_score = Set(grade.raw_score);
                active.late = Set(grade.late);
                active.penalty_percentage = Set(grade.penalty_percentage);
                active.final_score = Set(grade.final_score);
                active.finalized = Set(grade.finalized);
                active.graded_at = Set(now);
                let updated = active
                    .update(&self.db)
                    .await
                    .map_err(db_error("更新成绩失败"))?;
                (updated, UpsertAction::Updated)
            }
            None => {
                let created = ActiveModel {
                    evaluation_kind: Set(grade.evaluation.kind.to_string()),
                    evaluation_id: Set(grade.evaluation.id),
                    student_id: Set(grade.student_id),
                    raw_score: Set(grade.raw_score),
                    late: Set(grade.late),
                    penalty_percentage: Set(grade.penalty_percentage),
                    final_score: Set(grade.final_score),
                    finalized: Set(grade.finalized),
                    graded_at: Set(now),
                    ..Default::default()
                }
                .insert(&self.db)
                .await
                .map_err(db_error("创建成绩失败"))?;
                (created, UpsertAction::Created)
            }
        };

        Ok((model.into_grade()?, action))
    }
}
