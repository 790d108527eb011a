//! 评价目录存储操作
//!
//! 按 `EvaluationKind` 分派到提交类 / 参与类两张表。

use super::{IN_CHUNK, SeaOrmStorage, db_error};
use crate::entity::deliverable_evaluations::{
    self as deliverables, ActiveModel as DeliverableActiveModel, Entity as DeliverableEvaluations,
};
use crate::entity::participation_evaluations::{
    self as participations, ActiveModel as ParticipationActiveModel,
    Entity as ParticipationEvaluations,
};
use crate::errors::Result;
use crate::models::evaluations::{
    entities::{Evaluation, EvaluationDetails, EvaluationKind, EvaluationRef},
    requests::CreateEvaluationRequest,
};
use crate::utils::normalize;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

/// 评价统一排序：科目、ID，同 ID 时按种类
fn sort_evaluations(evaluations: &mut [Evaluation]) {
    evaluations.sort_by_key(|e| (e.subject_id, e.id, e.kind()));
}

/// 指定科目在某学期的全部有效评价
pub(super) async fn active_evaluations<C: ConnectionTrait>(
    db: &C,
    subject_ids: &[i64],
    term_id: i64,
) -> Result<Vec<Evaluation>> {
    let mut result = Vec::new();

    for chunk in subject_ids.chunks(IN_CHUNK) {
        let delivered = DeliverableEvaluations::find()
            .filter(deliverables::Column::SubjectId.is_in(chunk.to_vec()))
            .filter(deliverables::Column::TermId.eq(term_id))
            .filter(deliverables::Column::Active.eq(true))
            .all(db)
            .await
            .map_err(db_error("查询提交类评价失败"))?;

        let participated = ParticipationEvaluations::find()
            .filter(participations::Column::SubjectId.is_in(chunk.to_vec()))
            .filter(participations::Column::TermId.eq(term_id))
            .filter(participations::Column::Active.eq(true))
            .all(db)
            .await
            .map_err(db_error("查询参与类评价失败"))?;

        result.extend(delivered.into_iter().map(|m| m.into_evaluation()));
        result.extend(participated.into_iter().map(|m| m.into_evaluation()));
    }

    sort_evaluations(&mut result);
    Ok(result)
}

pub(super) async fn get_evaluation<C: ConnectionTrait>(
    db: &C,
    evaluation: EvaluationRef,
) -> Result<Option<Evaluation>> {
    let result = match evaluation.kind {
        EvaluationKind::Deliverable => DeliverableEvaluations::find_by_id(evaluation.id)
            .one(db)
            .await
            .map_err(db_error("查询提交类评价失败"))?
            .map(|m| m.into_evaluation()),
        EvaluationKind::Participation => ParticipationEvaluations::find_by_id(evaluation.id)
            .one(db)
            .await
            .map_err(db_error("查询参与类评价失败"))?
            .map(|m| m.into_evaluation()),
    };

    Ok(result)
}

/// 某科目、某评价类型的有效评价
pub(super) async fn active_evaluations_of_type<C: ConnectionTrait>(
    db: &C,
    subject_id: i64,
    evaluation_type_id: i64,
    term_id: Option<i64>,
) -> Result<Vec<Evaluation>> {
    let mut delivered = DeliverableEvaluations::find()
        .filter(deliverables::Column::SubjectId.eq(subject_id))
        .filter(deliverables::Column::EvaluationTypeId.eq(evaluation_type_id))
        .filter(deliverables::Column::Active.eq(true));
    let mut participated = ParticipationEvaluations::find()
        .filter(participations::Column::SubjectId.eq(subject_id))
        .filter(participations::Column::EvaluationTypeId.eq(evaluation_type_id))
        .filter(participations::Column::Active.eq(true));

    if let Some(term_id) = term_id {
        delivered = delivered.filter(deliverables::Column::TermId.eq(term_id));
        participated = participated.filter(participations::Column::TermId.eq(term_id));
    }

    let mut result: Vec<Evaluation> = delivered
        .all(db)
        .await
        .map_err(db_error("查询提交类评价失败"))?
        .into_iter()
        .map(|m| m.into_evaluation())
        .collect();
    result.extend(
        participated
            .all(db)
            .await
            .map_err(db_error("查询参与类评价失败"))?
            .into_iter()
            .map(|m| m.into_evaluation()),
    );

    sort_evaluations(&mut result);
    Ok(result)
}

impl SeaOrmStorage {
    /// 创建评价，按变体写入对应的表
    pub async fn create_evaluation_impl(&self, req: CreateEvaluationRequest) -> Result<Evaluation> {
        let now = chrono::Utc::now().timestamp();
        let weight = normalize(req.weight_percentage);

        let evaluation = match req.details {
            EvaluationDetails::Deliverable(details) => DeliverableActiveModel {
                subject_id: Set(req.subject_id),
                term_id: Set(req.term_id),
                evaluation_type_id: Set(req.evaluation_type_id),
                title: Set(req.title),
                description: Set(req.description),
                weight_percentage: Set(weight),
                assigned_date: Set(details.assigned_date),
                due_date: Set(details.due_date),
                limit_date: Set(details.limit_date),
                max_score: Set(normalize(details.max_score)),
                min_pass_score: Set(normalize(details.min_pass_score)),
                allows_late: Set(details.allows_late),
                late_penalty_percentage: Set(normalize(details.late_penalty_percentage)),
                active: Set(true),
                published: Set(req.published),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(&self.db)
            .await
            .map_err(db_error("创建提交类评价失败"))?
            .into_evaluation(),
            EvaluationDetails::Participation(details) => ParticipationActiveModel {
                subject_id: Set(req.subject_id),
                term_id: Set(req.term_id),
                evaluation_type_id: Set(req.evaluation_type_id),
                title: Set(req.title),
                description: Set(req.description),
                weight_percentage: Set(weight),
                registration_date: Set(details.registration_date),
                criteria: Set(details.criteria),
                active: Set(true),
                published: Set(req.published),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(&self.db)
            .await
            .map_err(db_error("创建参与类评价失败"))?
            .into_evaluation(),
        };

        Ok(evaluation)
    }
}
