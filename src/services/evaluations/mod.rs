//! 评价目录服务

pub mod validator;

use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::errors::{AggregatorError, Result};
use crate::models::evaluations::{
    entities::{Evaluation, EvaluationRef},
    requests::CreateEvaluationRequest,
};
use crate::storage::Storage;
use crate::utils::normalize;

pub use validator::{validate_details, validate_evaluation_weight, validate_type_share};

pub struct EvaluationService {
    storage: Arc<dyn Storage>,
}

impl EvaluationService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// 创建评价
    ///
    /// 评价类型必须已有有效权重配置，且同类型评价的权重合计不能超过该配置。
    pub async fn create_evaluation(&self, mut req: CreateEvaluationRequest) -> Result<Evaluation> {
        req.weight_percentage = normalize(req.weight_percentage);
        validate_evaluation_weight(req.weight_percentage)?;
        validate_details(&req.details)?;

        if self.storage.get_subject(req.subject_id).await?.is_none() {
            return Err(AggregatorError::not_found(format!(
                "科目 {} 不存在",
                req.subject_id
            )));
        }
        if self
            .storage
            .get_evaluation_type(req.evaluation_type_id)
            .await?
            .is_none()
        {
            return Err(AggregatorError::not_found(format!(
                "评价类型 {} 不存在",
                req.evaluation_type_id
            )));
        }
        let Some(term) = self.storage.get_term(req.term_id).await? else {
            return Err(AggregatorError::not_found(format!(
                "学期 {} 不存在",
                req.term_id
            )));
        };

        if req.enforce_deadlines {
            let today = req.as_of.unwrap_or_else(|| Utc::now().date_naive());
            if !term.can_register_evaluations(today) {
                return Err(AggregatorError::validation(format!(
                    "学期 {} 当前不允许登记评价 (状态: {}, 截止: {})",
                    term.id, term.state, term.eval_deadline
                )));
            }
        }

        let config = self
            .storage
            .get_weight_config_for(req.subject_id, req.evaluation_type_id)
            .await?
            .filter(|c| c.active)
            .ok_or_else(|| {
                AggregatorError::validation(format!(
                    "科目 {} 尚未为评价类型 {} 配置有效权重",
                    req.subject_id, req.evaluation_type_id
                ))
            })?;

        let existing: Vec<_> = self
            .storage
            .active_evaluations_of_type(req.subject_id, req.evaluation_type_id, Some(req.term_id))
            .await?
            .into_iter()
            .map(|e| e.weight_percentage)
            .collect();
        validate_type_share(&existing, req.weight_percentage, config.percentage)?;

        let evaluation = self.storage.create_evaluation(req).await?;
        info!(
            "Evaluation {} created for subject {} in term {} with weight {}%",
            evaluation.reference(),
            evaluation.subject_id,
            evaluation.term_id,
            evaluation.weight_percentage
        );
        Ok(evaluation)
    }

    pub async fn get_evaluation(&self, evaluation: EvaluationRef) -> Result<Evaluation> {
        self.storage
            .get_evaluation(evaluation)
            .await?
            .ok_or_else(|| AggregatorError::not_found(format!("评价 {evaluation} 不存在")))
    }
}
