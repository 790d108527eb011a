//! 权重配置服务

pub mod validator;

use std::fmt;
use std::sync::Arc;
use tracing::info;

use crate::errors::{AggregatorError, Result, WeightConfigError};
use crate::models::weights::{
    requests::SetWeightRequest,
    responses::{SetWeightResponse, WeightSummary},
};
use crate::storage::Storage;
use crate::utils::normalize;

pub use validator::{available, check_weight};

/// 设置权重的错误：校验拒绝（带结构化负载）或存储失败
#[derive(Debug, Clone, PartialEq)]
pub enum WeightError {
    Rejected(WeightConfigError),
    Storage(AggregatorError),
}

impl fmt::Display for WeightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightError::Rejected(e) => write!(f, "{e}"),
            WeightError::Storage(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for WeightError {}

impl From<AggregatorError> for WeightError {
    fn from(err: AggregatorError) -> Self {
        WeightError::Storage(err)
    }
}

impl From<WeightError> for AggregatorError {
    fn from(err: WeightError) -> Self {
        match err {
            WeightError::Rejected(e) => e.into(),
            WeightError::Storage(e) => e,
        }
    }
}

pub struct WeightService {
    storage: Arc<dyn Storage>,
}

impl WeightService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// 设置 (科目, 评价类型) 的权重，写入或覆盖并重新激活
    ///
    /// 不会修改已有评价。
    pub async fn set_weight(
        &self,
        req: SetWeightRequest,
    ) -> std::result::Result<SetWeightResponse, WeightError> {
        // 先做范围校验（其余为 0 时只可能越界），溢出校验在存储事务内完成
        check_weight(rust_decimal::Decimal::ZERO, req.percentage).map_err(WeightError::Rejected)?;

        if self.storage.get_subject(req.subject_id).await?.is_none() {
            return Err(AggregatorError::not_found(format!("科目 {} 不存在", req.subject_id)).into());
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
            ))
            .into());
        }

        let write = self
            .storage
            .upsert_weight_config(req, check_weight)
            .await?
            .map_err(WeightError::Rejected)?;

        let remaining = available(write.others_total + write.config.percentage);
        info!(
            "Weight config {} for subject {} set to {}% ({:?}), {}% remaining",
            write.config.id,
            write.config.subject_id,
            write.config.percentage,
            write.action,
            remaining
        );

        Ok(SetWeightResponse {
            config: write.config,
            action: write.action,
            available: remaining,
        })
    }

    /// 删除权重配置；该 (科目, 类型) 下仍有有效评价时拒绝
    pub async fn remove_weight(&self, config_id: i64) -> Result<()> {
        let Some(config) = self.storage.get_weight_config(config_id).await? else {
            return Err(AggregatorError::not_found(format!(
                "权重配置 {config_id} 不存在"
            )));
        };

        let in_use = self
            .storage
            .active_evaluations_of_type(config.subject_id, config.evaluation_type_id, None)
            .await?;
        if !in_use.is_empty() {
            return Err(AggregatorError::validation(format!(
                "仍有 {} 个有效评价使用该评价类型，无法删除权重配置",
                in_use.len()
            )));
        }

        self.storage.delete_weight_config(config_id).await?;
        info!("Weight config {} removed", config_id);
        Ok(())
    }

    /// 科目权重汇总
    pub async fn weight_summary(&self, subject_id: i64) -> Result<WeightSummary> {
        if self.storage.get_subject(subject_id).await?.is_none() {
            return Err(AggregatorError::not_found(format!("科目 {subject_id} 不存在")));
        }

        let configs: Vec<_> = self
            .storage
            .list_weight_configs(subject_id)
            .await?
            .into_iter()
            .filter(|c| c.active)
            .collect();
        let assigned_total = normalize(configs.iter().map(|c| c.percentage).sum());

        Ok(WeightSummary {
            subject_id,
            available: available(assigned_total),
            assigned_total,
            configs,
        })
    }
}
