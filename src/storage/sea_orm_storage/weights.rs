//! 权重配置存储操作

use super::{SeaOrmStorage, db_error, write_isolation};
use crate::entity::weight_configs::{ActiveModel, Column, Entity as WeightConfigs};
use crate::errors::{Result, WeightConfigError};
use crate::models::{
    UpsertAction,
    weights::{entities::WeightConfig, requests::SetWeightRequest},
};
use crate::storage::{WeightCheck, WeightWrite};
use crate::utils::normalize;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 校验并写入权重配置
    ///
    /// 读取其余有效权重、校验、写入在同一可串行化事务中完成。
    /// 同一科目的并发写入中，后提交者以 `TransactionConflict` 失败，总和不会突破 100%。
    pub async fn upsert_weight_config_impl(
        &self,
        req: SetWeightRequest,
        check: WeightCheck,
    ) -> Result<std::result::Result<WeightWrite, WeightConfigError>> {
        let txn = self
            .db
            .begin_with_config(write_isolation(self.db.get_database_backend()), None)
            .await
            .map_err(db_error("开启权重配置事务失败"))?;

        let configs = WeightConfigs::find()
            .filter(Column::SubjectId.eq(req.subject_id))
            .all(&txn)
            .await
            .map_err(db_error("查询权重配置失败"))?;

        let others_total = normalize(
            configs
                .iter()
                .filter(|c| c.active && c.evaluation_type_id != req.evaluation_type_id)
                .map(|c| normalize(c.percentage))
                .sum::<Decimal>(),
        );

        let percentage = normalize(req.percentage);
        if let Err(rejected) = check(others_total, percentage) {
            // 事务随 txn 析构回滚
            return Ok(Err(rejected));
        }

        let now = chrono::Utc::now().timestamp();
        let existing = configs
            .into_iter()
            .find(|c| c.evaluation_type_id == req.evaluation_type_id);

        let (model, action) = match existing {
            Some(model) => {
                let mut active = model.into_active_model();
                active.percentage = Set(percentage);
                active.active = Set(true);
                active.updated_at = Set(now);
                let updated = active
                    .update(&txn)
                    .await
                    .map_err(db_error("更新权重配置失败"))?;
                (updated, UpsertAction::Updated)
            }
            None => {
                let created = ActiveModel {
                    subject_id: Set(req.subject_id),
                    evaluation_type_id: Set(req.evaluation_type_id),
                    percentage: Set(percentage),
                    active: Set(true),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&txn)
                .await
                .map_err(db_error("创建权重配置失败"))?;
                (created, UpsertAction::Created)
            }
        };

        txn.commit()
            .await
            .map_err(db_error("提交权重配置事务失败"))?;

        Ok(Ok(WeightWrite {
            config: model.into_weight_config(),
            action,
            others_total,
        }))
    }

    /// 通过 ID 获取权重配置
    pub async fn get_weight_config_impl(&self, id: i64) -> Result<Option<WeightConfig>> {
        let result = WeightConfigs::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error("查询权重配置失败"))?;

        Ok(result.map(|m| m.into_weight_config()))
    }

    /// 通过 (科目, 评价类型) 获取权重配置
    pub async fn get_weight_config_for_impl(
        &self,
        subject_id: i64,
        evaluation_type_id: i64,
    ) -> Result<Option<WeightConfig>> {
        let result = WeightConfigs::find()
            .filter(Column::SubjectId.eq(subject_id))
            .filter(Column::EvaluationTypeId.eq(evaluation_type_id))
            .one(&self.db)
            .await
            .map_err(db_error("查询权重配置失败"))?;

        Ok(result.map(|m| m.into_weight_config()))
    }

    /// 列出科目的全部权重配置
    pub async fn list_weight_configs_impl(&self, subject_id: i64) -> Result<Vec<WeightConfig>> {
        let rows = WeightConfigs::find()
            .filter(Column::SubjectId.eq(subject_id))
            .order_by_asc(Column::EvaluationTypeId)
            .all(&self.db)
            .await
            .map_err(db_error("查询权重配置列表失败"))?;

        Ok(rows.into_iter().map(|m| m.into_weight_config()).collect())
    }

    /// 删除权重配置
    pub async fn delete_weight_config_impl(&self, id: i64) -> Result<bool> {
        let Some(model) = WeightConfigs::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error("查询权重配置失败"))?
        else {
            return Ok(false);
        };

        let result = model
            .delete(&self.db)
            .await
            .map_err(db_error("删除权重配置失败"))?;

        Ok(result.rows_affected > 0)
    }
}
