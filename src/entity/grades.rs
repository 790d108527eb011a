//! 成绩实体
//!
//! `evaluation_kind` + `evaluation_id` 组成多态引用，分别指向提交类或参与类评价表。

use sea_orm::entity::prelude::*;

use crate::errors::AggregatorError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "grades")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub evaluation_kind: String,
    pub evaluation_id: i64,
    pub student_id: i64,
    #[sea_orm(column_type = "Decimal(Some((6, 2)))")]
    pub raw_score: Decimal,
    pub late: bool,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub penalty_percentage: Decimal,
    #[sea_orm(column_type = "Decimal(Some((6, 2)))")]
    pub final_score: Decimal,
    pub finalized: bool,
    pub graded_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::students::Entity",
        from = "Column::StudentId",
        to = "super::students::Column::Id"
    )]
    Student,
}

impl Related<super::students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    /// 未知的评价种类视为损坏的成绩记录
    pub fn into_grade(self) -> crate::errors::Result<crate::models::grades::entities::GradeRecord> {
        use crate::models::evaluations::entities::{EvaluationKind, EvaluationRef};
        use crate::models::grades::entities::GradeRecord;
        use crate::utils::normalize;

        let kind = self.evaluation_kind.parse::<EvaluationKind>().map_err(|e| {
            AggregatorError::corrupt_grade(format!("成绩 {} 的评价种类无效: {e}", self.id))
        })?;

        Ok(GradeRecord {
            id: self.id,
            evaluation: EvaluationRef {
                kind,
                id: self.evaluation_id,
            },
            student_id: self.student_id,
            raw_score: normalize(self.raw_score),
            late: self.late,
            penalty_percentage: normalize(self.penalty_percentage),
            final_score: normalize(self.final_score),
            finalized: self.finalized,
            graded_at: super::from_timestamp(self.graded_at),
        })
    }
}
