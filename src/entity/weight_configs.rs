//! 权重配置实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "weight_configs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub subject_id: i64,
    pub evaluation_type_id: i64,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub percentage: Decimal,
    pub active: bool,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::subjects::Entity",
        from = "Column::SubjectId",
        to = "super::subjects::Column::Id"
    )]
    Subject,
    #[sea_orm(
        belongs_to = "super::evaluation_types::Entity",
        from = "Column::EvaluationTypeId",
        to = "super::evaluation_types::Column::Id"
    )]
    EvaluationType,
}

impl Related<super::subjects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subject.def()
    }
}

impl Related<super::evaluation_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EvaluationType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_weight_config(self) -> crate::models::weights::entities::WeightConfig {
        use crate::models::weights::entities::WeightConfig;
        use crate::utils::normalize;

        WeightConfig {
            id: self.id,
            subject_id: self.subject_id,
            evaluation_type_id: self.evaluation_type_id,
            percentage: normalize(self.percentage),
            active: self.active,
            updated_at: super::from_timestamp(self.updated_at),
        }
    }
}
