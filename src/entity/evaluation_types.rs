//! 评价类型实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "evaluation_types")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::weight_configs::Entity")]
    WeightConfigs,
}

impl Related<super::weight_configs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WeightConfigs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_evaluation_type(self) -> crate::models::academics::entities::EvaluationType {
        crate::models::academics::entities::EvaluationType {
            id: self.id,
            name: self.name,
            description: self.description,
        }
    }
}
