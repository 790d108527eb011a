//! 科目实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "subjects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: i64,
    pub name: String,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::weight_configs::Entity")]
    WeightConfigs,
    #[sea_orm(has_many = "super::deliverable_evaluations::Entity")]
    DeliverableEvaluations,
    #[sea_orm(has_many = "super::participation_evaluations::Entity")]
    ParticipationEvaluations,
}

impl Related<super::weight_configs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WeightConfigs.def()
    }
}

impl Related<super::deliverable_evaluations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeliverableEvaluations.def()
    }
}

impl Related<super::participation_evaluations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ParticipationEvaluations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_subject(self) -> crate::models::academics::entities::Subject {
        use crate::models::academics::entities::Subject;

        Subject {
            id: self.id,
            course_id: self.course_id,
            name: self.name,
            created_at: super::from_timestamp(self.created_at),
        }
    }
}
