//! 参与类评价实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "participation_evaluations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub subject_id: i64,
    pub term_id: i64,
    pub evaluation_type_id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub weight_percentage: Decimal,
    pub registration_date: Date,
    #[sea_orm(column_type = "Text", nullable)]
    pub criteria: Option<String>,
    pub active: bool,
    pub published: bool,
    pub created_at: i64,
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
        belongs_to = "super::terms::Entity",
        from = "Column::TermId",
        to = "super::terms::Column::Id"
    )]
    Term,
}

impl Related<super::subjects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subject.def()
    }
}

impl Related<super::terms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Term.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_evaluation(self) -> crate::models::evaluations::entities::Evaluation {
        use crate::models::evaluations::entities::{
            Evaluation, EvaluationDetails, ParticipationDetails,
        };

        Evaluation {
            id: self.id,
            subject_id: self.subject_id,
            term_id: self.term_id,
            evaluation_type_id: self.evaluation_type_id,
            title: self.title,
            description: self.description,
            weight_percentage: crate::utils::normalize(self.weight_percentage),
            active: self.active,
            published: self.published,
            details: EvaluationDetails::Participation(ParticipationDetails {
                registration_date: self.registration_date,
                criteria: self.criteria,
            }),
            created_at: super::from_timestamp(self.created_at),
        }
    }
}
