//! 学期实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "terms")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub number: i32,
    pub year: i32,
    pub name: String,
    pub start_date: Date,
    pub end_date: Date,
    pub eval_deadline: Date,
    pub grade_deadline: Date,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub min_pass_score: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub min_attendance_pct: Decimal,
    pub state: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::deliverable_evaluations::Entity")]
    DeliverableEvaluations,
    #[sea_orm(has_many = "super::participation_evaluations::Entity")]
    ParticipationEvaluations,
    #[sea_orm(has_many = "super::attendance::Entity")]
    Attendance,
    #[sea_orm(has_many = "super::term_averages::Entity")]
    TermAverages,
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

impl Related<super::attendance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attendance.def()
    }
}

impl Related<super::term_averages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TermAverages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_term(self) -> crate::models::terms::entities::Term {
        use crate::models::terms::entities::{Term, TermState};
        use crate::utils::normalize;

        Term {
            id: self.id,
            number: self.number,
            year: self.year,
            name: self.name,
            start_date: self.start_date,
            end_date: self.end_date,
            eval_deadline: self.eval_deadline,
            grade_deadline: self.grade_deadline,
            min_pass_score: normalize(self.min_pass_score),
            min_attendance_pct: normalize(self.min_attendance_pct),
            state: self.state.parse::<TermState>().unwrap_or(TermState::Planned),
            created_at: super::from_timestamp(self.created_at),
            updated_at: super::from_timestamp(self.updated_at),
        }
    }
}
