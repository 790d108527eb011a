//! 学期平均实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "term_averages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: i64,
    pub subject_id: i64,
    pub term_id: i64,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub evaluation_average: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub final_average: Decimal,
    pub classes_total: i32,
    pub classes_present: i32,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub attendance_pct: Decimal,
    pub passed: bool,
    pub auto_computed: bool,
    pub computed_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::students::Entity",
        from = "Column::StudentId",
        to = "super::students::Column::Id"
    )]
    Student,
    #[sea_orm(
        belongs_to = "super::terms::Entity",
        from = "Column::TermId",
        to = "super::terms::Column::Id"
    )]
    Term,
}

impl Related<super::students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::terms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Term.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_term_average(self) -> crate::models::averages::entities::TermAverage {
        use crate::models::averages::entities::{TermAverage, TermAverageFields};
        use crate::utils::normalize;

        TermAverage {
            id: self.id,
            student_id: self.student_id,
            subject_id: self.subject_id,
            term_id: self.term_id,
            fields: TermAverageFields {
                evaluation_average: normalize(self.evaluation_average),
                final_average: normalize(self.final_average),
                classes_total: self.classes_total,
                classes_present: self.classes_present,
                attendance_pct: normalize(self.attendance_pct),
                passed: self.passed,
            },
            auto_computed: self.auto_computed,
            computed_at: super::from_timestamp(self.computed_at),
        }
    }
}
