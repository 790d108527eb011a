//! 学年平均实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "annual_averages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: i64,
    pub subject_id: i64,
    pub year: i32,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))", nullable)]
    pub term1_average: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))", nullable)]
    pub term2_average: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))", nullable)]
    pub term3_average: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub annual_average: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub attendance_pct_annual: Decimal,
    pub passed_annual: bool,
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
}

impl Related<super::students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_annual_average(self) -> crate::models::averages::entities::AnnualAverage {
        use crate::models::averages::entities::{AnnualAverage, AnnualAverageFields};
        use crate::utils::normalize;

        AnnualAverage {
            id: self.id,
            student_id: self.student_id,
            subject_id: self.subject_id,
            year: self.year,
            fields: AnnualAverageFields {
                term1_average: self.term1_average.map(normalize),
                term2_average: self.term2_average.map(normalize),
                term3_average: self.term3_average.map(normalize),
                annual_average: normalize(self.annual_average),
                attendance_pct_annual: normalize(self.attendance_pct_annual),
                passed_annual: self.passed_annual,
            },
            auto_computed: self.auto_computed,
            computed_at: super::from_timestamp(self.computed_at),
        }
    }
}
