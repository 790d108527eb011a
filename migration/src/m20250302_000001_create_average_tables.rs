use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_academic_tables::{Students, Subjects, Terms};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ==================== 学期平均表 ====================
        manager
            .create_table(
                Table::create()
                    .table(TermAverages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TermAverages::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TermAverages::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TermAverages::SubjectId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TermAverages::TermId).big_integer().not_null())
                    .col(
                        ColumnDef::new(TermAverages::EvaluationAverage)
                            .decimal_len(5, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TermAverages::FinalAverage)
                            .decimal_len(5, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TermAverages::ClassesTotal)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TermAverages::ClassesPresent)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TermAverages::AttendancePct)
                            .decimal_len(5, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TermAverages::Passed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(TermAverages::AutoComputed)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(TermAverages::ComputedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TermAverages::Table, TermAverages::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TermAverages::Table, TermAverages::SubjectId)
                            .to(Subjects::Table, Subjects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TermAverages::Table, TermAverages::TermId)
                            .to(Terms::Table, Terms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 年度平均表 ====================
        manager
            .create_table(
                Table::create()
                    .table(AnnualAverages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AnnualAverages::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AnnualAverages::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AnnualAverages::SubjectId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AnnualAverages::Year).integer().not_null())
                    .col(
                        ColumnDef::new(AnnualAverages::Term1Average)
                            .decimal_len(5, 2)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AnnualAverages::Term2Average)
                            .decimal_len(5, 2)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AnnualAverages::Term3Average)
                            .decimal_len(5, 2)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AnnualAverages::AnnualAverage)
                            .decimal_len(5, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AnnualAverages::AttendancePctAnnual)
                            .decimal_len(5, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AnnualAverages::PassedAnnual)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(AnnualAverages::AutoComputed)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(AnnualAverages::ComputedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AnnualAverages::Table, AnnualAverages::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AnnualAverages::Table, AnnualAverages::SubjectId)
                            .to(Subjects::Table, Subjects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 唯一键：重复计算只会覆盖，不会追加
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_term_averages_student_subject_term")
                    .table(TermAverages::Table)
                    .col(TermAverages::StudentId)
                    .col(TermAverages::SubjectId)
                    .col(TermAverages::TermId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_annual_averages_student_subject_year")
                    .table(AnnualAverages::Table)
                    .col(AnnualAverages::StudentId)
                    .col(AnnualAverages::SubjectId)
                    .col(AnnualAverages::Year)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_term_averages_term_id")
                    .table(TermAverages::Table)
                    .col(TermAverages::TermId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AnnualAverages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TermAverages::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum TermAverages {
    #[sea_orm(iden = "term_averages")]
    Table,
    Id,
    StudentId,
    SubjectId,
    TermId,
    EvaluationAverage,
    FinalAverage,
    ClassesTotal,
    ClassesPresent,
    AttendancePct,
    Passed,
    AutoComputed,
    ComputedAt,
}

#[derive(DeriveIden)]
enum AnnualAverages {
    #[sea_orm(iden = "annual_averages")]
    Table,
    Id,
    StudentId,
    SubjectId,
    Year,
    Term1Average,
    Term2Average,
    Term3Average,
    AnnualAverage,
    AttendancePctAnnual,
    PassedAnnual,
    AutoComputed,
    ComputedAt,
}
