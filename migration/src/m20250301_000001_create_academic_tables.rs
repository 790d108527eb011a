use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建学生表
        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Students::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Students::CourseId).big_integer().not_null())
                    .col(ColumnDef::new(Students::FirstName).string().not_null())
                    .col(ColumnDef::new(Students::LastName).string().not_null())
                    .col(
                        ColumnDef::new(Students::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Students::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建科目表
        manager
            .create_table(
                Table::create()
                    .table(Subjects::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subjects::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Subjects::CourseId).big_integer().not_null())
                    .col(ColumnDef::new(Subjects::Name).string().not_null())
                    .col(ColumnDef::new(Subjects::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建评价类型表
        manager
            .create_table(
                Table::create()
                    .table(EvaluationTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EvaluationTypes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EvaluationTypes::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(EvaluationTypes::Description).text().null())
                    .to_owned(),
            )
            .await?;

        // 创建权重配置表
        manager
            .create_table(
                Table::create()
                    .table(WeightConfigs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WeightConfigs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WeightConfigs::SubjectId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WeightConfigs::EvaluationTypeId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WeightConfigs::Percentage)
                            .decimal_len(5, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WeightConfigs::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(WeightConfigs::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(WeightConfigs::Table, WeightConfigs::SubjectId)
                            .to(Subjects::Table, Subjects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(WeightConfigs::Table, WeightConfigs::EvaluationTypeId)
                            .to(EvaluationTypes::Table, EvaluationTypes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建学期表
        manager
            .create_table(
                Table::create()
                    .table(Terms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Terms::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Terms::Number).integer().not_null())
                    .col(ColumnDef::new(Terms::Year).integer().not_null())
                    .col(ColumnDef::new(Terms::Name).string().not_null())
                    .col(ColumnDef::new(Terms::StartDate).date().not_null())
                    .col(ColumnDef::new(Terms::EndDate).date().not_null())
                    .col(ColumnDef::new(Terms::EvalDeadline).date().not_null())
                    .col(ColumnDef::new(Terms::GradeDeadline).date().not_null())
                    .col(
                        ColumnDef::new(Terms::MinPassScore)
                            .decimal_len(5, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Terms::MinAttendancePct)
                            .decimal_len(5, 2)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Terms::State).string().not_null())
                    .col(ColumnDef::new(Terms::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Terms::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建作业类评价表
        manager
            .create_table(
                Table::create()
                    .table(DeliverableEvaluations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DeliverableEvaluations::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DeliverableEvaluations::SubjectId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeliverableEvaluations::TermId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeliverableEvaluations::EvaluationTypeId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeliverableEvaluations::Title)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeliverableEvaluations::Description)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(DeliverableEvaluations::WeightPercentage)
                            .decimal_len(5, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeliverableEvaluations::AssignedDate)
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeliverableEvaluations::DueDate)
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeliverableEvaluations::LimitDate)
                            .date()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(DeliverableEvaluations::MaxScore)
                            .decimal_len(6, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeliverableEvaluations::MinPassScore)
                            .decimal_len(6, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeliverableEvaluations::AllowsLate)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(DeliverableEvaluations::LatePenaltyPercentage)
                            .decimal_len(5, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeliverableEvaluations::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(DeliverableEvaluations::Published)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(DeliverableEvaluations::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                DeliverableEvaluations::Table,
                                DeliverableEvaluations::SubjectId,
                            )
                            .to(Subjects::Table, Subjects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(DeliverableEvaluations::Table, DeliverableEvaluations::TermId)
                            .to(Terms::Table, Terms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建课堂参与类评价表
        manager
            .create_table(
                Table::create()
                    .table(ParticipationEvaluations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ParticipationEvaluations::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ParticipationEvaluations::SubjectId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ParticipationEvaluations::TermId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ParticipationEvaluations::EvaluationTypeId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ParticipationEvaluations::Title)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ParticipationEvaluations::Description)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ParticipationEvaluations::WeightPercentage)
                            .decimal_len(5, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ParticipationEvaluations::RegistrationDate)
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ParticipationEvaluations::Criteria)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ParticipationEvaluations::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ParticipationEvaluations::Published)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ParticipationEvaluations::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                ParticipationEvaluations::Table,
                                ParticipationEvaluations::SubjectId,
                            )
                            .to(Subjects::Table, Subjects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                ParticipationEvaluations::Table,
                                ParticipationEvaluations::TermId,
                            )
                            .to(Terms::Table, Terms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建成绩表（多态评价引用：evaluation_kind + evaluation_id）
        manager
            .create_table(
                Table::create()
                    .table(Grades::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Grades::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Grades::EvaluationKind).string().not_null())
                    .col(ColumnDef::new(Grades::EvaluationId).big_integer().not_null())
                    .col(ColumnDef::new(Grades::StudentId).big_integer().not_null())
                    .col(ColumnDef::new(Grades::RawScore).decimal_len(6, 2).not_null())
                    .col(
                        ColumnDef::new(Grades::Late)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Grades::PenaltyPercentage)
                            .decimal_len(5, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Grades::FinalScore)
                            .decimal_len(6, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Grades::Finalized)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Grades::GradedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Grades::Table, Grades::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建考勤表
        manager
            .create_table(
                Table::create()
                    .table(Attendance::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Attendance::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Attendance::StudentId).big_integer().not_null())
                    .col(ColumnDef::new(Attendance::SubjectId).big_integer().not_null())
                    .col(ColumnDef::new(Attendance::TermId).big_integer().not_null())
                    .col(ColumnDef::new(Attendance::Date).date().not_null())
                    .col(
                        ColumnDef::new(Attendance::Present)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Attendance::Justified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Attendance::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Attendance::Table, Attendance::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Attendance::Table, Attendance::SubjectId)
                            .to(Subjects::Table, Subjects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Attendance::Table, Attendance::TermId)
                            .to(Terms::Table, Terms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 唯一索引 ====================
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_weight_configs_subject_type")
                    .table(WeightConfigs::Table)
                    .col(WeightConfigs::SubjectId)
                    .col(WeightConfigs::EvaluationTypeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_terms_number_year")
                    .table(Terms::Table)
                    .col(Terms::Number)
                    .col(Terms::Year)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_grades_evaluation_student")
                    .table(Grades::Table)
                    .col(Grades::EvaluationKind)
                    .col(Grades::EvaluationId)
                    .col(Grades::StudentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_attendance_student_subject_date")
                    .table(Attendance::Table)
                    .col(Attendance::StudentId)
                    .col(Attendance::SubjectId)
                    .col(Attendance::Date)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ==================== 查询索引 ====================
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_students_course_id")
                    .table(Students::Table)
                    .col(Students::CourseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_subjects_course_id")
                    .table(Subjects::Table)
                    .col(Subjects::CourseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_deliverables_subject_term")
                    .table(DeliverableEvaluations::Table)
                    .col(DeliverableEvaluations::SubjectId)
                    .col(DeliverableEvaluations::TermId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_participations_subject_term")
                    .table(ParticipationEvaluations::Table)
                    .col(ParticipationEvaluations::SubjectId)
                    .col(ParticipationEvaluations::TermId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_attendance_term_id")
                    .table(Attendance::Table)
                    .col(Attendance::TermId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按照创建的相反顺序删除
        manager
            .drop_table(Table::drop().table(Attendance::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Grades::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ParticipationEvaluations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DeliverableEvaluations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Terms::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WeightConfigs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EvaluationTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Subjects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Students::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Students {
    #[sea_orm(iden = "students")]
    Table,
    Id,
    CourseId,
    FirstName,
    LastName,
    Code,
    CreatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Subjects {
    #[sea_orm(iden = "subjects")]
    Table,
    Id,
    CourseId,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum EvaluationTypes {
    #[sea_orm(iden = "evaluation_types")]
    Table,
    Id,
    Name,
    Description,
}

#[derive(DeriveIden)]
enum WeightConfigs {
    #[sea_orm(iden = "weight_configs")]
    Table,
    Id,
    SubjectId,
    EvaluationTypeId,
    Percentage,
    Active,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Terms {
    #[sea_orm(iden = "terms")]
    Table,
    Id,
    Number,
    Year,
    Name,
    StartDate,
    EndDate,
    EvalDeadline,
    GradeDeadline,
    MinPassScore,
    MinAttendancePct,
    State,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum DeliverableEvaluations {
    #[sea_orm(iden = "deliverable_evaluations")]
    Table,
    Id,
    SubjectId,
    TermId,
    EvaluationTypeId,
    Title,
    Description,
    WeightPercentage,
    AssignedDate,
    DueDate,
    LimitDate,
    MaxScore,
    MinPassScore,
    AllowsLate,
    LatePenaltyPercentage,
    Active,
    Published,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ParticipationEvaluations {
    #[sea_orm(iden = "participation_evaluations")]
    Table,
    Id,
    SubjectId,
    TermId,
    EvaluationTypeId,
    Title,
    Description,
    WeightPercentage,
    RegistrationDate,
    Criteria,
    Active,
    Published,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Grades {
    #[sea_orm(iden = "grades")]
    Table,
    Id,
    EvaluationKind,
    EvaluationId,
    StudentId,
    RawScore,
    Late,
    PenaltyPercentage,
    FinalScore,
    Finalized,
    GradedAt,
}

#[derive(DeriveIden)]
enum Attendance {
    #[sea_orm(iden = "attendance")]
    Table,
    Id,
    StudentId,
    SubjectId,
    TermId,
    Date,
    Present,
    Justified,
    UpdatedAt,
}
