use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::ops::RangeInclusive;
use std::sync::Arc;

use crate::errors::{Result, WeightConfigError};
use crate::models::{
    UpsertAction,
    academics::{
        entities::{EvaluationType, Student, Subject},
        requests::{CreateEvaluationTypeRequest, CreateStudentRequest, CreateSubjectRequest},
    },
    attendance::{entities::AttendanceRecord, requests::AttendanceWrite},
    averages::entities::{
        AnnualAverage, AnnualAverageFields, AnnualAverageKey, TermAverage, TermAverageFields,
        TermAverageKey,
    },
    evaluations::{
        entities::{Evaluation, EvaluationRef},
        requests::CreateEvaluationRequest,
    },
    grades::{entities::GradeRecord, requests::GradeWrite},
    terms::{
        entities::{Term, TermState},
        requests::NewTerm,
    },
    weights::{entities::WeightConfig, requests::SetWeightRequest},
};

pub mod sea_orm_storage;

/// 权重写入前的校验：(其余有效权重之和, 新百分比)
pub type WeightCheck = fn(Decimal, Decimal) -> std::result::Result<(), WeightConfigError>;

/// 权重写入结果
#[derive(Debug, Clone)]
pub struct WeightWrite {
    pub config: WeightConfig,
    pub action: UpsertAction,
    // 同一科目其余有效权重之和
    pub others_total: Decimal,
}

/// 学籍数据：学生与科目
#[async_trait::async_trait]
pub trait RosterProvider: Send + Sync {
    // 某课程的学生
    async fn students_of(&self, course_id: i64) -> Result<Vec<Student>>;
    // 多个课程的学生（批量）
    async fn students_of_courses(&self, course_ids: &[i64]) -> Result<Vec<Student>>;
    // 某课程的科目
    async fn subjects_of(&self, course_id: i64) -> Result<Vec<Subject>>;
    // 列出科目，ids 为 None 时返回全部
    async fn list_subjects(&self, ids: Option<&[i64]>) -> Result<Vec<Subject>>;
    async fn get_student(&self, id: i64) -> Result<Option<Student>>;
    async fn get_students(&self, ids: &[i64]) -> Result<Vec<Student>>;
}

/// 学期数据
#[async_trait::async_trait]
pub trait TermProvider: Send + Sync {
    async fn get_term(&self, id: i64) -> Result<Option<Term>>;
    // 某学年的全部学期，按序号排序
    async fn terms_of_year(&self, year: i32) -> Result<Vec<Term>>;
    // 包含该日期的学期
    async fn term_for_date(&self, date: NaiveDate) -> Result<Option<Term>>;
}

/// 评价目录
#[async_trait::async_trait]
pub trait EvaluationProvider: Send + Sync {
    // 指定科目在某学期的全部有效评价（两种变体）
    async fn active_evaluations(&self, subject_ids: &[i64], term_id: i64)
    -> Result<Vec<Evaluation>>;
    async fn get_evaluation(&self, evaluation: EvaluationRef) -> Result<Option<Evaluation>>;
}

/// 成绩台账
#[async_trait::async_trait]
pub trait GradeProvider: Send + Sync {
    async fn grade_of(&self, evaluation: EvaluationRef, student_id: i64)
    -> Result<Option<GradeRecord>>;
    // 批量读取成绩
    async fn grades_for(
        &self,
        evaluations: &[EvaluationRef],
        student_ids: &[i64],
    ) -> Result<Vec<GradeRecord>>;
}

/// 出勤台账
#[async_trait::async_trait]
pub trait AttendanceProvider: Send + Sync {
    async fn attendance_of(
        &self,
        student_id: i64,
        subject_id: i64,
        range: &RangeInclusive<NaiveDate>,
    ) -> Result<Vec<AttendanceRecord>>;
    // 批量读取出勤
    async fn attendance_for(
        &self,
        student_ids: &[i64],
        subject_ids: &[i64],
        range: &RangeInclusive<NaiveDate>,
    ) -> Result<Vec<AttendanceRecord>>;
}

/// 平均成绩的读取与写入
#[async_trait::async_trait]
pub trait AveragePersistence: Send + Sync {
    async fn term_averages_for(
        &self,
        term_ids: &[i64],
        subject_ids: Option<&[i64]>,
        student_ids: Option<&[i64]>,
    ) -> Result<Vec<TermAverage>>;
    // 按 (学生, 科目, 学期) 写入或覆盖
    async fn upsert_term_average(
        &self,
        key: TermAverageKey,
        fields: TermAverageFields,
    ) -> Result<(TermAverage, UpsertAction)>;
    async fn annual_averages_for(
        &self,
        year: i32,
        subject_ids: Option<&[i64]>,
        student_ids: Option<&[i64]>,
    ) -> Result<Vec<AnnualAverage>>;
    // 按 (学生, 科目, 学年) 写入或覆盖
    async fn upsert_annual_average(
        &self,
        key: AnnualAverageKey,
        fields: AnnualAverageFields,
    ) -> Result<(AnnualAverage, UpsertAction)>;
}

/// 批处理事务边界：所有读写都在同一事务中，整体提交或回滚
#[async_trait::async_trait]
pub trait BatchScope:
    RosterProvider
    + TermProvider
    + EvaluationProvider
    + GradeProvider
    + AttendanceProvider
    + AveragePersistence
{
    async fn commit(self: Box<Self>) -> Result<()>;
    async fn rollback(self: Box<Self>) -> Result<()>;
}

#[async_trait::async_trait]
pub trait Storage:
    RosterProvider
    + TermProvider
    + EvaluationProvider
    + GradeProvider
    + AttendanceProvider
    + AveragePersistence
{
    /// 学籍管理方法
    async fn create_student(&self, req: CreateStudentRequest) -> Result<Student>;
    async fn create_subject(&self, req: CreateSubjectRequest) -> Result<Subject>;
    async fn get_subject(&self, id: i64) -> Result<Option<Subject>>;
    async fn create_evaluation_type(
        &self,
        req: CreateEvaluationTypeRequest,
    ) -> Result<EvaluationType>;
    async fn get_evaluation_type(&self, id: i64) -> Result<Option<EvaluationType>>;

    /// 学期管理方法
    async fn create_term(&self, term: NewTerm) -> Result<Term>;
    async fn get_term_by_number_and_year(&self, number: i32, year: i32) -> Result<Option<Term>>;
    // 更新学期状态，学期不存在时返回 None
    async fn update_term_state(&self, term_id: i64, state: TermState) -> Result<Option<Term>>;

    /// 权重配置方法
    // 在同一事务内校验并写入，校验失败时返回内层 Err
    async fn upsert_weight_config(
        &self,
        req: SetWeightRequest,
        check: WeightCheck,
    ) -> Result<std::result::Result<WeightWrite, WeightConfigError>>;
    async fn get_weight_config(&self, id: i64) -> Result<Option<WeightConfig>>;
    async fn get_weight_config_for(
        &self,
        subject_id: i64,
        evaluation_type_id: i64,
    ) -> Result<Option<WeightConfig>>;
    async fn list_weight_configs(&self, subject_id: i64) -> Result<Vec<WeightConfig>>;
    async fn delete_weight_config(&self, id: i64) -> Result<bool>;

    /// 评价管理方法
    async fn create_evaluation(&self, req: CreateEvaluationRequest) -> Result<Evaluation>;
    // 某科目、某评价类型的有效评价（term_id 为 None 时跨学期）
    async fn active_evaluations_of_type(
        &self,
        subject_id: i64,
        evaluation_type_id: i64,
        term_id: Option<i64>,
    ) -> Result<Vec<Evaluation>>;

    /// 成绩与出勤
    async fn upsert_grade(&self, grade: GradeWrite) -> Result<(GradeRecord, UpsertAction)>;
    async fn grades_of_evaluation(&self, evaluation: EvaluationRef) -> Result<Vec<GradeRecord>>;
    async fn upsert_attendance(
        &self,
        record: AttendanceWrite,
    ) -> Result<(AttendanceRecord, UpsertAction)>;

    /// 开启批处理事务
    async fn begin_batch(&self) -> Result<Box<dyn BatchScope>>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
