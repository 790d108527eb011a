//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。
//! 读取与写入函数对 `ConnectionTrait` 泛型，同一份实现既服务于普通连接，
//! 也服务于批处理事务 [`SeaOrmBatch`]。

mod academics;
mod attendance;
mod averages;
mod evaluations;
mod grades;
mod terms;
mod weights;

use crate::config::AppConfig;
use crate::errors::{AggregatorError, Result, is_conflict_message};
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ConnectOptions, Database, DatabaseConnection, DatabaseTransaction,
    DbBackend, DbErr, IsolationLevel, TransactionTrait,
};
use std::time::Duration;
use tracing::{debug, info};

/// IN 查询单批参数上限，避免超过 SQLite 的绑定变量限制
pub(crate) const IN_CHUNK: usize = 500;

/// 将数据库错误映射为业务错误，并识别可重试的并发冲突
pub(crate) fn db_error(context: &'static str) -> impl Fn(DbErr) -> AggregatorError {
    move |e| {
        let message = format!("{context}: {e}");
        if is_conflict_message(&message) {
            AggregatorError::transaction_conflict(message)
        } else {
            AggregatorError::database_operation(message)
        }
    }
}

/// 读后写事务的隔离级别
///
/// PostgreSQL / MySQL 使用 SERIALIZABLE；SQLite 的写事务本身即串行，沿用默认。
pub(crate) fn write_isolation(backend: DbBackend) -> Option<IsolationLevel> {
    match backend {
        DbBackend::Sqlite => None,
        _ => Some(IsolationLevel::Serializable),
    }
}

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        let storage = Self::from_connection(db).await?;
        info!("SeaORM 存储初始化完成，数据库: {}", db_url);
        Ok(storage)
    }

    /// 使用已有连接创建存储并运行迁移（测试中用于内存数据库）
    pub async fn from_connection(db: DatabaseConnection) -> Result<Self> {
        Migrator::up(&db, None)
            .await
            .map_err(|e| AggregatorError::database_operation(format!("数据库迁移失败: {e}")))?;

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| AggregatorError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true)
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| {
                AggregatorError::database_connection(format!("SQLite 连接失败: {e}"))
            })?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false);

        Database::connect(opt)
            .await
            .map_err(|e| AggregatorError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url == ":memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(AggregatorError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }

    /// 开启批处理事务
    async fn begin_batch_impl(&self) -> Result<SeaOrmBatch> {
        let isolation = write_isolation(self.db.get_database_backend());

        let txn = self
            .db
            .begin_with_config(isolation, None)
            .await
            .map_err(db_error("开启批处理事务失败"))?;

        debug!("Batch transaction opened (isolation: {:?})", isolation);
        Ok(SeaOrmBatch { txn })
    }
}

/// 批处理事务，Drop 时未提交则自动回滚
pub struct SeaOrmBatch {
    pub(crate) txn: DatabaseTransaction,
}

// 读取类 trait 的实现对连接与事务完全一致，用宏生成
macro_rules! impl_providers {
    ($target:ty, $conn:ident) => {
        #[async_trait::async_trait]
        impl crate::storage::RosterProvider for $target {
            async fn students_of(
                &self,
                course_id: i64,
            ) -> Result<Vec<crate::models::academics::entities::Student>> {
                academics::students_of_courses(&self.$conn, &[course_id]).await
            }

            async fn students_of_courses(
                &self,
                course_ids: &[i64],
            ) -> Result<Vec<crate::models::academics::entities::Student>> {
                academics::students_of_courses(&self.$conn, course_ids).await
            }

            async fn subjects_of(
                &self,
                course_id: i64,
            ) -> Result<Vec<crate::models::academics::entities::Subject>> {
                academics::subjects_of(&self.$conn, course_id).await
            }

            async fn list_subjects(
                &self,
                ids: Option<&[i64]>,
            ) -> Result<Vec<crate::models::academics::entities::Subject>> {
                academics::list_subjects(&self.$conn, ids).await
            }

            async fn get_student(
                &self,
                id: i64,
            ) -> Result<Option<crate::models::academics::entities::Student>> {
                academics::get_student(&self.$conn, id).await
            }

            async fn get_students(
                &self,
                ids: &[i64],
            ) -> Result<Vec<crate::models::academics::entities::Student>> {
                academics::get_students(&self.$conn, ids).await
            }
        }

        #[async_trait::async_trait]
        impl crate::storage::TermProvider for $target {
            async fn get_term(
                &self,
                id: i64,
            ) -> Result<Option<crate::models::terms::entities::Term>> {
                terms::get_term(&self.$conn, id).await
            }

            async fn terms_of_year(
                &self,
                year: i32,
            ) -> Result<Vec<crate::models::terms::entities::Term>> {
                terms::terms_of_year(&self.$conn, year).await
            }

            async fn term_for_date(
                &self,
                date: chrono::NaiveDate,
            ) -> Result<Option<crate::models::terms::entities::Term>> {
                terms::term_for_date(&self.$conn, date).await
            }
        }

        #[async_trait::async_trait]
        impl crate::storage::EvaluationProvider for $target {
            async fn active_evaluations(
                &self,
                subject_ids: &[i64],
                term_id: i64,
            ) -> Result<Vec<crate::models::evaluations::entities::Evaluation>> {
                evaluations::active_evaluations(&self.$conn, subject_ids, term_id).await
            }

            async fn get_evaluation(
                &self,
                evaluation: crate::models::evaluations::entities::EvaluationRef,
            ) -> Result<Option<crate::models::evaluations::entities::Evaluation>> {
                evaluations::get_evaluation(&self.$conn, evaluation).await
            }
        }

        #[async_trait::async_trait]
        impl crate::storage::GradeProvider for $target {
            async fn grade_of(
                &self,
                evaluation: crate::models::evaluations::entities::EvaluationRef,
                student_id: i64,
            ) -> Result<Option<crate::models::grades::entities::GradeRecord>> {
                grades::grade_of(&self.$conn, evaluation, student_id).await
            }

            async fn grades_for(
                &self,
                evaluations: &[crate::models::evaluations::entities::EvaluationRef],
                student_ids: &[i64],
            ) -> Result<Vec<crate::models::grades::entities::GradeRecord>> {
                grades::grades_for(&self.$conn, evaluations, student_ids).await
            }
        }

        #[async_trait::async_trait]
        impl crate::storage::AttendanceProvider for $target {
            async fn attendance_of(
                &self,
                student_id: i64,
                subject_id: i64,
                range: &std::ops::RangeInclusive<chrono::NaiveDate>,
            ) -> Result<Vec<crate::models::attendance::entities::AttendanceRecord>> {
                attendance::attendance_for(&self.$conn, &[student_id], &[subject_id], range).await
            }

            async fn attendance_for(
                &self,
                student_ids: &[i64],
                subject_ids: &[i64],
                range: &std::ops::RangeInclusive<chrono::NaiveDate>,
            ) -> Result<Vec<crate::models::attendance::entities::AttendanceRecord>> {
                attendance::attendance_for(&self.$conn, student_ids, subject_ids, range).await
            }
        }

        #[async_trait::async_trait]
        impl crate::storage::AveragePersistence for $target {
            async fn term_averages_for(
                &self,
                term_ids: &[i64],
                subject_ids: Option<&[i64]>,
                student_ids: Option<&[i64]>,
            ) -> Result<Vec<crate::models::averages::entities::TermAverage>> {
                averages::term_averages_for(&self.$conn, term_ids, subject_ids, student_ids).await
            }

            async fn upsert_term_average(
                &self,
                key: crate::models::averages::entities::TermAverageKey,
                fields: crate::models::averages::entities::TermAverageFields,
            ) -> Result<(
                crate::models::averages::entities::TermAverage,
                crate::models::UpsertAction,
            )> {
                averages::upsert_term_average(&self.$conn, key, fields).await
            }

            async fn annual_averages_for(
                &self,
                year: i32,
                subject_ids: Option<&[i64]>,
                student_ids: Option<&[i64]>,
            ) -> Result<Vec<crate::models::averages::entities::AnnualAverage>> {
                averages::annual_averages_for(&self.$conn, year, subject_ids, student_ids).await
            }

            async fn upsert_annual_average(
                &self,
                key: crate::models::averages::entities::AnnualAverageKey,
                fields: crate::models::averages::entities::AnnualAverageFields,
            ) -> Result<(
                crate::models::averages::entities::AnnualAverage,
                crate::models::UpsertAction,
            )> {
                averages::upsert_annual_average(&self.$conn, key, fields).await
            }
        }
    };
}

impl_providers!(SeaOrmStorage, db);
impl_providers!(SeaOrmBatch, txn);

#[async_trait::async_trait]
impl crate::storage::BatchScope for SeaOrmBatch {
    async fn commit(self: Box<Self>) -> Result<()> {
        self.txn.commit().await.map_err(db_error("提交批处理事务失败"))
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.txn
            .rollback()
            .await
            .map_err(db_error("回滚批处理事务失败"))
    }
}

// Storage trait 实现
use crate::errors::WeightConfigError;
use crate::models::{
    UpsertAction,
    academics::{
        entities::{EvaluationType, Student, Subject},
        requests::{CreateEvaluationTypeRequest, CreateStudentRequest, CreateSubjectRequest},
    },
    attendance::{entities::AttendanceRecord, requests::AttendanceWrite},
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
use crate::storage::{BatchScope, Storage, WeightCheck, WeightWrite};
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 学籍模块
    async fn create_student(&self, req: CreateStudentRequest) -> Result<Student> {
        self.create_student_impl(req).await
    }

    async fn create_subject(&self, req: CreateSubjectRequest) -> Result<Subject> {
        self.create_subject_impl(req).await
    }

    async fn get_subject(&self, id: i64) -> Result<Option<Subject>> {
        academics::get_subject(&self.db, id).await
    }

    async fn create_evaluation_type(
        &self,
        req: CreateEvaluationTypeRequest,
    ) -> Result<EvaluationType> {
        self.create_evaluation_type_impl(req).await
    }

    async fn get_evaluation_type(&self, id: i64) -> Result<Option<EvaluationType>> {
        self.get_evaluation_type_impl(id).await
    }

    // 学期模块
    async fn create_term(&self, term: NewTerm) -> Result<Term> {
        self.create_term_impl(term).await
    }

    async fn get_term_by_number_and_year(&self, number: i32, year: i32) -> Result<Option<Term>> {
        self.get_term_by_number_and_year_impl(number, year).await
    }

    async fn update_term_state(&self, term_id: i64, state: TermState) -> Result<Option<Term>> {
        self.update_term_state_impl(term_id, state).await
    }

    // 权重模块
    async fn upsert_weight_config(
        &self,
        req: SetWeightRequest,
        check: WeightCheck,
    ) -> Result<std::result::Result<WeightWrite, WeightConfigError>> {
        self.upsert_weight_config_impl(req, check).await
    }

    async fn get_weight_config(&self, id: i64) -> Result<Option<WeightConfig>> {
        self.get_weight_config_impl(id).await
    }

    async fn get_weight_config_for(
        &self,
        subject_id: i64,
        evaluation_type_id: i64,
    ) -> Result<Option<WeightConfig>> {
        self.get_weight_config_for_impl(subject_id, evaluation_type_id)
            .await
    }

    async fn list_weight_configs(&self, subject_id: i64) -> Result<Vec<WeightConfig>> {
        self.list_weight_configs_impl(subject_id).await
    }

    async fn delete_weight_config(&self, id: i64) -> Result<bool> {
        self.delete_weight_config_impl(id).await
    }

    // 评价模块
    async fn create_evaluation(&self, req: CreateEvaluationRequest) -> Result<Evaluation> {
        self.create_evaluation_impl(req).await
    }

    async fn active_evaluations_of_type(
        &self,
        subject_id: i64,
        evaluation_type_id: i64,
        term_id: Option<i64>,
    ) -> Result<Vec<Evaluation>> {
        evaluations::active_evaluations_of_type(&self.db, subject_id, evaluation_type_id, term_id)
            .await
    }

    // 成绩与出勤模块
    async fn upsert_grade(&self, grade: GradeWrite) -> Result<(GradeRecord, UpsertAction)> {
        self.upsert_grade_impl(grade).await
    }

    async fn grades_of_evaluation(&self, evaluation: EvaluationRef) -> Result<Vec<GradeRecord>> {
        grades::grades_of_evaluation(&self.db, evaluation).await
    }

    async fn upsert_attendance(
        &self,
        record: AttendanceWrite,
    ) -> Result<(AttendanceRecord, UpsertAction)> {
        self.upsert_attendance_impl(record).await
    }

    // 批处理
    async fn begin_batch(&self) -> Result<Box<dyn BatchScope>> {
        Ok(Box::new(self.begin_batch_impl().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("grades.db").unwrap(),
            "sqlite://grades.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url(":memory:").unwrap(),
            "sqlite::memory:"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url("postgres://u:p@localhost/school").unwrap(),
            "postgres://u:p@localhost/school"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url("ftp://nowhere").unwrap_err().code(),
            "E002"
        );
    }

    #[test]
    fn test_write_isolation_per_backend() {
        assert!(write_isolation(DbBackend::Sqlite).is_none());
        assert!(matches!(
            write_isolation(DbBackend::Postgres),
            Some(IsolationLevel::Serializable)
        ));
        assert!(matches!(
            write_isolation(DbBackend::MySql),
            Some(IsolationLevel::Serializable)
        ));
    }

    #[test]
    fn test_db_error_classifies_conflicts() {
        let err = db_error("写入失败")(DbErr::Custom("database is locked".into()));
        assert!(err.is_retryable());
        let err = db_error("写入失败")(DbErr::Custom("no such column".into()));
        assert_eq!(err.code(), "E004");
        assert!(err.message().starts_with("写入失败"));
    }
}
