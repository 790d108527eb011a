//! 端到端批处理测试：内存 SQLite + 迁移

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::{Decimal, dec};
use sea_orm::{ConnectOptions, Database};

use rust_grade_aggregator::errors::WeightConfigError;
use rust_grade_aggregator::models::academics::entities::{EvaluationType, Student, Subject};
use rust_grade_aggregator::models::academics::requests::{
    CreateEvaluationTypeRequest, CreateStudentRequest, CreateSubjectRequest,
};
use rust_grade_aggregator::models::attendance::requests::RecordAttendanceRequest;
use rust_grade_aggregator::models::batch::{
    BatchFilter, RunOptions, SkipReason, TripleStatus, UpsertAction,
};
use rust_grade_aggregator::models::evaluations::entities::{
    DeliverableDetails, Evaluation, EvaluationDetails, ParticipationDetails,
};
use rust_grade_aggregator::models::evaluations::requests::CreateEvaluationRequest;
use rust_grade_aggregator::models::grades::requests::RecordGradeRequest;
use rust_grade_aggregator::models::terms::entities::{Term, TermState};
use rust_grade_aggregator::models::terms::requests::CreateTermRequest;
use rust_grade_aggregator::models::weights::requests::SetWeightRequest;
use rust_grade_aggregator::services::weights::WeightError;
use rust_grade_aggregator::services::{
    AggregationService, AttendanceService, EvaluationService, GradeService, ReportService,
    TermService, WeightService,
};
use rust_grade_aggregator::storage::Storage;
use rust_grade_aggregator::storage::sea_orm_storage::SeaOrmStorage;

const COURSE: i64 = 1;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn memory_storage() -> Arc<dyn Storage> {
    // 内存数据库每个连接独立，只能使用单连接
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    Arc::new(SeaOrmStorage::from_connection(db).await.unwrap())
}

struct Fixture {
    storage: Arc<dyn Storage>,
    term: Term,
    subject: Subject,
    exam: EvaluationType,
    students: Vec<Student>,
}

impl Fixture {
    /// 一个科目、两名学生、第一学期，评价类型 EXAMEN 占 100%
    async fn new() -> Self {
        let storage = memory_storage().await;

        let mut students = Vec::new();
        for (code, first) in [("S-001", "Ana"), ("S-002", "Luis")] {
            students.push(
                storage
                    .create_student(CreateStudentRequest {
                        course_id: COURSE,
                        first_name: first.into(),
                        last_name: "Pérez".into(),
                        code: code.into(),
                    })
                    .await
                    .unwrap(),
            );
        }
        let subject = storage
            .create_subject(CreateSubjectRequest {
                course_id: COURSE,
                name: "Matemáticas".into(),
            })
            .await
            .unwrap();
        let exam = storage
            .create_evaluation_type(CreateEvaluationTypeRequest {
                name: "EXAMEN".into(),
                description: None,
            })
            .await
            .unwrap();

        let term = create_term(&storage, 1, date(2025, 2, 3), date(2025, 5, 16)).await;

        WeightService::new(storage.clone())
            .set_weight(SetWeightRequest {
                subject_id: subject.id,
                evaluation_type_id: exam.id,
                percentage: dec!(100),
            })
            .await
            .unwrap();

        Self {
            storage,
            term,
            subject,
            exam,
            students,
        }
    }

    fn student(&self, index: usize) -> i64 {
        self.students[index].id
    }

    async fn participation(&self, term: &Term, weight: Decimal) -> Evaluation {
        EvaluationService::new(self.storage.clone())
            .create_evaluation(CreateEvaluationRequest {
                subject_id: self.subject.id,
                term_id: term.id,
                evaluation_type_id: self.exam.id,
                title: format!("Participación {weight}"),
                description: None,
                weight_percentage: weight,
                published: true,
                details: EvaluationDetails::Participation(ParticipationDetails {
                    registration_date: term.start_date,
                    criteria: None,
                }),
                enforce_deadlines: false,
                as_of: None,
            })
            .await
            .unwrap()
    }

    async fn grade(&self, evaluation: &Evaluation, student_id: i64, score: Decimal, late: bool) {
        GradeService::new(self.storage.clone())
            .record_grade(RecordGradeRequest {
                evaluation: evaluation.reference(),
                student_id,
                raw_score: score,
                late,
                enforce_deadlines: false,
                as_of: None,
            })
            .await
            .unwrap();
    }

    async fn attend(&self, student_id: i64, present: usize, absent: usize) {
        let service = AttendanceService::new(self.storage.clone());
        for i in 0..present + absent {
            service
                .record_attendance(RecordAttendanceRequest {
                    student_id,
                    subject_id: self.subject.id,
                    term_id: Some(self.term.id),
                    date: self.term.start_date + chrono::Days::new(i as u64),
                    present: i < present,
                    justified: false,
                })
                .await
                .unwrap();
        }
    }

    fn aggregation(&self) -> AggregationService {
        AggregationService::new(self.storage.clone())
    }
}

async fn create_term(storage: &Arc<dyn Storage>, number: i32, start: NaiveDate, end: NaiveDate) -> Term {
    TermService::new(storage.clone())
        .create_term(CreateTermRequest {
            number,
            year: 2025,
            name: None,
            start_date: start,
            end_date: end,
            eval_deadline: None,
            grade_deadline: None,
            min_pass_score: None,
            min_attendance_pct: None,
            state: Some(TermState::Active),
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn test_term_aggregation_is_idempotent() {
    let fx = Fixture::new().await;
    let first = fx.participation(&fx.term, dec!(50)).await;
    let second = fx.participation(&fx.term, dec!(50)).await;
    let student = fx.student(0);
    fx.grade(&first, student, dec!(80), false).await;
    fx.grade(&second, student, dec!(90), false).await;
    fx.attend(student, 10, 0).await;

    let options = RunOptions::default();
    let filter = BatchFilter::subjects(vec![fx.subject.id]).with_students(vec![student]);

    let run1 = fx
        .aggregation()
        .run_term_aggregation(fx.term.id, filter.clone(), &options)
        .await
        .unwrap();
    let Some(TripleStatus::Computed { action, averages }) = run1.outcome_for(student, fx.subject.id)
    else {
        panic!("expected computed outcome: {:?}", run1.outcomes);
    };
    assert_eq!(*action, UpsertAction::Created);
    assert_eq!(averages.fields.final_average, dec!(85.00));
    assert_eq!(averages.fields.attendance_pct, dec!(100.00));
    assert!(averages.fields.passed);
    assert!(averages.auto_computed);
    let first_fields = averages.fields.clone();
    let first_computed_at = averages.computed_at;

    let run2 = fx
        .aggregation()
        .run_term_aggregation(fx.term.id, filter, &options)
        .await
        .unwrap();
    let Some(TripleStatus::Computed { action, averages }) = run2.outcome_for(student, fx.subject.id)
    else {
        panic!("expected computed outcome: {:?}", run2.outcomes);
    };
    assert_eq!(*action, UpsertAction::Updated);
    assert_eq!(averages.fields, first_fields);
    assert!(averages.computed_at >= first_computed_at);
    assert_ne!(run1.run_id, run2.run_id);

    let rows = fx
        .storage
        .term_averages_for(&[fx.term.id], Some(&[fx.subject.id][..]), Some(&[student][..]))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn test_partial_grading_and_zero_weight_guard() {
    let fx = Fixture::new().await;
    let graded = fx.participation(&fx.term, dec!(50)).await;
    let _ungraded = fx.participation(&fx.term, dec!(50)).await;
    fx.grade(&graded, fx.student(0), dec!(80), false).await;

    let result = fx
        .aggregation()
        .run_term_aggregation(fx.term.id, BatchFilter::default(), &RunOptions::default())
        .await
        .unwrap();
    assert_eq!(result.summary.total, 2);
    assert_eq!(result.summary.created, 2);

    let Some(TripleStatus::Computed { averages, .. }) = result.outcome_for(fx.student(0), fx.subject.id)
    else {
        panic!("expected computed outcome");
    };
    assert_eq!(averages.fields.evaluation_average, dec!(80.00));

    // 第二名学生没有任何成绩
    let Some(TripleStatus::Computed { averages, .. }) = result.outcome_for(fx.student(1), fx.subject.id)
    else {
        panic!("expected computed outcome");
    };
    assert_eq!(averages.fields.evaluation_average, dec!(0.00));
    assert!(!averages.fields.passed);
}

#[tokio::test]
async fn test_attendance_gate_dominates_score() {
    let fx = Fixture::new().await;
    let evaluation = fx.participation(&fx.term, dec!(100)).await;
    fx.grade(&evaluation, fx.student(0), dec!(95), false).await;
    fx.attend(fx.student(0), 4, 6).await;

    let result = fx
        .aggregation()
        .run_term_aggregation(
            fx.term.id,
            BatchFilter::default().with_students(vec![fx.student(0)]),
            &RunOptions::default(),
        )
        .await
        .unwrap();
    let Some(TripleStatus::Computed { averages, .. }) = result.outcome_for(fx.student(0), fx.subject.id)
    else {
        panic!("expected computed outcome");
    };
    assert_eq!(averages.fields.final_average, dec!(95.00));
    assert_eq!(averages.fields.attendance_pct, dec!(40.00));
    assert!(!averages.fields.passed);
}

#[tokio::test]
async fn test_late_rejected_grade_is_ignored() {
    let fx = Fixture::new().await;
    let participation = fx.participation(&fx.term, dec!(50)).await;
    let deliverable = EvaluationService::new(fx.storage.clone())
        .create_evaluation(CreateEvaluationRequest {
            subject_id: fx.subject.id,
            term_id: fx.term.id,
            evaluation_type_id: fx.exam.id,
            title: "Informe final".into(),
            description: None,
            weight_percentage: dec!(50),
            published: true,
            details: EvaluationDetails::Deliverable(DeliverableDetails {
                assigned_date: date(2025, 3, 1),
                due_date: date(2025, 3, 15),
                limit_date: None,
                max_score: dec!(100),
                min_pass_score: dec!(51),
                allows_late: false,
                late_penalty_percentage: dec!(0),
            }),
            enforce_deadlines: false,
            as_of: None,
        })
        .await
        .unwrap();

    let student = fx.student(0);
    let response = GradeService::new(fx.storage.clone())
        .record_grade(RecordGradeRequest {
            evaluation: deliverable.reference(),
            student_id: student,
            raw_score: dec!(100),
            late: true,
            enforce_deadlines: false,
            as_of: None,
        })
        .await
        .unwrap();
    assert!(response.late_rejected);
    assert!(!response.grade.finalized);
    assert!(!response.is_passing);

    fx.grade(&participation, student, dec!(70), false).await;

    let result = fx
        .aggregation()
        .run_term_aggregation(fx.term.id, BatchFilter::default(), &RunOptions::default())
        .await
        .unwrap();
    let Some(TripleStatus::Computed { averages, .. }) = result.outcome_for(student, fx.subject.id)
    else {
        panic!("expected computed outcome");
    };
    assert_eq!(averages.fields.evaluation_average, dec!(70.00));
}

#[tokio::test]
async fn test_late_penalty_is_applied_when_allowed() {
    let fx = Fixture::new().await;
    let deliverable = EvaluationService::new(fx.storage.clone())
        .create_evaluation(CreateEvaluationRequest {
            subject_id: fx.subject.id,
            term_id: fx.term.id,
            evaluation_type_id: fx.exam.id,
            title: "Proyecto".into(),
            description: None,
            weight_percentage: dec!(100),
            published: true,
            details: EvaluationDetails::Deliverable(DeliverableDetails {
                assigned_date: date(2025, 3, 1),
                due_date: date(2025, 3, 15),
                limit_date: Some(date(2025, 3, 20)),
                max_score: dec!(100),
                min_pass_score: dec!(51),
                allows_late: true,
                late_penalty_percentage: dec!(20),
            }),
            enforce_deadlines: false,
            as_of: None,
        })
        .await
        .unwrap();

    let grades = GradeService::new(fx.storage.clone());
    let request = RecordGradeRequest {
        evaluation: deliverable.reference(),
        student_id: fx.student(0),
        raw_score: dec!(100),
        late: true,
        enforce_deadlines: false,
        as_of: None,
    };
    let created = grades.record_grade(request.clone()).await.unwrap();
    assert_eq!(created.action, UpsertAction::Created);
    assert_eq!(created.grade.final_score, dec!(80.00));
    assert_eq!(created.percentage, dec!(80.00));

    // 重新登记覆盖同一条记录
    let updated = grades
        .record_grade(RecordGradeRequest {
            late: false,
            ..request
        })
        .await
        .unwrap();
    assert_eq!(updated.action, UpsertAction::Updated);
    assert_eq!(updated.grade.id, created.grade.id);
    assert_eq!(updated.grade.final_score, dec!(100.00));
}

#[tokio::test]
async fn test_weight_overflow_is_rejected() {
    let fx = Fixture::new().await;
    let subject = fx
        .storage
        .create_subject(CreateSubjectRequest {
            course_id: COURSE,
            name: "Historia".into(),
        })
        .await
        .unwrap();
    let homework = fx
        .storage
        .create_evaluation_type(CreateEvaluationTypeRequest {
            name: "TRABAJO".into(),
            description: None,
        })
        .await
        .unwrap();

    let weights = WeightService::new(fx.storage.clone());
    let set = weights
        .set_weight(SetWeightRequest {
            subject_id: subject.id,
            evaluation_type_id: fx.exam.id,
            percentage: dec!(60),
        })
        .await
        .unwrap();
    assert_eq!(set.available, dec!(40.00));

    let err = weights
        .set_weight(SetWeightRequest {
            subject_id: subject.id,
            evaluation_type_id: homework.id,
            percentage: dec!(50),
        })
        .await
        .unwrap_err();
    assert_eq!(
        err,
        WeightError::Rejected(WeightConfigError::PercentageOverflow {
            available: dec!(40.00)
        })
    );

    // 覆盖已有配置时不把自身计入其余权重
    let replaced = weights
        .set_weight(SetWeightRequest {
            subject_id: subject.id,
            evaluation_type_id: fx.exam.id,
            percentage: dec!(100),
        })
        .await
        .unwrap();
    assert_eq!(replaced.action, UpsertAction::Updated);
    assert_eq!(replaced.available, dec!(0.00));
}

#[tokio::test]
async fn test_evaluation_weight_cannot_exceed_type_share() {
    let fx = Fixture::new().await;
    fx.participation(&fx.term, dec!(70)).await;

    let err = EvaluationService::new(fx.storage.clone())
        .create_evaluation(CreateEvaluationRequest {
            subject_id: fx.subject.id,
            term_id: fx.term.id,
            evaluation_type_id: fx.exam.id,
            title: "Extra".into(),
            description: None,
            weight_percentage: dec!(40),
            published: false,
            details: EvaluationDetails::Participation(ParticipationDetails {
                registration_date: fx.term.start_date,
                criteria: None,
            }),
            enforce_deadlines: false,
            as_of: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.code(), "E006");
}

#[tokio::test]
async fn test_annual_average_omits_missing_terms() {
    let fx = Fixture::new().await;
    let term2 = create_term(&fx.storage, 2, date(2025, 6, 2), date(2025, 8, 29)).await;
    let student = fx.student(0);

    let first = fx.participation(&fx.term, dec!(100)).await;
    let second = fx.participation(&term2, dec!(100)).await;
    fx.grade(&first, student, dec!(70), false).await;
    fx.grade(&second, student, dec!(80), false).await;

    let service = fx.aggregation();
    let options = RunOptions::default();
    let filter = BatchFilter::default().with_students(vec![student]);
    for term_id in [fx.term.id, term2.id] {
        service
            .run_term_aggregation(term_id, filter.clone(), &options)
            .await
            .unwrap();
    }

    let result = service
        .run_annual_aggregation(2025, filter, &options)
        .await
        .unwrap();
    let Some(TripleStatus::Computed { action, averages }) = result.outcome_for(student, fx.subject.id)
    else {
        panic!("expected computed outcome: {:?}", result.outcomes);
    };
    assert_eq!(*action, UpsertAction::Created);
    assert_eq!(averages.fields.annual_average, dec!(75.00));
    assert_eq!(averages.fields.term1_average, Some(dec!(70.00)));
    assert_eq!(averages.fields.term2_average, Some(dec!(80.00)));
    assert_eq!(averages.fields.term3_average, None);
    assert!(averages.fields.passed_annual);
}

#[tokio::test]
async fn test_annual_without_term_averages_is_skipped() {
    let fx = Fixture::new().await;
    let result = fx
        .aggregation()
        .run_annual_aggregation(2025, BatchFilter::default(), &RunOptions::default())
        .await
        .unwrap();
    assert_eq!(result.summary.skipped, 2);
    assert_eq!(
        result.outcome_for(fx.student(0), fx.subject.id),
        Some(&TripleStatus::Skipped {
            reason: SkipReason::NoTermAverages
        })
    );
}

#[tokio::test]
async fn test_year_without_terms_is_not_found() {
    let fx = Fixture::new().await;
    let err = fx
        .aggregation()
        .run_annual_aggregation(1999, BatchFilter::default(), &RunOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "E007");

    let err = fx
        .aggregation()
        .run_term_aggregation(9999, BatchFilter::default(), &RunOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "E007");
}

#[tokio::test]
async fn test_subject_without_evaluations_is_skipped() {
    let fx = Fixture::new().await;
    let evaluation = fx.participation(&fx.term, dec!(100)).await;
    fx.grade(&evaluation, fx.student(0), dec!(90), false).await;
    let empty = fx
        .storage
        .create_subject(CreateSubjectRequest {
            course_id: COURSE,
            name: "Música".into(),
        })
        .await
        .unwrap();

    let result = fx
        .aggregation()
        .run_term_aggregation(fx.term.id, BatchFilter::default(), &RunOptions::default())
        .await
        .unwrap();
    assert_eq!(
        result.outcome_for(fx.student(0), empty.id),
        Some(&TripleStatus::Skipped {
            reason: SkipReason::NoEvaluations
        })
    );
    assert_eq!(result.summary.skipped, 2);
    assert_eq!(result.summary.created, 2);

    let rows = fx
        .storage
        .term_averages_for(&[fx.term.id], Some(&[empty.id][..]), None)
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_unknown_filter_ids_are_reported() {
    let fx = Fixture::new().await;
    fx.participation(&fx.term, dec!(100)).await;

    let filter = BatchFilter::subjects(vec![fx.subject.id, 999]).with_students(vec![fx.student(1), 888]);
    let result = fx
        .aggregation()
        .run_term_aggregation(fx.term.id, filter, &RunOptions::default())
        .await
        .unwrap();

    assert_eq!(result.errors.len(), 2);
    assert!(result.errors.iter().all(|e| e.code == "E007"));
    assert!(result.errors.iter().any(|e| e.message.contains("999")));
    assert!(result.errors.iter().any(|e| e.message.contains("888")));
    assert_eq!(result.summary.total, 1);
    assert!(matches!(
        result.outcome_for(fx.student(1), fx.subject.id),
        Some(TripleStatus::Computed { .. })
    ));
}

#[tokio::test]
async fn test_aggregation_runs_on_closed_term() {
    let fx = Fixture::new().await;
    let evaluation = fx.participation(&fx.term, dec!(100)).await;
    fx.grade(&evaluation, fx.student(0), dec!(60), false).await;

    let terms = TermService::new(fx.storage.clone());
    assert_eq!(terms.advance_term(fx.term.id).await.unwrap().state, TermState::Finished);
    assert_eq!(terms.advance_term(fx.term.id).await.unwrap().state, TermState::Closed);
    assert_eq!(
        terms.advance_term(fx.term.id).await.unwrap_err().code(),
        "E009"
    );

    let result = fx
        .aggregation()
        .run_term_aggregation(fx.term.id, BatchFilter::default(), &RunOptions::default())
        .await
        .unwrap();
    assert_eq!(result.summary.created, 2);
    assert_eq!(result.summary.failed, 0);
}

#[tokio::test]
async fn test_cancelled_batch_writes_nothing() {
    let fx = Fixture::new().await;
    let evaluation = fx.participation(&fx.term, dec!(100)).await;
    fx.grade(&evaluation, fx.student(0), dec!(60), false).await;

    let options = RunOptions::default();
    options.cancel.cancel();
    let err = fx
        .aggregation()
        .run_term_aggregation(fx.term.id, BatchFilter::default(), &options)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "E011");

    let rows = fx
        .storage
        .term_averages_for(&[fx.term.id], None, None)
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_grade_deadline_is_enforced_on_request() {
    let fx = Fixture::new().await;
    let evaluation = fx.participation(&fx.term, dec!(100)).await;
    let request = RecordGradeRequest {
        evaluation: evaluation.reference(),
        student_id: fx.student(0),
        raw_score: dec!(75),
        late: false,
        enforce_deadlines: true,
        as_of: Some(date(2025, 6, 1)),
    };

    let grades = GradeService::new(fx.storage.clone());
    let err = grades.record_grade(request.clone()).await.unwrap_err();
    assert_eq!(err.code(), "E006");

    // 历史导入不检查窗口
    let imported = grades
        .record_grade(RecordGradeRequest {
            enforce_deadlines: false,
            ..request
        })
        .await
        .unwrap();
    assert!(imported.is_passing);
}

#[tokio::test]
async fn test_attendance_resolves_term_by_date() {
    let fx = Fixture::new().await;
    let service = AttendanceService::new(fx.storage.clone());

    let (record, action) = service
        .record_attendance(RecordAttendanceRequest {
            student_id: fx.student(0),
            subject_id: fx.subject.id,
            term_id: None,
            date: date(2025, 4, 1),
            present: true,
            justified: false,
        })
        .await
        .unwrap();
    assert_eq!(record.term_id, fx.term.id);
    assert_eq!(action, UpsertAction::Created);

    let err = service
        .record_attendance(RecordAttendanceRequest {
            student_id: fx.student(0),
            subject_id: fx.subject.id,
            term_id: None,
            date: date(2025, 12, 24),
            present: true,
            justified: false,
        })
        .await
        .unwrap_err();
    assert_eq!(err.code(), "E007");
}

#[tokio::test]
async fn test_weight_summary_and_removal() {
    let fx = Fixture::new().await;
    let subject = fx
        .storage
        .create_subject(CreateSubjectRequest {
            course_id: COURSE,
            name: "Historia".into(),
        })
        .await
        .unwrap();
    let homework = fx
        .storage
        .create_evaluation_type(CreateEvaluationTypeRequest {
            name: "TRABAJO".into(),
            description: None,
        })
        .await
        .unwrap();

    let weights = WeightService::new(fx.storage.clone());
    let exam_weight = weights
        .set_weight(SetWeightRequest {
            subject_id: subject.id,
            evaluation_type_id: fx.exam.id,
            percentage: dec!(60),
        })
        .await
        .unwrap();
    let homework_weight = weights
        .set_weight(SetWeightRequest {
            subject_id: subject.id,
            evaluation_type_id: homework.id,
            percentage: dec!(30),
        })
        .await
        .unwrap();

    let summary = weights.weight_summary(subject.id).await.unwrap();
    assert_eq!(summary.configs.len(), 2);
    assert_eq!(summary.assigned_total, dec!(90.00));
    assert_eq!(summary.available, dec!(10.00));

    // 有有效评价使用时不能删除
    EvaluationService::new(fx.storage.clone())
        .create_evaluation(CreateEvaluationRequest {
            subject_id: subject.id,
            term_id: fx.term.id,
            evaluation_type_id: fx.exam.id,
            title: "Examen parcial".into(),
            description: None,
            weight_percentage: dec!(60),
            published: true,
            details: EvaluationDetails::Participation(ParticipationDetails {
                registration_date: fx.term.start_date,
                criteria: None,
            }),
            enforce_deadlines: false,
            as_of: None,
        })
        .await
        .unwrap();
    let err = weights.remove_weight(exam_weight.config.id).await.unwrap_err();
    assert_eq!(err.code(), "E006");

    weights.remove_weight(homework_weight.config.id).await.unwrap();
    let summary = weights.weight_summary(subject.id).await.unwrap();
    assert_eq!(summary.configs.len(), 1);
    assert_eq!(summary.assigned_total, dec!(60.00));
    assert_eq!(summary.available, dec!(40.00));

    assert_eq!(
        weights.remove_weight(homework_weight.config.id).await.unwrap_err().code(),
        "E007"
    );
    assert_eq!(weights.weight_summary(9999).await.unwrap_err().code(), "E007");
}

/// 课程 1 的数学（两名学生）与课程 2 的生物（一名学生），学期汇总已完成
async fn two_course_fixture() -> (Fixture, Subject, Student, Evaluation) {
    let fx = Fixture::new().await;
    let biology = fx
        .storage
        .create_subject(CreateSubjectRequest {
            course_id: 2,
            name: "Biología".into(),
        })
        .await
        .unwrap();
    let outsider = fx
        .storage
        .create_student(CreateStudentRequest {
            course_id: 2,
            first_name: "Sofía".into(),
            last_name: "Rojas".into(),
            code: "S-101".into(),
        })
        .await
        .unwrap();
    WeightService::new(fx.storage.clone())
        .set_weight(SetWeightRequest {
            subject_id: biology.id,
            evaluation_type_id: fx.exam.id,
            percentage: dec!(100),
        })
        .await
        .unwrap();

    let math = fx.participation(&fx.term, dec!(100)).await;
    let lab = EvaluationService::new(fx.storage.clone())
        .create_evaluation(CreateEvaluationRequest {
            subject_id: biology.id,
            term_id: fx.term.id,
            evaluation_type_id: fx.exam.id,
            title: "Laboratorio".into(),
            description: None,
            weight_percentage: dec!(100),
            published: true,
            details: EvaluationDetails::Participation(ParticipationDetails {
                registration_date: fx.term.start_date,
                criteria: None,
            }),
            enforce_deadlines: false,
            as_of: None,
        })
        .await
        .unwrap();

    fx.grade(&math, fx.student(0), dec!(90), false).await;
    fx.grade(&math, fx.student(1), dec!(40), false).await;
    fx.grade(&lab, outsider.id, dec!(70), false).await;
    fx.attend(fx.student(0), 10, 0).await;

    let result = fx
        .aggregation()
        .run_term_aggregation(fx.term.id, BatchFilter::default(), &RunOptions::default())
        .await
        .unwrap();
    assert_eq!(result.summary.created, 3);

    (fx, biology, outsider, math)
}

#[tokio::test]
async fn test_term_report_filters_compose() {
    let (fx, biology, _, _) = two_course_fixture().await;
    let reports = ReportService::new(fx.storage.clone());

    let all = reports.term_report(fx.term.id, None, None).await.unwrap();
    assert_eq!(all.total, 3);

    let course = reports.term_report(fx.term.id, None, Some(COURSE)).await.unwrap();
    assert_eq!(course.total, 2);
    assert_eq!(course.passed, 1);
    assert_eq!(course.failed, 1);
    assert_eq!(course.pass_rate, dec!(50.00));
    assert_eq!(course.general_average, dec!(65.00));
    assert!(course.rows.iter().all(|r| r.subject_id == fx.subject.id));

    let subject = reports
        .term_report(fx.term.id, Some(biology.id), None)
        .await
        .unwrap();
    assert_eq!(subject.total, 1);
    assert_eq!(subject.rows[0].fields.final_average, dec!(70.00));

    // 科目不属于该课程时交集为空
    let disjoint = reports
        .term_report(fx.term.id, Some(biology.id), Some(COURSE))
        .await
        .unwrap();
    assert_eq!(disjoint.total, 0);
    assert_eq!(disjoint.general_average, dec!(0.00));

    assert_eq!(
        reports.term_report(9999, None, None).await.unwrap_err().code(),
        "E007"
    );
}

#[tokio::test]
async fn test_evaluation_statistics_counts_finalized_grades() {
    let (fx, _, _, math) = two_course_fixture().await;
    let stats = ReportService::new(fx.storage.clone())
        .evaluation_statistics(math.reference())
        .await
        .unwrap();
    assert_eq!(stats.count, 2);
    assert_eq!(stats.mean, Some(dec!(65.00)));
    assert_eq!(stats.max, Some(dec!(90.00)));
    assert_eq!(stats.min, Some(dec!(40.00)));
    assert_eq!(stats.passed, 1);
    assert_eq!(stats.failed, 1);
}

#[tokio::test]
async fn test_annual_comparison_breaks_down_terms() {
    let (fx, _, _, _) = two_course_fixture().await;
    let term2 = create_term(&fx.storage, 2, date(2025, 6, 2), date(2025, 8, 29)).await;
    let student = fx.student(0);
    fx.aggregation()
        .run_annual_aggregation(2025, BatchFilter::default(), &RunOptions::default())
        .await
        .unwrap();

    let rows = ReportService::new(fx.storage.clone())
        .annual_comparison(2025, Some(student), None)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.annual.subject_id, fx.subject.id);
    assert_eq!(row.annual.fields.annual_average, dec!(90.00));
    assert_eq!(row.terms.len(), 2);

    let first = row.terms.iter().find(|t| t.term_id == fx.term.id).unwrap();
    assert_eq!(first.number, 1);
    assert_eq!(first.final_average, Some(dec!(90.00)));
    assert_eq!(first.passed, Some(true));

    // 第二学期尚无平均
    let second = row.terms.iter().find(|t| t.term_id == term2.id).unwrap();
    assert_eq!(second.final_average, None);
    assert_eq!(second.passed, None);

    assert_eq!(
        ReportService::new(fx.storage.clone())
            .annual_comparison(1999, None, None)
            .await
            .unwrap_err()
            .code(),
        "E007"
    );
}
