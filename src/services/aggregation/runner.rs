//! 批处理执行器
//!
//! 每次尝试：开启事务 → 批量读取快照 → 并发计算 → 顺序写入 → 提交。
//! 事务冲突时整批重试，超时或取消时整批回滚。

use std::collections::{BTreeSet, HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use super::AggregationService;
use super::annual::compute_annual_average;
use super::lookup::{AnnualSnapshot, AttendanceBook, EvaluationCatalog, GradeBook, TermSnapshot};
use super::term::compute_term_average;
use crate::errors::{AggregatorError, Result};
use crate::models::academics::entities::{Student, Subject};
use crate::models::averages::entities::{
    AnnualAverage, AnnualAverageKey, TermAverage, TermAverageKey,
};
use crate::models::batch::{
    BatchFilter, BatchResult, RequestError, RunOptions, SkipReason, TripleOutcome, TripleStatus,
};
use crate::storage::BatchScope;

pub type TermBatchResult = BatchResult<TermAverage>;
pub type AnnualBatchResult = BatchResult<AnnualAverage>;

/// 单次尝试的产出
struct AttemptOutput<T> {
    outcomes: Vec<TripleOutcome<T>>,
    errors: Vec<RequestError>,
}

/// (科目, 学生)
type Pair = (i64, i64);

impl AggregationService {
    pub(super) async fn run_term(
        &self,
        term_id: i64,
        filter: &BatchFilter,
        options: &RunOptions,
    ) -> Result<TermBatchResult> {
        let run_id = Uuid::new_v4();
        let span = info_span!("term_aggregation", %run_id, term_id);

        async {
            info!("Term aggregation started");
            let (output, attempts) = with_timeout(
                options,
                with_retries(options, || {
                    let storage = self.storage.clone();
                    async move {
                        let scope = storage.begin_batch().await?;
                        let result = aggregate_term(&*scope, term_id, filter, options).await;
                        settle(scope, result).await
                    }
                }),
            )
            .await?;

            let result = BatchResult::new(run_id, attempts, output.outcomes, output.errors);
            log_summary(&result);
            Ok(result)
        }
        .instrument(span)
        .await
    }

    pub(super) async fn run_annual(
        &self,
        year: i32,
        filter: &BatchFilter,
        options: &RunOptions,
    ) -> Result<AnnualBatchResult> {
        let run_id = Uuid::new_v4();
        let span = info_span!("annual_aggregation", %run_id, year);

        async {
            info!("Annual aggregation started");
            let (output, attempts) = with_timeout(
                options,
                with_retries(options, || {
                    let storage = self.storage.clone();
                    async move {
                        let scope = storage.begin_batch().await?;
                        let result = aggregate_annual(&*scope, year, filter, options).await;
                        settle(scope, result).await
                    }
                }),
            )
            .await?;

            let result = BatchResult::new(run_id, attempts, output.outcomes, output.errors);
            log_summary(&result);
            Ok(result)
        }
        .instrument(span)
        .await
    }
}

/// 成功则提交，失败则回滚
async fn settle<T>(scope: Box<dyn BatchScope>, result: Result<T>) -> Result<T> {
    match result {
        Ok(value) => {
            scope.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = scope.rollback().await {
                warn!("Rollback failed after {}: {}", err.code(), rollback_err);
            }
            Err(err)
        }
    }
}

/// 事务冲突时整批重试，退避时间指数增长
async fn with_retries<T, F, Fut>(options: &RunOptions, mut attempt: F) -> Result<(T, u32)>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        match attempt().await {
            Ok(value) => return Ok((value, attempts)),
            Err(err) if err.is_retryable() && attempts <= options.conflict_retries => {
                let delay = options
                    .retry_backoff
                    .saturating_mul(2u32.saturating_pow(attempts - 1));
                warn!(
                    attempt = attempts,
                    "Transaction conflict, retrying batch in {:?}: {}",
                    delay,
                    err.message()
                );
                tokio::select! {
                    _ = options.cancel.cancelled() => {
                        return Err(AggregatorError::cancelled("批处理在重试等待期间被取消"));
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            Err(err) => return Err(err),
        }
    }
}

/// 整批超时；超时时未完成的事务随 future 一起丢弃并回滚
async fn with_timeout<T>(options: &RunOptions, fut: impl Future<Output = Result<T>>) -> Result<T> {
    match options.timeout {
        Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
            AggregatorError::timeout(format!("批处理超过 {} 秒未完成", limit.as_secs_f64()))
        })?,
        None => fut.await,
    }
}

fn ensure_not_cancelled(options: &RunOptions) -> Result<()> {
    if options.cancel.is_cancelled() {
        return Err(AggregatorError::cancelled("批处理已取消"));
    }
    Ok(())
}

/// 有界并发计算，每个 (科目, 学生) 之间检查取消
async fn fan_out<T, F>(pairs: Vec<Pair>, options: &RunOptions, compute: F) -> Result<Vec<(Pair, T)>>
where
    T: Send + 'static,
    F: Fn(Pair) -> T + Send + Sync + 'static,
{
    let semaphore = Arc::new(Semaphore::new(options.max_concurrency.max(1)));
    let compute = Arc::new(compute);
    let mut tasks = JoinSet::new();

    for pair in pairs {
        if options.cancel.is_cancelled() {
            tasks.abort_all();
            return Err(AggregatorError::cancelled("批处理在计算阶段被取消"));
        }
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| AggregatorError::internal("并发信号量已关闭"))?;
        let compute = compute.clone();
        tasks.spawn(async move {
            let _permit = permit;
            (pair, compute(pair))
        });
    }

    let mut results = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        results.push(joined.map_err(|e| AggregatorError::internal(format!("计算任务异常终止: {e}")))?);
    }
    ensure_not_cancelled(options)?;
    Ok(results)
}

/// 解析科目过滤条件；不存在的 ID 记为请求级错误
async fn resolve_subjects(
    scope: &dyn BatchScope,
    filter: &BatchFilter,
) -> Result<(Vec<Subject>, Vec<RequestError>)> {
    let Some(ids) = filter.subject_ids.as_deref() else {
        return Ok((scope.list_subjects(None).await?, Vec::new()));
    };

    let subjects = scope.list_subjects(Some(ids)).await?;
    let found: HashSet<i64> = subjects.iter().map(|s| s.id).collect();
    let errors = ids
        .iter()
        .filter(|id| !found.contains(id))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|id| AggregatorError::not_found(format!("科目 {id} 不存在")).into())
        .collect();
    Ok((subjects, errors))
}

/// 读取科目所属课程的学生并应用学生过滤；不存在的学生 ID 记为请求级错误
async fn resolve_students(
    scope: &dyn BatchScope,
    subjects: &[Subject],
    filter: &BatchFilter,
) -> Result<(Vec<Student>, Vec<RequestError>)> {
    let mut errors = Vec::new();
    if let Some(ids) = filter.student_ids.as_deref() {
        let known: HashSet<i64> = scope.get_students(ids).await?.iter().map(|s| s.id).collect();
        errors.extend(
            ids.iter()
                .filter(|id| !known.contains(id))
                .collect::<BTreeSet<_>>()
                .into_iter()
                .map(|id| RequestError::from(AggregatorError::not_found(format!("学生 {id} 不存在")))),
        );
    }

    let course_ids: Vec<i64> = subjects
        .iter()
        .map(|s| s.course_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if course_ids.is_empty() {
        return Ok((Vec::new(), errors));
    }

    let students = scope
        .students_of_courses(&course_ids)
        .await?
        .into_iter()
        .filter(|s| filter.allows_student(s.id))
        .collect();
    Ok((students, errors))
}

/// 科目 × 同课程学生
fn pairs_of(subjects: &[Subject], students: &[Student]) -> Vec<Pair> {
    let mut by_course: HashMap<i64, Vec<i64>> = HashMap::new();
    for student in students {
        by_course.entry(student.course_id).or_default().push(student.id);
    }

    subjects
        .iter()
        .flat_map(|subject| {
            by_course
                .get(&subject.course_id)
                .into_iter()
                .flatten()
                .map(move |&student_id| (subject.id, student_id))
        })
        .collect()
}

fn failed<T>(pair: Pair, err: &AggregatorError) -> TripleOutcome<T> {
    warn!(
        subject_id = pair.0,
        student_id = pair.1,
        "Triple failed: {}",
        err.format_simple()
    );
    TripleOutcome {
        subject_id: pair.0,
        student_id: pair.1,
        status: TripleStatus::Failed {
            code: err.code().to_string(),
            message: err.message().to_string(),
        },
    }
}

fn skipped<T>(pair: Pair, reason: SkipReason) -> TripleOutcome<T> {
    debug!(subject_id = pair.0, student_id = pair.1, "Triple skipped: {reason}");
    TripleOutcome {
        subject_id: pair.0,
        student_id: pair.1,
        status: TripleStatus::Skipped { reason },
    }
}

async fn aggregate_term(
    scope: &dyn BatchScope,
    term_id: i64,
    filter: &BatchFilter,
    options: &RunOptions,
) -> Result<AttemptOutput<TermAverage>> {
    ensure_not_cancelled(options)?;

    // 学期不做状态检查，已关闭的学期同样可以重算
    let term = scope
        .get_term(term_id)
        .await?
        .ok_or_else(|| AggregatorError::not_found(format!("学期 {term_id} 不存在")))?;

    let (subjects, mut errors) = resolve_subjects(scope, filter).await?;
    let (students, student_errors) = resolve_students(scope, &subjects, filter).await?;
    errors.extend(student_errors);

    let pairs = pairs_of(&subjects, &students);
    if pairs.is_empty() {
        return Ok(AttemptOutput {
            outcomes: Vec::new(),
            errors,
        });
    }

    let subject_ids: Vec<i64> = subjects.iter().map(|s| s.id).collect();
    let student_ids: Vec<i64> = students.iter().map(|s| s.id).collect();

    let catalog = EvaluationCatalog::new(scope.active_evaluations(&subject_ids, term.id).await?);
    let grades = if catalog.is_empty() {
        Vec::new()
    } else {
        scope.grades_for(&catalog.references(), &student_ids).await?
    };
    let attendance = scope
        .attendance_for(&student_ids, &subject_ids, &(term.start_date..=term.end_date))
        .await?;
    debug!(
        evaluations = catalog.len(),
        grades = grades.len(),
        attendance = attendance.len(),
        pairs = pairs.len(),
        "Term snapshot loaded"
    );

    let snapshot = Arc::new(TermSnapshot {
        term,
        catalog,
        grades: GradeBook::new(grades),
        attendance: AttendanceBook::new(attendance),
    });

    let computed = fan_out(pairs, options, {
        let snapshot = snapshot.clone();
        move |(subject_id, student_id)| {
            compute_term_average(
                &snapshot.term,
                snapshot.catalog.for_subject(subject_id),
                &snapshot.grades,
                student_id,
                snapshot.attendance.records(student_id, subject_id),
            )
        }
    })
    .await?;

    let mut outcomes = Vec::with_capacity(computed.len());
    for (pair, result) in computed {
        ensure_not_cancelled(options)?;
        let (subject_id, student_id) = pair;
        match result {
            Ok(Some(fields)) => {
                let key = TermAverageKey {
                    student_id,
                    subject_id,
                    term_id: snapshot.term.id,
                };
                let (averages, action) = scope.upsert_term_average(key, fields).await?;
                outcomes.push(TripleOutcome {
                    subject_id,
                    student_id,
                    status: TripleStatus::Computed { action, averages },
                });
            }
            Ok(None) => outcomes.push(skipped(pair, SkipReason::NoEvaluations)),
            Err(err) => outcomes.push(failed(pair, &err)),
        }
    }

    Ok(AttemptOutput { outcomes, errors })
}

async fn aggregate_annual(
    scope: &dyn BatchScope,
    year: i32,
    filter: &BatchFilter,
    options: &RunOptions,
) -> Result<AttemptOutput<AnnualAverage>> {
    ensure_not_cancelled(options)?;

    let terms = scope.terms_of_year(year).await?;
    if terms.is_empty() {
        return Err(AggregatorError::not_found(format!("{year} 学年没有任何学期")));
    }
    let term_numbers: HashMap<i64, i32> = terms.iter().map(|t| (t.id, t.number)).collect();
    let term_ids: Vec<i64> = terms.iter().map(|t| t.id).collect();

    let (subjects, mut errors) = resolve_subjects(scope, filter).await?;
    let (students, student_errors) = resolve_students(scope, &subjects, filter).await?;
    errors.extend(student_errors);

    let pairs = pairs_of(&subjects, &students);
    if pairs.is_empty() {
        return Ok(AttemptOutput {
            outcomes: Vec::new(),
            errors,
        });
    }

    let subject_ids: Vec<i64> = subjects.iter().map(|s| s.id).collect();
    let student_ids: Vec<i64> = students.iter().map(|s| s.id).collect();
    let averages = scope
        .term_averages_for(&term_ids, Some(subject_ids.as_slice()), Some(student_ids.as_slice()))
        .await?;
    debug!(
        terms = terms.len(),
        term_averages = averages.len(),
        pairs = pairs.len(),
        "Annual snapshot loaded"
    );

    let snapshot = Arc::new(AnnualSnapshot::new(&term_numbers, averages));
    let computed = fan_out(pairs, options, move |(subject_id, student_id)| {
        compute_annual_average(snapshot.term_averages(student_id, subject_id))
    })
    .await?;

    let mut outcomes = Vec::with_capacity(computed.len());
    for (pair, fields) in computed {
        ensure_not_cancelled(options)?;
        let (subject_id, student_id) = pair;
        let Some(fields) = fields else {
            outcomes.push(skipped(pair, SkipReason::NoTermAverages));
            continue;
        };
        let key = AnnualAverageKey {
            student_id,
            subject_id,
            year,
        };
        let (averages, action) = scope.upsert_annual_average(key, fields).await?;
        outcomes.push(TripleOutcome {
            subject_id,
            student_id,
            status: TripleStatus::Computed { action, averages },
        });
    }

    Ok(AttemptOutput { outcomes, errors })
}

fn log_summary<T>(result: &BatchResult<T>) {
    let s = &result.summary;
    info!(
        attempts = result.attempts,
        total = s.total,
        created = s.created,
        updated = s.updated,
        skipped = s.skipped,
        failed = s.failed,
        request_errors = result.errors.len(),
        "Aggregation completed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn options() -> RunOptions {
        RunOptions {
            conflict_retries: 2,
            retry_backoff: Duration::from_millis(1),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_retries_only_conflicts() {
        let calls = &AtomicU32::new(0);
        let (value, attempts) = with_retries(&options(), move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(AggregatorError::transaction_conflict("could not serialize access"))
            } else {
                Ok(42)
            }
        })
        .await
        .unwrap();
        assert_eq!(value, 42);
        assert_eq!(attempts, 3);

        let calls = &AtomicU32::new(0);
        let err = with_retries(&options(), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(AggregatorError::validation("bad"))
        })
        .await
        .unwrap_err();
        assert_eq!(err.code(), "E006");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let calls = &AtomicU32::new(0);
        let err = with_retries(&options(), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(AggregatorError::transaction_conflict("deadlock"))
        })
        .await
        .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_timeout_aborts() {
        let options = RunOptions {
            timeout: Some(Duration::from_millis(5)),
            ..Default::default()
        };
        let err = with_timeout(&options, async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await
        .unwrap_err();
        assert_eq!(err.code(), "E012");
    }

    #[tokio::test]
    async fn test_fan_out_computes_every_pair() {
        let options = RunOptions {
            max_concurrency: 2,
            ..Default::default()
        };
        let pairs = vec![(1, 1), (1, 2), (2, 1), (2, 2), (3, 1)];
        let mut results = fan_out(pairs, &options, |(a, b)| a * 10 + b).await.unwrap();
        results.sort();
        assert_eq!(results.len(), 5);
        assert_eq!(results[4], ((3, 1), 31));
    }

    #[tokio::test]
    async fn test_fan_out_stops_when_cancelled() {
        let options = RunOptions::default();
        options.cancel.cancel();
        let err = fan_out(vec![(1, 1)], &options, |_| ()).await.unwrap_err();
        assert_eq!(err.code(), "E011");
    }

    #[test]
    fn test_pairs_follow_course_membership() {
        let now = chrono::Utc::now();
        let subject = |id, course_id| Subject {
            id,
            course_id,
            name: format!("S{id}"),
            created_at: now,
        };
        let student = |id, course_id| Student {
            id,
            course_id,
            first_name: "A".into(),
            last_name: "B".into(),
            code: format!("C{id}"),
            created_at: now,
        };

        let pairs = pairs_of(
            &[subject(1, 10), subject(2, 20)],
            &[student(5, 10), student(6, 20), student(7, 10)],
        );
        assert_eq!(pairs, vec![(1, 5), (1, 7), (2, 6)]);
    }
}
