use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::AggregationConfig;

/// 批处理过滤条件，None 表示不过滤
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchFilter {
    pub subject_ids: Option<Vec<i64>>,
    pub student_ids: Option<Vec<i64>>,
}

impl BatchFilter {
    pub fn subjects(ids: impl Into<Vec<i64>>) -> Self {
        Self {
            subject_ids: Some(ids.into()),
            student_ids: None,
        }
    }

    pub fn with_students(mut self, ids: impl Into<Vec<i64>>) -> Self {
        self.student_ids = Some(ids.into());
        self
    }

    pub fn allows_student(&self, student_id: i64) -> bool {
        self.student_ids
            .as_ref()
            .is_none_or(|ids| ids.contains(&student_id))
    }
}

/// 单次批处理的运行参数
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub cancel: CancellationToken,
    pub max_concurrency: usize,
    pub timeout: Option<Duration>,
    pub conflict_retries: u32,
    pub retry_backoff: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            cancel: CancellationToken::new(),
            max_concurrency: num_cpus::get().max(1),
            timeout: None,
            conflict_retries: 3,
            retry_backoff: Duration::from_millis(200),
        }
    }
}

impl RunOptions {
    pub fn from_config(config: &AggregationConfig) -> Self {
        Self {
            cancel: CancellationToken::new(),
            max_concurrency: config.max_concurrency.max(1),
            timeout: (config.batch_timeout_secs > 0)
                .then(|| Duration::from_secs(config.batch_timeout_secs)),
            conflict_retries: config.conflict_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// 写入方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertAction {
    Created,
    Updated,
}

/// 跳过原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    // (科目, 学期) 没有任何有效评价
    NoEvaluations,
    // 该学年没有任何学期平均
    NoTermAverages,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoEvaluations => write!(f, "no evaluations"),
            SkipReason::NoTermAverages => write!(f, "no term averages"),
        }
    }
}

/// 单个 (学生, 科目) 的处理结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TripleStatus<T> {
    Computed { action: UpsertAction, averages: T },
    Skipped { reason: SkipReason },
    Failed { code: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripleOutcome<T> {
    pub student_id: i64,
    pub subject_id: i64,
    #[serde(flatten)]
    pub status: TripleStatus<T>,
}

/// 请求级错误（如过滤条件中不存在的 ID），不会中止批处理
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestError {
    pub code: String,
    pub message: String,
}

impl From<crate::errors::AggregatorError> for RequestError {
    fn from(err: crate::errors::AggregatorError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.message().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// 批处理结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult<T> {
    pub run_id: uuid::Uuid,
    // 实际执行次数（含冲突重试）
    pub attempts: u32,
    pub outcomes: Vec<TripleOutcome<T>>,
    pub errors: Vec<RequestError>,
    pub summary: BatchSummary,
}

impl<T> BatchResult<T> {
    pub fn new(
        run_id: uuid::Uuid,
        attempts: u32,
        mut outcomes: Vec<TripleOutcome<T>>,
        errors: Vec<RequestError>,
    ) -> Self {
        outcomes.sort_by_key(|o| (o.subject_id, o.student_id));

        let mut summary = BatchSummary {
            total: outcomes.len(),
            ..Default::default()
        };
        for outcome in &outcomes {
            match &outcome.status {
                TripleStatus::Computed {
                    action: UpsertAction::Created,
                    ..
                } => summary.created += 1,
                TripleStatus::Computed {
                    action: UpsertAction::Updated,
                    ..
                } => summary.updated += 1,
                TripleStatus::Skipped { .. } => summary.skipped += 1,
                TripleStatus::Failed { .. } => summary.failed += 1,
            }
        }

        Self {
            run_id,
            attempts,
            outcomes,
            errors,
            summary,
        }
    }

    pub fn outcome_for(&self, student_id: i64, subject_id: i64) -> Option<&TripleStatus<T>> {
        self.outcomes
            .iter()
            .find(|o| o.student_id == student_id && o.subject_id == subject_id)
            .map(|o| &o.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(student_id: i64, subject_id: i64, status: TripleStatus<u8>) -> TripleOutcome<u8> {
        TripleOutcome {
            student_id,
            subject_id,
            status,
        }
    }

    #[test]
    fn test_batch_result_sorts_and_counts() {
        let result = BatchResult::new(
            uuid::Uuid::new_v4(),
            1,
            vec![
                outcome(
                    2,
                    1,
                    TripleStatus::Computed {
                        action: UpsertAction::Updated,
                        averages: 0,
                    },
                ),
                outcome(
                    1,
                    2,
                    TripleStatus::Skipped {
                        reason: SkipReason::NoEvaluations,
                    },
                ),
                outcome(
                    1,
                    1,
                    TripleStatus::Failed {
                        code: "E010".into(),
                        message: "bad".into(),
                    },
                ),
            ],
            vec![],
        );

        let order: Vec<(i64, i64)> = result
            .outcomes
            .iter()
            .map(|o| (o.subject_id, o.student_id))
            .collect();
        assert_eq!(order, vec![(1, 1), (1, 2), (2, 1)]);
        assert_eq!(result.summary.total, 3);
        assert_eq!(result.summary.updated, 1);
        assert_eq!(result.summary.skipped, 1);
        assert_eq!(result.summary.failed, 1);
    }

    #[test]
    fn test_outcome_serializes_flat_with_status_tag() {
        let o = outcome(
            3,
            4,
            TripleStatus::Skipped {
                reason: SkipReason::NoTermAverages,
            },
        );
        let json = serde_json::to_value(&o).unwrap();
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["reason"], "no_term_averages");
        assert_eq!(json["student_id"], 3);
    }

    #[test]
    fn test_filter_allows_student() {
        assert!(BatchFilter::default().allows_student(9));
        let filter = BatchFilter::subjects(vec![1]).with_students(vec![2, 3]);
        assert!(filter.allows_student(3));
        assert!(!filter.allows_student(4));
    }

    #[test]
    fn test_run_options_from_config() {
        let config = AggregationConfig {
            max_concurrency: 0,
            batch_timeout_secs: 0,
            conflict_retries: 5,
            retry_backoff_ms: 50,
        };
        let options = RunOptions::from_config(&config);
        assert_eq!(options.max_concurrency, 1);
        assert!(options.timeout.is_none());
        assert_eq!(options.conflict_retries, 5);
    }
}
