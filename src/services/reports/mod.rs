//! 报表服务：只读取已持久化的平均成绩与成绩台账

pub mod summary;

use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::{AggregatorError, Result};
use crate::models::evaluations::entities::EvaluationRef;
use crate::models::reports::responses::{
    AnnualComparisonRow, EvaluationStats, TermBreakdown, TermReport,
};
use crate::storage::Storage;

pub use summary::{evaluation_stats, summarize_term};

pub struct ReportService {
    storage: Arc<dyn Storage>,
}

impl ReportService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// 学期报表，可按科目或课程过滤
    pub async fn term_report(
        &self,
        term_id: i64,
        subject_id: Option<i64>,
        course_id: Option<i64>,
    ) -> Result<TermReport> {
        if self.storage.get_term(term_id).await?.is_none() {
            return Err(AggregatorError::not_found(format!("学期 {term_id} 不存在")));
        }

        let subject_ids = match (subject_id, course_id) {
            (None, None) => None,
            (Some(subject_id), None) => Some(vec![subject_id]),
            (subject_id, Some(course_id)) => Some(
                self.storage
                    .subjects_of(course_id)
                    .await?
                    .into_iter()
                    .map(|s| s.id)
                    .filter(|id| subject_id.is_none_or(|wanted| wanted == *id))
                    .collect(),
            ),
        };

        let rows = self
            .storage
            .term_averages_for(&[term_id], subject_ids.as_deref(), None)
            .await?;
        Ok(summarize_term(term_id, subject_id, course_id, rows))
    }

    /// 单个评价的已定稿成绩统计
    pub async fn evaluation_statistics(&self, evaluation: EvaluationRef) -> Result<EvaluationStats> {
        let Some(found) = self.storage.get_evaluation(evaluation).await? else {
            return Err(AggregatorError::not_found(format!("评价 {evaluation} 不存在")));
        };
        let grades = self.storage.grades_of_evaluation(evaluation).await?;
        Ok(evaluation_stats(&found, &grades))
    }

    /// 学年对比：每条学年平均附带各学期明细
    pub async fn annual_comparison(
        &self,
        year: i32,
        student_id: Option<i64>,
        subject_id: Option<i64>,
    ) -> Result<Vec<AnnualComparisonRow>> {
        let terms = self.storage.terms_of_year(year).await?;
        if terms.is_empty() {
            return Err(AggregatorError::not_found(format!("{year} 学年没有任何学期")));
        }

        let students = student_id.map(|id| vec![id]);
        let subjects = subject_id.map(|id| vec![id]);
        let annuals = self
            .storage
            .annual_averages_for(year, subjects.as_deref(), students.as_deref())
            .await?;

        let term_ids: Vec<i64> = terms.iter().map(|t| t.id).collect();
        let mut term_rows: HashMap<(i64, i64, i64), _> = self
            .storage
            .term_averages_for(&term_ids, subjects.as_deref(), students.as_deref())
            .await?
            .into_iter()
            .map(|row| ((row.student_id, row.subject_id, row.term_id), row.fields))
            .collect();

        Ok(annuals
            .into_iter()
            .map(|annual| {
                let breakdown = terms
                    .iter()
                    .map(|term| {
                        let fields =
                            term_rows.remove(&(annual.student_id, annual.subject_id, term.id));
                        TermBreakdown {
                            term_id: term.id,
                            number: term.number,
                            final_average: fields.as_ref().map(|f| f.final_average),
                            attendance_pct: fields.as_ref().map(|f| f.attendance_pct),
                            passed: fields.as_ref().map(|f| f.passed),
                        }
                    })
                    .collect();
                AnnualComparisonRow {
                    annual,
                    terms: breakdown,
                }
            })
            .collect())
    }
}
