use rust_decimal::Decimal;

use crate::models::averages::entities::TermAverage;
use crate::models::evaluations::entities::Evaluation;
use crate::models::grades::entities::GradeRecord;
use crate::models::reports::responses::{EvaluationStats, TermReport};
use crate::utils::{normalize, ratio_pct};

fn mean(values: impl ExactSizeIterator<Item = Decimal>) -> Option<Decimal> {
    let count = values.len();
    if count == 0 {
        return None;
    }
    let sum: Decimal = values.sum();
    Some(normalize(sum / Decimal::from(count)))
}

pub fn summarize_term(
    term_id: i64,
    subject_id: Option<i64>,
    course_id: Option<i64>,
    rows: Vec<TermAverage>,
) -> TermReport {
    let total = rows.len() as i64;
    let passed = rows.iter().filter(|r| r.fields.passed).count() as i64;
    let zero = normalize(Decimal::ZERO);

    TermReport {
        term_id,
        subject_id,
        course_id,
        total,
        passed,
        failed: total - passed,
        pass_rate: ratio_pct(Decimal::from(passed), Decimal::from(total)),
        general_average: mean(rows.iter().map(|r| r.fields.final_average)).unwrap_or(zero),
        average_attendance: mean(rows.iter().map(|r| r.fields.attendance_pct)).unwrap_or(zero),
        rows,
    }
}

/// 只统计已定稿成绩，及格线取评价自身的及格分
pub fn evaluation_stats(evaluation: &Evaluation, grades: &[GradeRecord]) -> EvaluationStats {
    let scores: Vec<Decimal> = grades
        .iter()
        .filter(|g| g.finalized)
        .map(|g| g.final_score)
        .collect();
    let pass_score = evaluation.min_pass_score();
    let passed = scores.iter().filter(|s| **s >= pass_score).count() as i64;

    EvaluationStats {
        evaluation: evaluation.reference(),
        count: scores.len() as i64,
        mean: mean(scores.iter().copied()),
        max: scores.iter().max().copied().map(normalize),
        min: scores.iter().min().copied().map(normalize),
        passed,
        failed: scores.len() as i64 - passed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::averages::entities::TermAverageFields;
    use crate::models::evaluations::entities::{EvaluationDetails, EvaluationRef, ParticipationDetails};
    use chrono::{NaiveDate, Utc};
    use rust_decimal::dec;

    fn row(student_id: i64, average: Decimal, attendance: Decimal, passed: bool) -> TermAverage {
        TermAverage {
            id: student_id,
            student_id,
            subject_id: 1,
            term_id: 1,
            fields: TermAverageFields {
                evaluation_average: average,
                final_average: average,
                classes_total: 10,
                classes_present: 8,
                attendance_pct: attendance,
                passed,
            },
            auto_computed: true,
            computed_at: Utc::now(),
        }
    }

    #[test]
    fn test_term_summary() {
        let report = summarize_term(
            1,
            Some(1),
            None,
            vec![
                row(1, dec!(85.00), dec!(90.00), true),
                row(2, dec!(40.00), dec!(70.00), false),
                row(3, dec!(60.00), dec!(95.00), true),
            ],
        );
        assert_eq!(report.total, 3);
        assert_eq!(report.passed, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.pass_rate, dec!(66.67));
        assert_eq!(report.general_average, dec!(61.67));
        assert_eq!(report.average_attendance, dec!(85.00));
    }

    #[test]
    fn test_empty_term_summary() {
        let report = summarize_term(1, None, None, vec![]);
        assert_eq!(report.total, 0);
        assert_eq!(report.pass_rate.to_string(), "0.00");
        assert_eq!(report.general_average.to_string(), "0.00");
    }

    #[test]
    fn test_evaluation_stats_ignore_unfinalized() {
        let evaluation = Evaluation {
            id: 3,
            subject_id: 1,
            term_id: 1,
            evaluation_type_id: 1,
            title: "Participación".into(),
            description: None,
            weight_percentage: dec!(10),
            active: true,
            published: true,
            details: EvaluationDetails::Participation(ParticipationDetails {
                registration_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                criteria: None,
            }),
            created_at: Utc::now(),
        };
        let grade = |student_id, score, finalized| GradeRecord {
            id: student_id,
            evaluation: EvaluationRef::participation(3),
            student_id,
            raw_score: score,
            late: false,
            penalty_percentage: dec!(0),
            final_score: score,
            finalized,
            graded_at: Utc::now(),
        };

        let stats = evaluation_stats(
            &evaluation,
            &[
                grade(1, dec!(90), true),
                grade(2, dec!(50), true),
                grade(3, dec!(100), false),
            ],
        );
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean, Some(dec!(70.00)));
        assert_eq!(stats.max, Some(dec!(90.00)));
        assert_eq!(stats.min, Some(dec!(50.00)));
        assert_eq!(stats.passed, 1);
        assert_eq!(stats.failed, 1);
    }
}
