//! 学年平均计算（纯函数）

use rust_decimal::{Decimal, dec};

use crate::models::averages::entities::{AnnualAverageFields, TermAverageFields};
use crate::utils::normalize;

/// 学年及格线，与各学期的及格线无关
pub const ANNUAL_PASS_SCORE: Decimal = dec!(51.00);

/// 由已有的学期平均计算学年平均
///
/// 缺失的学期直接省略而不是按 0 计入；没有任何学期平均时返回 `None`。
pub fn compute_annual_average(terms: &[(i32, TermAverageFields)]) -> Option<AnnualAverageFields> {
    if terms.is_empty() {
        return None;
    }

    let count = Decimal::from(terms.len());
    let average_sum: Decimal = terms.iter().map(|(_, f)| f.final_average).sum();
    let attendance_sum: Decimal = terms.iter().map(|(_, f)| f.attendance_pct).sum();

    let column = |number: i32| {
        terms
            .iter()
            .find(|(n, _)| *n == number)
            .map(|(_, f)| normalize(f.final_average))
    };

    let raw_average = average_sum / count;
    Some(AnnualAverageFields {
        term1_average: column(1),
        term2_average: column(2),
        term3_average: column(3),
        annual_average: normalize(raw_average),
        attendance_pct_annual: normalize(attendance_sum / count),
        passed_annual: raw_average >= ANNUAL_PASS_SCORE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(average: Decimal, attendance: Decimal) -> TermAverageFields {
        TermAverageFields {
            evaluation_average: average,
            final_average: average,
            classes_total: 10,
            classes_present: 9,
            attendance_pct: attendance,
            passed: true,
        }
    }

    #[test]
    fn test_missing_terms_are_omitted() {
        let fields = compute_annual_average(&[
            (1, term(dec!(70.00), dec!(90.00))),
            (2, term(dec!(80.00), dec!(80.00))),
        ])
        .unwrap();
        assert_eq!(fields.annual_average, dec!(75.00));
        assert_eq!(fields.attendance_pct_annual, dec!(85.00));
        assert_eq!(fields.term1_average, Some(dec!(70.00)));
        assert_eq!(fields.term2_average, Some(dec!(80.00)));
        assert_eq!(fields.term3_average, None);
        assert!(fields.passed_annual);
    }

    #[test]
    fn test_columns_follow_term_number() {
        let fields = compute_annual_average(&[(3, term(dec!(40.00), dec!(100.00)))]).unwrap();
        assert_eq!(fields.term1_average, None);
        assert_eq!(fields.term3_average, Some(dec!(40.00)));
        assert!(!fields.passed_annual);
    }

    #[test]
    fn test_fixed_pass_threshold() {
        let fields = compute_annual_average(&[
            (1, term(dec!(50.00), dec!(100.00))),
            (2, term(dec!(52.00), dec!(100.00))),
        ])
        .unwrap();
        assert_eq!(fields.annual_average, dec!(51.00));
        assert!(fields.passed_annual);
    }

    #[test]
    fn test_pass_threshold_uses_unrounded_average() {
        let fields = compute_annual_average(&[
            (1, term(dec!(50.99), dec!(100.00))),
            (2, term(dec!(51.00), dec!(100.00))),
        ])
        .unwrap();
        assert_eq!(fields.annual_average, dec!(51.00));
        assert!(!fields.passed_annual);
    }

    #[test]
    fn test_no_terms_is_none() {
        assert!(compute_annual_average(&[]).is_none());
    }
}
