use rust_decimal::Decimal;

use crate::errors::{AggregatorError, Result};
use crate::models::evaluations::entities::EvaluationDetails;
use crate::utils::{HUNDRED, normalize, validate_percentage};

/// 评价自身权重必须在 (0, 100]
pub fn validate_evaluation_weight(weight: Decimal) -> Result<()> {
    if weight <= Decimal::ZERO || weight > HUNDRED {
        return Err(AggregatorError::validation(format!(
            "评价权重 {weight} 必须在 (0, 100] 范围内"
        )));
    }
    Ok(())
}

/// 同类型评价的权重之和不能超过该类型的权重配置
///
/// `existing` 为该学期同科目同类型的其余有效评价权重。
pub fn validate_type_share(
    existing: &[Decimal],
    weight: Decimal,
    type_percentage: Decimal,
) -> Result<()> {
    if weight > type_percentage {
        return Err(AggregatorError::validation(format!(
            "评价权重 {weight} 超过评价类型的权重配置 {type_percentage}"
        )));
    }

    let used: Decimal = existing.iter().copied().sum();
    if used + weight > type_percentage {
        return Err(AggregatorError::validation(format!(
            "同类型评价权重合计将超过 {type_percentage}，剩余可分配 {}",
            normalize((type_percentage - used).max(Decimal::ZERO))
        )));
    }
    Ok(())
}

/// 校验评价变体的专有字段
pub fn validate_details(details: &EvaluationDetails) -> Result<()> {
    let EvaluationDetails::Deliverable(d) = details else {
        return Ok(());
    };

    if d.due_date < d.assigned_date {
        return Err(AggregatorError::validation(format!(
            "截止日期 {} 早于布置日期 {}",
            d.due_date, d.assigned_date
        )));
    }
    if let Some(limit) = d.limit_date
        && limit < d.due_date
    {
        return Err(AggregatorError::validation(format!(
            "最迟提交日期 {limit} 早于截止日期 {}",
            d.due_date
        )));
    }
    if d.max_score <= Decimal::ZERO {
        return Err(AggregatorError::validation("满分必须大于 0"));
    }
    if d.min_pass_score < Decimal::ZERO || d.min_pass_score > d.max_score {
        return Err(AggregatorError::validation(format!(
            "及格分 {} 必须在 [0, {}] 范围内",
            d.min_pass_score, d.max_score
        )));
    }
    validate_percentage(d.late_penalty_percentage)
        .map_err(|e| AggregatorError::validation(format!("迟交罚分: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::evaluations::entities::DeliverableDetails;
    use chrono::NaiveDate;
    use rust_decimal::dec;

    fn details() -> DeliverableDetails {
        DeliverableDetails {
            assigned_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            limit_date: Some(NaiveDate::from_ymd_opt(2025, 3, 12).unwrap()),
            max_score: dec!(100),
            min_pass_score: dec!(51),
            allows_late: true,
            late_penalty_percentage: dec!(10),
        }
    }

    #[test]
    fn test_valid_deliverable() {
        assert!(validate_details(&EvaluationDetails::Deliverable(details())).is_ok());
    }

    #[test]
    fn test_deliverable_date_order() {
        let d = DeliverableDetails {
            due_date: NaiveDate::from_ymd_opt(2025, 2, 20).unwrap(),
            ..details()
        };
        assert!(validate_details(&EvaluationDetails::Deliverable(d)).is_err());

        let d = DeliverableDetails {
            limit_date: Some(NaiveDate::from_ymd_opt(2025, 3, 9).unwrap()),
            ..details()
        };
        assert!(validate_details(&EvaluationDetails::Deliverable(d)).is_err());
    }

    #[test]
    fn test_deliverable_scores() {
        let d = DeliverableDetails {
            min_pass_score: dec!(101),
            ..details()
        };
        assert!(validate_details(&EvaluationDetails::Deliverable(d)).is_err());

        let d = DeliverableDetails {
            late_penalty_percentage: dec!(150),
            ..details()
        };
        assert!(validate_details(&EvaluationDetails::Deliverable(d)).is_err());
    }

    #[test]
    fn test_evaluation_weight_range() {
        assert!(validate_evaluation_weight(dec!(0)).is_err());
        assert!(validate_evaluation_weight(dec!(100.01)).is_err());
        assert!(validate_evaluation_weight(dec!(100)).is_ok());
    }

    #[test]
    fn test_type_share() {
        assert!(validate_type_share(&[dec!(20)], dec!(20), dec!(40)).is_ok());
        assert!(validate_type_share(&[dec!(20), dec!(10)], dec!(20), dec!(40)).is_err());
        assert!(validate_type_share(&[], dec!(50), dec!(40)).is_err());
    }
}
