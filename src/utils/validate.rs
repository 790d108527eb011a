use rust_decimal::Decimal;

use super::decimal::HUNDRED;

/// 百分比校验：0 <= x <= 100
pub fn validate_percentage(value: Decimal) -> Result<(), &'static str> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err("Percentage must not be negative");
    }
    if value > HUNDRED {
        return Err("Percentage must not exceed 100");
    }
    Ok(())
}

/// 分数校验：0 <= x <= max_score
pub fn validate_score(value: Decimal, max_score: Decimal) -> Result<(), &'static str> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err("Score must not be negative");
    }
    if value > max_score {
        return Err("Score must not exceed the evaluation's maximum score");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    #[test]
    fn test_validate_percentage() {
        assert!(validate_percentage(dec!(0)).is_ok());
        assert!(validate_percentage(dec!(100.00)).is_ok());
        assert!(validate_percentage(dec!(-0.01)).is_err());
        assert!(validate_percentage(dec!(100.01)).is_err());
    }

    #[test]
    fn test_validate_score() {
        assert!(validate_score(dec!(20), dec!(20)).is_ok());
        assert!(validate_score(dec!(20.5), dec!(20)).is_err());
        assert!(validate_score(dec!(-1), dec!(20)).is_err());
    }
}
