//! 精确小数工具
//!
//! 所有分数、百分比均以两位小数持久化；派生值统一使用银行家舍入（四舍六入五成双）。

use rust_decimal::{Decimal, RoundingStrategy};

pub const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// 规范化为两位小数
///
/// SQLite 经由 f64 读回的值可能带有二进制误差（如 84.99999999），
/// 这里统一舍入并固定 scale = 2，保证重复计算的结果逐字节一致。
pub fn normalize(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(2);
    rounded
}

/// `value × pct / 100`
pub fn percent_of(value: Decimal, pct: Decimal) -> Decimal {
    value * pct / HUNDRED
}

/// `part / total × 100`，total 为 0 时返回 0
pub fn ratio_pct(part: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        return normalize(Decimal::ZERO);
    }
    normalize(part / total * HUNDRED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    #[test]
    fn test_normalize_uses_half_even() {
        assert_eq!(normalize(dec!(2.345)), dec!(2.34));
        assert_eq!(normalize(dec!(2.355)), dec!(2.36));
        assert_eq!(normalize(dec!(84.999999999)), dec!(85.00));
    }

    #[test]
    fn test_normalize_fixes_scale() {
        assert_eq!(normalize(dec!(85)).to_string(), "85.00");
        assert_eq!(normalize(dec!(7.5)).to_string(), "7.50");
        assert_eq!(normalize(Decimal::ZERO).to_string(), "0.00");
    }

    #[test]
    fn test_ratio_pct() {
        assert_eq!(ratio_pct(dec!(2), dec!(5)), dec!(40.00));
        assert_eq!(ratio_pct(dec!(1), dec!(3)), dec!(33.33));
        assert_eq!(ratio_pct(dec!(3), Decimal::ZERO), dec!(0.00));
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(dec!(100), dec!(20)), dec!(20));
        assert_eq!(normalize(percent_of(dec!(80), dec!(50))), dec!(40.00));
    }
}
