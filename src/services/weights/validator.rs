//! 权重配置校验（纯函数）

use rust_decimal::Decimal;

use crate::errors::WeightConfigError;
use crate::utils::{HUNDRED, normalize, validate_percentage};

/// 剩余可分配百分比，不小于 0
pub fn available(assigned_total: Decimal) -> Decimal {
    normalize((HUNDRED - assigned_total).max(Decimal::ZERO))
}

/// 校验新百分比：必须在 [0, 100]，且与其余有效权重之和不超过 100
pub fn check_weight(others_total: Decimal, percentage: Decimal) -> Result<(), WeightConfigError> {
    if validate_percentage(percentage).is_err() {
        return Err(WeightConfigError::PercentageOutOfRange {
            percentage: normalize(percentage),
        });
    }

    if others_total + percentage > HUNDRED {
        return Err(WeightConfigError::PercentageOverflow {
            available: available(others_total),
        });
    }

    Ok(())
}
