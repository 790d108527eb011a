use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SetWeightRequest {
    pub subject_id: i64,
    pub evaluation_type_id: i64,
    pub percentage: Decimal,
}
