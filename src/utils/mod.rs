pub mod decimal;
pub mod validate;

pub use decimal::{HUNDRED, normalize, percent_of, ratio_pct};
pub use validate::{validate_percentage, validate_score};
