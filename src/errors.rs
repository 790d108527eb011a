//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。
//! 带结构化负载的领域子错误（权重配置、成绩计算）定义在下方，
//! 通过 `From` 转换汇入 [`AggregatorError`]。

use rust_decimal::Decimal;
use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_aggregator_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum AggregatorError {
            $($variant(String),)*
        }

        impl AggregatorError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(AggregatorError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(AggregatorError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(AggregatorError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl AggregatorError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        AggregatorError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_aggregator_errors! {
    Configuration("E001", "Configuration Error"),
    DatabaseConfig("E002", "Database Configuration Error"),
    DatabaseConnection("E003", "Database Connection Error"),
    DatabaseOperation("E004", "Database Operation Error"),
    TransactionConflict("E005", "Transaction Conflict"),
    Validation("E006", "Validation Error"),
    NotFound("E007", "Resource Not Found"),
    LateDeliveryRejected("E008", "Late Delivery Rejected"),
    InvalidStateTransition("E009", "Invalid State Transition"),
    CorruptGrade("E010", "Corrupt Grade"),
    Cancelled("E011", "Batch Cancelled"),
    Timeout("E012", "Batch Timeout"),
    Serialization("E013", "Serialization Error"),
    DateParse("E014", "Date Parse Error"),
    Internal("E015", "Internal Error"),
}

impl AggregatorError {
    /// 是否应当整体重试批处理（序列化冲突、死锁、唯一键竞争）
    pub fn is_retryable(&self) -> bool {
        matches!(self, AggregatorError::TransactionConflict(_))
    }

    /// 是否为存储层错误（会导致整个批处理回滚）
    pub fn is_storage_level(&self) -> bool {
        matches!(
            self,
            AggregatorError::DatabaseConfig(_)
                | AggregatorError::DatabaseConnection(_)
                | AggregatorError::DatabaseOperation(_)
                | AggregatorError::TransactionConflict(_)
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for AggregatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for AggregatorError {}

/// 判断数据库错误是否属于可重试的并发冲突
///
/// PostgreSQL 40001/40P01、MySQL 1213/1205、SQLite busy，以及并发插入撞上唯一键。
pub(crate) fn is_conflict_message(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    [
        "40001",
        "40p01",
        "could not serialize",
        "deadlock",
        "lock wait timeout",
        "database is locked",
        "unique constraint",
        "duplicate key",
        "duplicate entry",
    ]
    .iter()
    .any(|needle| lower.contains(needle))
}

/// 权重配置错误，配置时同步拒绝，从不静默截断
#[derive(Debug, Clone, PartialEq)]
pub enum WeightConfigError {
    // 百分比不在 [0, 100]
    PercentageOutOfRange { percentage: Decimal },
    // 加上其余有效权重后超过 100
    PercentageOverflow { available: Decimal },
}

impl fmt::Display for WeightConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightConfigError::PercentageOutOfRange { percentage } => {
                write!(f, "权重百分比 {percentage} 超出范围 [0, 100]")
            }
            WeightConfigError::PercentageOverflow { available } => {
                write!(f, "权重总和将超过 100%，剩余可分配 {available}%")
            }
        }
    }
}

impl std::error::Error for WeightConfigError {}

impl From<WeightConfigError> for AggregatorError {
    fn from(err: WeightConfigError) -> Self {
        AggregatorError::Validation(err.to_string())
    }
}

/// 成绩计算错误
#[derive(Debug, Clone, PartialEq)]
pub enum GradeError {
    // 标记迟交，但评价不接受迟交
    LateDeliveryRejected,
    ScoreOutOfRange { score: Decimal, max_score: Decimal },
    PenaltyOutOfRange { penalty: Decimal },
}

impl fmt::Display for GradeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradeError::LateDeliveryRejected => write!(f, "该评价不接受迟交"),
            GradeError::ScoreOutOfRange { score, max_score } => {
                write!(f, "分数 {score} 超出范围 [0, {max_score}]")
            }
            GradeError::PenaltyOutOfRange { penalty } => {
                write!(f, "罚分百分比 {penalty} 超出范围 [0, 100]")
            }
        }
    }
}

impl std::error::Error for GradeError {}

impl From<GradeError> for AggregatorError {
    fn from(err: GradeError) -> Self {
        match err {
            GradeError::LateDeliveryRejected => AggregatorError::LateDeliveryRejected(err.to_string()),
            _ => AggregatorError::Validation(err.to_string()),
        }
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for AggregatorError {
    fn from(err: sea_orm::DbErr) -> Self {
        let message = err.to_string();
        if is_conflict_message(&message) {
            AggregatorError::TransactionConflict(message)
        } else {
            AggregatorError::DatabaseOperation(message)
        }
    }
}

impl From<serde_json::Error> for AggregatorError {
    fn from(err: serde_json::Error) -> Self {
        AggregatorError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for AggregatorError {
    fn from(err: chrono::ParseError) -> Self {
        AggregatorError::DateParse(err.to_string())
    }
}

impl From<config::ConfigError> for AggregatorError {
    fn from(err: config::ConfigError) -> Self {
        AggregatorError::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AggregatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AggregatorError::configuration("test").code(), "E001");
        assert_eq!(AggregatorError::not_found("test").code(), "E007");
        assert_eq!(AggregatorError::late_delivery_rejected("test").code(), "E008");
        assert_eq!(AggregatorError::timeout("test").code(), "E012");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            AggregatorError::corrupt_grade("test").error_type(),
            "Corrupt Grade"
        );
        assert_eq!(
            AggregatorError::validation("test").error_type(),
            "Validation Error"
        );
    }

    #[test]
    fn test_format_simple() {
        let err = AggregatorError::not_found("term 42");
        let formatted = err.format_simple();
        assert!(formatted.contains("Resource Not Found"));
        assert!(formatted.contains("term 42"));
    }

    #[test]
    fn test_conflict_classification() {
        assert!(is_conflict_message(
            "Execution Error: error returned from database: could not serialize access"
        ));
        assert!(is_conflict_message("UNIQUE constraint failed: term_averages.student_id"));
        assert!(is_conflict_message("database is locked"));
        assert!(!is_conflict_message("no such table: terms"));

        let err: AggregatorError = sea_orm::DbErr::Custom("deadlock detected".into()).into();
        assert!(err.is_retryable());
        assert!(err.is_storage_level());

        let err: AggregatorError = sea_orm::DbErr::Custom("syntax error".into()).into();
        assert!(!err.is_retryable());
        assert_eq!(err.code(), "E004");
    }

    #[test]
    fn test_domain_errors_convert() {
        let err: AggregatorError = WeightConfigError::PercentageOverflow {
            available: rust_decimal::dec!(40.00),
        }
        .into();
        assert_eq!(err.code(), "E006");
        assert!(err.message().contains("40.00"));

        let err: AggregatorError = GradeError::LateDeliveryRejected.into();
        assert_eq!(err.code(), "E008");
    }
}
