use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 学期平均的唯一键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TermAverageKey {
    pub student_id: i64,
    pub subject_id: i64,
    pub term_id: i64,
}

/// 学年平均的唯一键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnnualAverageKey {
    pub student_id: i64,
    pub subject_id: i64,
    pub year: i32,
}

/// 学期汇总计算出的字段（纯函数输出）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermAverageFields {
    pub evaluation_average: Decimal,
    pub final_average: Decimal,
    pub classes_total: i32,
    pub classes_present: i32,
    pub attendance_pct: Decimal,
    pub passed: bool,
}

/// 学年汇总计算出的字段，缺失的学期为 None
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualAverageFields {
    pub term1_average: Option<Decimal>,
    pub term2_average: Option<Decimal>,
    pub term3_average: Option<Decimal>,
    pub annual_average: Decimal,
    pub attendance_pct_annual: Decimal,
    pub passed_annual: bool,
}

// 学期平均（持久化行）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermAverage {
    pub id: i64,
    pub student_id: i64,
    pub subject_id: i64,
    pub term_id: i64,
    #[serde(flatten)]
    pub fields: TermAverageFields,
    pub auto_computed: bool,
    pub computed_at: chrono::DateTime<chrono::Utc>,
}

impl TermAverage {
    pub fn key(&self) -> TermAverageKey {
        TermAverageKey {
            student_id: self.student_id,
            subject_id: self.subject_id,
            term_id: self.term_id,
        }
    }
}

// 学年平均（持久化行）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualAverage {
    pub id: i64,
    pub student_id: i64,
    pub subject_id: i64,
    pub year: i32,
    #[serde(flatten)]
    pub fields: AnnualAverageFields,
    pub auto_computed: bool,
    pub computed_at: chrono::DateTime<chrono::Utc>,
}

impl AnnualAverage {
    pub fn key(&self) -> AnnualAverageKey {
        AnnualAverageKey {
            student_id: self.student_id,
            subject_id: self.subject_id,
            year: self.year,
        }
    }
}
