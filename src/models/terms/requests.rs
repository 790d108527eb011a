use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::entities::TermState;

/// 创建学期请求，未给出的截止日与阈值由服务层补默认值
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTermRequest {
    pub number: i32,
    pub year: i32,
    pub name: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub eval_deadline: Option<NaiveDate>,
    pub grade_deadline: Option<NaiveDate>,
    pub min_pass_score: Option<Decimal>,
    pub min_attendance_pct: Option<Decimal>,
    pub state: Option<TermState>,
}

/// 校验并补全默认值后的学期数据，由存储层直接写入
#[derive(Debug, Clone)]
pub struct NewTerm {
    pub number: i32,
    pub year: i32,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub eval_deadline: NaiveDate,
    pub grade_deadline: NaiveDate,
    pub min_pass_score: Decimal,
    pub min_attendance_pct: Decimal,
    pub state: TermState,
}
