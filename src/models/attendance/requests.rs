use chrono::NaiveDate;
use serde::Deserialize;

/// 登记出勤请求，term_id 缺省时按日期自动匹配学期
#[derive(Debug, Clone, Deserialize)]
pub struct RecordAttendanceRequest {
    pub student_id: i64,
    pub subject_id: i64,
    pub term_id: Option<i64>,
    pub date: NaiveDate,
    pub present: bool,
    #[serde(default)]
    pub justified: bool,
}

/// 已确定学期的出勤写入
#[derive(Debug, Clone)]
pub struct AttendanceWrite {
    pub student_id: i64,
    pub subject_id: i64,
    pub term_id: i64,
    pub date: NaiveDate,
    pub present: bool,
    pub justified: bool,
}
