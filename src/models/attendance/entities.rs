use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// 出勤记录，每个 (学生, 科目, 日期) 唯一
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: i64,
    pub student_id: i64,
    pub subject_id: i64,
    pub term_id: i64,
    pub date: NaiveDate,
    pub present: bool,
    // 请假（仍计为缺勤）
    pub justified: bool,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
