//! 出勤服务

use std::sync::Arc;
use tracing::debug;

use crate::errors::{AggregatorError, Result};
use crate::models::UpsertAction;
use crate::models::attendance::{
    entities::AttendanceRecord,
    requests::{AttendanceWrite, RecordAttendanceRequest},
};
use crate::storage::Storage;

pub struct AttendanceService {
    storage: Arc<dyn Storage>,
}

impl AttendanceService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// 登记出勤，按 (学生, 科目, 日期) 写入或覆盖
    ///
    /// 未指定学期时按日期匹配；指定学期时日期必须落在学期范围内。
    pub async fn record_attendance(
        &self,
        req: RecordAttendanceRequest,
    ) -> Result<(AttendanceRecord, UpsertAction)> {
        if self.storage.get_student(req.student_id).await?.is_none() {
            return Err(AggregatorError::not_found(format!(
                "学生 {} 不存在",
                req.student_id
            )));
        }
        if self.storage.get_subject(req.subject_id).await?.is_none() {
            return Err(AggregatorError::not_found(format!(
                "科目 {} 不存在",
                req.subject_id
            )));
        }

        let term = match req.term_id {
            Some(term_id) => {
                let term = self
                    .storage
                    .get_term(term_id)
                    .await?
                    .ok_or_else(|| AggregatorError::not_found(format!("学期 {term_id} 不存在")))?;
                if !term.contains(req.date) {
                    return Err(AggregatorError::validation(format!(
                        "日期 {} 不在学期 {} 范围内 ({} ~ {})",
                        req.date, term.id, term.start_date, term.end_date
                    )));
                }
                term
            }
            None => self
                .storage
                .term_for_date(req.date)
                .await?
                .ok_or_else(|| {
                    AggregatorError::not_found(format!("日期 {} 不属于任何学期", req.date))
                })?,
        };

        let (record, action) = self
            .storage
            .upsert_attendance(AttendanceWrite {
                student_id: req.student_id,
                subject_id: req.subject_id,
                term_id: term.id,
                date: req.date,
                present: req.present,
                justified: req.justified,
            })
            .await?;
        debug!(
            "Attendance {} {:?} for student {} on {}",
            record.id, action, record.student_id, record.date
        );
        Ok((record, action))
    }
}
