//! 出勤存储操作

use super::{IN_CHUNK, SeaOrmStorage, db_error};
use crate::entity::attendance::{ActiveModel, Column, Entity as Attendance};
use crate::errors::Result;
use crate::models::{
    UpsertAction,
    attendance::{entities::AttendanceRecord, requests::AttendanceWrite},
};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use std::ops::RangeInclusive;

/// 批量读取出勤，日期区间两端均包含
pub(super) async fn attendance_for<C: ConnectionTrait>(
    db: &C,
    student_ids: &[i64],
    subject_ids: &[i64],
    range: &RangeInclusive<NaiveDate>,
) -> Result<Vec<AttendanceRecord>> {
    if student_ids.is_empty() || subject_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut result = Vec::new();
    for subject_chunk in subject_ids.chunks(IN_CHUNK) {
        for student_chunk in student_ids.chunks(IN_CHUNK) {
            let rows = Attendance::find()
                .filter(Column::SubjectId.is_in(subject_chunk.to_vec()))
                .filter(Column::StudentId.is_in(student_chunk.to_vec()))
                .filter(Column::Date.between(*range.start(), *range.end()))
                .order_by_asc(Column::Date)
                .all(db)
                .await
                .map_err(db_error("批量查询出勤失败"))?;
            result.extend(rows.into_iter().map(|m| m.into_attendance()));
        }
    }

    Ok(result)
}

impl SeaOrmStorage {
    /// 按 (学生, 科目, 日期) 写入或覆盖出勤
    pub async fn upsert_attendance_impl(
        &self,
        record: AttendanceWrite,
    ) -> Result<(AttendanceRecord, UpsertAction)> {
        let now = chrono::Utc::now().timestamp();

        let existing = Attendance::find()
            .filter(Column::StudentId.eq(record.student_id))
            .filter(Column::SubjectId.eq(record.subject_id))
            .filter(Column::Date.eq(record.date))
            .one(&self.db)
            .await
            .map_err(db_error("查询出勤失败"))?;

        let (model, action) = match existing {
            Some(model) => {
                let mut active = model.into_active_model();
                active.term_id = Set(record.term_id);
                active.present = Set(record.present);
                active.justified = Set(record.justified);
                active.updated_at = Set(now);
                let updated = active
                    .update(&self.db)
                    .await
                    .map_err(db_error("更新出勤失败"))?;
                (updated, UpsertAction::Updated)
            }
            None => {
                let created = ActiveModel {
                    student_id: Set(record.student_id),
                    subject_id: Set(record.subject_id),
                    term_id: Set(record.term_id),
                    date: Set(record.date),
                    present: Set(record.present),
                    justified: Set(record.justified),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&self.db)
                .await
                .map_err(db_error("创建出勤失败"))?;
                (created, UpsertAction::Created)
            }
        };

        Ok((model.into_attendance(), action))
    }
}
