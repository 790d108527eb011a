//! 平均成绩存储操作
//!
//! 两张平均表都以唯一键覆盖写入：首次创建，之后只更新，从不追加。

use super::{IN_CHUNK, db_error};
use crate::entity::annual_averages::{
    self as annual, ActiveModel as AnnualActiveModel, Entity as AnnualAverages,
};
use crate::entity::term_averages::{
    self as term, ActiveModel as TermActiveModel, Entity as TermAverages,
};
use crate::errors::Result;
use crate::models::{
    UpsertAction,
    averages::entities::{
        AnnualAverage, AnnualAverageFields, AnnualAverageKey, TermAverage, TermAverageFields,
        TermAverageKey,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    Select, Set,
};

/// 可选的 IN 过滤；ids 为空切片时不会匹配任何行
fn filter_ids<E, C>(select: Select<E>, column: C, ids: Option<&[i64]>) -> Select<E>
where
    E: EntityTrait,
    C: ColumnTrait,
{
    match ids {
        Some(ids) => select.filter(column.is_in(ids.to_vec())),
        None => select,
    }
}

/// 按 `IN_CHUNK` 切分可选的 id 列表
///
/// `None` 表示不过滤，产生一次 `None`；空切片仍产生一次 `Some(&[])`，不匹配任何行。
fn id_chunks(ids: Option<&[i64]>) -> Vec<Option<&[i64]>> {
    match ids {
        None => vec![None],
        Some([]) => vec![Some(&[][..])],
        Some(ids) => ids.chunks(IN_CHUNK).map(Some).collect(),
    }
}

pub(super) async fn term_averages_for<C: ConnectionTrait>(
    db: &C,
    term_ids: &[i64],
    subject_ids: Option<&[i64]>,
    student_ids: Option<&[i64]>,
) -> Result<Vec<TermAverage>> {
    let mut result = Vec::new();
    for term_chunk in term_ids.chunks(IN_CHUNK) {
        for student_chunk in id_chunks(student_ids) {
            let select =
                TermAverages::find().filter(term::Column::TermId.is_in(term_chunk.to_vec()));
            let select = filter_ids(select, term::Column::SubjectId, subject_ids);
            let select = filter_ids(select, term::Column::StudentId, student_chunk);

            let rows = select
                .all(db)
                .await
                .map_err(db_error("查询学期平均失败"))?;
            result.extend(rows.into_iter().map(|m| m.into_term_average()));
        }
    }

    // 分块查询后统一排序
    result.sort_by_key(|row| (row.subject_id, row.student_id, row.term_id));
    Ok(result)
}

pub(super) async fn upsert_term_average<C: ConnectionTrait>(
    db: &C,
    key: TermAverageKey,
    fields: TermAverageFields,
) -> Result<(TermAverage, UpsertAction)> {
    let existing = TermAverages::find()
        .filter(term::Column::StudentId.eq(key.student_id))
        .filter(term::Column::SubjectId.eq(key.subject_id))
        .filter(term::Column::TermId.eq(key.term_id))
        .one(db)
        .await
        .map_err(db_error("查询学期平均失败"))?;

    let (mut active, action) = match existing {
        Some(model) => (model.into_active_model(), UpsertAction::Updated),
        None => (
            TermActiveModel {
                student_id: Set(key.student_id),
                subject_id: Set(key.subject_id),
                term_id: Set(key.term_id),
                ..Default::default()
            },
            UpsertAction::Created,
        ),
    };

    active.evaluation_average = Set(fields.evaluation_average);
    active.final_average = Set(fields.final_average);
    active.classes_total = Set(fields.classes_total);
    active.classes_present = Set(fields.classes_present);
    active.attendance_pct = Set(fields.attendance_pct);
    active.passed = Set(fields.passed);
    active.auto_computed = Set(true);
    active.computed_at = Set(chrono::Utc::now().timestamp());

    let model = match action {
        UpsertAction::Created => active.insert(db).await,
        UpsertAction::Updated => active.update(db).await,
    }
    .map_err(db_error("写入学期平均失败"))?;

    Ok((model.into_term_average(), action))
}

pub(super) async fn annual_averages_for<C: ConnectionTrait>(
    db: &C,
    year: i32,
    subject_ids: Option<&[i64]>,
    student_ids: Option<&[i64]>,
) -> Result<Vec<AnnualAverage>> {
    let mut result = Vec::new();
    for student_chunk in id_chunks(student_ids) {
        let select = AnnualAverages::find().filter(annual::Column::Year.eq(year));
        let select = filter_ids(select, annual::Column::SubjectId, subject_ids);
        let select = filter_ids(select, annual::Column::StudentId, student_chunk);

        let rows = select
            .all(db)
            .await
            .map_err(db_error("查询学年平均失败"))?;
        result.extend(rows.into_iter().map(|m| m.into_annual_average()));
    }

    result.sort_by_key(|row| (row.subject_id, row.student_id));
    Ok(result)
}

pub(super) async fn upsert_annual_average<C: ConnectionTrait>(
    db: &C,
    key: AnnualAverageKey,
    fields: AnnualAverageFields,
) -> Result<(AnnualAverage, UpsertAction)> {
    let existing = AnnualAverages::find()
        .filter(annual::Column::StudentId.eq(key.student_id))
        .filter(annual::Column::SubjectId.eq(key.subject_id))
        .filter(annual::Column::Year.eq(key.year))
        .one(db)
        .await
        .map_err(db_error("查询学年平均失败"))?;

    let (mut active, action) = match existing {
        Some(model) => (model.into_active_model(), UpsertAction::Updated),
        None => (
            AnnualActiveModel {
                student_id: Set(key.student_id),
                subject_id: Set(key.subject_id),
                year: Set(key.year),
                ..Default::default()
            },
            UpsertAction::Created,
        ),
    };

    active.term1_average = Set(fields.term1_average);
    active.term2_average = Set(fields.term2_average);
    active.term3_average = Set(fields.term3_average);
    active.annual_average = Set(fields.annual_average);
    active.attendance_pct_annual = Set(fields.attendance_pct_annual);
    active.passed_annual = Set(fields.passed_annual);
    active.auto_computed = Set(true);
    active.computed_at = Set(chrono::Utc::now().timestamp());

    let model = match action {
        UpsertAction::Created => active.insert(db).await,
        UpsertAction::Updated => active.update(db).await,
    }
    .map_err(db_error("写入学年平均失败"))?;

    Ok((model.into_annual_average(), action))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_chunks() {
        assert_eq!(id_chunks(None), vec![None]);
        assert_eq!(id_chunks(Some(&[][..])), vec![Some(&[][..])]);

        let ids: Vec<i64> = (0..(IN_CHUNK as i64 * 2 + 1)).collect();
        let chunks = id_chunks(Some(ids.as_slice()));
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].map(<[i64]>::len), Some(IN_CHUNK));
        assert_eq!(chunks[2].map(<[i64]>::len), Some(1));
    }
}
