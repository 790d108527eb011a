//! 学期存储操作

use super::{SeaOrmStorage, db_error};
use crate::entity::terms::{ActiveModel, Column, Entity as Terms};
use crate::errors::Result;
use crate::models::terms::{
    entities::{Term, TermState},
    requests::NewTerm,
};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

pub(super) async fn get_term<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Term>> {
    let result = Terms::find_by_id(id)
        .one(db)
        .await
        .map_err(db_error("查询学期失败"))?;

    Ok(result.map(|m| m.into_term()))
}

/// 某学年的全部学期，按序号排序
pub(super) async fn terms_of_year<C: ConnectionTrait>(db: &C, year: i32) -> Result<Vec<Term>> {
    let rows = Terms::find()
        .filter(Column::Year.eq(year))
        .order_by_asc(Column::Number)
        .all(db)
        .await
        .map_err(db_error("查询学年学期失败"))?;

    Ok(rows.into_iter().map(|m| m.into_term()).collect())
}

/// 包含该日期的学期（区间两端均包含）
pub(super) async fn term_for_date<C: ConnectionTrait>(
    db: &C,
    date: NaiveDate,
) -> Result<Option<Term>> {
    let result = Terms::find()
        .filter(Column::StartDate.lte(date))
        .filter(Column::EndDate.gte(date))
        .order_by_asc(Column::Id)
        .one(db)
        .await
        .map_err(db_error("按日期查询学期失败"))?;

    Ok(result.map(|m| m.into_term()))
}

impl SeaOrmStorage {
    /// 创建学期
    pub async fn create_term_impl(&self, term: NewTerm) -> Result<Term> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            number: Set(term.number),
            year: Set(term.year),
            name: Set(term.name),
            start_date: Set(term.start_date),
            end_date: Set(term.end_date),
            eval_deadline: Set(term.eval_deadline),
            grade_deadline: Set(term.grade_deadline),
            min_pass_score: Set(term.min_pass_score),
            min_attendance_pct: Set(term.min_attendance_pct),
            state: Set(term.state.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(db_error("创建学期失败"))?;

        Ok(result.into_term())
    }

    /// 通过 (序号, 学年) 获取学期
    pub async fn get_term_by_number_and_year_impl(
        &self,
        number: i32,
        year: i32,
    ) -> Result<Option<Term>> {
        let result = Terms::find()
            .filter(Column::Number.eq(number))
            .filter(Column::Year.eq(year))
            .one(&self.db)
            .await
            .map_err(db_error("查询学期失败"))?;

        Ok(result.map(|m| m.into_term()))
    }

    /// 更新学期状态
    pub async fn update_term_state_impl(
        &self,
        term_id: i64,
        state: TermState,
    ) -> Result<Option<Term>> {
        // 先检查学期是否存在
        if get_term(&self.db, term_id).await?.is_none() {
            return Ok(None);
        }

        let model = ActiveModel {
            id: Set(term_id),
            state: Set(state.to_string()),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .update(&self.db)
            .await
            .map_err(db_error("更新学期状态失败"))?;

        Ok(Some(result.into_term()))
    }
}
