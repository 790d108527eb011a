//! 学期服务：创建与状态流转

pub mod validate;

use std::sync::Arc;
use tracing::info;

use crate::errors::{AggregatorError, Result};
use crate::models::terms::{
    entities::{Term, TermState},
    requests::CreateTermRequest,
};
use crate::storage::Storage;

pub use validate::validate_new_term;

pub struct TermService {
    storage: Arc<dyn Storage>,
}

impl TermService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// 创建学期，同一学年内序号唯一
    pub async fn create_term(&self, req: CreateTermRequest) -> Result<Term> {
        let new_term = validate_new_term(req)?;

        if self
            .storage
            .get_term_by_number_and_year(new_term.number, new_term.year)
            .await?
            .is_some()
        {
            return Err(AggregatorError::validation(format!(
                "{} 学年的第 {} 学期已存在",
                new_term.year, new_term.number
            )));
        }

        let term = self.storage.create_term(new_term).await?;
        info!(
            "Term {} created: number {} of {} ({} ~ {})",
            term.id, term.number, term.year, term.start_date, term.end_date
        );
        Ok(term)
    }

    pub async fn get_term(&self, term_id: i64) -> Result<Term> {
        self.storage
            .get_term(term_id)
            .await?
            .ok_or_else(|| AggregatorError::not_found(format!("学期 {term_id} 不存在")))
    }

    /// 推进到下一个状态
    pub async fn advance_term(&self, term_id: i64) -> Result<Term> {
        let term = self.get_term(term_id).await?;
        let Some(next) = term.state.next() else {
            return Err(AggregatorError::invalid_state_transition(format!(
                "学期 {term_id} 已处于 {} 状态，无法继续推进",
                term.state
            )));
        };
        self.apply_state(term, next).await
    }

    /// 切换到指定状态，只允许前进一步
    pub async fn transition_term(&self, term_id: i64, target: TermState) -> Result<Term> {
        let term = self.get_term(term_id).await?;
        if !term.state.can_transition_to(target) {
            return Err(AggregatorError::invalid_state_transition(format!(
                "学期 {term_id} 不能从 {} 切换到 {target}",
                term.state
            )));
        }
        self.apply_state(term, target).await
    }

    async fn apply_state(&self, term: Term, target: TermState) -> Result<Term> {
        let updated = self
            .storage
            .update_term_state(term.id, target)
            .await?
            .ok_or_else(|| AggregatorError::not_found(format!("学期 {} 不存在", term.id)))?;
        info!("Term {} moved from {} to {}", term.id, term.state, updated.state);
        Ok(updated)
    }
}
