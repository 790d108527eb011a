//! 平均成绩汇总
//!
//! 学期汇总与学年汇总共用同一套批处理执行器：快照读取、并发计算、事务写入。

pub mod annual;
pub mod lookup;
pub mod runner;
pub mod term;

use std::sync::Arc;

use crate::errors::Result;
use crate::models::batch::{BatchFilter, RunOptions};
use crate::storage::Storage;

pub use annual::{ANNUAL_PASS_SCORE, compute_annual_average};
pub use lookup::EvaluationCatalog;
pub use runner::{AnnualBatchResult, TermBatchResult};
pub use term::compute_term_average;

pub struct AggregationService {
    storage: Arc<dyn Storage>,
}

impl AggregationService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// 重算某学期的学期平均
    ///
    /// 过滤条件中不存在的科目或学生记入结果的 `errors`，不会中止批处理。
    pub async fn run_term_aggregation(
        &self,
        term_id: i64,
        filter: BatchFilter,
        options: &RunOptions,
    ) -> Result<TermBatchResult> {
        self.run_term(term_id, &filter, options).await
    }

    /// 重算某学年的学年平均
    pub async fn run_annual_aggregation(
        &self,
        year: i32,
        filter: BatchFilter,
        options: &RunOptions,
    ) -> Result<AnnualBatchResult> {
        self.run_annual(year, &filter, options).await
    }
}
