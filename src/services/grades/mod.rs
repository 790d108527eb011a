pub mod calculator;
pub mod record;

use std::sync::Arc;

use crate::errors::Result;
use crate::models::grades::{requests::RecordGradeRequest, responses::RecordGradeResponse};
use crate::storage::Storage;

pub use calculator::{final_score, score_grade, verify_stored_grade};

pub struct GradeService {
    storage: Arc<dyn Storage>,
}

impl GradeService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// 登记成绩（按 (评价, 学生) 写入或覆盖）
    pub async fn record_grade(&self, req: RecordGradeRequest) -> Result<RecordGradeResponse> {
        record::record_grade(self, req).await
    }
}
