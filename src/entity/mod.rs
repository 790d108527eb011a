//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! Storage 层使用这些实体进行 CRUD 操作，然后转换为 models 中的业务实体。
//! 小数列读出后统一经 `utils::normalize` 规范为两位小数。

pub mod prelude;

pub mod annual_averages;
pub mod attendance;
pub mod deliverable_evaluations;
pub mod evaluation_types;
pub mod grades;
pub mod participation_evaluations;
pub mod students;
pub mod subjects;
pub mod term_averages;
pub mod terms;
pub mod weight_configs;

use chrono::{DateTime, Utc};

pub(crate) fn from_timestamp(ts: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()
}
