//! 业务数据模型
//!
//! 与 `entity` 中的数据库实体分离，供服务层与调用方使用，全部可通过 serde 序列化。

pub mod academics;
pub mod attendance;
pub mod averages;
pub mod batch;
pub mod evaluations;
pub mod grades;
pub mod reports;
pub mod terms;
pub mod weights;

pub use batch::{BatchFilter, BatchResult, RunOptions, TripleOutcome, TripleStatus, UpsertAction};
