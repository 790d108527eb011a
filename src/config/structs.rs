use serde::{Deserialize, Serialize};

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseConfig,
    pub aggregation: AggregationConfig,
    #[serde(default)]
    pub job: JobConfig,
}

/// 应用设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub system_name: String,
    pub environment: String,
    pub log_level: String,
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,    // 数据库连接 URL（从 scheme 自动推断类型）
    pub pool_size: u32, // 连接池大小
    pub timeout: u64,   // 连接超时 (秒)
}

/// 聚合批处理配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationConfig {
    pub max_concurrency: usize,   // 并发计算上限，0 表示使用 CPU 核数
    pub batch_timeout_secs: u64,  // 整批超时 (秒)，0 表示不限制
    pub conflict_retries: u32,    // 事务冲突时的整批重试次数
    pub retry_backoff_ms: u64,    // 首次重试等待时间，之后指数退避
}

/// 重算任务配置（仅供 main 中的编排入口使用）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobConfig {
    pub term_id: Option<i64>,
    pub year: Option<i32>,
    #[serde(default)]
    pub subject_ids: Vec<i64>,
    #[serde(default)]
    pub student_ids: Vec<i64>,
}
