use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::errors::Result;
use crate::storage::Storage;

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
}

/// 启动前准备：连接数据库并执行迁移
pub async fn prepare_startup() -> Result<StartupContext> {
    let config = AppConfig::get();
    debug!(
        "Aggregation settings: max_concurrency={}, batch_timeout={}s, conflict_retries={}",
        config.aggregation.max_concurrency,
        config.aggregation.batch_timeout_secs,
        config.aggregation.conflict_retries
    );

    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    Ok(StartupContext { storage })
}
