use dotenv::dotenv;
use human_panic::setup_panic;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

// 从 lib.rs 导入模块
use rust_grade_aggregator::config::AppConfig;
use rust_grade_aggregator::errors::Result;
use rust_grade_aggregator::models::{BatchFilter, RunOptions};
use rust_grade_aggregator::runtime::lifetime;
use rust_grade_aggregator::services::AggregationService;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // 记录程序启动时间
    let start_time = chrono::Utc::now();

    // 初始化配置
    setup_panic!();
    AppConfig::init()?;
    let config = AppConfig::get();

    // 初始化日志
    let stdout_log = std::io::stdout();
    let (non_blocking_writer, _guard) = tracing_appender::non_blocking(stdout_log);
    let filter = tracing_subscriber::EnvFilter::new(&config.app.log_level);
    let tracing_format = tracing_subscriber::fmt::format()
        .with_level(true)
        .with_ansi(true);

    let tracing_builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking_writer)
        .event_format(tracing_format);

    if config.is_development() {
        tracing_builder
            .with_file(true)
            .with_line_number(true)
            .init();
    } else {
        tracing_builder.json().init();
    }

    // 打印信息
    warn!(
        "Starting pre-startup processing...
        Project: {}
        Version: {}
        Authors: {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_AUTHORS")
    );

    let startup = lifetime::startup::prepare_startup().await?;

    debug!(
        "Pre-startup processing completed in {} ms",
        chrono::Utc::now()
            .signed_duration_since(start_time)
            .num_milliseconds()
    );

    let cancel = CancellationToken::new();
    tokio::spawn(lifetime::shutdown::listen_for_shutdown(cancel.clone()));

    let job = &config.job;
    let filter = BatchFilter {
        subject_ids: (!job.subject_ids.is_empty()).then(|| job.subject_ids.clone()),
        student_ids: (!job.student_ids.is_empty()).then(|| job.student_ids.clone()),
    };
    let options = RunOptions::from_config(&config.aggregation).with_cancel(cancel);
    let service = AggregationService::new(startup.storage);

    if job.term_id.is_none() && job.year.is_none() {
        warn!("No job configured, set AGGREGATOR__JOB__TERM_ID or AGGREGATOR__JOB__YEAR");
        return Ok(());
    }

    if let Some(term_id) = job.term_id {
        match service
            .run_term_aggregation(term_id, filter.clone(), &options)
            .await
        {
            Ok(result) => info!("Term batch result: {}", serde_json::to_string(&result)?),
            Err(e) => {
                error!("Term aggregation failed: {}", e);
                return Err(e);
            }
        }
    }

    if let Some(year) = job.year {
        match service.run_annual_aggregation(year, filter, &options).await {
            Ok(result) => info!("Annual batch result: {}", serde_json::to_string(&result)?),
            Err(e) => {
                error!("Annual aggregation failed: {}", e);
                return Err(e);
            }
        }
    }

    Ok(())
}
