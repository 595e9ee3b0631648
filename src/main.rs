use dotenv::dotenv;
use human_panic::setup_panic;
use tracing::{info, warn};

// 从 lib.rs 导入模块
use gradiator::config::GradiatorConfig;
use gradiator::context::DomainContext;
use gradiator::coordinator::{LocalEducationStore, PersistenceCoordinator};
use gradiator::gateway::create_remote_api;
use gradiator::storage::{JsonStore, create_key_value_store};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    // 记录程序启动时间
    let app_start_time = chrono::Utc::now();

    // 启动前预处理 //

    // 初始化配置
    setup_panic!();
    let config = GradiatorConfig::load().expect("Failed to initialize configuration");

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

    // 组装存储与网关
    gradiator::storage::register::debug_storage_registry();
    let kv_store = create_key_value_store(&config).await?;
    let local = LocalEducationStore::new(JsonStore::new(kv_store, &config.storage.key_prefix));
    let remote = create_remote_api(&config)?;

    // 探测远程服务并落定后端模式
    let coordinator =
        PersistenceCoordinator::connect(remote, local, config.probe_timeout()).await;
    coordinator.initialize_local_if_empty().await?;
    let mode = coordinator.mode().await;

    // 首次拉取，填充领域快照
    let context = DomainContext::new(std::sync::Arc::new(coordinator));
    context.refresh_all().await?;

    // 输出预处理时间
    info!(
        "Pre-startup processing completed in {} ms",
        chrono::Utc::now()
            .signed_duration_since(app_start_time)
            .num_milliseconds()
    );

    // 预处理完成 //

    warn!(
        "Gradiator data core ready: mode={:?}, subjects={}, assignments={}, materials={}",
        mode,
        context.subjects().await.len(),
        context.assignments().await.len(),
        context.materials().await.len()
    );

    Ok(())
}
