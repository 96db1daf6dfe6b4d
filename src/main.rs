//! NBA 数据查询服务
//!
//! 启动流程：
//! 1. 初始化日志
//! 2. 加载配置（失败时使用默认配置）
//! 3. 创建共享 HTTP 客户端（连接池，进程级生命周期）
//! 4. 创建查询引擎并启动 HTTP 服务
//!
//! 运行: cargo run --bin nbastats-server

use nbastats::service::http::HttpServer;
use nbastats::utils::config::ServiceConfig;
use nbastats::{HttpDatasetFetcher, StatsQueryEngine};
use std::io;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 初始化日志
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 1. 加载配置文件
    let config = match ServiceConfig::load_default() {
        Ok(cfg) => cfg,
        Err(e) => {
            log::warn!("Failed to load config file: {}, using defaults", e);
            ServiceConfig::default()
        }
    };

    // 2. 共享客户端：所有请求复用同一个连接池
    let client = HttpDatasetFetcher::build_client(
        config.source.timeout(),
        config.source.connect_timeout(),
    )
    .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("Failed to build HTTP client: {}", e)))?;

    let fetcher = HttpDatasetFetcher::new(
        client,
        config.source.base_url.clone(),
        config.source.awards_stem.clone(),
    )
    .with_awards_format(config.source.awards_format);
    log::info!(
        "✅ Dataset fetcher initialized (base_url={}, timeout={}ms)",
        config.source.base_url,
        config.source.timeout_ms
    );

    // 3. 查询引擎
    let seasons = config.seasons.known_seasons();
    if seasons.is_empty() {
        log::warn!(
            "No seasons between {} and {}, all-seasons queries will return 404",
            config.seasons.first,
            config.seasons.last
        );
    }
    log::info!(
        "✅ Query engine initialized ({} seasons, fan-out concurrency {})",
        seasons.len(),
        config.seasons.fan_out_concurrency
    );
    let engine = StatsQueryEngine::new(Arc::new(fetcher), seasons)
        .with_fan_out_concurrency(config.seasons.fan_out_concurrency);

    // 4. HTTP 服务
    let mut server = HttpServer::new(
        engine,
        config.seasons.default,
        config.server.name.clone(),
        config.http.bind_address(),
    );
    if let Some(workers) = config.http.workers {
        server = server.with_workers(workers);
    }

    server.run().await?;
    log::info!("Server stopped");
    Ok(())
}
