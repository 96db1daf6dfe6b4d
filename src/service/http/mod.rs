//! HTTP API 服务模块
//!
//! 提供球员数据、排行榜、奖项的只读查询接口

pub mod handlers;
pub mod models;
pub mod routes;

use actix_web::{middleware, web, App, HttpServer as ActixHttpServer};
use std::io;
use std::sync::Arc;

use crate::dataset::Season;
use crate::query::StatsQueryEngine;
use handlers::AppState;

/// HTTP 服务器
pub struct HttpServer {
    /// 应用状态
    app_state: Arc<AppState>,

    /// 监听地址
    bind_address: String,

    /// 工作线程数
    workers: Option<usize>,
}

impl HttpServer {
    /// 创建新的 HTTP 服务器
    pub fn new(
        engine: StatsQueryEngine,
        default_season: Season,
        service_name: impl Into<String>,
        bind_address: String,
    ) -> Self {
        Self {
            app_state: Arc::new(AppState::new(engine, default_season, service_name)),
            bind_address,
            workers: None,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers.max(1));
        self
    }

    /// 启动 HTTP 服务器，直到收到停止信号
    pub async fn run(self) -> io::Result<()> {
        log::info!("Starting HTTP server at {}", self.bind_address);

        let app_state = self.app_state.clone();

        let mut server = ActixHttpServer::new(move || {
            App::new()
                // 应用状态
                .app_data(web::Data::new(app_state.clone()))
                // 中间件
                .wrap(middleware::Logger::default())
                .wrap(middleware::Compress::default())
                // CORS 支持
                .wrap(
                    actix_cors::Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header()
                        .max_age(3600),
                )
                // 配置路由
                .configure(routes::configure)
        });

        if let Some(workers) = self.workers {
            server = server.workers(workers);
        }

        server.bind(&self.bind_address)?.run().await
    }
}
