//! HTTP API 路由配置

use actix_web::{error, web, HttpResponse};

use super::handlers;
use super::models::ErrorResponse;

/// 路径参数解析失败（如 limit 不是整数）返回 400
fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        let body = ErrorResponse::new(err.to_string());
        error::InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    })
}

/// 配置所有路由
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(path_config())
        // 健康检查
        .route("/health", web::get().to(handlers::health_check))

        // 球员数据
        .service(
            web::scope("/players")
                .route("", web::get().to(handlers::get_all_players))
                .route("/{player}", web::get().to(handlers::get_player_stats))
                .route("/{player}/averages", web::get().to(handlers::get_player_averages))
                .route("/{player}/allseasons", web::get().to(handlers::get_all_seasons_stats))
        )

        // 排行榜
        .route("/top/{stat}/{season}/{limit}", web::get().to(handlers::get_top_players))

        // 奖项：固定前缀的路由必须注册在 /{season}/{player} 之前
        .service(
            web::scope("/awards")
                .route("/players/{player}", web::get().to(handlers::get_awards_by_player))
                .route("/types/{award}", web::get().to(handlers::get_winners_by_award))
                .route("/{season}", web::get().to(handlers::get_awards_by_season))
                .route("/{season}/{player}", web::get().to(handlers::get_awards_by_season_and_player))
        );
}
