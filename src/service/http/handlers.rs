//! HTTP API 请求处理器

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use chrono::Utc;
use std::sync::Arc;

use super::models::*;
use crate::dataset::Season;
use crate::query::StatsQueryEngine;
use crate::StatsError;

type HandlerResult = std::result::Result<HttpResponse, StatsError>;

/// 应用状态
pub struct AppState {
    pub engine: StatsQueryEngine,
    pub default_season: Season,
    pub service_name: String,
}

impl AppState {
    pub fn new(engine: StatsQueryEngine, default_season: Season, service_name: impl Into<String>) -> Self {
        Self {
            engine,
            default_season,
            service_name: service_name.into(),
        }
    }

    fn season_or_default(&self, query: &SeasonQuery) -> Result<Season, StatsError> {
        match query.season.as_deref() {
            Some(tag) => Ok(Season::parse(tag)?),
            None => Ok(self.default_season),
        }
    }
}

impl ResponseError for StatsError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        let status = ResponseError::status_code(self);
        if status.is_server_error() {
            log::error!("{}", self);
        } else {
            log::debug!("{} {}", status.as_u16(), self);
        }
        HttpResponse::build(status).json(ErrorResponse::new(self.to_string()))
    }
}

/// 健康检查
pub async fn health_check(state: web::Data<Arc<AppState>>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        service: state.service_name.clone(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// 球员单赛季数据
///
/// GET /players/{player}?season=2022-23
pub async fn get_player_stats(
    player: web::Path<String>,
    query: web::Query<SeasonQuery>,
    state: web::Data<Arc<AppState>>,
) -> HandlerResult {
    let season = state.season_or_default(&query)?;
    let rows = state.engine.player_stats(&player, season).await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// 单赛季全部球员名
///
/// GET /players?season=2022-23
pub async fn get_all_players(
    query: web::Query<SeasonQuery>,
    state: web::Data<Arc<AppState>>,
) -> HandlerResult {
    let season = state.season_or_default(&query)?;
    let players = state.engine.all_players(season).await?;
    Ok(HttpResponse::Ok().json(PlayersResponse { players }))
}

/// 球员单赛季场均数据
///
/// GET /players/{player}/averages?season=2022-23
pub async fn get_player_averages(
    player: web::Path<String>,
    query: web::Query<SeasonQuery>,
    state: web::Data<Arc<AppState>>,
) -> HandlerResult {
    let season = state.season_or_default(&query)?;
    let averages = state.engine.player_averages(&player, season).await?;
    Ok(HttpResponse::Ok().json(averages))
}

/// 球员跨赛季数据
///
/// GET /players/{player}/allseasons
pub async fn get_all_seasons_stats(
    player: web::Path<String>,
    state: web::Data<Arc<AppState>>,
) -> HandlerResult {
    let rows = state.engine.all_seasons_stats(&player).await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// 统计列排行
///
/// GET /top/{stat}/{season}/{limit}
pub async fn get_top_players(
    path: web::Path<(String, String, i64)>,
    state: web::Data<Arc<AppState>>,
) -> HandlerResult {
    let (stat, season, limit) = path.into_inner();
    let season = Season::parse(&season)?;
    let rows = state.engine.top_players(&stat, season, limit).await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// 按赛季查询奖项
///
/// GET /awards/{season}
pub async fn get_awards_by_season(
    season: web::Path<String>,
    state: web::Data<Arc<AppState>>,
) -> HandlerResult {
    let season = Season::parse(&season)?;
    let rows = state.engine.awards_by_season(season).await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// 按球员查询奖项
///
/// GET /awards/players/{player}
pub async fn get_awards_by_player(
    player: web::Path<String>,
    state: web::Data<Arc<AppState>>,
) -> HandlerResult {
    let rows = state.engine.awards_by_player(&player).await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// 按奖项名称查询获奖者
///
/// GET /awards/types/{award}
pub async fn get_winners_by_award(
    award: web::Path<String>,
    state: web::Data<Arc<AppState>>,
) -> HandlerResult {
    let rows = state.engine.awards_by_name(&award).await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// 按赛季+球员查询奖项
///
/// GET /awards/{season}/{player}
pub async fn get_awards_by_season_and_player(
    path: web::Path<(String, String)>,
    state: web::Data<Arc<AppState>>,
) -> HandlerResult {
    let (season, player) = path.into_inner();
    let season = Season::parse(&season)?;
    let rows = state
        .engine
        .awards_by_season_and_player(season, &player)
        .await?;
    Ok(HttpResponse::Ok().json(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FetchError;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (StatsError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (StatsError::InvalidRequest("x".into()), StatusCode::BAD_REQUEST),
            (StatsError::MalformedSource("x".into()), StatusCode::BAD_REQUEST),
            (StatsError::Processing("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(ResponseError::status_code(&err), expected);
            assert_eq!(err.error_response().status(), expected);
        }

        let fetch = StatsError::Fetch(FetchError {
            dataset: crate::DatasetId::Awards,
            primary: crate::dataset::AttemptError::Status {
                url: "a.csv".into(),
                status: 404,
            },
            secondary: crate::dataset::AttemptError::Status {
                url: "a.xlsx".into(),
                status: 404,
            },
        });
        assert_eq!(fetch.error_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
