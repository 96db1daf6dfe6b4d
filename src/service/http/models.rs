//! HTTP API 请求/响应模型

use serde::{Deserialize, Serialize};

use crate::dataset::CellValue;

/// `?season=` 查询参数，缺省时使用配置中的默认赛季
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeasonQuery {
    pub season: Option<String>,
}

/// 球员列表响应
#[derive(Debug, Clone, Serialize)]
pub struct PlayersResponse {
    #[serde(rename = "Players")]
    pub players: Vec<CellValue>,
}

/// 错误响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// 健康检查响应
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: String,
    pub timestamp: String,
}
