//! 配置管理模块

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::dataset::{Season, SourceFormat};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config/nbastats.toml";

/// 配置文件路径环境变量
pub const CONFIG_PATH_ENV: &str = "NBASTATS_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub seasons: SeasonsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_name")]
    pub name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// 工作线程数，缺省时由 actix-web 按 CPU 核数决定
    #[serde(default)]
    pub workers: Option<usize>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

impl HttpConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 远程数据源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// 数据文件所在目录的 URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// 奖项数据文件名（不含扩展名）
    #[serde(default = "default_awards_stem")]
    pub awards_stem: String,

    /// 奖项数据首先尝试的格式（`csv` / `xlsx`），另一种作为回退
    #[serde(default = "default_awards_format")]
    pub awards_format: SourceFormat,

    /// 单次请求总超时（毫秒）
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// 建连超时（毫秒）
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            awards_stem: default_awards_stem(),
            awards_format: default_awards_format(),
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// 赛季配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonsConfig {
    /// 未指定赛季时使用的赛季
    #[serde(default = "default_season")]
    pub default: Season,

    /// 跨赛季查询的第一个赛季
    #[serde(default = "default_first_season")]
    pub first: Season,

    /// 跨赛季查询的最后一个赛季
    #[serde(default = "default_season")]
    pub last: Season,

    /// 跨赛季查询的最大并发拉取数
    #[serde(default = "default_fan_out_concurrency")]
    pub fan_out_concurrency: usize,
}

impl Default for SeasonsConfig {
    fn default() -> Self {
        Self {
            default: default_season(),
            first: default_first_season(),
            last: default_season(),
            fan_out_concurrency: default_fan_out_concurrency(),
        }
    }
}

impl SeasonsConfig {
    /// 跨赛季查询覆盖的赛季列表（升序）
    pub fn known_seasons(&self) -> Vec<Season> {
        Season::range(self.first, self.last)
    }
}

// 默认值函数
fn default_server_name() -> String {
    "nbastats".to_string()
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_base_url() -> String {
    "https://raw.githubusercontent.com/bayareahomelander/NBA-Stats-API/main/data".to_string()
}
fn default_awards_stem() -> String {
    "awardwinners".to_string()
}
fn default_awards_format() -> SourceFormat {
    SourceFormat::Xlsx
}
fn default_timeout_ms() -> u64 {
    5000
}
fn default_connect_timeout_ms() -> u64 {
    2000
}
fn default_season() -> Season {
    Season::from_start_year(2022)
}
fn default_first_season() -> Season {
    Season::from_start_year(2000)
}
fn default_fan_out_concurrency() -> usize {
    23
}

impl ServiceConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// 加载 `NBASTATS_CONFIG` 指定的文件，未设置时加载默认路径
    pub fn load_default() -> Result<Self, String> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from_file(path)
    }
}
