//! 远程数据集拉取
//!
//! 地址规则：`<base_url>/<stem>.csv` 与 `<base_url>/<stem>.xlsx`，默认 CSV 优先、XLSX 回退。
//! 赛季数据的 stem 是赛季标签，奖项数据的 stem 与首选格式由配置指定。
//!
//! 不做缓存、不做重试：同一数据集拉取两次就是两次独立的网络往返。

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::parse::{self, ParseError};
use super::table::Table;
use super::{DatasetId, SourceFormat};

/// 数据集来源接口
///
/// 查询引擎只依赖这个接口，测试中可替换为内存实现。
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// 拉取并解析一个完整数据集
    async fn fetch(&self, dataset: DatasetId) -> Result<Table, FetchError>;
}

/// 单次格式尝试的失败原因
#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to parse {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: ParseError,
    },
}

impl AttemptError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AttemptError::Status { status: 404, .. })
    }

    fn from_transport(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AttemptError::Timeout {
                url: url.to_string(),
            }
        } else {
            AttemptError::Request {
                url: url.to_string(),
                source: err,
            }
        }
    }
}

/// 两种格式都失败：同时保留首选与回退两次尝试的原因
#[derive(Debug, thiserror::Error)]
#[error("Failed to load {dataset}: {secondary} (first attempt: {primary})")]
pub struct FetchError {
    pub dataset: DatasetId,
    pub primary: AttemptError,
    #[source]
    pub secondary: AttemptError,
}

impl FetchError {
    /// 两种格式都返回 404：远程仓库中没有这个数据集
    pub fn is_missing(&self) -> bool {
        self.primary.is_not_found() && self.secondary.is_not_found()
    }
}

/// 基于 HTTP 的数据集拉取器
///
/// `Client` 内部是连接池，进程启动时创建一次，克隆后注入，进程退出时随之释放。
#[derive(Clone)]
pub struct HttpDatasetFetcher {
    client: Client,
    base_url: String,
    awards_stem: String,
    awards_format: SourceFormat,
}

impl HttpDatasetFetcher {
    pub fn new(client: Client, base_url: impl Into<String>, awards_stem: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            awards_stem: awards_stem.into(),
            awards_format: SourceFormat::Csv,
        }
    }

    /// 奖项数据集首先尝试的格式，另一种格式作为回退
    pub fn with_awards_format(mut self, format: SourceFormat) -> Self {
        self.awards_format = format;
        self
    }

    /// 数据集的尝试顺序：(首选, 回退)
    pub fn format_order(&self, dataset: DatasetId) -> (SourceFormat, SourceFormat) {
        let first = match dataset {
            DatasetId::Season(_) => SourceFormat::Csv,
            DatasetId::Awards => self.awards_format,
        };
        (first, first.other())
    }

    /// 构建带超时的共享客户端
    pub fn build_client(timeout: Duration, connect_timeout: Duration) -> reqwest::Result<Client> {
        Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .user_agent(concat!("nbastats-rs/", env!("CARGO_PKG_VERSION")))
            .build()
    }

    fn stem(&self, dataset: DatasetId) -> String {
        match dataset {
            DatasetId::Season(season) => season.to_string(),
            DatasetId::Awards => self.awards_stem.clone(),
        }
    }

    pub fn url_for(&self, dataset: DatasetId, format: SourceFormat) -> String {
        format!(
            "{}/{}.{}",
            self.base_url.trim_end_matches('/'),
            self.stem(dataset),
            format.extension()
        )
    }

    async fn fetch_format(&self, dataset: DatasetId, format: SourceFormat) -> Result<Table, AttemptError> {
        let url = self.url_for(dataset, format);
        log::debug!("Fetching {} as {} from {}", dataset, format, url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AttemptError::from_transport(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AttemptError::from_transport(&url, e))?;

        let table = parse::parse(format, body.to_vec()).map_err(|source| AttemptError::Parse {
            url: url.clone(),
            source,
        })?;
        log::debug!("Loaded {} rows for {} from {}", table.len(), dataset, url);
        Ok(table)
    }
}

#[async_trait]
impl DatasetSource for HttpDatasetFetcher {
    async fn fetch(&self, dataset: DatasetId) -> Result<Table, FetchError> {
        let (first, fallback) = self.format_order(dataset);
        let primary = match self.fetch_format(dataset, first).await {
            Ok(table) => return Ok(table),
            Err(e) => e,
        };
        log::debug!(
            "{} {} attempt failed ({}), falling back to {}",
            dataset,
            first,
            primary,
            fallback
        );

        match self.fetch_format(dataset, fallback).await {
            Ok(table) => Ok(table),
            Err(secondary) => {
                let err = FetchError {
                    dataset,
                    primary,
                    secondary,
                };
                log::warn!("{}", err);
                Err(err)
            }
        }
    }
}
