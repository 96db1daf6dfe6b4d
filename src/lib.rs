//! # NBASTATS-RS
//!
//! 只读的 NBA 球员数据查询服务 - 远程表格文件 + 内存过滤/排序/投影
//!
//! ## 核心能力
//!
//! - **数据拉取**: 按赛季/奖项数据集拉取远程文件，CSV 优先，失败回退 XLSX
//! - **球员查询**: 单赛季球员数据/球员列表/场均数据
//! - **跨赛季查询**: 23 个赛季并发拉取，按赛季顺序合并
//! - **排行榜**: 按任意统计列降序取前 N（稳定排序）
//! - **奖项查询**: 按赛季/球员/奖项名称/赛季+球员过滤
//! - **对外服务**: HTTP API (基于 Actix-web)
//!
//! ## 架构设计
//!
//! ```text
//! 客户端 (HTTP)
//!     ↓
//! Service Layer (service/)
//!     ↓
//! Query Engine (query/)
//!     ↓
//! Dataset Fetcher (dataset/) → 远程 CSV / XLSX
//! ```
//!
//! 无数据库、无缓存：每个请求都重新拉取数据集，处理完即丢弃。

// ============================================================================
// 外部依赖
// ============================================================================

// Web 框架
pub use actix_web;

// 异步运行时
pub use futures;
pub use tokio;

// 序列化
pub use serde;
pub use serde_json;

// 日志
pub use log;

// ============================================================================
// 内部模块
// ============================================================================

/// 数据集：表格模型、赛季标识、解析与远程拉取
pub mod dataset;

/// 查询引擎
pub mod query;

/// 对外服务层 (HTTP)
pub mod service;

/// 工具模块
pub mod utils;

// ============================================================================
// 重导出常用类型
// ============================================================================

pub use dataset::fetcher::{DatasetSource, FetchError, HttpDatasetFetcher};
pub use dataset::season::{Season, SeasonError};
pub use dataset::table::{CellValue, Record, Table, TableError};
pub use dataset::DatasetId;
pub use query::StatsQueryEngine;

// ============================================================================
// 全局错误类型
// ============================================================================

/// 查询边界上的错误分类
///
/// 每个变体对应一个对外状态码，见 [`StatsError::http_status`]。
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    /// 查询成功执行但没有命中任何行，数据集本身为空，或远程仓库中没有该数据集
    #[error("{0}")]
    NotFound(String),

    /// 参数结构非法（未知统计列、赛季格式错误、limit 非正）
    #[error("{0}")]
    InvalidRequest(String),

    /// 数据集缺少查询所需的列
    #[error("{0}")]
    MalformedSource(String),

    /// 两种格式均拉取失败
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// 排序/投影意外失败
    #[error("{0}")]
    Processing(String),
}

impl StatsError {
    /// 对外 HTTP 状态码
    pub fn http_status(&self) -> u16 {
        match self {
            StatsError::NotFound(_) => 404,
            StatsError::InvalidRequest(_) | StatsError::MalformedSource(_) => 400,
            StatsError::Fetch(_) | StatsError::Processing(_) => 500,
        }
    }
}

impl From<TableError> for StatsError {
    fn from(err: TableError) -> Self {
        match err {
            TableError::MissingColumn(_) => StatsError::MalformedSource(err.to_string()),
            TableError::MixedTypes(_) | TableError::RowWidth { .. } => {
                StatsError::Processing(err.to_string())
            }
        }
    }
}

impl From<SeasonError> for StatsError {
    fn from(err: SeasonError) -> Self {
        StatsError::InvalidRequest(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StatsError>;

// ============================================================================
// 测试模块
// ============================================================================
