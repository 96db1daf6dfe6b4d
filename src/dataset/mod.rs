//! 数据集模块
//!
//! 一个数据集 = 远程仓库中的一个表格文件（某赛季的球员数据，或唯一的奖项文件）。
//! 数据集只在单个请求内存活：拉取 → 过滤/投影 → 丢弃。

pub mod fetcher;
pub mod parse;
pub mod season;
pub mod table;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use fetcher::{AttemptError, DatasetSource, FetchError, HttpDatasetFetcher};
pub use season::{Season, SeasonError};
pub use table::{CellValue, Record, Table, TableError};

/// 数据集标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetId {
    /// 单赛季球员数据
    Season(Season),
    /// 奖项数据（全部赛季合一）
    Awards,
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetId::Season(season) => write!(f, "season {}", season),
            DatasetId::Awards => write!(f, "awards"),
        }
    }
}

/// 源文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// 逗号分隔文本（首选）
    Csv,
    /// 电子表格（回退）
    Xlsx,
}

impl SourceFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SourceFormat::Csv => "csv",
            SourceFormat::Xlsx => "xlsx",
        }
    }

    /// 另一种格式（回退目标）
    pub fn other(&self) -> SourceFormat {
        match self {
            SourceFormat::Csv => SourceFormat::Xlsx,
            SourceFormat::Xlsx => SourceFormat::Csv,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
