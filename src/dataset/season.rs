//! 赛季标识 `YYYY-YY`

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// 赛季格式错误
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Invalid season '{0}': expected YYYY-YY, e.g. 2022-23")]
pub struct SeasonError(pub String);

/// 赛季，例如 `2022-23`
///
/// 只接受后两位等于 `(起始年 + 1) % 100` 的标签，一个赛季对应一个数据文件。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Season {
    start_year: u16,
}

impl Season {
    pub fn from_start_year(start_year: u16) -> Self {
        Self { start_year }
    }

    pub fn parse(tag: &str) -> Result<Self, SeasonError> {
        let invalid = || SeasonError(tag.to_string());

        let (start, end) = tag.split_once('-').ok_or_else(invalid)?;
        if start.len() != 4
            || end.len() != 2
            || !start.bytes().all(|b| b.is_ascii_digit())
            || !end.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let start_year: u16 = start.parse().map_err(|_| invalid())?;
        let end_suffix: u16 = end.parse().map_err(|_| invalid())?;
        if (start_year + 1) % 100 != end_suffix {
            return Err(invalid());
        }

        Ok(Self { start_year })
    }

    pub fn start_year(&self) -> u16 {
        self.start_year
    }

    pub fn next(&self) -> Season {
        Season::from_start_year(self.start_year + 1)
    }

    /// 闭区间 `[first, last]` 的赛季序列（升序）；first > last 时为空
    pub fn range(first: Season, last: Season) -> Vec<Season> {
        (first.start_year..=last.start_year)
            .map(Season::from_start_year)
            .collect()
    }

    pub fn tag(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.start_year, (self.start_year + 1) % 100)
    }
}

impl FromStr for Season {
    type Err = SeasonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Season::parse(s)
    }
}

impl Serialize for Season {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Season {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Season::parse(&tag).map_err(serde::de::Error::custom)
    }
}
