// 查询引擎 - 拉取数据集后按查询形态过滤/排序/投影

use futures::stream::{self, StreamExt};
use std::sync::Arc;

use crate::dataset::{CellValue, DatasetId, DatasetSource, Record, Season, Table};
use crate::{Result, StatsError};

pub const PLAYER_COLUMN: &str = "Player";
pub const SEASON_COLUMN: &str = "Season";
pub const AWARD_COLUMN: &str = "Award";

/// 场均数据投影的统计列
pub const AVERAGE_COLUMNS: [&str; 9] = ["PER", "PTS", "AST", "TRB", "BLK", "TOV", "3PA", "3P", "3P%"];

/// 查询引擎
///
/// 功能:
/// - 单赛季球员数据 / 球员列表 / 场均数据
/// - 跨赛季并发查询（按赛季顺序合并）
/// - 统计列排行
/// - 奖项过滤
///
/// 所有字符串比较都是严格相等（大小写敏感、不 trim）。
pub struct StatsQueryEngine {
    /// 数据集来源
    source: Arc<dyn DatasetSource>,

    /// 跨赛季查询覆盖的赛季（升序）
    seasons: Vec<Season>,

    /// 跨赛季查询的最大并发拉取数
    fan_out_concurrency: usize,
}

impl StatsQueryEngine {
    /// 创建查询引擎，默认对所有赛季同时发起拉取
    pub fn new(source: Arc<dyn DatasetSource>, seasons: Vec<Season>) -> Self {
        let fan_out_concurrency = seasons.len().max(1);
        Self {
            source,
            seasons,
            fan_out_concurrency,
        }
    }

    pub fn with_fan_out_concurrency(mut self, limit: usize) -> Self {
        self.fan_out_concurrency = limit.max(1);
        self
    }

    pub fn seasons(&self) -> &[Season] {
        &self.seasons
    }

    /// 拉取数据集；两种格式都 404 视为数据集不存在（NotFound），其余失败保持为拉取错误
    async fn load(&self, dataset: DatasetId) -> Result<Table> {
        match self.source.fetch(dataset).await {
            Ok(table) => Ok(table),
            Err(e) if e.is_missing() => {
                let reason = match dataset {
                    DatasetId::Season(_) => "Season not found",
                    DatasetId::Awards => "Awards data not found",
                };
                Err(StatsError::NotFound(reason.to_string()))
            }
            Err(e) => Err(StatsError::Fetch(e)),
        }
    }

    /// 单赛季球员数据：返回该球员的全部行（原始行序）
    pub async fn player_stats(&self, player: &str, season: Season) -> Result<Vec<Record>> {
        let table = self.load(DatasetId::Season(season)).await?;
        if table.is_empty() {
            return Err(StatsError::NotFound("Player not found".to_string()));
        }

        let hits = table.filter_eq(PLAYER_COLUMN, player)?;
        if hits.is_empty() {
            return Err(StatsError::NotFound("Player not found".to_string()));
        }

        log::debug!("{} rows for player '{}' in {}", hits.len(), player, season);
        Ok(hits.into_records())
    }

    /// 单赛季球员列表：去重并保持首次出现顺序；空表返回空列表
    pub async fn all_players(&self, season: Season) -> Result<Vec<CellValue>> {
        let table = self.load(DatasetId::Season(season)).await?;
        if table.is_empty() {
            return Ok(Vec::new());
        }
        Ok(table.distinct(PLAYER_COLUMN)?)
    }

    /// 单赛季场均数据：只返回第一条匹配行的投影
    pub async fn player_averages(&self, player: &str, season: Season) -> Result<Record> {
        let table = self.load(DatasetId::Season(season)).await?;
        if table.is_empty() {
            return Err(StatsError::NotFound("Player not found".to_string()));
        }

        let hits = table.filter_eq(PLAYER_COLUMN, player)?;
        if hits.is_empty() {
            return Err(StatsError::NotFound("Player not found".to_string()));
        }

        if let Some(missing) = AVERAGE_COLUMNS.iter().find(|c| !hits.has_column(c)) {
            log::warn!("{} table has no '{}' column", season, missing);
            return Err(StatsError::NotFound("Stats not found".to_string()));
        }

        let mut columns = vec![PLAYER_COLUMN];
        columns.extend(AVERAGE_COLUMNS);
        let mut projected = hits.head(1).project(&columns)?;
        projected.insert_constant(1, SEASON_COLUMN, CellValue::Text(season.to_string()));

        projected
            .into_records()
            .into_iter()
            .next()
            .ok_or_else(|| StatsError::NotFound("Stats not found".to_string()))
    }

    /// 跨赛季球员数据
    ///
    /// 每个赛季独立拉取+过滤，结果写入按赛季编号的槽位，全部完成后按赛季顺序读出，
    /// 与实际完成顺序无关。单个赛季缺失（无匹配/文件不存在/拉取失败/表格异常）只跳过该赛季；
    /// 所有赛季都拉取失败时返回拉取错误，否则合并结果为空时返回 NotFound。
    pub async fn all_seasons_stats(&self, player: &str) -> Result<Vec<Record>> {
        let mut slots: Vec<Option<Result<Table>>> = (0..self.seasons.len()).map(|_| None).collect();

        let mut outcomes = stream::iter(self.seasons.iter().copied().enumerate())
            .map(|(idx, season)| async move { (idx, self.season_slice(player, season).await) })
            .buffer_unordered(self.fan_out_concurrency);

        while let Some((idx, outcome)) = outcomes.next().await {
            slots[idx] = Some(outcome);
        }

        let mut records = Vec::new();
        let mut fetch_failures = 0;
        let mut last_fetch_error = None;

        for (season, slot) in self.seasons.iter().zip(slots) {
            match slot {
                Some(Ok(hits)) => records.extend(hits.into_records()),
                Some(Err(StatsError::Fetch(e))) => {
                    log::warn!("Skipping {} for '{}': {}", season, player, e);
                    fetch_failures += 1;
                    last_fetch_error = Some(e);
                }
                Some(Err(e)) => log::warn!("Skipping {} for '{}': {}", season, player, e),
                None => {}
            }
        }

        if records.is_empty() {
            if fetch_failures == self.seasons.len() {
                if let Some(e) = last_fetch_error {
                    return Err(StatsError::Fetch(e));
                }
            }
            return Err(StatsError::NotFound(
                "Player not found in any season".to_string(),
            ));
        }

        log::debug!(
            "{} rows for player '{}' across {} seasons",
            records.len(),
            player,
            self.seasons.len()
        );
        Ok(records)
    }

    async fn season_slice(&self, player: &str, season: Season) -> Result<Table> {
        let table = self.load(DatasetId::Season(season)).await?;
        if table.is_empty() {
            return Ok(table);
        }
        let mut hits = table.filter_eq(PLAYER_COLUMN, player)?;
        hits.stamp(SEASON_COLUMN, CellValue::Text(season.to_string()));
        Ok(hits)
    }

    /// 统计列排行：降序稳定排序后取前 limit 行，投影 `Player` + 统计列
    pub async fn top_players(&self, stat: &str, season: Season, limit: i64) -> Result<Vec<Record>> {
        if limit <= 0 {
            return Err(StatsError::InvalidRequest(format!(
                "limit must be a positive integer, got {}",
                limit
            )));
        }

        let table = self.load(DatasetId::Season(season)).await?;
        if table.is_empty() {
            return Err(StatsError::NotFound(
                "No data found for this season".to_string(),
            ));
        }
        if !table.has_column(stat) {
            return Err(StatsError::InvalidRequest("Invalid stat category".to_string()));
        }

        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        let top = table.sort_desc(stat)?.head(limit).project(&[PLAYER_COLUMN, stat])?;
        Ok(top.into_records())
    }

    async fn filter_awards(&self, conditions: &[(&str, &str)], not_found: &str) -> Result<Vec<Record>> {
        let table = self.load(DatasetId::Awards).await?;
        if table.is_empty() {
            return Err(StatsError::NotFound(not_found.to_string()));
        }

        let hits = table.filter_all_eq(conditions)?;
        if hits.is_empty() {
            return Err(StatsError::NotFound(not_found.to_string()));
        }
        Ok(hits.into_records())
    }

    /// 某赛季的全部奖项
    pub async fn awards_by_season(&self, season: Season) -> Result<Vec<Record>> {
        let tag = season.to_string();
        self.filter_awards(
            &[(SEASON_COLUMN, tag.as_str())],
            "No awards data found for this season",
        )
        .await
    }

    /// 某球员的全部奖项
    pub async fn awards_by_player(&self, player: &str) -> Result<Vec<Record>> {
        self.filter_awards(
            &[(PLAYER_COLUMN, player)],
            "No awards data found for this player",
        )
        .await
    }

    /// 某奖项的全部获奖者
    pub async fn awards_by_name(&self, award: &str) -> Result<Vec<Record>> {
        self.filter_awards(&[(AWARD_COLUMN, award)], "No data found for this award")
            .await
    }

    /// 某球员在某赛季的奖项（两个条件同时满足）
    pub async fn awards_by_season_and_player(&self, season: Season, player: &str) -> Result<Vec<Record>> {
        let tag = season.to_string();
        self.filter_awards(
            &[(SEASON_COLUMN, tag.as_str()), (PLAYER_COLUMN, player)],
            "No awards data found for this player in this season",
        )
        .await
    }
}
