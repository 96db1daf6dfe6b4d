// 测试公共设施：内存数据源 + 样例表格
#![allow(dead_code)]

use async_trait::async_trait;
use nbastats::dataset::AttemptError;
use nbastats::{CellValue, DatasetId, DatasetSource, FetchError, Season, Table};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// 内存数据源
///
/// 未登记的数据集按“两种格式都 404”处理；可为单个数据集设置人工延迟，
/// 或让它以超时失败。
#[derive(Default)]
pub struct MemorySource {
    datasets: HashMap<DatasetId, Table>,
    delays: HashMap<DatasetId, Duration>,
    unreachable: HashSet<DatasetId>,
    calls: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_season(mut self, tag: &str, table: Table) -> Self {
        self.datasets.insert(season_id(tag), table);
        self
    }

    pub fn with_awards(mut self, table: Table) -> Self {
        self.datasets.insert(DatasetId::Awards, table);
        self
    }

    pub fn with_delay(mut self, tag: &str, delay: Duration) -> Self {
        self.delays.insert(season_id(tag), delay);
        self
    }

    /// 两次尝试都超时
    pub fn with_unreachable(mut self, tag: &str) -> Self {
        self.unreachable.insert(season_id(tag));
        self
    }

    pub fn with_unreachable_awards(mut self) -> Self {
        self.unreachable.insert(DatasetId::Awards);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatasetSource for MemorySource {
    async fn fetch(&self, dataset: DatasetId) -> Result<Table, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(&dataset) {
            tokio::time::sleep(*delay).await;
        }

        if self.unreachable.contains(&dataset) {
            return Err(FetchError {
                dataset,
                primary: AttemptError::Timeout {
                    url: format!("memory://{}.csv", dataset),
                },
                secondary: AttemptError::Timeout {
                    url: format!("memory://{}.xlsx", dataset),
                },
            });
        }

        match self.datasets.get(&dataset) {
            Some(table) => Ok(table.clone()),
            None => Err(FetchError {
                dataset,
                primary: AttemptError::Status {
                    url: format!("memory://{}.csv", dataset),
                    status: 404,
                },
                secondary: AttemptError::Status {
                    url: format!("memory://{}.xlsx", dataset),
                    status: 404,
                },
            }),
        }
    }
}

pub fn season_id(tag: &str) -> DatasetId {
    DatasetId::Season(Season::parse(tag).unwrap())
}

pub fn season(tag: &str) -> Season {
    Season::parse(tag).unwrap()
}

/// 2000-01 ..= 2022-23
pub fn known_seasons() -> Vec<Season> {
    Season::range(season("2000-01"), season("2022-23"))
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// 三名球员的赛季数据
pub fn player_stats_table() -> Table {
    let rows = [
        ("LeBron James", [25.0, 27.0, 7.0, 7.0, 0.7, 3.5, 5.7, 2.0, 0.350]),
        ("Kevin Durant", [26.1, 28.0, 5.5, 7.8, 1.1, 2.8, 6.3, 2.5, 0.390]),
        ("Stephen Curry", [27.3, 29.0, 6.1, 5.3, 0.3, 3.1, 11.1, 4.1, 0.370]),
    ];

    Table::from_rows(
        columns(&["Player", "Tm", "PER", "PTS", "AST", "TRB", "BLK", "TOV", "3PA", "3P", "3P%"]),
        rows.iter()
            .map(|(name, stats)| {
                let mut row = vec![CellValue::from(*name), CellValue::from("LAL")];
                row.extend(stats.iter().map(|v| CellValue::Float(*v)));
                row
            })
            .collect(),
    )
    .unwrap()
}

/// 单行赛季数据
pub fn single_player_table(player: &str, team: &str, pts: f64) -> Table {
    Table::from_rows(
        columns(&["Player", "Tm", "PTS"]),
        vec![vec![player.into(), team.into(), pts.into()]],
    )
    .unwrap()
}

/// 奖项数据：2009-10 一条，2022-23 三条
pub fn awards_table() -> Table {
    let rows = [
        ("2009-10", "Kobe Bryant", "Finals MVP"),
        ("2022-23", "LeBron James", "MVP"),
        ("2022-23", "Kevin Durant", "Scoring Leader"),
        ("2022-23", "Stephen Curry", "Three Point Leader"),
        ("2012-13", "LeBron James", "MVP"),
    ];
    Table::from_rows(
        columns(&["Season", "Player", "Award"]),
        rows.iter()
            .map(|(s, p, a)| vec![(*s).into(), (*p).into(), (*a).into()])
            .collect(),
    )
    .unwrap()
}

pub fn empty_table() -> Table {
    Table::new(Vec::new())
}

/// 奖项工作簿：表头 + 两条记录，中间夹一个空行
pub fn awards_workbook() -> Vec<u8> {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();

    let rows = [
        (0, ["Season", "Player", "Award"]),
        (1, ["2022-23", "Joel Embiid", "MVP"]),
        (3, ["2021-22", "Nikola Jokic", "MVP"]),
    ];
    for (row, cells) in rows {
        for (col, value) in cells.iter().enumerate() {
            sheet.write_string(row, col as u16, *value).unwrap();
        }
    }
    sheet.write_string(0, 3, "Share").unwrap();
    sheet.write_number(1, 3, 0.915).unwrap();
    sheet.write_number(3, 3, 1).unwrap();

    workbook.save_to_buffer().unwrap()
}
