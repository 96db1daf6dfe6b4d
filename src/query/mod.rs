// 查询引擎模块
//
// 架构：
// ┌──────────────────────────────────────────────────────┐
// │                    Query Layer                       │
// │                                                      │
// │   ┌──────────────────┐      ┌──────────────────┐     │
// │   │ StatsQueryEngine │ ───▶ │  DatasetSource   │     │
// │   │ (filter / sort / │      │ (CSV → XLSX      │     │
// │   │  project / fan)  │      │  fallback)       │     │
// │   └──────────────────┘      └──────────────────┘     │
// └──────────────────────────────────────────────────────┘

pub mod engine;

pub use engine::{StatsQueryEngine, AVERAGE_COLUMNS, AWARD_COLUMN, PLAYER_COLUMN, SEASON_COLUMN};
