//! 内存表格模型
//!
//! 一个数据集 = 有序列名 + 等宽行。所有查询原语（过滤/去重/投影/排序/打标）
//! 都返回新表，原表保持不变，因此同一次拉取的结果可以被多个查询形态复用。

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

/// 单元格值
///
/// JSON 序列化为无标签形式：`null` / `true` / `27` / `25.0` / `"LeBron James"`。
/// 非有限浮点数（NaN/Inf）由 serde_json 输出为 `null`。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    /// 空值（含 NaN）
    pub fn is_null(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// 严格相等匹配：只有文本单元格参与，大小写敏感，不做 trim
    pub fn matches_text(&self, expected: &str) -> bool {
        matches!(self, CellValue::Text(s) if s == expected)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, "null"),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(x) => write!(f, "{}", x),
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

/// 表格操作错误
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TableError {
    #[error("row {row} has {found} cells, expected {expected}")]
    RowWidth {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("'{0}' column not found in the dataset")]
    MissingColumn(String),

    #[error("column '{0}' mixes text and numeric values and cannot be ordered")]
    MixedTypes(String),
}

/// 去重键：借用单元格内容，浮点按位比较（`-0.0` 归一为 `0.0`）
#[derive(PartialEq, Eq, Hash)]
enum DistinctKey<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Float(u64),
    Text(&'a str),
}

impl<'a> DistinctKey<'a> {
    fn of(cell: &'a CellValue) -> Self {
        match cell {
            CellValue::Null => DistinctKey::Null,
            CellValue::Bool(b) => DistinctKey::Bool(*b),
            CellValue::Int(i) => DistinctKey::Int(*i),
            CellValue::Float(f) if *f == 0.0 => DistinctKey::Float(0),
            CellValue::Float(f) => DistinctKey::Float(f.to_bits()),
            CellValue::Text(t) => DistinctKey::Text(t),
        }
    }
}

/// 表格数据集
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// 创建只有表头的空表
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// 由表头和行构建，校验每行宽度与表头一致
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self, TableError> {
        let mut table = Self::new(columns);
        table.rows.reserve(rows.len());
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) -> Result<(), TableError> {
        if row.len() != self.columns.len() {
            return Err(TableError::RowWidth {
                row: self.rows.len(),
                found: row.len(),
                expected: self.columns.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// 行数
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    fn require_column(&self, name: &str) -> Result<usize, TableError> {
        self.column_index(name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// 单列严格相等过滤，保持原始行序
    pub fn filter_eq(&self, column: &str, value: &str) -> Result<Table, TableError> {
        self.filter_all_eq(&[(column, value)])
    }

    /// 多列相等条件的合取过滤，保持原始行序
    pub fn filter_all_eq(&self, conditions: &[(&str, &str)]) -> Result<Table, TableError> {
        let resolved = conditions
            .iter()
            .map(|(column, value)| Ok((self.require_column(column)?, *value)))
            .collect::<Result<Vec<_>, TableError>>()?;

        let rows = self
            .rows
            .iter()
            .filter(|row| resolved.iter().all(|(idx, value)| row[*idx].matches_text(value)))
            .cloned()
            .collect();

        Ok(Table {
            columns: self.columns.clone(),
            rows,
        })
    }

    /// 列去重，按首次出现顺序；空值不计入。整数与浮点按类型区分（`1` 与 `1.0` 不同）
    pub fn distinct(&self, column: &str) -> Result<Vec<CellValue>, TableError> {
        let idx = self.require_column(column)?;
        let mut seen = HashSet::new();
        let mut values = Vec::new();
        for row in &self.rows {
            let cell = &row[idx];
            if cell.is_null() {
                continue;
            }
            if seen.insert(DistinctKey::of(cell)) {
                values.push(cell.clone());
            }
        }
        Ok(values)
    }

    /// 列投影；重复的列名只保留第一次
    pub fn project(&self, columns: &[&str]) -> Result<Table, TableError> {
        let mut names: Vec<String> = Vec::with_capacity(columns.len());
        let mut indices = Vec::with_capacity(columns.len());
        for name in columns {
            if names.iter().any(|n| n == name) {
                continue;
            }
            indices.push(self.require_column(name)?);
            names.push(name.to_string());
        }

        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();

        Ok(Table {
            columns: names,
            rows,
        })
    }

    /// 按列降序稳定排序
    ///
    /// - 数值列按数值比较，空值/NaN 排在最后
    /// - 纯文本列按字典序降序
    /// - 文本与数值混合的列无法排序，返回 [`TableError::MixedTypes`]
    pub fn sort_desc(&self, column: &str) -> Result<Table, TableError> {
        let idx = self.require_column(column)?;

        let keys: Vec<SortKey<'_>> = self.rows.iter().map(|row| SortKey::of(&row[idx])).collect();
        let has_text = keys.iter().any(|k| matches!(k, SortKey::Text(_)));
        let has_number = keys.iter().any(|k| matches!(k, SortKey::Number(_)));
        if has_text && has_number {
            return Err(TableError::MixedTypes(column.to_string()));
        }

        let mut order: Vec<usize> = (0..self.rows.len()).collect();
        // slice::sort_by 是稳定排序，相同值保持原始行序
        order.sort_by(|&a, &b| keys[a].cmp_desc(&keys[b]));

        Ok(Table {
            columns: self.columns.clone(),
            rows: order.into_iter().map(|i| self.rows[i].clone()).collect(),
        })
    }

    /// 取前 n 行，不足 n 行时返回全部
    pub fn head(mut self, n: usize) -> Table {
        self.rows.truncate(n);
        self
    }

    /// 给每行打上常量列：已存在则原位覆盖，否则追加到末尾
    pub fn stamp(&mut self, column: &str, value: CellValue) {
        match self.column_index(column) {
            Some(idx) => {
                for row in &mut self.rows {
                    row[idx] = value.clone();
                }
            }
            None => {
                self.columns.push(column.to_string());
                for row in &mut self.rows {
                    row.push(value.clone());
                }
            }
        }
    }

    /// 在指定位置插入常量列（位置越界时追加）
    pub fn insert_constant(&mut self, position: usize, column: &str, value: CellValue) {
        let position = position.min(self.columns.len());
        self.columns.insert(position, column.to_string());
        for row in &mut self.rows {
            row.insert(position, value.clone());
        }
    }

    /// 转换为 JSON 记录（列名 → 值，保持列序）
    pub fn into_records(self) -> Vec<Record> {
        let columns = self.columns;
        self.rows
            .into_iter()
            .map(|row| Record {
                fields: columns.iter().cloned().zip(row).collect(),
            })
            .collect()
    }
}

enum SortKey<'a> {
    Number(f64),
    Text(&'a str),
    Missing,
}

impl<'a> SortKey<'a> {
    fn of(cell: &'a CellValue) -> Self {
        if cell.is_null() {
            return SortKey::Missing;
        }
        match cell {
            CellValue::Text(s) => SortKey::Text(s),
            other => other.as_f64().map(SortKey::Number).unwrap_or(SortKey::Missing),
        }
    }

    fn cmp_desc(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Missing, SortKey::Missing) => Ordering::Equal,
            (SortKey::Missing, _) => Ordering::Greater,
            (_, SortKey::Missing) => Ordering::Less,
            (SortKey::Number(a), SortKey::Number(b)) => b.partial_cmp(a).unwrap_or(Ordering::Equal),
            (SortKey::Text(a), SortKey::Text(b)) => b.cmp(a),
            _ => Ordering::Equal,
        }
    }
}

/// 一行记录，序列化为保持列序的 JSON 对象
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Vec<(String, CellValue)>,
}

impl Record {
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.fields.iter().find(|(k, _)| k == column).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats_table() -> Table {
        Table::from_rows(
            vec!["Player".into(), "Tm".into(), "PTS".into()],
            vec![
                vec!["A".into(), "LAL".into(), 20.0.into()],
                vec!["B".into(), "BOS".into(), 25.5.into()],
                vec!["A".into(), "MIA".into(), 20.0.into()],
                vec!["C".into(), "GSW".into(), CellValue::Null],
                vec!["D".into(), "DEN".into(), 25.5.into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_row_width_is_enforced() {
        let err = Table::from_rows(vec!["a".into(), "b".into()], vec![vec![1i64.into()]]).unwrap_err();
        assert_eq!(
            err,
            TableError::RowWidth {
                row: 0,
                found: 1,
                expected: 2
            }
        );
    }

    #[test]
    fn test_filter_eq_is_exact_and_ordered() {
        let table = stats_table();
        let hits = table.filter_eq("Player", "A").unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits.cell(0, "Tm"), Some(&CellValue::from("LAL")));
        assert_eq!(hits.cell(1, "Tm"), Some(&CellValue::from("MIA")));

        assert!(table.filter_eq("Player", "a").unwrap().is_empty());
        assert!(table.filter_eq("Player", "A ").unwrap().is_empty());
    }

    #[test]
    fn test_filter_missing_column() {
        let err = stats_table().filter_eq("Award", "MVP").unwrap_err();
        assert_eq!(err, TableError::MissingColumn("Award".into()));
    }

    #[test]
    fn test_filter_all_eq_is_conjunction() {
        let table = stats_table();
        let hits = table.filter_all_eq(&[("Player", "A"), ("Tm", "MIA")]).unwrap();
        assert_eq!(hits.len(), 1);
        assert!(table
            .filter_all_eq(&[("Player", "B"), ("Tm", "MIA")])
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_distinct_keeps_first_seen_order() {
        let names = stats_table().distinct("Player").unwrap();
        let names: Vec<_> = names.iter().filter_map(|v| v.as_text()).collect();
        assert_eq!(names, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_distinct_numeric_and_mixed_cells() {
        let points = stats_table().distinct("PTS").unwrap();
        assert_eq!(points, vec![CellValue::Float(20.0), CellValue::Float(25.5)]);

        let mixed = Table::from_rows(
            vec!["v".into()],
            vec![
                vec![1i64.into()],
                vec![1.0.into()],
                vec!["1".into()],
                vec![1i64.into()],
                vec![0.0.into()],
                vec![(-0.0).into()],
                vec![CellValue::Float(f64::NAN)],
            ],
        )
        .unwrap();
        assert_eq!(
            mixed.distinct("v").unwrap(),
            vec![
                CellValue::Int(1),
                CellValue::Float(1.0),
                CellValue::from("1"),
                CellValue::Float(0.0),
            ]
        );
    }

    #[test]
    fn test_sort_desc_is_stable_with_nulls_last() {
        let sorted = stats_table().sort_desc("PTS").unwrap();
        let order: Vec<_> = (0..sorted.len())
            .map(|i| sorted.cell(i, "Tm").unwrap().to_string())
            .collect();
        assert_eq!(order, vec!["BOS", "DEN", "LAL", "MIA", "GSW"]);
    }

    #[test]
    fn test_sort_desc_text_column() {
        let sorted = stats_table().sort_desc("Tm").unwrap();
        assert_eq!(sorted.cell(0, "Tm"), Some(&CellValue::from("MIA")));
    }

    #[test]
    fn test_sort_mixed_column_fails() {
        let table = Table::from_rows(
            vec!["X".into()],
            vec![vec![1i64.into()], vec!["two".into()]],
        )
        .unwrap();
        assert_eq!(table.sort_desc("X").unwrap_err(), TableError::MixedTypes("X".into()));
    }

    #[test]
    fn test_project_dedups_and_orders() {
        let projected = stats_table().project(&["PTS", "Player", "PTS"]).unwrap();
        assert_eq!(projected.columns(), &["PTS".to_string(), "Player".to_string()]);
    }

    #[test]
    fn test_stamp_overwrites_or_appends() {
        let mut table = stats_table();
        table.stamp("Season", "2022-23".into());
        assert_eq!(table.columns().last().map(String::as_str), Some("Season"));

        table.stamp("Tm", "TOT".into());
        assert_eq!(table.columns().len(), 4);
        assert_eq!(table.cell(2, "Tm"), Some(&CellValue::from("TOT")));
    }

    #[test]
    fn test_record_serializes_in_column_order() {
        let records = stats_table().head(1).into_records();
        let json = serde_json::to_string(&records[0]).unwrap();
        assert_eq!(json, r#"{"Player":"A","Tm":"LAL","PTS":20.0}"#);
    }

    #[test]
    fn test_head_beyond_len() {
        assert_eq!(stats_table().head(50).len(), 5);
    }
}
