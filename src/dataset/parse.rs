//! CSV / XLSX 解码为 [`Table`]
//!
//! 列类型推断规则：
//! - CSV: 整列非空单元格都能解析为 i64 → 整数列；都能解析为 f64 → 浮点列；否则保留原始文本
//! - XLSX: 单元格保留表格自身类型，同列整数与浮点混合时整数提升为浮点
//!
//! 空串 / `NA` / `N/A` / `NaN` / `null` 视为空值。

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use std::io::Cursor;

use super::table::{CellValue, Table, TableError};
use super::SourceFormat;

const NULL_TOKENS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null"];

/// 解析错误
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("xlsx: {0}")]
    Xlsx(#[from] calamine::XlsxError),

    #[error("workbook has no worksheets")]
    NoWorksheet,

    #[error(transparent)]
    Shape(#[from] TableError),
}

/// 按格式分派
pub fn parse(format: SourceFormat, bytes: Vec<u8>) -> Result<Table, ParseError> {
    match format {
        SourceFormat::Csv => parse_csv(&bytes),
        SourceFormat::Xlsx => parse_xlsx(bytes),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ColumnKind {
    Int,
    Float,
    Text,
}

fn is_null_token(raw: &str) -> bool {
    NULL_TOKENS.contains(&raw.trim())
}

fn infer_kind<'a>(cells: impl Iterator<Item = &'a str>) -> ColumnKind {
    let mut kind = ColumnKind::Int;
    for raw in cells.filter(|c| !is_null_token(c)) {
        let trimmed = raw.trim();
        if kind == ColumnKind::Int && trimmed.parse::<i64>().is_err() {
            kind = ColumnKind::Float;
        }
        if kind == ColumnKind::Float && trimmed.parse::<f64>().is_err() {
            return ColumnKind::Text;
        }
    }
    kind
}

fn convert_text_cell(raw: &str, kind: ColumnKind) -> CellValue {
    if is_null_token(raw) {
        return CellValue::Null;
    }
    let trimmed = raw.trim();
    match kind {
        ColumnKind::Int => trimmed
            .parse()
            .map(CellValue::Int)
            .unwrap_or_else(|_| CellValue::Text(raw.to_string())),
        ColumnKind::Float => trimmed
            .parse()
            .map(CellValue::Float)
            .unwrap_or_else(|_| CellValue::Text(raw.to_string())),
        ColumnKind::Text => CellValue::Text(raw.to_string()),
    }
}

/// 空表头 → `Unnamed: <i>`；重复表头追加 `.1`、`.2` ...
fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut headers: Vec<String> = Vec::with_capacity(raw.len());
    for (i, name) in raw.into_iter().enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {}", i)
        } else {
            name
        };
        let mut candidate = base.clone();
        let mut suffix = 1;
        while headers.contains(&candidate) {
            candidate = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        headers.push(candidate);
    }
    headers
}

/// 解析逗号分隔文本，首行为表头
pub fn parse_csv(bytes: &[u8]) -> Result<Table, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let headers = normalize_headers(reader.headers()?.iter().map(str::to_string).collect());

    let records = reader
        .records()
        .collect::<Result<Vec<csv::StringRecord>, csv::Error>>()?;

    let width = headers.len();
    let kinds: Vec<ColumnKind> = (0..width)
        .map(|c| infer_kind(records.iter().map(|r| r.get(c).unwrap_or(""))))
        .collect();

    let rows = records
        .iter()
        .map(|record| {
            (0..width)
                .map(|c| convert_text_cell(record.get(c).unwrap_or(""), kinds[c]))
                .collect()
        })
        .collect();

    Ok(Table::from_rows(headers, rows)?)
}

fn convert_xlsx_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Null,
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) if is_null_token(s) => CellValue::Null,
        Data::String(s) => CellValue::Text(s.clone()),
        other => CellValue::Text(other.to_string()),
    }
}

fn xlsx_header(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 解析工作簿的第一个工作表，首行为表头，全空行丢弃
pub fn parse_xlsx(bytes: Vec<u8>) -> Result<Table, ParseError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ParseError::NoWorksheet)??;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header_row) => normalize_headers(header_row.iter().map(xlsx_header).collect()),
        None => return Ok(Table::default()),
    };
    let width = headers.len();

    let mut cells: Vec<Vec<CellValue>> = rows
        .map(|row| {
            (0..width)
                .map(|c| row.get(c).map(convert_xlsx_cell).unwrap_or(CellValue::Null))
                .collect::<Vec<_>>()
        })
        .filter(|row| !row.iter().all(CellValue::is_null))
        .collect();

    promote_mixed_numeric(&mut cells, width);

    Ok(Table::from_rows(headers, cells)?)
}

fn promote_mixed_numeric(rows: &mut [Vec<CellValue>], width: usize) {
    for c in 0..width {
        let has_float = rows.iter().any(|r| matches!(r[c], CellValue::Float(_)));
        let has_int = rows.iter().any(|r| matches!(r[c], CellValue::Int(_)));
        if !(has_float && has_int) {
            continue;
        }
        for row in rows.iter_mut() {
            if let CellValue::Int(i) = row[c] {
                row[c] = CellValue::Float(i as f64);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_column_inference() {
        let data = b"Rk,Player,Age,PER,3P%\n1,LeBron James,38,23.9,.321\n2,Kevin Durant,34,25.0,\n";
        let table = parse_csv(data).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, "Rk"), Some(&CellValue::Int(1)));
        assert_eq!(table.cell(0, "Player"), Some(&CellValue::from("LeBron James")));
        assert_eq!(table.cell(1, "PER"), Some(&CellValue::Float(25.0)));
        assert_eq!(table.cell(0, "3P%"), Some(&CellValue::Float(0.321)));
        assert_eq!(table.cell(1, "3P%"), Some(&CellValue::Null));
    }

    #[test]
    fn test_csv_mixed_column_stays_text() {
        let table = parse_csv(b"Pos,G\nPG,10\n1,x\n").unwrap();
        assert_eq!(table.cell(1, "Pos"), Some(&CellValue::from("1")));
        assert_eq!(table.cell(0, "G"), Some(&CellValue::from("10")));
    }

    #[test]
    fn test_csv_int_float_column_becomes_float() {
        let table = parse_csv(b"PTS\n27\n28.5\n").unwrap();
        assert_eq!(table.cell(0, "PTS"), Some(&CellValue::Float(27.0)));
    }

    #[test]
    fn test_csv_headers_are_normalized() {
        let table = parse_csv(b",Player,Player\n1,A,B\n").unwrap();
        assert_eq!(
            table.columns(),
            &["Unnamed: 0".to_string(), "Player".to_string(), "Player.1".to_string()]
        );
    }

    #[test]
    fn test_csv_ragged_rows_fail() {
        assert!(matches!(parse_csv(b"a,b\n1,2,3\n"), Err(ParseError::Csv(_))));
    }

    #[test]
    fn test_csv_empty_input_is_empty_table() {
        let table = parse_csv(b"").unwrap();
        assert!(table.is_empty());
        assert!(table.columns().is_empty());
    }

    fn stats_workbook() -> Vec<u8> {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, name) in ["Player", "Tm", "PTS", "Player", ""].iter().enumerate() {
            sheet.write_string(0, col as u16, *name).unwrap();
        }
        sheet.write_string(1, 0, "LeBron James").unwrap();
        sheet.write_string(1, 1, "LAL").unwrap();
        sheet.write_number(1, 2, 28.9).unwrap();
        sheet.write_string(1, 3, "x").unwrap();
        // 第 2 行留空
        sheet.write_string(3, 0, "Kevin Durant").unwrap();
        sheet.write_string(3, 1, "N/A").unwrap();
        sheet.write_number(3, 2, 29).unwrap();
        sheet.write_boolean(3, 4, true).unwrap();
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_xlsx_workbook() {
        let table = parse_xlsx(stats_workbook()).unwrap();

        assert_eq!(
            table.columns(),
            &[
                "Player".to_string(),
                "Tm".to_string(),
                "PTS".to_string(),
                "Player.1".to_string(),
                "Unnamed: 4".to_string(),
            ]
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, "Player"), Some(&CellValue::from("LeBron James")));
        assert_eq!(table.cell(1, "Player"), Some(&CellValue::from("Kevin Durant")));
        assert_eq!(table.cell(0, "PTS").and_then(CellValue::as_f64), Some(28.9));
        assert_eq!(table.cell(1, "PTS").and_then(CellValue::as_f64), Some(29.0));
        assert_eq!(table.cell(1, "Tm"), Some(&CellValue::Null));
        assert_eq!(table.cell(1, "Player.1"), Some(&CellValue::Null));
        assert_eq!(table.cell(1, "Unnamed: 4"), Some(&CellValue::Bool(true)));
        assert!(table.sort_desc("PTS").is_ok());
    }

    #[test]
    fn test_xlsx_rejects_non_zip_payload() {
        let err = parse_xlsx(b"Player,PTS\nA,1\n".to_vec()).unwrap_err();
        assert!(matches!(err, ParseError::Xlsx(_)));
    }

    #[test]
    fn test_promote_mixed_numeric() {
        let mut rows = vec![
            vec![CellValue::Int(3), CellValue::Int(1)],
            vec![CellValue::Float(2.5), CellValue::Null],
        ];
        promote_mixed_numeric(&mut rows, 2);
        assert_eq!(rows[0][0], CellValue::Float(3.0));
        assert_eq!(rows[0][1], CellValue::Int(1));
    }
}
