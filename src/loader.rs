use std::borrow::Cow;
use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::classifier::NoiseFilter;
use crate::error::{CuadreError, Result};
use crate::models::RawRow;
use crate::settings::ColumnNames;

// ---------------------------------------------------------------------------
// Cells and sheets
// ---------------------------------------------------------------------------

/// Source-agnostic cell value. CSV cells are always `Text` or `Empty`.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
    /// Booleans, dates, formula errors: anything that is neither text nor a number.
    Other(String),
}

impl Cell {
    fn text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(n) => format!("{n}"),
            Cell::Text(s) | Cell::Other(s) => s.trim().to_string(),
        }
    }

    fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

/// One tab of a workbook. `cells[r][c]` is sheet row `r + 1`, column `c + 1`.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub name: String,
    pub cells: Vec<Vec<Cell>>,
}

impl Sheet {
    fn cell(&self, row: usize, col: usize) -> &Cell {
        self.cells
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&Cell::Empty)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a money string the way bookkeepers type it. `None` when it is not a number.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s: String = raw
        .chars()
        .filter(|c| !matches!(c, ',' | '"' | '$') && !c.is_whitespace())
        .collect();
    if s.is_empty() {
        return None;
    }
    let value = match s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        Some(inner) => inner.parse::<f64>().ok().map(|v| -v),
        None => s.parse::<f64>().ok(),
    };
    value.filter(|v| v.is_finite())
}

/// Coerce a money cell. Non-numeric content becomes 0 and bumps `repaired`.
fn coerce_amount(cell: &Cell, repaired: &mut usize) -> f64 {
    match cell {
        Cell::Empty => 0.0,
        Cell::Number(n) => *n,
        Cell::Text(s) if s.trim().is_empty() => 0.0,
        Cell::Text(s) => parse_amount(s).unwrap_or_else(|| {
            *repaired += 1;
            0.0
        }),
        Cell::Other(_) => {
            *repaired += 1;
            0.0
        }
    }
}

fn normalize_header(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn find_column(headers: &[String], aliases: &[String]) -> Option<usize> {
    let wanted: Vec<String> = aliases.iter().map(|a| normalize_header(a)).collect();
    headers.iter().position(|h| wanted.contains(h))
}

pub fn checksum_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// UTF-8 when valid, otherwise Windows-1252 (what Excel on Windows saves CSV as).
fn decode_text(data: &[u8]) -> Cow<'_, str> {
    let (text, had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(data);
    if !had_errors {
        return text;
    }
    debug!("CSV is not UTF-8, decoding as Windows-1252");
    encoding_rs::WINDOWS_1252.decode_without_bom_handling(data).0
}

// ---------------------------------------------------------------------------
// Reading workbooks
// ---------------------------------------------------------------------------

fn unreadable(path: &Path, message: impl ToString) -> CuadreError {
    CuadreError::WorkbookUnreadable {
        path: path.display().to_string(),
        message: message.to_string(),
    }
}

/// Sheets of one input file plus the SHA-256 of the bytes they came from.
#[derive(Debug)]
pub struct Source {
    pub sheets: Vec<Sheet>,
    pub checksum: String,
}

/// Read every sheet of a workbook file. A `.csv` file is one sheet named after the file.
pub fn read_source(file_path: &Path) -> Result<Source> {
    if !file_path.exists() {
        return Err(unreadable(file_path, "file not found"));
    }
    let data = std::fs::read(file_path)?;
    let checksum = checksum_bytes(&data);
    let is_csv = file_path
        .extension()
        .map_or(false, |e| e.eq_ignore_ascii_case("csv"));
    let sheets = if is_csv {
        read_csv_sheet(file_path, &data)?
    } else {
        read_workbook(file_path, data)?
    };
    Ok(Source { sheets, checksum })
}

fn read_csv_sheet(file_path: &Path, data: &[u8]) -> Result<Vec<Sheet>> {
    let text = decode_text(data);
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut cells = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| unreadable(file_path, e))?;
        cells.push(
            record
                .iter()
                .map(|f| {
                    if f.trim().is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(f.to_string())
                    }
                })
                .collect(),
        );
    }
    let name = file_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("sheet")
        .to_string();
    Ok(vec![Sheet { name, cells }])
}

#[cfg(feature = "xlsx")]
fn read_workbook(file_path: &Path, data: Vec<u8>) -> Result<Vec<Sheet>> {
    read_sheets_from_bytes(&file_path.display().to_string(), data)
}

#[cfg(not(feature = "xlsx"))]
fn read_workbook(file_path: &Path, _data: Vec<u8>) -> Result<Vec<Sheet>> {
    Err(CuadreError::UnsupportedFormat(format!(
        "{} (built without spreadsheet support; export it as CSV)",
        file_path.display()
    )))
}

/// Read a workbook held in memory, e.g. an upload that never touched disk.
#[cfg(feature = "xlsx")]
pub fn read_sheets_from_bytes(name: &str, data: Vec<u8>) -> Result<Vec<Sheet>> {
    let workbook = calamine::open_workbook_auto_from_rs(std::io::Cursor::new(data))
        .map_err(|e| unreadable(Path::new(name), e))?;
    Ok(sheets_from_workbook(workbook))
}

#[cfg(feature = "xlsx")]
fn sheets_from_workbook<RS>(mut workbook: calamine::Sheets<RS>) -> Vec<Sheet>
where
    RS: std::io::Read + std::io::Seek,
{
    use calamine::Reader;

    workbook
        .sheet_names()
        .into_iter()
        .map(|name| {
            let range = workbook.worksheet_range(&name);
            sheet_or_empty(name, range)
        })
        .collect()
}

/// A sheet calamine cannot read stays in place as an empty sheet, which the loader then skips.
#[cfg(feature = "xlsx")]
fn sheet_or_empty<E: std::fmt::Display>(
    name: String,
    range: std::result::Result<calamine::Range<calamine::Data>, E>,
) -> Sheet {
    match range {
        Ok(range) => sheet_from_range(name, &range),
        Err(e) => {
            warn!(sheet = %name, error = %e, "sheet could not be read, skipping");
            Sheet {
                name,
                cells: Vec::new(),
            }
        }
    }
}

/// calamine ranges start at the first used cell, so pad back to absolute coordinates.
#[cfg(feature = "xlsx")]
pub fn sheet_from_range(name: String, range: &calamine::Range<calamine::Data>) -> Sheet {
    use calamine::Data;

    let Some((row0, col0)) = range.start() else {
        return Sheet {
            name,
            cells: Vec::new(),
        };
    };
    let mut cells: Vec<Vec<Cell>> = vec![Vec::new(); row0 as usize];
    for row in range.rows() {
        let mut out = vec![Cell::Empty; col0 as usize];
        out.extend(row.iter().map(|d| match d {
            Data::Empty => Cell::Empty,
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::String(s) => Cell::Text(s.clone()),
            other => Cell::Other(other.to_string()),
        }));
        cells.push(out);
    }
    Sheet { name, cells }
}

// ---------------------------------------------------------------------------
// Row extraction and filtering
// ---------------------------------------------------------------------------

pub struct LoadOptions<'a> {
    /// One-indexed header row.
    pub header_row: u32,
    pub columns: &'a ColumnNames,
    pub noise: &'a NoiseFilter,
}

/// Non-fatal diagnostics gathered while loading.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadStats {
    pub sheets_read: usize,
    pub skipped_sheets: Vec<String>,
    pub noise_rows: usize,
    pub empty_rows: usize,
    pub repaired_cells: usize,
}

struct ColumnMap {
    description: usize,
    type_hint: Option<usize>,
    cash: Option<usize>,
    transfer: Option<usize>,
}

fn map_columns(sheet: &Sheet, header_idx: usize, columns: &ColumnNames) -> Option<ColumnMap> {
    let headers: Vec<String> = sheet
        .cells
        .get(header_idx)?
        .iter()
        .map(|c| normalize_header(&c.text()))
        .collect();
    Some(ColumnMap {
        description: find_column(&headers, &columns.description)?,
        type_hint: find_column(&headers, &columns.type_hint),
        cash: find_column(&headers, &columns.cash),
        transfer: find_column(&headers, &columns.transfer),
    })
}

/// Extract the surviving rows of one sheet, or `None` when it has no description column.
pub fn extract_sheet(sheet: &Sheet, opts: &LoadOptions, stats: &mut LoadStats) -> Option<Vec<RawRow>> {
    let header_idx = opts.header_row.saturating_sub(1) as usize;
    let Some(map) = map_columns(sheet, header_idx, opts.columns) else {
        debug!(sheet = %sheet.name, "no description column, skipping sheet");
        stats.skipped_sheets.push(sheet.name.clone());
        return None;
    };
    stats.sheets_read += 1;

    let mut rows = Vec::new();
    for r in (header_idx + 1)..sheet.cells.len() {
        let description = sheet.cell(r, map.description).text();
        if let Some(keyword) = opts.noise.matched(&description) {
            debug!(sheet = %sheet.name, row = r + 1, keyword, "dropping summary row");
            stats.noise_rows += 1;
            continue;
        }
        let amount = |col: Option<usize>, stats: &mut LoadStats| {
            col.map_or(0.0, |c| coerce_amount(sheet.cell(r, c), &mut stats.repaired_cells))
        };
        let cash_amount = amount(map.cash, stats);
        let transfer_amount = amount(map.transfer, stats);
        let type_hint = map
            .type_hint
            .map(|c| sheet.cell(r, c))
            .filter(|c| !c.is_blank())
            .map(Cell::text);

        let row = RawRow {
            description,
            type_hint,
            cash_amount,
            transfer_amount,
            sheet_name: sheet.name.clone(),
        };
        if !row.moved_money() {
            stats.empty_rows += 1;
            continue;
        }
        rows.push(row);
    }
    Some(rows)
}

pub struct LoadedRows {
    pub rows: Vec<RawRow>,
    pub stats: LoadStats,
}

pub fn load_rows(sheets: &[Sheet], opts: &LoadOptions) -> LoadedRows {
    let mut stats = LoadStats::default();
    let mut rows = Vec::new();
    for sheet in sheets {
        if let Some(found) = extract_sheet(sheet, opts, &mut stats) {
            debug!(sheet = %sheet.name, rows = found.len(), "sheet loaded");
            rows.extend(found);
        }
    }
    if stats.repaired_cells > 0 {
        warn!(cells = stats.repaired_cells, "non-numeric money cells counted as 0");
    }
    info!(
        sheets = stats.sheets_read,
        skipped = stats.skipped_sheets.len(),
        rows = rows.len(),
        "workbook loaded"
    );
    LoadedRows { rows, stats }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    /// Five title rows, then headers on row 6, then `data`.
    fn day_sheet(name: &str, headers: &[&str], data: Vec<Vec<Cell>>) -> Sheet {
        let mut cells = vec![
            vec![text("DISTRICAUCHOS")],
            vec![text("Cuadre diario")],
            vec![],
            vec![text("Fecha"), text("01/03/2025")],
            vec![],
        ];
        cells.push(headers.iter().map(|h| text(h)).collect());
        cells.extend(data);
        Sheet {
            name: name.to_string(),
            cells,
        }
    }

    fn run(sheets: &[Sheet]) -> LoadedRows {
        let settings = Settings::default();
        let noise = NoiseFilter::new(&settings.noise_keywords);
        let opts = LoadOptions {
            header_row: settings.header_row,
            columns: &settings.columns,
            noise: &noise,
        };
        load_rows(sheets, &opts)
    }

    const HEADERS: &[&str] = &["Description", "Cash(+)", "Transfer(+)"];

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("$ 50,000"), Some(50000.0));
        assert_eq!(parse_amount("(500.00)"), Some(-500.0));
        assert_eq!(parse_amount("-$50.00"), Some(-50.0));
        assert_eq!(parse_amount("  -42.50  "), Some(-42.5));
        assert_eq!(parse_amount("pendiente"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_non_finite_money_text_is_repaired() {
        for raw in ["inf", "NaN", "(inf)", "(NaN)", "-infinity"] {
            assert_eq!(parse_amount(raw), None, "{raw}");
            let mut repaired = 0;
            assert_eq!(coerce_amount(&text(raw), &mut repaired), 0.0);
            assert_eq!(repaired, 1, "{raw}");
        }
    }

    #[test]
    fn test_header_row_offset_and_sheet_tag() {
        let sheet = day_sheet(
            "01",
            HEADERS,
            vec![vec![text("VENTA CLIENTE %A"), Cell::Empty, Cell::Number(50000.0)]],
        );
        let loaded = run(&[sheet]);
        assert_eq!(loaded.rows.len(), 1);
        let row = &loaded.rows[0];
        assert_eq!(row.description, "VENTA CLIENTE %A");
        assert_eq!(row.cash_amount, 0.0);
        assert_eq!(row.transfer_amount, 50000.0);
        assert_eq!(row.sheet_name, "01");
        assert_eq!(loaded.stats.sheets_read, 1);
    }

    #[test]
    fn test_noise_rows_dropped_regardless_of_amount() {
        let sheet = day_sheet(
            "02",
            HEADERS,
            vec![
                vec![text("TOTAL DEL DIA"), Cell::Number(500000.0), Cell::Empty],
                vec![text("Base de caja"), Cell::Number(100000.0), Cell::Empty],
                vec![text("LLANTA RIN 14"), Cell::Number(80000.0), Cell::Empty],
            ],
        );
        let loaded = run(&[sheet]);
        assert_eq!(loaded.rows.len(), 1);
        assert_eq!(loaded.rows[0].description, "LLANTA RIN 14");
        assert_eq!(loaded.stats.noise_rows, 2);
    }

    #[test]
    fn test_rows_without_money_dropped() {
        let sheet = day_sheet(
            "03",
            HEADERS,
            vec![
                vec![text(""), Cell::Number(0.0), Cell::Number(0.0)],
                vec![],
                vec![text("PARCHE"), Cell::Empty, Cell::Empty],
            ],
        );
        let loaded = run(&[sheet]);
        assert!(loaded.rows.is_empty());
        assert_eq!(loaded.stats.empty_rows, 3);
    }

    #[test]
    fn test_sheet_without_description_is_skipped() {
        let cover = day_sheet("Portada", &["Mes", "Año"], vec![vec![text("Marzo"), text("2025")]]);
        let day = day_sheet(
            "04",
            HEADERS,
            vec![vec![text("VALVULA"), Cell::Number(3000.0), Cell::Empty]],
        );
        let loaded = run(&[cover, day]);
        assert_eq!(loaded.rows.len(), 1);
        assert_eq!(loaded.stats.skipped_sheets, vec!["Portada".to_string()]);
        assert_eq!(loaded.stats.sheets_read, 1);
    }

    #[test]
    fn test_bad_numeric_cells_become_zero() {
        let sheet = day_sheet(
            "05",
            HEADERS,
            vec![
                vec![text("BALANCEO"), text("veinte mil"), text("20,000")],
                vec![text("ROTACION"), Cell::Other("#VALUE!".to_string()), Cell::Empty],
            ],
        );
        let loaded = run(&[sheet]);
        assert_eq!(loaded.rows.len(), 1);
        assert_eq!(loaded.rows[0].description, "BALANCEO");
        assert_eq!(loaded.rows[0].cash_amount, 0.0);
        assert_eq!(loaded.rows[0].transfer_amount, 20000.0);
        assert_eq!(loaded.stats.repaired_cells, 2);
        assert_eq!(loaded.stats.empty_rows, 1);
    }

    #[test]
    fn test_negative_amounts_preserved() {
        let sheet = day_sheet(
            "06",
            HEADERS,
            vec![vec![text("DEVOLUCION"), Cell::Number(-15000.0), Cell::Empty]],
        );
        let loaded = run(&[sheet]);
        assert_eq!(loaded.rows[0].cash_amount, -15000.0);
    }

    #[test]
    fn test_spanish_headers_with_stray_spaces_and_type_column() {
        let sheet = day_sheet(
            "07",
            &[" Descripción ", "Tipo", "Efectivo  (+)", "Transferencia (+) "],
            vec![vec![text("VENTA"), text("Nequi"), Cell::Empty, Cell::Number(12000.0)]],
        );
        let loaded = run(&[sheet]);
        assert_eq!(loaded.rows.len(), 1);
        assert_eq!(loaded.rows[0].type_hint.as_deref(), Some("Nequi"));
        assert_eq!(loaded.rows[0].transfer_amount, 12000.0);
    }

    #[test]
    fn test_header_spacing_variants_match_one_alias() {
        let sheet = day_sheet(
            "09",
            &["DESCRIPTION", "Cash (+)", "Transfer ( + )"],
            vec![vec![text("PAGO QR"), Cell::Number(1000.0), Cell::Number(2000.0)]],
        );
        let loaded = run(&[sheet]);
        assert_eq!(loaded.rows[0].cash_amount, 1000.0);
        assert_eq!(loaded.rows[0].transfer_amount, 2000.0);
    }

    #[test]
    fn test_missing_money_column_reads_as_zero() {
        let sheet = day_sheet(
            "08",
            &["Description", "Cash(+)"],
            vec![vec![text("AIRE"), Cell::Number(2000.0)]],
        );
        let loaded = run(&[sheet]);
        assert_eq!(loaded.rows[0].transfer_amount, 0.0);
    }

    #[test]
    fn test_read_csv_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("marzo-01.csv");
        let content = "\
DISTRICAUCHOS,,
,,
,,
,,
,,
Description,Cash(+),Transfer(+)
VENTA CLIENTE %A,,50000
TOTAL DEL DIA,500000,
";
        std::fs::write(&path, content).unwrap();
        let source = read_source(&path).unwrap();
        assert_eq!(source.checksum, checksum_bytes(content.as_bytes()));
        let sheets = source.sheets;
        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].name, "marzo-01");
        let loaded = run(&sheets);
        assert_eq!(loaded.rows.len(), 1);
        assert_eq!(loaded.rows[0].transfer_amount, 50000.0);
    }

    #[test]
    fn test_read_windows_1252_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("marzo-02.csv");
        let mut content = b",,\n,,\n,,\n,,\n,,\nDescripci".to_vec();
        content.push(0xF3);
        content.extend_from_slice(b"n,Efectivo (+),Transferencia (+)\nALINEACI");
        content.push(0xD3);
        content.extend_from_slice(b"N %J,45000,\n");
        std::fs::write(&path, &content).unwrap();

        let source = read_source(&path).unwrap();
        let loaded = run(&source.sheets);
        assert_eq!(loaded.rows.len(), 1);
        assert_eq!(loaded.rows[0].description, "ALINEACIÓN %J");
        assert_eq!(loaded.rows[0].cash_amount, 45000.0);
    }

    #[test]
    fn test_utf8_bom_csv() {
        let mut data = vec![0xEF, 0xBB, 0xBF];
        data.extend_from_slice("Descripción,Cash(+)\n".as_bytes());
        assert_eq!(decode_text(&data), "Descripción,Cash(+)\n");
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_source(&dir.path().join("nope.xlsx")).unwrap_err();
        assert!(matches!(err, CuadreError::WorkbookUnreadable { .. }));
    }

    #[cfg(feature = "xlsx")]
    #[test]
    fn test_corrupt_workbook_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("marzo.xlsx");
        std::fs::write(&path, b"this is not a zip archive").unwrap();
        let err = read_source(&path).unwrap_err();
        assert!(matches!(err, CuadreError::WorkbookUnreadable { .. }));

        let err = read_sheets_from_bytes("upload.xlsx", b"garbage".to_vec()).unwrap_err();
        assert!(matches!(err, CuadreError::WorkbookUnreadable { .. }));
    }

    #[cfg(feature = "xlsx")]
    #[test]
    fn test_sheet_from_range_keeps_absolute_rows() {
        use calamine::{Data, Range};

        // Used area starts at B3, so headers on row 6 sit at range-relative row 3.
        let mut range: Range<Data> = Range::new((2, 1), (6, 3));
        range.set_value((2, 1), Data::String("Cuadre".to_string()));
        range.set_value((5, 1), Data::String("Description".to_string()));
        range.set_value((5, 2), Data::String("Cash(+)".to_string()));
        range.set_value((5, 3), Data::String("Transfer(+)".to_string()));
        range.set_value((6, 1), Data::String("PAGO NEQUI %J".to_string()));
        range.set_value((6, 3), Data::Int(30000));

        let sheet = sheet_from_range("10".to_string(), &range);
        let loaded = run(&[sheet]);
        assert_eq!(loaded.rows.len(), 1);
        assert_eq!(loaded.rows[0].description, "PAGO NEQUI %J");
        assert_eq!(loaded.rows[0].transfer_amount, 30000.0);
        assert_eq!(loaded.rows[0].cash_amount, 0.0);
    }

    /// Cover sheet, then one sheet per day with headers on row 6 starting at `col0`.
    #[cfg(feature = "xlsx")]
    fn month_workbook() -> Vec<u8> {
        use rust_xlsxwriter::Workbook;

        let days: [(&str, u16, &[(&str, f64, f64)]); 2] = [
            (
                "01",
                0,
                &[("VENTA CLIENTE %A", 0.0, 50000.0), ("TOTAL DEL DIA", 500000.0, 0.0)],
            ),
            (
                "02",
                1,
                &[("PAGO NEQUI %J", 0.0, 30000.0), ("LLANTA RIN 13", 120000.0, 0.0)],
            ),
        ];
        let mut workbook = Workbook::new();
        let cover = workbook.add_worksheet();
        cover.set_name("Portada").unwrap();
        cover.write_string(0, 0, "DISTRICAUCHOS").unwrap();
        cover.write_string(1, 0, "Marzo 2025").unwrap();
        for (name, col0, rows) in days {
            let ws = workbook.add_worksheet();
            ws.set_name(name).unwrap();
            ws.write_string(1, col0, "Cuadre diario").unwrap();
            for (i, header) in ["Descripción", "Efectivo (+)", "Transferencia (+)"]
                .iter()
                .enumerate()
            {
                ws.write_string(5, col0 + i as u16, *header).unwrap();
            }
            for (i, (desc, cash, transfer)) in rows.iter().enumerate() {
                let r = 6 + i as u32;
                ws.write_string(r, col0, *desc).unwrap();
                if *cash != 0.0 {
                    ws.write_number(r, col0 + 1, *cash).unwrap();
                }
                if *transfer != 0.0 {
                    ws.write_number(r, col0 + 2, *transfer).unwrap();
                }
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    #[cfg(feature = "xlsx")]
    #[test]
    fn test_read_multi_sheet_workbook() {
        let sheets = read_sheets_from_bytes("marzo.xlsx", month_workbook()).unwrap();
        let names: Vec<&str> = sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Portada", "01", "02"]);

        let loaded = run(&sheets);
        assert_eq!(loaded.stats.skipped_sheets, vec!["Portada".to_string()]);
        assert_eq!(loaded.stats.sheets_read, 2);
        assert_eq!(loaded.stats.noise_rows, 1);
        let got: Vec<(&str, f64, f64, &str)> = loaded
            .rows
            .iter()
            .map(|r| {
                (
                    r.description.as_str(),
                    r.cash_amount,
                    r.transfer_amount,
                    r.sheet_name.as_str(),
                )
            })
            .collect();
        assert_eq!(
            got,
            vec![
                ("VENTA CLIENTE %A", 0.0, 50000.0, "01"),
                ("PAGO NEQUI %J", 0.0, 30000.0, "02"),
                ("LLANTA RIN 13", 120000.0, 0.0, "02"),
            ]
        );
    }

    #[cfg(feature = "xlsx")]
    #[test]
    fn test_read_workbook_file_records_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("marzo.xlsx");
        let data = month_workbook();
        std::fs::write(&path, &data).unwrap();
        let source = read_source(&path).unwrap();
        assert_eq!(source.sheets.len(), 3);
        assert_eq!(source.checksum, checksum_bytes(&data));
    }

    #[cfg(feature = "xlsx")]
    #[test]
    fn test_unreadable_sheet_becomes_empty_and_is_skipped() {
        let sheet = sheet_or_empty("15".to_string(), Err("corrupt sheet XML"));
        assert_eq!(sheet.name, "15");
        assert!(sheet.cells.is_empty());
        let loaded = run(&[sheet]);
        assert_eq!(loaded.stats.skipped_sheets, vec!["15".to_string()]);
    }

    #[test]
    fn test_checksum_is_stable() {
        assert_eq!(checksum_bytes(b"abc"), checksum_bytes(b"abc"));
        assert_eq!(checksum_bytes(b"abc").len(), 64);
    }
}
