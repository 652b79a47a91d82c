//! マニフェスト索引モジュール
//!
//! CSV/Excelのマニフェストを正規化済みの行レコードへ読み込み、
//! バーコード→LOT番号の解決とLOT番号での行検索を行う。
//! 列名は候補名リスト（先に見つかったものを採用）で解決する。

use crate::error::{Result, TnfScanError};
use calamine::Reader;
use std::collections::HashMap;
use std::path::Path;

/// GESバーコード列の候補名（優先順）
pub const BARCODE_KEYS: &[&str] = &["ges barcode", "gesbarcode", "ges_barcode"];

/// LOT番号列の候補名（優先順）
pub const LOT_KEYS: &[&str] = &["lot #", "lot#", "lot number", "lot no", "lot"];

/// 画像名列の候補名（優先順）
pub const IMAGE_KEYS: &[&str] = &["image file name", "image filename", "image_name"];

/// マニフェストの1行
///
/// 列名は小文字・前後空白除去で正規化済み。値は前後空白除去のみ。
#[derive(Debug, Clone, Default)]
pub struct ManifestRow {
    values: HashMap<String, String>,
}

impl ManifestRow {
    /// ヘッダーとセル値から1行を構築する（足りないセルは空文字）
    pub fn from_cells(headers: &[String], cells: &[String]) -> Self {
        let mut values = HashMap::new();
        for (i, header) in headers.iter().enumerate() {
            let value = cells.get(i).cloned().unwrap_or_default();
            values.insert(header.clone(), value);
        }
        Self { values }
    }

    /// 候補名リストのうち最初に存在する列の値を返す（無ければ空文字）
    pub fn resolve(&self, keys: &[&str]) -> &str {
        keys.iter()
            .find_map(|k| self.values.get(*k))
            .map(|s| s.as_str())
            .unwrap_or("")
    }
}

/// マニフェストファイルを読み込む（拡張子でCSV/Excelを判別）
pub fn load_rows(path: &Path) -> Result<Vec<ManifestRow>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xls" => load_rows_excel(path),
        _ => load_rows_csv(path),
    }
}

fn load_rows_csv(path: &Path) -> Result<Vec<ManifestRow>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| TnfScanError::ManifestRead(format!("{}: {}", path.display(), e)))?;
    load_rows_from_csv_str(&content)
}

/// CSV文字列からマニフェスト行を読み込む
///
/// 1行目をヘッダーとして扱う。先頭のUTF-8 BOMは除去する。
pub fn load_rows_from_csv_str(content: &str) -> Result<Vec<ManifestRow>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| TnfScanError::ManifestRead(format!("ヘッダー行: {}", e)))?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| TnfScanError::ManifestRead(e.to_string()))?;
        let cells: Vec<String> = record.iter().map(|c| c.trim().to_string()).collect();
        rows.push(ManifestRow::from_cells(&headers, &cells));
    }

    Ok(rows)
}

fn load_rows_excel(path: &Path) -> Result<Vec<ManifestRow>> {
    let mut workbook = calamine::open_workbook_auto(path)
        .map_err(|e| TnfScanError::ManifestRead(format!("{}: {}", path.display(), e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| {
            TnfScanError::ManifestRead(format!("{}: シートがありません", path.display()))
        })?
        .map_err(|e| TnfScanError::ManifestRead(format!("{}: {}", path.display(), e)))?;

    let mut cell_rows = range.rows();
    let headers: Vec<String> = match cell_rows.next() {
        Some(header_cells) => header_cells
            .iter()
            .map(|c| c.to_string().trim().to_lowercase())
            .collect(),
        None => return Ok(Vec::new()),
    };

    let mut rows = Vec::new();
    for cells in cell_rows {
        let cells: Vec<String> = cells.iter().map(|c| c.to_string().trim().to_string()).collect();
        rows.push(ManifestRow::from_cells(&headers, &cells));
    }

    Ok(rows)
}

/// スキャン入力に一致する最初の行のLOT番号を返す
///
/// バーコード値への大文字小文字を無視した部分一致。
/// スキャナが前後にチェック文字を付けても拾えるように部分一致にしている。
/// 一致した行のLOT番号が空の場合はその行を飛ばして探し続ける。
pub fn find_lot_by_scan(rows: &[ManifestRow], token: &str) -> Option<String> {
    let needle = token.to_lowercase();
    for row in rows {
        let barcode = row.resolve(BARCODE_KEYS);
        if barcode.to_lowercase().contains(&needle) {
            let lot = row.resolve(LOT_KEYS);
            if !lot.is_empty() {
                return Some(lot.to_string());
            }
        }
    }
    None
}

/// LOT番号が一致する行を元の順序で返す（完全一致、大文字小文字無視）
pub fn rows_for_lot<'a>(rows: &'a [ManifestRow], lot_num: &str) -> Vec<&'a ManifestRow> {
    let target = lot_num.to_lowercase();
    rows.iter()
        .filter(|row| row.resolve(LOT_KEYS).to_lowercase() == target)
        .collect()
}
