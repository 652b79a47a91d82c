//! Captureフォルダ割り当てモジュール
//!
//! 作業ディレクトリ配下のCapture/に連番付きLOTフォルダを作成する。
//! 連番は既存フォルダ名から導出するため、プロセスを再起動しても続きから振られる。

use crate::error::{Result, TnfScanError};
use crate::manifest::{ManifestRow, IMAGE_KEYS};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Captureフォルダ名の既定値
pub const DEFAULT_CAPTURE_DIR: &str = "Capture";

lazy_static! {
    // 先頭の3桁連番（"001_LotName" または "001"）
    static ref COUNTER_PREFIX_RE: Regex = Regex::new(r"^(\d{3})(?:_|$)").unwrap();
}

/// パス区切り文字（`/` と `\`）を `-` に置換する
pub fn safe_name(name: &str) -> String {
    name.replace(['/', '\\'], "-")
}

/// 既存フォルダ名から次の連番を導出する
///
/// フォルダ名の最初の `_` より前が3桁の数字であるものだけを数える。
/// 形式に合わないフォルダ名は無視する。フォルダが無ければ1を返す。
pub fn next_counter(capture_dir: &Path) -> u32 {
    if !capture_dir.exists() {
        return 1;
    }

    let mut max_seen = 0u32;
    for entry in WalkDir::new(capture_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if let Some(caps) = COUNTER_PREFIX_RE.captures(&name) {
            if let Ok(n) = caps[1].parse::<u32>() {
                max_seen = max_seen.max(n);
            }
        }
    }

    max_seen + 1
}

fn create_dir_idempotent(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| TnfScanError::FolderCreation {
        path: path.display().to_string(),
        source: e,
    })
}

/// LOTフォルダ `{連番:03}_{LOT名}` を作成する（既存でもエラーにしない）
pub fn create_lot_folder(capture_dir: &Path, counter: u32, lot_num: &str) -> Result<PathBuf> {
    let folder = capture_dir.join(format!("{:03}_{}", counter, safe_name(lot_num)));
    create_dir_idempotent(&folder)?;
    Ok(folder)
}

/// 画像名を持つ各行に対応するサブフォルダを作成する
///
/// 画像名が空の行は飛ばす。作成済みのフォルダはそのまま。
/// 返り値は行順の作成パス一覧（重複可）。
pub fn create_subfolders(lot_folder: &Path, rows: &[&ManifestRow]) -> Result<Vec<PathBuf>> {
    let mut created = Vec::new();

    for row in rows {
        let image_name = row.resolve(IMAGE_KEYS);
        if image_name.is_empty() {
            continue;
        }
        let subfolder = lot_folder.join(safe_name(image_name));
        create_dir_idempotent(&subfolder)?;
        created.push(subfolder);
    }

    Ok(created)
}

/// LOTフォルダへ追加のサブフォルダ `{LOT名}-{名前}` を作成する
///
/// LOT名はフォルダ名から `NNN_` 接頭辞を除いたもの（`_` が無ければ全体）。
pub fn add_named_subfolder(lot_folder: &Path, name: &str) -> Result<PathBuf> {
    let folder_name = lot_folder
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let lot_name = match folder_name.split_once('_') {
        Some((_, rest)) => rest.to_string(),
        None => folder_name,
    };

    let subfolder = lot_folder.join(format!("{}-{}", lot_name, safe_name(name)));
    create_dir_idempotent(&subfolder)?;
    Ok(subfolder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_safe_name() {
        assert_eq!(safe_name("A/B\\C"), "A-B-C");
        assert_eq!(safe_name("plain"), "plain");
        assert_eq!(safe_name(""), "");
    }

    #[test]
    fn test_next_counter_missing_dir() {
        let dir = tempdir().unwrap();
        assert_eq!(next_counter(&dir.path().join("Capture")), 1);
    }

    #[test]
    fn test_next_counter_empty_dir() {
        let dir = tempdir().unwrap();
        assert_eq!(next_counter(dir.path()), 1);
    }

    #[test]
    fn test_next_counter_from_existing_folders() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("001_LotA")).unwrap();
        std::fs::create_dir(dir.path().join("002_LotB")).unwrap();
        assert_eq!(next_counter(dir.path()), 3);
    }

    #[test]
    fn test_next_counter_ignores_nonconforming_names() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("005_LotA")).unwrap();
        std::fs::create_dir(dir.path().join("12_Short")).unwrap();
        std::fs::create_dir(dir.path().join("0099_Long")).unwrap();
        std::fs::create_dir(dir.path().join("abc_Letters")).unwrap();
        std::fs::create_dir(dir.path().join("notes")).unwrap();
        assert_eq!(next_counter(dir.path()), 6);
    }

    #[test]
    fn test_next_counter_accepts_bare_three_digits() {
        // "_" なしでも3桁数字ならカウント対象
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("007")).unwrap();
        assert_eq!(next_counter(dir.path()), 8);
    }

    #[test]
    fn test_next_counter_ignores_files() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("001_LotA")).unwrap();
        std::fs::write(dir.path().join("009_file"), b"x").unwrap();
        assert_eq!(next_counter(dir.path()), 2);
    }

    #[test]
    fn test_create_lot_folder_idempotent() {
        let dir = tempdir().unwrap();
        let capture = dir.path().join("Capture");

        let first = create_lot_folder(&capture, 1, "L100").unwrap();
        assert!(first.is_dir());
        assert_eq!(first.file_name().unwrap(), "001_L100");

        // 2回目もエラーにならない
        let again = create_lot_folder(&capture, 1, "L100").unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn test_create_lot_folder_sanitizes_lot_name() {
        let dir = tempdir().unwrap();
        let folder = create_lot_folder(dir.path(), 2, "A/B\\C").unwrap();
        assert_eq!(folder.file_name().unwrap(), "002_A-B-C");
    }

    #[test]
    fn test_create_subfolders_skips_empty_image_names() {
        let dir = tempdir().unwrap();
        let lot_folder = dir.path().join("001_L100");
        std::fs::create_dir(&lot_folder).unwrap();

        let headers = vec!["lot #".to_string(), "image file name".to_string()];
        let rows = vec![
            ManifestRow::from_cells(&headers, &["L100".to_string(), "front".to_string()]),
            ManifestRow::from_cells(&headers, &["L100".to_string(), "".to_string()]),
            ManifestRow::from_cells(&headers, &["L100".to_string(), "back".to_string()]),
        ];
        let refs: Vec<&ManifestRow> = rows.iter().collect();

        let created = create_subfolders(&lot_folder, &refs).unwrap();
        assert_eq!(created.len(), 2);
        assert!(lot_folder.join("front").is_dir());
        assert!(lot_folder.join("back").is_dir());

        // 再実行してもエラーなし・重複作成なし
        let again = create_subfolders(&lot_folder, &refs).unwrap();
        assert_eq!(again.len(), 2);
    }

    #[test]
    fn test_add_named_subfolder_strips_counter_prefix() {
        let dir = tempdir().unwrap();
        let lot_folder = dir.path().join("001_LotName");
        std::fs::create_dir(&lot_folder).unwrap();

        let sub = add_named_subfolder(&lot_folder, "shotB").unwrap();
        assert_eq!(sub.file_name().unwrap(), "LotName-shotB");
        assert!(sub.is_dir());
    }

    #[test]
    fn test_add_named_subfolder_without_underscore() {
        let dir = tempdir().unwrap();
        let lot_folder = dir.path().join("LotName");
        std::fs::create_dir(&lot_folder).unwrap();

        let sub = add_named_subfolder(&lot_folder, "extra").unwrap();
        assert_eq!(sub.file_name().unwrap(), "LotName-extra");
    }

    #[test]
    fn test_add_named_subfolder_sanitizes_name() {
        let dir = tempdir().unwrap();
        let lot_folder = dir.path().join("001_L100");
        std::fs::create_dir(&lot_folder).unwrap();

        let sub = add_named_subfolder(&lot_folder, "a/b").unwrap();
        assert_eq!(sub.file_name().unwrap(), "L100-a-b");
    }
}
