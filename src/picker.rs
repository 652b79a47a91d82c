//! 作業ディレクトリ・マニフェストの対話式選択モジュール
//!
//! セッション状態機械からは「検証済みパスを返す協力者」として呼ばれる。

use crate::error::{Result, TnfScanError};
use dialoguer::{Confirm, Input, Select};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// マニフェストとして扱う拡張子
const MANIFEST_EXTENSIONS: &[&str] = &["csv", "xlsx", "xls"];

/// 作業ディレクトリを決定する
///
/// CLI引数で渡されたパスも同じ検証を通す。存在しない場合は確認の上で作成する。
pub fn prompt_for_working_directory(initial: Option<PathBuf>) -> Result<PathBuf> {
    let mut candidate = initial;

    loop {
        let path = match candidate.take() {
            Some(p) => p,
            None => {
                let raw: String = Input::new()
                    .with_prompt("セッションフォルダのパスを入力")
                    .interact_text()
                    .map_err(|e| TnfScanError::CliExecution(e.to_string()))?;
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    continue;
                }
                PathBuf::from(trimmed)
            }
        };

        if !path.exists() {
            let create = Confirm::new()
                .with_prompt(format!(
                    "フォルダが存在しません。作成しますか?\n  {}",
                    path.display()
                ))
                .default(false)
                .interact()
                .map_err(|e| TnfScanError::CliExecution(e.to_string()))?;
            if !create {
                continue;
            }
            if let Err(e) = std::fs::create_dir_all(&path) {
                println!("⚠ フォルダ作成に失敗しました: {}", e);
                continue;
            }
        }

        if !path.is_dir() {
            println!("⚠ ディレクトリではありません: {}", path.display());
            continue;
        }

        // 引き渡しXMLに絶対パスを書くため正規化して返す
        return Ok(std::fs::canonicalize(&path)?);
    }
}

/// 作業ディレクトリ直下のマニフェスト候補を名前順で返す
pub fn list_manifest_files(working_dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(working_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .map(|e| MANIFEST_EXTENSIONS.contains(&e.to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}

/// マニフェストファイルを選択する
///
/// 候補が1件だけならそれを自動選択。0件ならパス入力、複数なら番号選択。
pub fn pick_manifest_file(working_dir: &Path) -> Result<PathBuf> {
    let mut candidates = list_manifest_files(working_dir);

    if candidates.len() == 1 {
        let only = candidates.remove(0);
        println!("✔ マニフェスト: {}", file_name(&only));
        return Ok(only);
    }

    if candidates.is_empty() {
        loop {
            let raw: String = Input::new()
                .with_prompt("マニフェストが見つかりません。パスを入力")
                .interact_text()
                .map_err(|e| TnfScanError::CliExecution(e.to_string()))?;
            let path = PathBuf::from(raw.trim());
            if path.is_file() {
                return Ok(path);
            }
            println!("⚠ ファイルが見つかりません: {}", path.display());
        }
    }

    let names: Vec<String> = candidates.iter().map(|p| file_name(p)).collect();
    let index = Select::new()
        .with_prompt("マニフェストを選択")
        .items(&names)
        .default(0)
        .interact()
        .map_err(|e| TnfScanError::CliExecution(e.to_string()))?;

    Ok(candidates.swap_remove(index))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
