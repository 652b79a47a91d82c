//! 次キャプチャフォルダ引き渡しモジュール
//!
//! 最後に作成したLOTフォルダとサブフォルダ一覧を作業ディレクトリのXMLへ書き出す。
//! Capture One側のAppleScriptがこのファイルを読むため、常に最新状態だけを残す
//! （追記ではなく毎回全置換）。

use crate::error::{Result, TnfScanError};
use std::path::{Path, PathBuf};

/// 引き渡しXMLファイル名の既定値
pub const DEFAULT_XML_FILENAME: &str = "next_capture_folder.xml";

fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

fn build_xml(working_dir: &Path, lot_folder_name: &str, subfolder_names: &[String]) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(r#"<next_capture version="1.0">"#);
    xml.push('\n');
    xml.push_str(&format!(
        "  <working_dir>{}</working_dir>\n",
        escape_xml(&working_dir.display().to_string())
    ));
    xml.push_str(&format!(
        "  <lot_folder>{}</lot_folder>\n",
        escape_xml(lot_folder_name)
    ));
    // current_subfolderは書き込み時に常に1へ戻す
    xml.push_str("  <current_subfolder>1</current_subfolder>\n");

    if subfolder_names.is_empty() {
        xml.push_str("  <subfolders />\n");
    } else {
        xml.push_str("  <subfolders>\n");
        for name in subfolder_names {
            xml.push_str(&format!("    <subfolder>{}</subfolder>\n", escape_xml(name)));
        }
        xml.push_str("  </subfolders>\n");
    }

    xml.push_str("</next_capture>\n");
    xml
}

/// LOTフォルダとサブフォルダの状態を引き渡しXMLへ書き出す
///
/// `lot_folder` はフォルダ名（basename）だけを書く。サブフォルダは作成順。
pub fn publish(
    working_dir: &Path,
    lot_folder: &Path,
    subfolders: &[PathBuf],
    xml_filename: &str,
) -> Result<PathBuf> {
    let lot_folder_name = lot_folder
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let subfolder_names: Vec<String> = subfolders
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .collect();

    let xml_path = working_dir.join(xml_filename);
    let xml = build_xml(working_dir, &lot_folder_name, &subfolder_names);
    std::fs::write(&xml_path, xml)
        .map_err(|e| TnfScanError::HandoffWrite(format!("{}: {}", xml_path.display(), e)))?;

    Ok(xml_path)
}
