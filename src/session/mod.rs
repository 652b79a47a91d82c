//! スキャンセッションの状態機械
//!
//! 端末の入力ループ。入力1行を exit / add / スキャンへ振り分け、
//! スキャンはマニフェスト索引→フォルダ作成→引き渡しXML→GES通知の順に処理する。
//! セッション状態は単一の`SessionContext`で持ち回り、グローバル状態は持たない。

use crate::capture;
use crate::config::Config;
use crate::error::Result;
use crate::ges::LotNotifier;
use crate::handoff;
use crate::manifest::{self, ManifestRow};
use crate::picker;
use std::path::{Path, PathBuf};

/// セッション状態
///
/// スキャン成功とマニフェスト選び直しのたびに更新され、プロセス終了で破棄される。
#[derive(Debug)]
pub struct SessionContext {
    pub working_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub rows: Vec<ManifestRow>,
    /// 直前に作成したLOTフォルダ（addコマンドの対象）
    pub last_lot_folder: Option<PathBuf>,
}

impl SessionContext {
    pub fn new(working_dir: PathBuf, manifest_path: PathBuf, rows: Vec<ManifestRow>) -> Self {
        Self {
            working_dir,
            manifest_path,
            rows,
            last_lot_folder: None,
        }
    }
}

/// 入力1行の解釈結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// 空入力（黙って無視）
    Ignore,
    /// セッション終了
    Exit,
    /// 直前のLOTフォルダへサブフォルダ追加
    Add(String),
    /// 名前なしのadd（使い方を表示）
    AddUsage,
    /// バーコードスキャン
    Scan(String),
}

/// 入力1行をコマンドへ解釈する
pub fn parse_command(input: &str) -> SessionCommand {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return SessionCommand::Ignore;
    }
    if trimmed.eq_ignore_ascii_case("exit") {
        return SessionCommand::Exit;
    }

    // "add " 接頭辞の判定は右側の空白を残したまま行う
    // （"add   " は名前なしのaddであってスキャン入力ではない）
    let start = input.trim_start();
    if start.to_lowercase().starts_with("add ") {
        let name = start[4..].trim();
        if name.is_empty() {
            return SessionCommand::AddUsage;
        }
        return SessionCommand::Add(name.to_string());
    }

    SessionCommand::Scan(trimmed.to_string())
}

/// スキャン1回の結果
#[derive(Debug)]
pub enum ScanOutcome {
    /// 一致する行なし。マニフェストが消えていれば選び直しが必要
    NoMatch { manifest_missing: bool },
    /// LOTフォルダ作成済み
    Created {
        lot_num: String,
        lot_folder: PathBuf,
        subfolders: Vec<PathBuf>,
    },
}

/// スキャン1回分のフォルダ作成処理
///
/// LOTを解決できなければ何も作らない。解決できたら次の連番でLOTフォルダを
/// 作成し、同じLOTの行ごとにサブフォルダを作成して状態を更新する。
pub fn process_scan(ctx: &mut SessionContext, config: &Config, token: &str) -> Result<ScanOutcome> {
    let lot_num = match manifest::find_lot_by_scan(&ctx.rows, token) {
        Some(lot) => lot,
        None => {
            return Ok(ScanOutcome::NoMatch {
                manifest_missing: !ctx.manifest_path.exists(),
            });
        }
    };

    let capture_dir = ctx.working_dir.join(&config.capture_dir_name);
    let counter = capture::next_counter(&capture_dir);
    let lot_folder = capture::create_lot_folder(&capture_dir, counter, &lot_num)?;
    println!("-{}", file_name(&lot_folder));

    let matching = manifest::rows_for_lot(&ctx.rows, &lot_num);
    if matching.is_empty() {
        println!("⚠ このLOT #の行が無いためサブフォルダは作成しません");
    }

    let subfolders = capture::create_subfolders(&lot_folder, &matching)?;
    for sub in &subfolders {
        println!("--{}", file_name(sub));
    }

    ctx.last_lot_folder = Some(lot_folder.clone());
    Ok(ScanOutcome::Created {
        lot_num,
        lot_folder,
        subfolders,
    })
}

/// スキャン入力1件を処理する（引き渡しXML・GES通知まで）
///
/// 引き渡しXMLの失敗は報告のみで継続。GES通知は引き渡し後にのみ行う。
/// マニフェストの選び直しは対話になるため呼び出し側で行う。
pub async fn handle_scan<N: LotNotifier>(
    ctx: &mut SessionContext,
    config: &Config,
    notifier: &N,
    token: &str,
    verbose: bool,
) -> Result<ScanOutcome> {
    let outcome = process_scan(ctx, config, token)?;

    if let ScanOutcome::Created {
        lot_num,
        lot_folder,
        subfolders,
    } = &outcome
    {
        if verbose {
            println!("✔ LOT #一致: {}", lot_num);
        }

        match handoff::publish(&ctx.working_dir, lot_folder, subfolders, &config.xml_filename) {
            Ok(path) => {
                if verbose {
                    println!("✔ 引き渡しXML更新: {}", path.display());
                }
            }
            Err(e) => println!("⚠ {}", e),
        }

        notifier.mark_as_shot(lot_num).await;
    }

    Ok(outcome)
}

/// 対話ループ本体
///
/// 明示的な`exit`（または入力の終端）までエラーで終了しない。
pub async fn run_session<N: LotNotifier>(
    ctx: &mut SessionContext,
    config: &Config,
    notifier: &N,
    verbose: bool,
) -> Result<()> {
    println!("GESバーコードをスキャンまたは入力してください。'exit' で終了します。");
    println!("'add <名前>' で直前のLOTフォルダにサブフォルダを追加できます。");

    let stdin = std::io::stdin();
    let mut line = String::new();

    loop {
        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            // 入力の終端はexit扱い
            println!("終了します。");
            break;
        }

        match parse_command(&line) {
            SessionCommand::Ignore => continue,
            SessionCommand::Exit => {
                println!("終了します。");
                break;
            }
            SessionCommand::AddUsage => {
                println!("⚠ addの後にフォルダ名を指定してください (例: add x)");
            }
            SessionCommand::Add(name) => handle_add(ctx, &name),
            SessionCommand::Scan(token) => {
                match handle_scan(ctx, config, notifier, &token, verbose).await {
                    Ok(ScanOutcome::NoMatch { manifest_missing }) => {
                        println!(
                            "⚠ GESバーコードに {} を含む行がありません: {}",
                            token,
                            ctx.manifest_path.display()
                        );
                        if manifest_missing {
                            println!("マニフェストファイルが見つからないため選び直します。");
                            repick_manifest(ctx);
                        }
                    }
                    Ok(ScanOutcome::Created { .. }) => {}
                    // フォルダ作成失敗はこのスキャンだけ中断してループ継続
                    Err(e) => println!("⚠ {}", e),
                }
            }
        }
    }

    Ok(())
}

fn handle_add(ctx: &SessionContext, name: &str) {
    let lot_folder = match &ctx.last_lot_folder {
        Some(folder) if folder.exists() => folder,
        _ => {
            println!("⚠ 直前のLOTフォルダがありません。先にGESバーコードをスキャンしてください。");
            return;
        }
    };

    match capture::add_named_subfolder(lot_folder, name) {
        Ok(sub) => println!("--{}", file_name(&sub)),
        Err(e) => println!("⚠ {}", e),
    }
}

fn repick_manifest(ctx: &mut SessionContext) {
    let new_path = match picker::pick_manifest_file(&ctx.working_dir) {
        Ok(path) => path,
        Err(e) => {
            println!("⚠ {}", e);
            return;
        }
    };

    match manifest::load_rows(&new_path) {
        Ok(rows) => {
            println!("✔ マニフェスト読み込み: {} ({}行)", new_path.display(), rows.len());
            ctx.manifest_path = new_path;
            ctx.rows = rows;
        }
        // 読めなければ元の行セットのまま継続
        Err(e) => println!("⚠ {}", e),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
