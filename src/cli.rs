use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tnf-scan")]
#[command(about = "GESバーコードスキャン・Captureフォルダ作成ツール", long_about = None)]
pub struct Cli {
    /// セッションフォルダ（省略時は対話で入力）
    pub working_dir: Option<PathBuf>,

    /// マニフェストファイル（CSV/Excel、省略時は作業フォルダから選択）
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,

    /// 引き渡しXMLのファイル名（設定ファイルより優先）
    #[arg(long)]
    pub xml_name: Option<String>,

    /// GESの撮影済みマークを無効化
    #[arg(long)]
    pub no_mark_shot: bool,

    /// 詳細ログを出力
    #[arg(short, long)]
    pub verbose: bool,
}
