use thiserror::Error;

#[derive(Error, Debug)]
pub enum TnfScanError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("マニフェスト読み込みエラー: {0}")]
    ManifestRead(String),

    #[error("フォルダ作成エラー: {path}: {source}")]
    FolderCreation {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("引き渡しXML書き込みエラー: {0}")]
    HandoffWrite(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("CLI実行エラー: {0}")]
    CliExecution(String),
}

pub type Result<T> = std::result::Result<T, TnfScanError>;
