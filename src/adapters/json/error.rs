use std::path::PathBuf;
use thiserror::Error;

/// JSONファイルストアのエラー
#[derive(Debug, Error)]
pub enum JsonStoreError {
    /// ファイルの読み書きに失敗
    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSONの変換に失敗
    #[error("Invalid JSON in {}", path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// 採番カウンタが上限に達した
    #[error("No ids left to allocate in {}", path.display())]
    IdSpaceExhausted { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, JsonStoreError>;
