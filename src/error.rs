use std::path::PathBuf;

use thiserror::Error;

/// 傳輸流程的錯誤分類
///
/// 只有 `SourceUnavailable` 與 `HashStoreUnavailable` 會中止整個執行，
/// 其餘錯誤只影響單一檔案。
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("無法存取相機資料夾: {}", path.display())]
    SourceUnavailable { path: PathBuf },

    #[error("無法開啟 hash 資料庫: {}", path.display())]
    HashStoreUnavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("hash 資料庫錯誤: {0}")]
    HashStore(#[from] rusqlite::Error),

    #[error("無法讀取拍攝資訊 {}: {reason}", path.display())]
    MetadataUnreadable { path: PathBuf, reason: String },

    #[error("無法計算 hash: {}", path.display())]
    HashComputeFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("寫入失敗: {}", path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("目的地檔案已存在: {}", path.display())]
    NamingCollision { path: PathBuf },
}

impl TransferError {
    /// 是否需要中止整個執行
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::SourceUnavailable { .. } | Self::HashStoreUnavailable { .. }
        )
    }
}
