use crate::config::Settings;
use crate::error::TransferError;
use crate::tools::file_hasher::ContentHash;
use crate::tools::sqlite_hash_store::SqliteHashStore;
use log::info;
use std::collections::HashSet;

/// 已傳輸檔案的 hash 紀錄
///
/// `record` 必須是冪等的：重複記錄同一個 hash 不會有任何效果。
pub trait HashStore {
    fn contains(&self, hash: &ContentHash) -> Result<bool, TransferError>;
    fn record(&mut self, hash: &ContentHash) -> Result<(), TransferError>;
}

/// 只存在於單次執行的 hash 紀錄
#[derive(Debug, Clone, Default)]
pub struct MemoryHashStore {
    hashes: HashSet<ContentHash>,
}

impl MemoryHashStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

impl HashStore for MemoryHashStore {
    fn contains(&self, hash: &ContentHash) -> Result<bool, TransferError> {
        Ok(self.hashes.contains(hash))
    }

    fn record(&mut self, hash: &ContentHash) -> Result<(), TransferError> {
        self.hashes.insert(*hash);
        Ok(())
    }
}

/// 依設定選擇 hash 紀錄：有 `sqlite_database` 時使用持久化版本
pub fn open_hash_store(settings: &Settings) -> Result<Box<dyn HashStore>, TransferError> {
    match &settings.sqlite_database {
        // dry run 不建立新的資料庫檔案
        Some(path) if settings.dry_run && !path.exists() => {
            info!("[dry run] {} 尚不存在，以空的 hash 紀錄執行", path.display());
            Ok(Box::new(MemoryHashStore::new()))
        }
        Some(path) => {
            let store = SqliteHashStore::open(path)?;
            info!(
                "已從 {} 載入 {} 筆 hash 紀錄",
                path.display(),
                store.len()
            );
            Ok(Box::new(store))
        }
        None => Ok(Box::new(MemoryHashStore::new())),
    }
}
